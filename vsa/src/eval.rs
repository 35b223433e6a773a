// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! The expression evaluator: interprets an SSA expression against an
//! [`AbsEnv`], producing either a scalar value set or a memory store. Total
//! by construction — every unhandled shape degrades to top of the right
//! width rather than failing the caller.

use num_bigint::BigInt;

use crate::algebra::ValueSet;
use crate::config::VsaConfig;
use crate::env::AbsEnv;
use crate::memstore::MemStore;
use crate::ssa::{Expr, Var};

/// The result of evaluating an expression whose scalar/array nature isn't
/// known ahead of time (the public `eval_expr` entry point).
#[derive(Clone, Debug, PartialEq)]
pub enum EvalResult {
    Scalar(ValueSet),
    Array(MemStore),
}

pub(crate) fn static_width(e: &Expr) -> u32 {
    match e {
        Expr::ConstInt { width, .. } => *width,
        Expr::Var(v) => v.width,
        Expr::Phi(vars) => vars.first().map(|v| v.width).unwrap_or(0),
        Expr::BinOp { width, .. } => *width,
        Expr::UnOp { width, .. } => *width,
        Expr::Cast { target_width, .. } => *target_width,
        Expr::Cmp { .. } => 1,
        Expr::Load { result_width, .. } => *result_width,
        Expr::Store { value_width, .. } => *value_width,
        Expr::Concat(hi, lo) => static_width(hi) + static_width(lo),
        Expr::Extract { hi_bit, lo_bit, .. } => hi_bit - lo_bit + 1,
        Expr::Ite { then_branch, .. } => static_width(then_branch),
        Expr::Unknown { width } => *width,
    }
}

fn scalar_phi(env: &AbsEnv, vars: &[Var]) -> ValueSet {
    let width = vars.first().map(|v| v.width).unwrap_or(0);
    let mut bound = vars.iter().filter(|v| env.is_bound(v)).map(|v| env.find_scalar(v));
    match bound.next() {
        None => ValueSet::top(width),
        Some(first) => bound.fold(first, |acc, v| acc.union(&v)),
    }
}

fn array_phi(env: &AbsEnv, vars: &[Var]) -> MemStore {
    let mut bound = vars.iter().filter(|v| env.is_bound(v)).map(|v| env.find_array(v));
    match bound.next() {
        None => MemStore::new(),
        Some(first) => bound.fold(first, |acc, m| acc.union(&m)),
    }
}

/// Evaluates a register-typed (scalar) expression against the recognized
/// dispatch list; any other shape (array expressions used in scalar
/// position, `Concat`/`Extract`/`Ite`/`Unknown`) is treated as unimplemented
/// and yields top.
pub fn eval_scalar(env: &AbsEnv, cfg: &VsaConfig, e: &Expr) -> ValueSet {
    match e {
        Expr::ConstInt { value, width } => ValueSet::of_int(BigInt::from(*value), *width),
        Expr::Var(v) => env.find_scalar(v),
        Expr::Phi(vars) => scalar_phi(env, vars),
        Expr::BinOp { op, lhs, rhs, .. } => {
            let l = eval_scalar(env, cfg, lhs);
            let r = eval_scalar(env, cfg, rhs);
            l.binop(*op, &r)
        }
        Expr::UnOp { op, arg, .. } => eval_scalar(env, cfg, arg).unop(*op),
        Expr::Cast { kind, target_width, arg } => {
            eval_scalar(env, cfg, arg).cast(*kind, *target_width)
        }
        Expr::Load { mem, index, result_width, .. } => {
            let store = env.find_array(mem);
            let addr = eval_scalar(env, cfg, index);
            store.read(*result_width, &addr, cfg.mem_max)
        }
        // Cmp, Concat, Extract, Ite, Unknown, and a Store used in scalar
        // position: unimplemented combinations, degrade to top.
        _ => ValueSet::top(static_width(e)),
    }
}

/// Evaluates a memory-typed (array) expression against the recognized
/// dispatch list.
pub fn eval_array(env: &AbsEnv, cfg: &VsaConfig, e: &Expr) -> MemStore {
    match e {
        Expr::Var(v) => env.find_array(v),
        Expr::Store { mem, index, value, value_width, .. } => {
            let store = env.find_array(mem);
            let addr = eval_scalar(env, cfg, index);
            let val = eval_scalar(env, cfg, value);
            store.write(*value_width, &addr, &val, cfg.mem_max)
        }
        Expr::Phi(vars) => array_phi(env, vars),
        _ => MemStore::new(),
    }
}

/// Public entry point: evaluates `e` against `env`, dispatching on whether
/// `e` is scalar- or array-shaped. Statement transfer knows the
/// destination's declared kind up front and calls [`eval_scalar`]/
/// [`eval_array`] directly instead; this helper is for callers like jump
/// target resolution that only ever want a scalar result and have no
/// destination variable to consult, so a bare array-typed `Phi` here falls
/// through to the scalar (top) case rather than being misclassified.
pub fn eval_expr(env: &AbsEnv, cfg: &VsaConfig, e: &Expr) -> EvalResult {
    match e {
        Expr::Var(v) if v.kind == crate::ssa::VarKind::Array => {
            EvalResult::Array(eval_array(env, cfg, e))
        }
        Expr::Store { .. } => EvalResult::Array(eval_array(env, cfg, e)),
        _ => EvalResult::Scalar(eval_scalar(env, cfg, e)),
    }
}
