// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! Edge transfer: refines an [`AbsEnv`] along a CFG edge using its branch
//! predicate. Recognition is deliberately separated from refinement (spec
//! §9) — each `recognize_*` / `refine_*` pair below can gain a new pattern
//! without touching the driver or each other.

use num_bigint::BigInt;

use crate::algebra::{StridedInterval, ValueSet};
use crate::config::VsaConfig;
use crate::env::{AbsEnv, Binding};
use crate::eval::{eval_scalar, static_width};
use crate::region::Region;
use crate::ssa::{CmpOp, EdgeLabel, Expr};

fn as_literal(e: &Expr) -> Option<i128> {
    match e {
        Expr::ConstInt { value, .. } => Some(*value),
        _ => None,
    }
}

/// Matches `EQ(inner, literal)` in either argument order, returning
/// `(inner, literal)`.
fn as_eq_bool(e: &Expr) -> Option<(&Expr, i128)> {
    if let Expr::Cmp { op: CmpOp::Eq, lhs, rhs } = e {
        if let Some(k) = as_literal(rhs) {
            return Some((lhs, k));
        }
        if let Some(k) = as_literal(lhs) {
            return Some((rhs, k));
        }
    }
    None
}

fn accept_cmp(op: CmpOp, signedness_hack: bool) -> bool {
    match op {
        CmpOp::Sle | CmpOp::Slt => true,
        CmpOp::Le | CmpOp::Lt => signedness_hack,
        _ => false,
    }
}

/// Intersects the value set bound at `target` with `vs_c`: a direct rebind
/// if `target` is a variable, or a `write_intersection` into the
/// underlying memory if `target` is a `Load`.
fn refine_target(env: &AbsEnv, cfg: &VsaConfig, target: &Expr, vs_c: &ValueSet) -> AbsEnv {
    match target {
        Expr::Var(v) => {
            let old = env.find_scalar(v);
            env.bind(v.clone(), Binding::Scalar(old.intersection(vs_c)))
        }
        Expr::Load { mem, index, result_width, .. } => {
            let old = eval_scalar(env, cfg, target);
            let refined = old.intersection(vs_c);
            let idx = eval_scalar(env, cfg, index);
            let store = env.find_array(mem);
            let new_store = store.write_intersection(*result_width, &idx, &refined);
            env.bind(mem.clone(), Binding::Array(new_store))
        }
        _ => env.clone(),
    }
}

/// Mirrors an ordering op when the constant sits on its lhs: `k OP x` holds
/// iff `x OP' k` does not, where `OP'` is `OP`'s strict/non-strict dual.
/// E.g. `k <= x` is `NOT(x < k)`, so `(Sle, flip) -> (Slt, negated literal)`.
fn mirror_cmp(op: CmpOp) -> Option<CmpOp> {
    match op {
        CmpOp::Sle => Some(CmpOp::Slt),
        CmpOp::Slt => Some(CmpOp::Sle),
        CmpOp::Le => Some(CmpOp::Lt),
        CmpOp::Lt => Some(CmpOp::Le),
        _ => None,
    }
}

/// Normalizes `Cmp(op, lhs, rhs)` to the `x OP k` shape regardless of which
/// side the literal is on, returning `(x, op, k, bool_literal)`.
fn normalize_ordering<'a>(
    op: CmpOp,
    lhs: &'a Expr,
    rhs: &'a Expr,
    bool_literal: i128,
) -> Option<(&'a Expr, CmpOp, i128, i128)> {
    if let Some(k) = as_literal(rhs) {
        return Some((lhs, op, k, bool_literal));
    }
    if let Some(k) = as_literal(lhs) {
        let mirrored = mirror_cmp(op)?;
        return Some((rhs, mirrored, k, 1 - bool_literal));
    }
    None
}

/// Pattern 1: `EQ(Cmp(op, x, k), bool_literal)`, `op` a recognized
/// ordering comparison, the constant in either argument order.
fn refine_pattern1(env: &AbsEnv, cfg: &VsaConfig, inner: &Expr, bool_literal: i128) -> Option<AbsEnv> {
    let Expr::Cmp { op, lhs, rhs } = inner else {
        return None;
    };
    if !accept_cmp(*op, cfg.signedness_hack) {
        return None;
    }
    let (x, op, k, bool_literal) = normalize_ordering(*op, lhs.as_ref(), rhs.as_ref(), bool_literal)?;
    let width = static_width(x);
    let kb = BigInt::from(k);
    // bool_literal = 1 keeps `x OP k` as stated; bool_literal = 0 negates it,
    // which both inverts the comparison and flips which bound it constrains
    // (SLE's negation is a strict lower bound, not an SLT upper bound).
    let si = match (op, bool_literal) {
        (CmpOp::Sle, 1) => StridedInterval::signed_beloweq(width, kb),
        (CmpOp::Sle, 0) => StridedInterval::signed_above(width, kb),
        (CmpOp::Slt, 1) => StridedInterval::signed_below(width, kb),
        (CmpOp::Slt, 0) => StridedInterval::signed_aboveeq(width, kb),
        (CmpOp::Le, 1) => StridedInterval::unsigned_beloweq(width, kb),
        (CmpOp::Le, 0) => StridedInterval::unsigned_above(width, kb),
        (CmpOp::Lt, 1) => StridedInterval::unsigned_below(width, kb),
        (CmpOp::Lt, 0) => StridedInterval::unsigned_aboveeq(width, kb),
        _ => return None,
    };
    let vs_c = ValueSet::single(Region::GLOBAL, si);
    Some(refine_target(env, cfg, x, &vs_c))
}

/// Pattern 2: `EQ(Cmp({EQ, NEQ}, v, k), bool_literal)`, the constant in
/// either argument order (equality is symmetric, no direction to flip).
fn refine_pattern2(env: &AbsEnv, cfg: &VsaConfig, inner: &Expr, bool_literal: i128) -> Option<AbsEnv> {
    let Expr::Cmp { op, lhs, rhs } = inner else {
        return None;
    };
    if !matches!(op, CmpOp::Eq | CmpOp::Neq) {
        return None;
    }
    let (v, k) = match (as_literal(rhs), as_literal(lhs)) {
        (Some(k), _) => (lhs, k),
        (None, Some(k)) => (rhs, k),
        (None, None) => return None,
    };
    let positive = matches!((op, bool_literal), (CmpOp::Eq, 1) | (CmpOp::Neq, 0));
    if !positive {
        // Disequality direction: recognized, but refinement is a no-op.
        return Some(env.clone());
    }
    let width = static_width(v);
    let vs_c = ValueSet::of_int(BigInt::from(k), width);
    Some(refine_target(env, cfg, v, &vs_c))
}

/// Pattern 3: `Cmp({SLT, SLE}, v2, v1)` on the taken edge.
fn refine_pattern3(env: &AbsEnv, predicate: &Expr, taken: bool) -> Option<AbsEnv> {
    if !taken {
        return None;
    }
    let Expr::Cmp { op, lhs: v2, rhs: v1 } = predicate else {
        return None;
    };
    if !matches!(op, CmpOp::Slt | CmpOp::Sle) {
        return None;
    }
    let Expr::Var(v1var) = v1.as_ref() else {
        return None;
    };
    let Expr::Var(v2var) = v2.as_ref() else {
        return None;
    };
    let v1_orig = env.find_scalar(v1var);
    let v2_orig = env.find_scalar(v2var);
    let new_v1 = v1_orig.intersection(&v2_orig.remove_lower_bound());
    let new_v2 = v2_orig.intersection(&v1_orig.remove_upper_bound());
    let env = env.bind(v1var.clone(), Binding::Scalar(new_v1));
    Some(env.bind(v2var.clone(), Binding::Scalar(new_v2)))
}

/// Refines `env` along an edge labeled `label`. Unrecognized labels (or no
/// label at all) leave `env` unchanged.
pub fn edge_refine(env: &AbsEnv, cfg: &VsaConfig, label: &EdgeLabel) -> AbsEnv {
    let Some((taken, predicate)) = label else {
        return env.clone();
    };
    if let Some((inner, k)) = as_eq_bool(predicate) {
        if let Some(e) = refine_pattern1(env, cfg, inner, k) {
            return e;
        }
        if let Some(e) = refine_pattern2(env, cfg, inner, k) {
            return e;
        }
    }
    if let Some(e) = refine_pattern3(env, predicate, *taken) {
        return e;
    }
    log::trace!("edge label {:?} matched no recognized refinement pattern", predicate);
    env.clone()
}
