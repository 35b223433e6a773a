// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! Statement transfer: updates an [`AbsEnv`] across one straight-line SSA
//! statement. A pure function `(stmt, env) -> env`.

use crate::algebra::ValueSet;
use crate::config::VsaConfig;
use crate::env::{AbsEnv, Binding};
use crate::eval::{eval_array, eval_scalar};
use crate::ssa::{Stmt, VarKind};

/// Applies one statement's transfer to `env`. `Assert` / `Assume` / `Jmp` /
/// `CJmp` / `Label` / `Comment` / `Halt` are identity — refinement from
/// branch conditions happens in the edge transfer, not here.
pub fn transfer_stmt(env: &AbsEnv, cfg: &VsaConfig, stmt: &Stmt) -> AbsEnv {
    match stmt {
        Stmt::Move { dst, value } => match dst.kind {
            VarKind::Scalar => {
                let v = eval_scalar(env, cfg, value);
                env.bind(dst.clone(), Binding::Scalar(v))
            }
            VarKind::Array => {
                let m = eval_array(env, cfg, value);
                env.bind(dst.clone(), Binding::Array(m))
            }
        },
        Stmt::Special { defs } => {
            let mut next = env.clone();
            for v in defs {
                if v.kind == VarKind::Scalar {
                    next = next.bind(v.clone(), Binding::Scalar(ValueSet::top(v.width)));
                }
                // Memory bindings are left untouched (see DESIGN.md:
                // "Special statements and memory").
            }
            next
        }
        Stmt::Assert(_)
        | Stmt::Assume(_)
        | Stmt::Jmp(_)
        | Stmt::CJmp { .. }
        | Stmt::Label(_)
        | Stmt::Comment(_)
        | Stmt::Halt => env.clone(),
    }
}
