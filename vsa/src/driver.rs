// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! The fixpoint driver: a forward worklist dataflow over the SSA CFG,
//! widening at vertices that have been revisited past a configurable
//! threshold. Pop a vertex, recompute its state, push changed successors,
//! iterate till the worklist is dry.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::algebra::{StridedInterval, ValueSet};
use crate::cfg::{Cfg, VertexId};
use crate::config::VsaConfig;
use crate::edge::edge_refine;
use crate::env::{AbsEnv, Binding, LatticeElement};
use crate::error::VsaError;
use crate::eval::{eval_expr, EvalResult};
use crate::memstore::MemStore;
use crate::region::Region;
use crate::ssa::Expr;
use crate::transfer::transfer_stmt;

/// Builds the seeded initial state: the stack pointer bound to a fresh,
/// zero-offset region of its own, and memory pre-loaded with
/// `config.initial_mem`.
fn init(config: &VsaConfig) -> AbsEnv {
    let sp_region = Region::stack(0, 0);
    let sp_value = ValueSet::single(sp_region, StridedInterval::of_int(0, config.sp.width));
    let mem_value = MemStore::from_initial_bytes(&config.initial_mem);
    AbsEnv::new()
        .bind(config.sp.clone(), Binding::Scalar(sp_value))
        .bind(config.mem.clone(), Binding::Array(mem_value))
}

/// The fixpoint result: a per-vertex [`LatticeElement`] plus the
/// configuration the states were computed under, so [`VsaResult::eval_expr`]
/// can be reused by clients without re-threading it.
pub struct VsaResult {
    config: VsaConfig,
    states: HashMap<VertexId, LatticeElement>,
}

impl VsaResult {
    pub fn state_at(&self, v: VertexId) -> LatticeElement {
        self.states.get(&v).cloned().unwrap_or(LatticeElement::Top)
    }

    /// Evaluates `e` against the fixpoint state at `v`. Returns `None` if
    /// `v` was never reached (state is still `⊤`).
    pub fn eval_expr(&self, v: VertexId, e: &Expr) -> Option<EvalResult> {
        let env = self.state_at(v).as_env()?.clone();
        Some(eval_expr(&env, &self.config, e))
    }
}

/// Runs the analysis to a fixpoint over `cfg` under `config`. Fails fast if
/// `sp`/`mem` are still at their sentinel default.
pub fn analyze(cfg: &Cfg, config: &VsaConfig) -> Result<VsaResult, VsaError> {
    let sentinel = VsaConfig::sentinel_var();
    if config.sp == sentinel || config.mem == sentinel {
        return Err(VsaError::Unconfigured);
    }

    let entry = cfg.entry();
    let mut states: HashMap<VertexId, LatticeElement> = HashMap::new();
    let mut visits: HashMap<VertexId, u32> = HashMap::new();
    let mut queued: HashSet<VertexId> = HashSet::new();
    let mut worklist: VecDeque<VertexId> = VecDeque::new();

    let init_env = init(config);
    states.insert(entry, LatticeElement::Env(init_env));
    worklist.push_back(entry);
    queued.insert(entry);

    while let Some(v) = worklist.pop_front() {
        queued.remove(&v);

        let count = *visits.get(&v).unwrap_or(&0);
        let widen_mode = count > config.nmeets;
        visits.insert(v, count + 1);

        let mut incoming = if v == entry {
            states.get(&entry).cloned().unwrap_or(LatticeElement::Top)
        } else {
            LatticeElement::Top
        };
        for (pred, label) in cfg.predecessors(v) {
            let pred_state = states.get(&pred).cloned().unwrap_or(LatticeElement::Top);
            let LatticeElement::Env(pred_env) = pred_state else {
                continue;
            };
            let refined = edge_refine(&pred_env, config, label);
            let contribution = LatticeElement::Env(refined);
            incoming = if widen_mode {
                incoming.widen(&contribution)
            } else {
                incoming.meet(&contribution)
            };
        }

        let new_out = match incoming {
            LatticeElement::Top => LatticeElement::Top,
            LatticeElement::Env(env) => {
                let mut env = env;
                for stmt in cfg.stmts(v) {
                    env = transfer_stmt(&env, config, stmt);
                }
                LatticeElement::Env(env)
            }
        };

        let changed = states.get(&v) != Some(&new_out);
        if changed {
            if widen_mode {
                log::debug!("vertex {} widened", v);
            }
            states.insert(v, new_out);
            for succ in cfg.successors(v).collect::<Vec<_>>() {
                if queued.insert(succ) {
                    worklist.push_back(succ);
                }
            }
        }
    }

    Ok(VsaResult {
        config: config.clone(),
        states,
    })
}
