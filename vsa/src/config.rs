// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! Analysis tunables, threaded explicitly to every component that needs
//! them rather than read from process-global state.

use crate::ssa::Var;

/// Default `mem_max`: the size cap at which a region's entry count (or a
/// write's concrete address count) triggers collapse to top.
pub const DEFAULT_MEM_MAX: usize = 1 << 16;

/// Configuration threaded to the driver and, through it, to the evaluator
/// and edge transfer.
#[derive(Clone, Debug)]
pub struct VsaConfig {
    /// `(address, byte)` pairs pre-populating the global region at `init`.
    pub initial_mem: Vec<(u64, u8)>,
    /// The SSA variable identity for the architecture's stack pointer.
    pub sp: Var,
    /// The SSA variable identity for memory.
    pub mem: Var,
    /// Widening threshold: a vertex visited more than this many times
    /// switches from `meet` to `widen` on subsequent merges.
    pub nmeets: u32,
    /// With the hack enabled (default), unsigned comparisons are accepted
    /// by the edge transfer's `ACCEPT_CMP` as if signed — unsound across
    /// the sign boundary, but usually a precision win in practice.
    pub signedness_hack: bool,
    /// MemStore size cap (spec §5).
    pub mem_max: usize,
}

impl VsaConfig {
    /// A threshold chosen so a fresh config is recognizably unconfigured;
    /// `init` rejects an `sp`/`mem` still equal to this sentinel.
    pub fn sentinel_var() -> Var {
        Var::scalar("__unconfigured__", 0)
    }

    pub fn new(sp: Var, mem: Var) -> VsaConfig {
        VsaConfig {
            initial_mem: Vec::new(),
            sp,
            mem,
            nmeets: 2,
            signedness_hack: true,
            mem_max: DEFAULT_MEM_MAX,
        }
    }
}

impl Default for VsaConfig {
    fn default() -> VsaConfig {
        VsaConfig::new(Self::sentinel_var(), Self::sentinel_var())
    }
}
