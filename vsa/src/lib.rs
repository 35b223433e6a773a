// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! Value-Set Analysis over an SSA control-flow graph: an abstract
//! interpreter computing, for every program point, an over-approximation of
//! the set of values each variable and memory location may hold.
//!
//! The crate is a library, not a driver: callers lower their IR to the
//! [`ssa`] vocabulary, build a [`cfg::Cfg`], and call [`driver::analyze`].
//! The [`algebra`] module is the strided-interval/value-set arithmetic the
//! rest of the crate treats as an external dependency (spec §2.1).

pub mod algebra;
pub mod cfg;
pub mod config;
pub mod driver;
pub mod edge;
pub mod env;
pub mod error;
pub mod eval;
pub mod logging;
pub mod memstore;
pub mod region;
pub mod ssa;
pub mod transfer;

#[cfg(test)]
mod test_algebra;
#[cfg(test)]
mod test_cfg;
#[cfg(test)]
mod test_env;
#[cfg(test)]
mod test_memstore;
#[cfg(test)]
mod test_transfer;
