// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! The one recoverable error this crate raises. Everything else — type
//! mismatches between a variable's declared and actual binding, malformed
//! SSA — is a programmer error and panics (spec §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VsaError {
    /// `init` was called with `sp`/`mem` still at their sentinel default.
    #[error("driver misconfigured: stack-pointer and memory variables must be set before init")]
    Unconfigured,
}
