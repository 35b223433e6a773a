// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! The value-set algebra: strided intervals and the region-tagged value
//! sets built from them. No such arithmetic library exists on crates.io, so
//! it lives here, deliberately separated from the interpreter that consumes
//! it (`crate::memstore`, `crate::env`, `crate::eval`).

pub mod si;
pub mod valueset;

pub use si::{BinOp, CastKind, StridedInterval, UnOp};
pub use valueset::ValueSet;
