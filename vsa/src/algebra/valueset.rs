// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! Value sets: a finite map from [`Region`] to [`StridedInterval`], all
//! sharing one bit width, with union semantics across regions. A scalar
//! without a region tag lives in [`Region::GLOBAL`].

use std::fmt;

use num_bigint::BigInt;

use super::si::{BinOp, CastKind, StridedInterval, UnOp};
use crate::region::{Region, RegionClass};

#[derive(Clone, Debug, PartialEq)]
enum VsKind {
    Top,
    /// Per-region strided intervals, regions in sorted order and each
    /// present at most once. Never empty — a `ValueSet` with zero live
    /// regions is represented as the dedicated `Empty` kind instead, so
    /// callers never need to distinguish "no regions" from "top".
    Regions(Vec<(Region, StridedInterval)>),
    Empty,
}

/// A width-tagged union of per-region strided intervals.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueSet {
    width: u32,
    kind: VsKind,
}

impl ValueSet {
    pub fn top(width: u32) -> ValueSet {
        ValueSet {
            width,
            kind: VsKind::Top,
        }
    }

    pub fn empty(width: u32) -> ValueSet {
        ValueSet {
            width,
            kind: VsKind::Empty,
        }
    }

    pub fn of_int<T: Into<BigInt>>(value: T, width: u32) -> ValueSet {
        Self::single(Region::GLOBAL, StridedInterval::of_int(value, width))
    }

    /// Builds a value set holding a single region's interval. An empty
    /// interval collapses to [`empty`](Self::empty); a top interval that
    /// is also the global region collapses to [`top`](Self::top) (global
    /// top is indistinguishable from unconstrained).
    pub fn single(region: Region, si: StridedInterval) -> ValueSet {
        let width = si.width();
        if si.is_empty() {
            return Self::empty(width);
        }
        if si.is_top() && region.is_global() {
            return Self::top(width);
        }
        ValueSet {
            width,
            kind: VsKind::Regions(vec![(region, si)]),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn is_top(&self) -> bool {
        matches!(self.kind, VsKind::Top)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, VsKind::Empty)
    }

    fn regions(&self) -> &[(Region, StridedInterval)] {
        match &self.kind {
            VsKind::Regions(rs) => rs,
            _ => &[],
        }
    }

    /// Exposes the per-region intervals to [`crate::memstore`] without
    /// making `VsKind` public; empty for `top`/`empty`.
    pub(crate) fn regions_slice(&self) -> &[(Region, StridedInterval)] {
        self.regions()
    }

    pub fn si_at(&self, region: Region) -> Option<&StridedInterval> {
        self.regions()
            .iter()
            .find(|(r, _)| *r == region)
            .map(|(_, si)| si)
    }

    /// The interval on the global region, if that is the only region
    /// populated (the common scalar case). `None` for top, empty, or a
    /// value set that spans more than one region.
    pub fn as_global(&self) -> Option<&StridedInterval> {
        match &self.kind {
            VsKind::Regions(rs) if rs.len() == 1 && rs[0].0.is_global() => Some(&rs[0].1),
            _ => None,
        }
    }

    fn from_regions(width: u32, mut rs: Vec<(Region, StridedInterval)>) -> ValueSet {
        rs.retain(|(_, si)| !si.is_empty());
        if rs.is_empty() {
            return Self::empty(width);
        }
        if rs.len() == 1 && rs[0].0.is_global() && rs[0].1.is_top() {
            return Self::top(width);
        }
        rs.sort_by(|a, b| a.0.cmp(&b.0));
        ValueSet {
            width,
            kind: VsKind::Regions(rs),
        }
    }

    pub fn union(&self, other: &ValueSet) -> ValueSet {
        assert_eq!(self.width, other.width, "value set width mismatch");
        match (&self.kind, &other.kind) {
            (VsKind::Top, _) | (_, VsKind::Top) => Self::top(self.width),
            (VsKind::Empty, _) => other.clone(),
            (_, VsKind::Empty) => self.clone(),
            (VsKind::Regions(a), VsKind::Regions(b)) => {
                let mut merged: Vec<(Region, StridedInterval)> = a.clone();
                for (r, si) in b {
                    if let Some(existing) = merged.iter_mut().find(|(er, _)| er == r) {
                        existing.1 = existing.1.union(si);
                    } else {
                        merged.push((*r, si.clone()));
                    }
                }
                Self::from_regions(self.width, merged)
            }
        }
    }

    pub fn intersection(&self, other: &ValueSet) -> ValueSet {
        assert_eq!(self.width, other.width, "value set width mismatch");
        match (&self.kind, &other.kind) {
            (VsKind::Empty, _) | (_, VsKind::Empty) => Self::empty(self.width),
            (VsKind::Top, _) => other.clone(),
            (_, VsKind::Top) => self.clone(),
            (VsKind::Regions(a), VsKind::Regions(b)) => {
                let mut merged = Vec::new();
                for (r, si) in a {
                    if let Some((_, si2)) = b.iter().find(|(er, _)| er == r) {
                        merged.push((*r, si.intersection(si2)));
                    }
                }
                Self::from_regions(self.width, merged)
            }
        }
    }

    pub fn widen(&self, other: &ValueSet) -> ValueSet {
        assert_eq!(self.width, other.width, "value set width mismatch");
        match (&self.kind, &other.kind) {
            (VsKind::Top, _) | (_, VsKind::Top) => Self::top(self.width),
            (VsKind::Empty, _) => other.clone(),
            (_, VsKind::Empty) => self.clone(),
            (VsKind::Regions(a), VsKind::Regions(b)) => {
                let mut merged: Vec<(Region, StridedInterval)> = a.clone();
                for (r, si) in b {
                    if let Some(existing) = merged.iter_mut().find(|(er, _)| er == r) {
                        existing.1 = existing.1.widen(si);
                    } else {
                        merged.push((*r, si.clone()));
                    }
                }
                Self::from_regions(self.width, merged)
            }
        }
    }

    pub fn cast(&self, kind: CastKind, target_width: u32) -> ValueSet {
        match &self.kind {
            VsKind::Top => Self::top(target_width),
            VsKind::Empty => Self::empty(target_width),
            VsKind::Regions(rs) => {
                let rs = rs
                    .iter()
                    .map(|(r, si)| (*r, si.cast(kind, target_width)))
                    .collect();
                Self::from_regions(target_width, rs)
            }
        }
    }

    /// Forwards `remove_lower_bound` to every region's interval.
    pub fn remove_lower_bound(&self) -> ValueSet {
        match &self.kind {
            VsKind::Regions(rs) => Self::from_regions(
                self.width,
                rs.iter().map(|(r, si)| (*r, si.remove_lower_bound())).collect(),
            ),
            _ => self.clone(),
        }
    }

    /// Forwards `remove_upper_bound` to every region's interval.
    pub fn remove_upper_bound(&self) -> ValueSet {
        match &self.kind {
            VsKind::Regions(rs) => Self::from_regions(
                self.width,
                rs.iter().map(|(r, si)| (*r, si.remove_upper_bound())).collect(),
            ),
            _ => self.clone(),
        }
    }

    pub fn concat(&self, lo: &ValueSet) -> ValueSet {
        match (self.as_global(), lo.as_global()) {
            (Some(hi), Some(lo)) => Self::single(Region::GLOBAL, hi.concat(lo)),
            _ if self.is_empty() || lo.is_empty() => Self::empty(self.width + lo.width),
            _ => Self::top(self.width + lo.width),
        }
    }

    pub fn extract(&self, hi_bit: u32, lo_bit: u32) -> ValueSet {
        match self.as_global() {
            Some(si) => Self::single(Region::GLOBAL, si.extract(hi_bit, lo_bit)),
            None if self.is_empty() => Self::empty(hi_bit - lo_bit + 1),
            None => Self::top(hi_bit - lo_bit + 1),
        }
    }

    /// Region-aware dispatch for `Add`/`Sub` (classic VSA pointer
    /// arithmetic): `Global + Global -> Global`; `region +/- Global ->
    /// region` (offsetting a pointer keeps its identity); `region - region`
    /// (same region) `-> Global` (a pointer difference is a scalar); any
    /// other region combination loses precision to top.
    fn region_binop(r1: Region, r2: Region, op: BinOp) -> Option<Region> {
        match op {
            BinOp::Add => match (r1.is_global(), r2.is_global()) {
                (true, true) => Some(Region::GLOBAL),
                (false, true) => Some(r1),
                (true, false) => Some(r2),
                (false, false) => None,
            },
            BinOp::Sub => match (r1.is_global(), r2.is_global()) {
                (true, true) => Some(Region::GLOBAL),
                (false, true) => Some(r1),
                (false, false) if r1 == r2 => Some(Region::GLOBAL),
                _ => None,
            },
            _ => {
                if r1.is_global() && r2.is_global() {
                    Some(Region::GLOBAL)
                } else {
                    None
                }
            }
        }
    }

    pub fn binop(&self, op: BinOp, other: &ValueSet) -> ValueSet {
        assert_eq!(self.width, other.width, "value set width mismatch");
        if self.is_empty() || other.is_empty() {
            return Self::empty(self.width);
        }
        if self.is_top() || other.is_top() {
            return Self::top(self.width);
        }
        let mut acc = Self::empty(self.width);
        for (r1, si1) in self.regions() {
            for (r2, si2) in other.regions() {
                let si = si1.binop(op, si2);
                let piece = match Self::region_binop(*r1, *r2, op) {
                    Some(region) => Self::single(region, si),
                    None => Self::top(self.width),
                };
                acc = acc.union(&piece);
            }
        }
        acc
    }

    pub fn unop(&self, op: UnOp) -> ValueSet {
        match &self.kind {
            VsKind::Top => Self::top(self.width),
            VsKind::Empty => Self::empty(self.width),
            VsKind::Regions(rs) => {
                let mut acc = Self::empty(self.width);
                for (r, si) in rs {
                    let region = if r.is_global() {
                        Region::GLOBAL
                    } else if matches!(op, UnOp::Neg) {
                        // negating a pointer value has no region meaning
                        Region::GLOBAL
                    } else {
                        *r
                    };
                    acc = acc.union(&Self::single(region, si.unop(op)));
                }
                acc
            }
        }
    }

    /// Enumerates concrete `(region, value)` points across all regions, or
    /// `None` if that would exceed `bound`.
    pub fn points(&self, bound: usize) -> Option<Vec<(Region, BigInt)>> {
        match &self.kind {
            VsKind::Top => None,
            VsKind::Empty => Some(Vec::new()),
            VsKind::Regions(rs) => {
                let mut out = Vec::new();
                for (r, si) in rs {
                    let pts = si.points(bound.saturating_sub(out.len()))?;
                    for p in pts {
                        out.push((*r, p));
                        if out.len() > bound {
                            return None;
                        }
                    }
                }
                Some(out)
            }
        }
    }
}

impl fmt::Display for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            VsKind::Top => write!(f, "⊤"),
            VsKind::Empty => write!(f, "⊥"),
            VsKind::Regions(rs) => {
                let parts: Vec<String> = rs
                    .iter()
                    .map(|(r, si)| {
                        if r.is_global() && matches!(r.class(), RegionClass::Global) {
                            format!("{}", si)
                        } else {
                            format!("{}:{}", r, si)
                        }
                    })
                    .collect();
                write!(f, "{{{}}}", parts.join(" ∪ "))
            }
        }
    }
}
