// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! The abstract memory store: a sparse map from `(region, offset)` to a
//! [`ValueSet`]. Absence of an entry means unknown — which is why, unlike
//! [`ValueSet`]/[`StridedInterval`], a `MemStore` needs no separate `Top`
//! tag: the empty store already denotes "every address unknown".

use std::fmt;

use im::OrdMap;
use num_bigint::BigInt;

use crate::algebra::ValueSet;
use crate::region::Region;

type RegionMap = OrdMap<BigInt, ValueSet>;

/// A persistent `region -> offset -> ValueSet` map. Cloning is O(1) and
/// shares structure with the source (`im`'s trees), which is what makes the
/// equality check below cheap in the common "unchanged by this merge" case.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct MemStore {
    regions: OrdMap<Region, RegionMap>,
}

impl MemStore {
    pub fn new() -> MemStore {
        MemStore {
            regions: OrdMap::new(),
        }
    }

    /// Seeds the global region by writing each `(address, byte)` pair at
    /// width 8, as the driver's `init` does for `initial_mem`.
    pub fn from_initial_bytes(bytes: &[(u64, u8)]) -> MemStore {
        let mut inner: RegionMap = OrdMap::new();
        for (addr, byte) in bytes {
            inner.insert(
                BigInt::from(*addr),
                ValueSet::of_int(*byte as u64, 8),
            );
        }
        let mut regions = OrdMap::new();
        if !inner.is_empty() {
            regions.insert(Region::GLOBAL, inner);
        }
        MemStore { regions }
    }

    fn entry(&self, region: Region, offset: &BigInt) -> Option<&ValueSet> {
        self.regions.get(&region)?.get(offset)
    }

    fn total_entries(&self) -> usize {
        self.regions.values().map(|m| m.len()).sum()
    }

    fn drop_region(&self, region: Region) -> MemStore {
        let mut regions = self.regions.clone();
        regions.remove(&region);
        MemStore { regions }
    }

    /// Strong update at `(region, offset)`: unconditional replace, except
    /// a top value deletes the entry and an unchanged value is a no-op
    /// (preserves structural sharing, per the design's equal-value-write
    /// elision note).
    fn strong_update(&self, region: Region, offset: BigInt, value: &ValueSet) -> MemStore {
        if value.is_top() {
            let mut regions = self.regions.clone();
            if let Some(inner) = regions.get(&region) {
                let mut inner = inner.clone();
                inner.remove(&offset);
                if inner.is_empty() {
                    regions.remove(&region);
                } else {
                    regions.insert(region, inner);
                }
            }
            return MemStore { regions };
        }
        if self.entry(region, &offset) == Some(value) {
            return self.clone();
        }
        let mut regions = self.regions.clone();
        let mut inner = regions.get(&region).cloned().unwrap_or_default();
        inner.insert(offset, value.clone());
        regions.insert(region, inner);
        MemStore { regions }
    }

    fn weak_update(&self, region: Region, offset: BigInt, value: &ValueSet) -> MemStore {
        let old = self.entry(region, &offset).cloned();
        let merged = match old {
            Some(ref o) if o.width() == value.width() => o.union(value),
            Some(_) => {
                // width mismatch: recovered locally by dropping the entry
                // rather than unioning mismatched widths (spec §7).
                let mut regions = self.regions.clone();
                if let Some(inner) = regions.get(&region) {
                    let mut inner = inner.clone();
                    inner.remove(&offset);
                    if inner.is_empty() {
                        regions.remove(&region);
                    } else {
                        regions.insert(region, inner);
                    }
                }
                return MemStore { regions };
            }
            None => return self.clone(), // absence is already top; top ∪ x = top
        };
        self.strong_update(region, offset, &merged)
    }

    /// If `region`'s entry count exceeds `mem_max`, collapses it to the
    /// empty (all-unknown) region map.
    fn widen_region(&self, region: Region, mem_max: usize) -> MemStore {
        match self.regions.get(&region) {
            Some(inner) if inner.len() > mem_max => {
                log::debug!(
                    "region {} exceeded mem_max ({} > {}), collapsing to unknown",
                    region,
                    inner.len(),
                    mem_max
                );
                self.drop_region(region)
            }
            _ => self.clone(),
        }
    }

    /// Reads `k` bits starting at the concrete `(region, offset)` pair,
    /// reassembling narrower entries little-endian (higher address holds
    /// the higher-order bits).
    fn read_concrete(&self, region: Region, offset: &BigInt, k: u32) -> ValueSet {
        match self.entry(region, offset) {
            None => ValueSet::top(k),
            Some(v) if v.width() == k => v.clone(),
            Some(v) if v.width() > k => ValueSet::top(k),
            Some(v) => {
                let w = v.width();
                let next_offset = offset + (w / 8);
                let hi = self.read_concrete(region, &next_offset, k - w);
                if hi.is_top() {
                    return ValueSet::top(k);
                }
                hi.concat(v)
            }
        }
    }

    pub fn read(&self, k: u32, addr_vs: &ValueSet, mem_max: usize) -> ValueSet {
        if addr_vs.is_empty() {
            return ValueSet::empty(k);
        }
        if addr_vs.is_top() {
            return ValueSet::top(k);
        }
        let points = match addr_vs.points(mem_max) {
            Some(pts) => pts,
            None => return ValueSet::top(k),
        };
        let mut acc = ValueSet::empty(k);
        for (region, offset) in &points {
            let v = self.read_concrete(*region, offset, k);
            if v.is_top() {
                return ValueSet::top(k);
            }
            acc = acc.union(&v);
        }
        acc
    }

    pub fn write(&self, k: u32, addr_vs: &ValueSet, value_vs: &ValueSet, mem_max: usize) -> MemStore {
        debug_assert_eq!(value_vs.width(), k, "write width mismatch");
        if addr_vs.is_top() {
            if value_vs.is_top() || self.total_entries() > mem_max {
                log::warn!("write through top address collapsed the whole store to unknown");
                return MemStore::new();
            }
            let mut result = self.clone();
            for region in self.regions.keys().cloned().collect::<Vec<_>>() {
                let offsets: Vec<BigInt> = result
                    .regions
                    .get(&region)
                    .map(|m| m.keys().cloned().collect())
                    .unwrap_or_default();
                for offset in offsets {
                    result = result.weak_update(region, offset, value_vs);
                }
                result = result.widen_region(region, mem_max);
            }
            return result;
        }

        if let [(region, si)] = addr_vs.regions_slice() {
            if si.is_top() {
                return self.drop_region(*region);
            }
            if si.is_singleton() {
                let offset = si.low().expect("singleton interval has a low bound").clone();
                return self.strong_update(*region, offset, value_vs);
            }
        }

        match addr_vs.points(mem_max) {
            None => {
                log::warn!("write address set exceeded mem_max, collapsing store to unknown");
                MemStore::new()
            }
            Some(points) => {
                let mut result = self.clone();
                let mut touched = Vec::new();
                for (region, offset) in points {
                    result = result.weak_update(region, offset, value_vs);
                    if !touched.contains(&region) {
                        touched.push(region);
                    }
                }
                for region in touched {
                    result = result.widen_region(region, mem_max);
                }
                result
            }
        }
    }

    /// Intersects the existing entry at a singleton address with
    /// `value_vs`; a no-op for any other shape of `addr_vs`.
    pub fn write_intersection(&self, k: u32, addr_vs: &ValueSet, value_vs: &ValueSet) -> MemStore {
        if let [(region, si)] = addr_vs.regions_slice() {
            if si.is_singleton() {
                let offset = si.low().expect("singleton interval has a low bound").clone();
                let old = self.read_concrete(*region, &offset, k);
                return self.strong_update(*region, offset, &old.intersection(value_vs));
            }
        }
        self.clone()
    }

    /// Exclusive merge: an address present on only one side is dropped,
    /// since absence means top and `top ∪ x = top`.
    pub fn union(&self, other: &MemStore) -> MemStore {
        let mut regions = OrdMap::new();
        for (region, inner) in self.regions.iter() {
            if let Some(other_inner) = other.regions.get(region) {
                let mut merged = OrdMap::new();
                for (offset, v) in inner.iter() {
                    if let Some(ov) = other_inner.get(offset) {
                        if v.width() == ov.width() {
                            merged.insert(offset.clone(), v.union(ov));
                        }
                    }
                }
                if !merged.is_empty() {
                    regions.insert(*region, merged);
                }
            }
        }
        MemStore { regions }
    }

    fn inclusive_merge(
        &self,
        other: &MemStore,
        combine: impl Fn(&ValueSet, &ValueSet) -> ValueSet,
    ) -> MemStore {
        let mut regions = self.regions.clone();
        for (region, other_inner) in other.regions.iter() {
            let mut inner = regions.get(region).cloned().unwrap_or_default();
            for (offset, ov) in other_inner.iter() {
                match inner.get(offset) {
                    Some(v) if v.width() == ov.width() => {
                        inner.insert(offset.clone(), combine(v, ov));
                    }
                    Some(_) => {
                        inner.remove(offset);
                    }
                    None => {
                        inner.insert(offset.clone(), ov.clone());
                    }
                }
            }
            regions.insert(*region, inner);
        }
        MemStore { regions }
    }

    /// Inclusive merge: an address present on only one side is retained;
    /// present on both, merged with value-set intersection.
    pub fn intersection(&self, other: &MemStore) -> MemStore {
        self.inclusive_merge(other, ValueSet::intersection)
    }

    /// Inclusive merge using value-set widen for shared addresses.
    pub fn widen(&self, other: &MemStore) -> MemStore {
        self.inclusive_merge(other, ValueSet::widen)
    }

    pub fn fold<B>(&self, init: B, mut f: impl FnMut(B, Region, &BigInt, &ValueSet) -> B) -> B {
        let mut acc = init;
        for (region, inner) in self.regions.iter() {
            for (offset, v) in inner.iter() {
                acc = f(acc, *region, offset, v);
            }
        }
        acc
    }

    pub fn equal(&self, other: &MemStore) -> bool {
        self == other
    }
}

impl fmt::Display for MemStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MemStore {{")?;
        for (region, inner) in self.regions.iter() {
            for (offset, v) in inner.iter() {
                writeln!(f, "  {}[{}] = {}", region, offset, v)?;
            }
        }
        write!(f, "}}")
    }
}
