// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

#[cfg(test)]
mod tests {
    use crate::algebra::ValueSet;
    use crate::memstore::MemStore;
    use crate::region::Region;

    const MEM_MAX: usize = 1 << 12;

    fn addr(a: u64) -> ValueSet {
        ValueSet::of_int(a, 32)
    }

    #[test]
    fn read_through_top_address_is_top_in_bounded_time() {
        let store = MemStore::from_initial_bytes(&[(0x1000, 0x41)]);
        let result = store.read(8, &ValueSet::top(32), MEM_MAX);
        assert!(result.is_top());
    }

    #[test]
    fn write_then_read_same_point_is_identity() {
        let store = MemStore::new();
        let value = ValueSet::of_int(0x42, 32);
        let written = store.write(32, &addr(0x2000), &value, MEM_MAX);
        assert_eq!(written.read(32, &addr(0x2000), MEM_MAX), value);
    }

    #[test]
    fn write_top_at_a_point_removes_the_entry() {
        let store = MemStore::new().write(32, &addr(0x2000), &ValueSet::of_int(7, 32), MEM_MAX);
        let erased = store.write(32, &addr(0x2000), &ValueSet::top(32), MEM_MAX);
        assert_eq!(erased, MemStore::new());
    }

    #[test]
    fn little_endian_narrow_writes_reconstruct_on_a_wide_read() {
        let store = MemStore::new()
            .write(8, &addr(0x1000), &ValueSet::of_int(0x41u32, 8), MEM_MAX)
            .write(8, &addr(0x1001), &ValueSet::of_int(0x42u32, 8), MEM_MAX);
        let wide = store.read(16, &addr(0x1000), MEM_MAX);
        assert_eq!(wide, ValueSet::of_int(0x4241u32, 16));
    }

    #[test]
    fn initial_mem_seeds_the_global_region_little_endian() {
        let store = MemStore::from_initial_bytes(&[(0x1000, 0x41), (0x1001, 0x42)]);
        let value = store.read(16, &addr(0x1000), MEM_MAX);
        assert_eq!(value, ValueSet::of_int(0x4241u32, 16));
    }

    #[test]
    fn weak_write_through_too_many_addresses_collapses_to_top() {
        let store = MemStore::new();
        // a stride-1 range wider than mem_max forces the collapse.
        let huge = ValueSet::single(
            Region::GLOBAL,
            crate::algebra::StridedInterval::new(
                32,
                num_bigint::BigInt::from(1),
                num_bigint::BigInt::from(0),
                num_bigint::BigInt::from(MEM_MAX as u64 + 10),
            ),
        );
        let written = store.write(8, &huge, &ValueSet::of_int(1u32, 8), MEM_MAX);
        assert_eq!(written, MemStore::new());
    }

    #[test]
    fn reading_a_wider_entry_than_requested_is_top() {
        let store = MemStore::new().write(16, &addr(0x1000), &ValueSet::of_int(0x1234u32, 16), MEM_MAX);
        assert!(store.read(8, &addr(0x1000), MEM_MAX).is_top());
    }

    #[test]
    fn union_is_commutative_and_exclusive() {
        let a = MemStore::new().write(32, &addr(0x1000), &ValueSet::of_int(1u32, 32), MEM_MAX);
        let b = MemStore::new().write(32, &addr(0x2000), &ValueSet::of_int(2u32, 32), MEM_MAX);
        // addresses present on only one side are dropped (absence = top).
        assert_eq!(a.union(&b), MemStore::new());
        assert_eq!(a.union(&b), b.union(&a));
    }

    #[test]
    fn union_merges_shared_addresses() {
        let a = MemStore::new().write(32, &addr(0x1000), &ValueSet::of_int(1u32, 32), MEM_MAX);
        let b = MemStore::new().write(32, &addr(0x1000), &ValueSet::of_int(5u32, 32), MEM_MAX);
        let merged = a.union(&b);
        assert_eq!(
            merged.read(32, &addr(0x1000), MEM_MAX),
            ValueSet::of_int(1u32, 32).union(&ValueSet::of_int(5u32, 32))
        );
    }

    #[test]
    fn intersection_retains_addresses_present_on_either_side() {
        let a = MemStore::new().write(32, &addr(0x1000), &ValueSet::of_int(1u32, 32), MEM_MAX);
        let b = MemStore::new().write(32, &addr(0x2000), &ValueSet::of_int(2u32, 32), MEM_MAX);
        let merged = a.intersection(&b);
        assert_eq!(merged.read(32, &addr(0x1000), MEM_MAX), ValueSet::of_int(1u32, 32));
        assert_eq!(merged.read(32, &addr(0x2000), MEM_MAX), ValueSet::of_int(2u32, 32));
    }

    #[test]
    fn equal_value_write_is_a_structural_no_op() {
        let store = MemStore::new().write(32, &addr(0x1000), &ValueSet::of_int(9u32, 32), MEM_MAX);
        let rewritten = store.write(32, &addr(0x1000), &ValueSet::of_int(9u32, 32), MEM_MAX);
        assert_eq!(store, rewritten);
    }

    #[test]
    fn write_intersection_on_non_singleton_address_is_a_no_op() {
        let store = MemStore::new().write(32, &addr(0x1000), &ValueSet::of_int(9u32, 32), MEM_MAX);
        let wide_addr = ValueSet::single(
            Region::GLOBAL,
            crate::algebra::StridedInterval::new(
                32,
                num_bigint::BigInt::from(1),
                num_bigint::BigInt::from(0x1000),
                num_bigint::BigInt::from(0x1004),
            ),
        );
        let unchanged = store.write_intersection(32, &wide_addr, &ValueSet::of_int(0u32, 32));
        assert_eq!(store, unchanged);
    }
}
