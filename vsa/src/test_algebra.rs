// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use crate::algebra::{BinOp, CastKind, StridedInterval, ValueSet};
    use crate::region::Region;

    #[test]
    fn si_of_int_is_a_singleton() {
        let si = StridedInterval::of_int(5, 32);
        assert!(si.is_singleton());
        assert_eq!(si.low(), Some(&BigInt::from(5)));
        assert_eq!(si.high(), Some(&BigInt::from(5)));
    }

    #[test]
    fn si_union_widens_stride_to_the_gap() {
        // {1} ∪ {5} at stride 0 each combine to stride 4 from 1 to 5 (spec
        // §8 scenario 6, "phi merge").
        let a = StridedInterval::of_int(1, 32);
        let b = StridedInterval::of_int(5, 32);
        let u = a.union(&b);
        assert_eq!(u.low(), Some(&BigInt::from(1)));
        assert_eq!(u.high(), Some(&BigInt::from(5)));
        assert_eq!(u.stride(), Some(&BigInt::from(4)));
    }

    #[test]
    fn si_top_absorbs_union_and_intersection() {
        let top = StridedInterval::top(32);
        let five = StridedInterval::of_int(5, 32);
        assert!(top.union(&five).is_top());
        assert_eq!(top.intersection(&five), five);
    }

    #[test]
    fn si_widen_same_value_is_identity() {
        let si = StridedInterval::new(32, BigInt::from(2), BigInt::from(0), BigInt::from(10));
        assert_eq!(si.widen(&si), si);
    }

    #[test]
    fn si_widen_growing_bound_jumps_to_extreme() {
        let a = StridedInterval::new(8, BigInt::from(1), BigInt::from(0), BigInt::from(3));
        let b = StridedInterval::new(8, BigInt::from(1), BigInt::from(0), BigInt::from(4));
        let w = a.widen(&b);
        // the growing high bound jumps straight to the representable max.
        assert_eq!(w.high(), Some(&BigInt::from(255)));
        assert_eq!(w.low(), Some(&BigInt::from(0)));
    }

    #[test]
    fn si_cast_narrowing_truncates_when_representable() {
        let si = StridedInterval::of_int(0x1_2345u32, 32);
        let narrowed = si.cast(CastKind::Unsigned, 16);
        assert_eq!(narrowed.low(), Some(&BigInt::from(0x2345)));
    }

    #[test]
    fn si_cast_narrowing_spanning_a_wrap_goes_top() {
        let si = StridedInterval::new(16, BigInt::from(1), BigInt::from(0), BigInt::from(0x1ff));
        let narrowed = si.cast(CastKind::Unsigned, 8);
        assert!(narrowed.is_top());
    }

    #[test]
    fn si_concat_little_endian_high_then_low() {
        // read_concrete's contract: hi.concat(lo), hi from the higher
        // address. 0x42 at the higher byte, 0x41 at the lower, width 16.
        let hi = StridedInterval::of_int(0x42, 8);
        let lo = StridedInterval::of_int(0x41, 8);
        let combined = hi.concat(&lo);
        assert_eq!(combined.low(), Some(&BigInt::from(0x4241)));
    }

    #[test]
    fn si_points_bounds_enumeration() {
        let si = StridedInterval::new(8, BigInt::from(1), BigInt::from(0), BigInt::from(255));
        assert!(si.points(100).is_none());
        assert!(si.points(1000).is_some());
    }

    #[test]
    fn si_points_of_top_is_unbounded() {
        assert!(StridedInterval::top(32).points(1_000_000).is_none());
    }

    #[test]
    fn vs_region_binop_add_keeps_pointer_identity() {
        let stack = Region::stack(0x1000, 0);
        let ptr = ValueSet::single(stack, StridedInterval::of_int(0, 32));
        let offset = ValueSet::of_int(8, 32);
        let result = ptr.binop(BinOp::Add, &offset);
        assert_eq!(result.si_at(stack).unwrap().low(), Some(&BigInt::from(8)));
    }

    #[test]
    fn vs_region_binop_sub_same_region_yields_scalar() {
        let stack = Region::stack(0x1000, 0);
        let a = ValueSet::single(stack, StridedInterval::of_int(12, 32));
        let b = ValueSet::single(stack, StridedInterval::of_int(4, 32));
        let diff = a.binop(BinOp::Sub, &b);
        assert_eq!(diff.as_global().unwrap().low(), Some(&BigInt::from(8)));
    }

    #[test]
    fn vs_region_binop_cross_region_add_loses_precision() {
        let s1 = Region::stack(0x1000, 0);
        let s2 = Region::stack(0x2000, 0);
        let a = ValueSet::single(s1, StridedInterval::of_int(0, 32));
        let b = ValueSet::single(s2, StridedInterval::of_int(0, 32));
        assert!(a.binop(BinOp::Add, &b).is_top());
    }
}
