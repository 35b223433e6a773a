// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

#[cfg(test)]
mod tests {
    use crate::algebra::ValueSet;
    use crate::env::{AbsEnv, Binding, LatticeElement};
    use crate::ssa::Var;

    fn x() -> Var {
        Var::scalar("x", 32)
    }

    #[test]
    fn absent_scalar_is_top_of_declared_width() {
        let env = AbsEnv::new();
        assert!(env.find_scalar(&x()).is_top());
        assert_eq!(env.find_scalar(&x()).width(), 32);
    }

    #[test]
    fn absent_array_is_the_empty_top_store() {
        let env = AbsEnv::new();
        assert_eq!(env.find_array(&Var::array("mem", 64)), crate::memstore::MemStore::new());
    }

    #[test]
    fn meet_of_two_sided_binding_unions_the_scalars() {
        let a = AbsEnv::new().bind(x(), Binding::Scalar(ValueSet::of_int(1u32, 32)));
        let b = AbsEnv::new().bind(x(), Binding::Scalar(ValueSet::of_int(5u32, 32)));
        let merged = a.meet(&b);
        assert_eq!(
            merged.find_scalar(&x()),
            ValueSet::of_int(1u32, 32).union(&ValueSet::of_int(5u32, 32))
        );
    }

    #[test]
    fn meet_keeps_a_binding_only_present_on_one_side() {
        let a = AbsEnv::new().bind(x(), Binding::Scalar(ValueSet::of_int(1u32, 32)));
        let b = AbsEnv::new();
        let merged = a.meet(&b);
        assert_eq!(merged.find_scalar(&x()), ValueSet::of_int(1u32, 32));
    }

    #[test]
    #[should_panic(expected = "type mismatch")]
    fn merging_a_scalar_with_an_array_at_the_same_variable_is_fatal() {
        let v = Var::scalar("m", 64);
        let a = AbsEnv::new().bind(v.clone(), Binding::Scalar(ValueSet::top(64)));
        let b = AbsEnv::new().bind(v, Binding::Array(crate::memstore::MemStore::new()));
        let _ = a.meet(&b);
    }

    #[test]
    fn lattice_top_absorbs_on_meet_and_widen() {
        let env = LatticeElement::Env(AbsEnv::new().bind(x(), Binding::Scalar(ValueSet::of_int(3u32, 32))));
        assert_eq!(LatticeElement::Top.meet(&env), env);
        assert_eq!(LatticeElement::Top.widen(&env), env);
        assert_eq!(env.meet(&LatticeElement::Top), env);
    }

    #[test]
    fn widen_of_identical_states_is_identity() {
        let env = AbsEnv::new().bind(x(), Binding::Scalar(ValueSet::of_int(3u32, 32)));
        assert_eq!(env.widen(&env), env);
    }
}
