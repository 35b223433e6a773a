// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

#[cfg(test)]
mod tests {
    use crate::algebra::ValueSet;
    use crate::config::VsaConfig;
    use crate::env::{AbsEnv, Binding};
    use crate::memstore::MemStore;
    use crate::ssa::{Expr, Stmt, Var};
    use crate::transfer::transfer_stmt;

    fn cfg() -> VsaConfig {
        VsaConfig::new(Var::scalar("sp", 32), Var::array("mem", 32))
    }

    #[test]
    fn move_to_a_scalar_var_binds_the_evaluated_value() {
        let x = Var::scalar("x", 32);
        let env = AbsEnv::new();
        let stmt = Stmt::Move { dst: x.clone(), value: Expr::const_int(11, 32) };
        let next = transfer_stmt(&env, &cfg(), &stmt);
        assert_eq!(next.find_scalar(&x), ValueSet::of_int(11u32, 32));
    }

    #[test]
    fn move_to_an_array_var_binds_the_evaluated_store() {
        let mem = Var::array("mem", 32);
        let env = AbsEnv::new();
        let stmt = Stmt::Move { dst: mem.clone(), value: Expr::Var(mem.clone()) };
        let next = transfer_stmt(&env, &cfg(), &stmt);
        assert_eq!(next.find_array(&mem), MemStore::new());
    }

    #[test]
    fn special_havocs_scalar_defs_to_top() {
        let x = Var::scalar("x", 32);
        let env = AbsEnv::new().bind(x.clone(), Binding::Scalar(ValueSet::of_int(1u32, 32)));
        let stmt = Stmt::Special { defs: vec![x.clone()] };
        let next = transfer_stmt(&env, &cfg(), &stmt);
        assert!(next.find_scalar(&x).is_top());
    }

    #[test]
    fn special_leaves_memory_defs_untouched() {
        let mem = Var::array("mem", 32);
        let store = MemStore::new().write(32, &ValueSet::of_int(0u32, 32), &ValueSet::of_int(9u32, 32), 1 << 16);
        let env = AbsEnv::new().bind(mem.clone(), Binding::Array(store.clone()));
        let stmt = Stmt::Special { defs: vec![mem.clone()] };
        let next = transfer_stmt(&env, &cfg(), &stmt);
        assert_eq!(next.find_array(&mem), store);
    }

    #[test]
    fn control_statements_are_identity() {
        let x = Var::scalar("x", 32);
        let env = AbsEnv::new().bind(x.clone(), Binding::Scalar(ValueSet::of_int(1u32, 32)));
        for stmt in [
            Stmt::Assert(Expr::const_int(1, 1)),
            Stmt::Assume(Expr::const_int(1, 1)),
            Stmt::Jmp(Expr::const_int(0, 32)),
            Stmt::Label("L0".into()),
            Stmt::Comment("note".into()),
            Stmt::Halt,
        ] {
            assert_eq!(transfer_stmt(&env, &cfg(), &stmt), env);
        }
    }
}
