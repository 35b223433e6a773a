// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

#[cfg(test)]
mod tests {
    use crate::cfg::Cfg;
    use crate::ssa::Stmt;

    #[test]
    fn entry_panics_when_unset() {
        let cfg = Cfg::new();
        let result = std::panic::catch_unwind(|| cfg.entry());
        assert!(result.is_err());
    }

    #[test]
    fn successors_and_predecessors_are_symmetric() {
        let mut cfg = Cfg::new();
        cfg.set_entry(0);
        cfg.add_vertex(1, vec![Stmt::Halt]);
        cfg.add_vertex(2, vec![]);
        cfg.add_edge(0, 1, None);
        cfg.add_edge(0, 2, None);

        let succs: Vec<_> = cfg.successors(0).collect();
        assert_eq!(succs.len(), 2);
        assert!(succs.contains(&1));
        assert!(succs.contains(&2));

        let preds: Vec<_> = cfg.predecessors(1).map(|(p, _)| p).collect();
        assert_eq!(preds, vec![0]);
    }

    #[test]
    fn stmts_of_an_unknown_vertex_is_empty() {
        let cfg = Cfg::new();
        assert!(cfg.stmts(99).is_empty());
    }

    #[test]
    fn vertices_lists_every_added_node() {
        let mut cfg = Cfg::new();
        cfg.set_entry(0);
        cfg.add_vertex(1, vec![]);
        let mut vs: Vec<_> = cfg.vertices().collect();
        vs.sort();
        assert_eq!(vs, vec![0, 1]);
    }
}
