// SPDX-FileCopyrightText: 2023 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! The SSA control-flow graph the driver walks: vertices carry a straight-
//! line statement list, edges carry an optional branch predicate.

use std::collections::HashMap;

use petgraph::prelude::DiGraphMap;
use petgraph::Direction::{Incoming, Outgoing};

use crate::ssa::{EdgeLabel, Stmt};

pub type VertexId = u64;

/// A CFG: vertices are `VertexId`s (e.g. block-start addresses), edges
/// carry the predicate the edge transfer pattern-matches on.
pub struct Cfg {
    graph: DiGraphMap<VertexId, EdgeLabel>,
    stmts: HashMap<VertexId, Vec<Stmt>>,
    entry: Option<VertexId>,
}

impl Cfg {
    pub fn new() -> Cfg {
        Cfg {
            graph: DiGraphMap::new(),
            stmts: HashMap::new(),
            entry: None,
        }
    }

    /// Adds a vertex (or replaces its statement list if already present).
    pub fn add_vertex(&mut self, id: VertexId, stmts: Vec<Stmt>) {
        self.graph.add_node(id);
        self.stmts.insert(id, stmts);
    }

    pub fn set_entry(&mut self, id: VertexId) {
        self.graph.add_node(id);
        self.entry = Some(id);
    }

    pub fn entry(&self) -> VertexId {
        self.entry.expect("cfg has no entry vertex set")
    }

    pub fn add_edge(&mut self, from: VertexId, to: VertexId, label: EdgeLabel) {
        self.graph.add_edge(from, to, label);
    }

    pub fn stmts(&self, v: VertexId) -> &[Stmt] {
        self.stmts.get(&v).map(|s| s.as_slice()).unwrap_or(&[])
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.graph.nodes()
    }

    pub fn predecessors(&self, v: VertexId) -> impl Iterator<Item = (VertexId, &EdgeLabel)> {
        self.graph
            .edges_directed(v, Incoming)
            .map(|(from, _to, label)| (from, label))
    }

    pub fn successors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.graph.neighbors_directed(v, Outgoing)
    }
}

impl Default for Cfg {
    fn default() -> Cfg {
        Cfg::new()
    }
}
