// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! The abstract environment: per-program-point lattice element mapping SSA
//! variables to either a scalar value set or a memory store.

use std::fmt;

use im::HashMap;

use crate::algebra::ValueSet;
use crate::memstore::MemStore;
use crate::ssa::Var;

/// The tagged value an SSA variable is bound to. The tag is load-bearing:
/// binding a variable under the wrong tag is a malformed-SSA condition and
/// panics rather than silently coercing.
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    Scalar(ValueSet),
    Array(MemStore),
}

impl Binding {
    fn as_scalar(&self) -> &ValueSet {
        match self {
            Binding::Scalar(vs) => vs,
            Binding::Array(_) => panic!("type mismatch: expected scalar binding, found array"),
        }
    }

    fn as_array(&self) -> &MemStore {
        match self {
            Binding::Array(m) => m,
            Binding::Scalar(_) => panic!("type mismatch: expected array binding, found scalar"),
        }
    }
}

/// A mapping from SSA variable identity to [`Binding`]. A variable absent
/// from the map denotes top of its declared width (scalar) or the top
/// (empty) `MemStore` (array) — see [`AbsEnv::find_scalar`]/[`AbsEnv::find_array`].
#[derive(Clone, Debug, PartialEq, Default)]
pub struct AbsEnv {
    bindings: HashMap<Var, Binding>,
}

impl AbsEnv {
    pub fn new() -> AbsEnv {
        AbsEnv {
            bindings: HashMap::new(),
        }
    }

    pub fn find_scalar(&self, v: &Var) -> ValueSet {
        match self.bindings.get(v) {
            Some(b) => b.as_scalar().clone(),
            None => ValueSet::top(v.width),
        }
    }

    /// Whether `v` has any binding at all, regardless of tag. Used by the
    /// evaluator's φ-handling, which only folds in operands that are
    /// actually bound rather than defaulting absent ones to top.
    pub fn is_bound(&self, v: &Var) -> bool {
        self.bindings.contains_key(v)
    }

    pub fn find_array(&self, m: &Var) -> MemStore {
        match self.bindings.get(m) {
            Some(b) => b.as_array().clone(),
            None => MemStore::new(),
        }
    }

    pub fn bind(&self, v: Var, value: Binding) -> AbsEnv {
        AbsEnv {
            bindings: self.bindings.update(v, value),
        }
    }

    pub fn equal(&self, other: &AbsEnv) -> bool {
        self == other
    }

    /// Merges `self` and `other`, `inclusive`ly (a variable bound on only
    /// one side keeps that binding — the other side is "not yet reached
    /// via that predecessor", and SSA φ-nodes make any real ambiguity
    /// explicit) using `scalar_op`/`array_op` to combine two-sided
    /// bindings. Used for both `meet` (union-based) and `widen`
    /// (widen-based).
    fn merge(
        &self,
        other: &AbsEnv,
        scalar_op: impl Fn(&ValueSet, &ValueSet) -> ValueSet,
        array_op: impl Fn(&MemStore, &MemStore) -> MemStore,
    ) -> AbsEnv {
        let mut bindings = self.bindings.clone();
        for (v, other_b) in other.bindings.iter() {
            match bindings.get(v) {
                None => {
                    bindings.insert(v.clone(), other_b.clone());
                }
                Some(Binding::Scalar(s)) => match other_b {
                    Binding::Scalar(o) => {
                        bindings.insert(v.clone(), Binding::Scalar(scalar_op(s, o)));
                    }
                    Binding::Array(_) => panic!(
                        "type mismatch merging env: {:?} bound to scalar on one side, array on the other",
                        v
                    ),
                },
                Some(Binding::Array(s)) => match other_b {
                    Binding::Array(o) => {
                        bindings.insert(v.clone(), Binding::Array(array_op(s, o)));
                    }
                    Binding::Scalar(_) => panic!(
                        "type mismatch merging env: {:?} bound to array on one side, scalar on the other",
                        v
                    ),
                },
            }
        }
        AbsEnv { bindings }
    }

    pub fn meet(&self, other: &AbsEnv) -> AbsEnv {
        self.merge(other, ValueSet::union, MemStore::union)
    }

    pub fn widen(&self, other: &AbsEnv) -> AbsEnv {
        self.merge(other, ValueSet::widen, MemStore::widen)
    }
}

impl fmt::Display for AbsEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "AbsEnv {{")?;
        for (v, b) in self.bindings.iter() {
            match b {
                Binding::Scalar(vs) => writeln!(f, "  {} = {}", v, vs)?,
                Binding::Array(m) => writeln!(f, "  {} = {}", v, m)?,
            }
        }
        write!(f, "}}")
    }
}

/// The analysis's lattice element: `⊤` ("not yet reached") or a concrete
/// [`AbsEnv`]. `⊤` absorbs on both `meet` and `widen`.
#[derive(Clone, Debug, PartialEq)]
pub enum LatticeElement {
    Top,
    Env(AbsEnv),
}

impl LatticeElement {
    pub fn meet(&self, other: &LatticeElement) -> LatticeElement {
        match (self, other) {
            (LatticeElement::Top, x) => x.clone(),
            (x, LatticeElement::Top) => x.clone(),
            (LatticeElement::Env(a), LatticeElement::Env(b)) => LatticeElement::Env(a.meet(b)),
        }
    }

    pub fn widen(&self, other: &LatticeElement) -> LatticeElement {
        match (self, other) {
            (LatticeElement::Top, x) => x.clone(),
            (x, LatticeElement::Top) => x.clone(),
            (LatticeElement::Env(a), LatticeElement::Env(b)) => LatticeElement::Env(a.widen(b)),
        }
    }

    pub fn as_env(&self) -> Option<&AbsEnv> {
        match self {
            LatticeElement::Env(e) => Some(e),
            LatticeElement::Top => None,
        }
    }
}

impl fmt::Display for LatticeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatticeElement::Top => write!(f, "⊤"),
            LatticeElement::Env(e) => write!(f, "{}", e),
        }
    }
}
