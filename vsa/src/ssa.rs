// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! The SSA intermediate representation the interpreter consumes: variables,
//! expressions, statements, and edge predicates. Construction (three-address
//! lowering, copy propagation, condition simplification) happens upstream;
//! this module only defines the shapes the evaluator and transfer functions
//! pattern-match on.

use std::fmt;
use std::rc::Rc;

use crate::algebra::{BinOp, CastKind, UnOp};

/// Endianness tag carried by `Load`/`Store` for documentation purposes
/// only — memory is assumed pre-deendianized upstream, so the evaluator
/// never branches on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endian {
    Little,
    Big,
}

/// Whether a [`Var`] denotes a register-typed (scalar) or memory-typed
/// (array) binding. Declared once at the variable, not inferred from use —
/// mixing the two at one `Var` is the malformed-SSA condition `AbsEnv`
/// treats as fatal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VarKind {
    Scalar,
    Array,
}

/// An SSA variable identity: a name, its declared bit width (the address
/// width, for an `Array` variable), and whether it is scalar- or
/// memory-typed. Two `Var`s with the same name but different widths are
/// distinct variables (this can happen across casts in poorly normalized
/// IR; the evaluator does not assume it can't).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Var {
    pub name: Rc<str>,
    pub width: u32,
    pub kind: VarKind,
}

impl Var {
    pub fn scalar(name: impl Into<Rc<str>>, width: u32) -> Var {
        Var {
            name: name.into(),
            width,
            kind: VarKind::Scalar,
        }
    }

    pub fn array(name: impl Into<Rc<str>>, addr_width: u32) -> Var {
        Var {
            name: name.into(),
            width: addr_width,
            kind: VarKind::Array,
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.width)
    }
}

/// Comparison operators that may appear in `Cmp(op, lhs, rhs)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Neq,
    Le,
    Lt,
    Sle,
    Slt,
}

/// An SSA expression. Scalar and memory (array-typed) expressions share one
/// tree; the evaluator dispatches on the inferred type of the subtree root
/// (a `Var`'s declared kind, or the shape of the expression itself).
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    ConstInt { value: i128, width: u32 },
    Var(Var),
    Phi(Vec<Var>),
    BinOp {
        op: BinOp,
        width: u32,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    UnOp {
        op: UnOp,
        width: u32,
        arg: Box<Expr>,
    },
    Cast {
        kind: CastKind,
        target_width: u32,
        arg: Box<Expr>,
    },
    Cmp {
        op: CmpOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Load {
        mem: Var,
        index: Box<Expr>,
        endian: Endian,
        result_width: u32,
    },
    Store {
        mem: Var,
        index: Box<Expr>,
        value: Box<Expr>,
        endian: Endian,
        value_width: u32,
    },
    Concat(Box<Expr>, Box<Expr>),
    Extract { hi_bit: u32, lo_bit: u32, arg: Box<Expr> },
    Ite {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Unknown { width: u32 },
}

impl Expr {
    pub fn const_int(value: i128, width: u32) -> Expr {
        Expr::ConstInt { value, width }
    }
}

/// An SSA statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Move { dst: Var, value: Expr },
    /// An opaque operation (syscall, intrinsic) that havocs its `defs`
    /// (register-typed results) but leaves memory untouched — see
    /// DESIGN.md's "Special statements and memory".
    Special { defs: Vec<Var> },
    Assert(Expr),
    Assume(Expr),
    Jmp(Expr),
    CJmp { cond: Expr, then_target: Expr, else_target: Expr },
    Label(Rc<str>),
    Comment(Rc<str>),
    Halt,
}

/// The label on a CFG edge: `None` for an unconditional edge, `Some((taken,
/// predicate))` for a conditional one — `taken` is whether this edge is the
/// "true" branch of `predicate`.
pub type EdgeLabel = Option<(bool, Expr)>;
