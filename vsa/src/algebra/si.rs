// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! Strided intervals: `(width, stride, low, high)` over arbitrary-precision
//! integers (spec §3). `low`/`high` are the true mathematical value of the
//! interval's endpoints, not a fixed-width two's-complement bit pattern;
//! `width` governs masking on truncating cast and the bounds used by the
//! unsigned/signed inequality constructors and widening. This keeps a single
//! numeric domain for both signed and unsigned readings of the same SI,
//! which is why [`StridedInterval::cast`] does not need separate unsigned
//! and signed extension behavior (see `DESIGN.md`, open question "cast and
//! sign").

use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};

use helper::num::subscript;

/// Binary operators the interpreter's evaluator dispatches on (spec §4.3,
/// "Binary op -> dispatch to VS's binop table").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    UDiv,
    SDiv,
    UMod,
    SMod,
    Shl,
    LShr,
    AShr,
    And,
    Or,
    Xor,
}

/// Unary operators (spec §4.3, "Unary op -> dispatch to VS's unop table").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnOp {
    Neg,
    Not,
}

/// Cast kinds the evaluator's `Cast(kind, target_width, e)` dispatches on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastKind {
    Unsigned,
    Signed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum SiKind {
    Top,
    Empty,
    Interval {
        stride: BigInt,
        low: BigInt,
        high: BigInt,
    },
}

/// A strided interval at a fixed bit width.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StridedInterval {
    width: u32,
    kind: SiKind,
}

fn modulus(width: u32) -> BigInt {
    BigInt::from(1) << width
}

fn unsigned_max(width: u32) -> BigInt {
    modulus(width) - 1
}

fn signed_min(width: u32) -> BigInt {
    -(BigInt::from(1) << (width - 1))
}

fn signed_max(width: u32) -> BigInt {
    (BigInt::from(1) << (width - 1)) - 1
}

/// gcd of two non-negative strides, treating 0 (a single point) as the
/// identity: `gcd(0, s) = s`.
fn gcd2(a: &BigInt, b: &BigInt) -> BigInt {
    a.gcd(b)
}

fn gcd3(a: &BigInt, b: &BigInt, c: &BigInt) -> BigInt {
    gcd2(&gcd2(a, b), c)
}

/// Extended Euclidean algorithm: returns `(g, x, y)` with `a*x + b*y = g`.
fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    if b.is_zero() {
        return (a.clone(), BigInt::from(1), BigInt::zero());
    }
    let (g, x1, y1) = extended_gcd(b, &(a % b));
    let q = a / b;
    (g, y1.clone(), x1 - &q * &y1)
}

/// Solves the simultaneous congruences `x ≡ l1 (mod s1)`, `x ≡ l2 (mod s2)`
/// (`s = 0` meaning "exactly one point"). Returns the combined
/// `(stride, base)` describing all solutions, or `None` if none exist.
fn solve_congruences(
    s1: &BigInt,
    l1: &BigInt,
    s2: &BigInt,
    l2: &BigInt,
) -> Option<(BigInt, BigInt)> {
    if s1.is_zero() && s2.is_zero() {
        return if l1 == l2 {
            Some((BigInt::zero(), l1.clone()))
        } else {
            None
        };
    }
    if s1.is_zero() {
        return if ((l1 - l2) % s2).is_zero() {
            Some((BigInt::zero(), l1.clone()))
        } else {
            None
        };
    }
    if s2.is_zero() {
        return if ((l2 - l1) % s1).is_zero() {
            Some((BigInt::zero(), l2.clone()))
        } else {
            None
        };
    }
    let (g, x, _y) = extended_gcd(s1, s2);
    let diff = l2 - l1;
    if !(&diff % &g).is_zero() {
        return None;
    }
    let lcm = (s1 / &g) * s2;
    let modulus2 = s2 / &g;
    let t = ((&diff / &g) * &x).mod_floor(&modulus2);
    let base = (l1 + &t * s1).mod_floor(&lcm);
    Some((lcm, base))
}

impl StridedInterval {
    pub fn top(width: u32) -> StridedInterval {
        StridedInterval {
            width,
            kind: SiKind::Top,
        }
    }

    pub fn empty(width: u32) -> StridedInterval {
        StridedInterval {
            width,
            kind: SiKind::Empty,
        }
    }

    /// Constructs `{ low + k*stride | 0 <= k, low + k*stride <= high }`,
    /// normalizing `high` down to the last attainable point and collapsing
    /// to [`empty`](Self::empty) if `low > high`.
    pub fn new(width: u32, stride: BigInt, low: BigInt, high: BigInt) -> StridedInterval {
        assert!(width > 0, "strided interval width must be positive");
        assert!(!stride.is_negative(), "stride must be non-negative");
        if low > high {
            return Self::empty(width);
        }
        if stride.is_zero() {
            return StridedInterval {
                width,
                kind: SiKind::Interval {
                    stride: BigInt::zero(),
                    high: low.clone(),
                    low,
                },
            };
        }
        let steps = (&high - &low) / &stride;
        let adj_high = &low + &steps * &stride;
        StridedInterval {
            width,
            kind: SiKind::Interval {
                stride,
                low,
                high: adj_high,
            },
        }
    }

    pub fn of_int<T: Into<BigInt>>(value: T, width: u32) -> StridedInterval {
        let v = value.into();
        Self::new(width, BigInt::zero(), v.clone(), v)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn is_top(&self) -> bool {
        matches!(self.kind, SiKind::Top)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, SiKind::Empty)
    }

    fn parts(&self) -> (&BigInt, &BigInt, &BigInt) {
        match &self.kind {
            SiKind::Interval { stride, low, high } => (stride, low, high),
            _ => panic!("strided interval has no concrete bounds (top or empty)"),
        }
    }

    pub fn stride(&self) -> Option<&BigInt> {
        match &self.kind {
            SiKind::Interval { stride, .. } => Some(stride),
            _ => None,
        }
    }

    pub fn low(&self) -> Option<&BigInt> {
        match &self.kind {
            SiKind::Interval { low, .. } => Some(low),
            _ => None,
        }
    }

    pub fn high(&self) -> Option<&BigInt> {
        match &self.kind {
            SiKind::Interval { high, .. } => Some(high),
            _ => None,
        }
    }

    pub fn is_singleton(&self) -> bool {
        matches!(&self.kind, SiKind::Interval { low, high, .. } if low == high)
    }

    fn singleton(&self) -> Option<BigInt> {
        match &self.kind {
            SiKind::Interval { low, high, .. } if low == high => Some(low.clone()),
            _ => None,
        }
    }

    pub fn union(&self, other: &StridedInterval) -> StridedInterval {
        assert_eq!(self.width, other.width, "strided interval width mismatch");
        match (&self.kind, &other.kind) {
            (SiKind::Top, _) | (_, SiKind::Top) => Self::top(self.width),
            (SiKind::Empty, _) => other.clone(),
            (_, SiKind::Empty) => self.clone(),
            (
                SiKind::Interval {
                    stride: s1,
                    low: l1,
                    high: h1,
                },
                SiKind::Interval {
                    stride: s2,
                    low: l2,
                    high: h2,
                },
            ) => {
                let new_low = l1.min(l2).clone();
                let new_high = h1.max(h2).clone();
                let new_stride = gcd3(s1, s2, &(l1 - l2).abs());
                Self::new(self.width, new_stride, new_low, new_high)
            }
        }
    }

    pub fn intersection(&self, other: &StridedInterval) -> StridedInterval {
        assert_eq!(self.width, other.width, "strided interval width mismatch");
        match (&self.kind, &other.kind) {
            (SiKind::Empty, _) | (_, SiKind::Empty) => Self::empty(self.width),
            (SiKind::Top, _) => other.clone(),
            (_, SiKind::Top) => self.clone(),
            (
                SiKind::Interval {
                    stride: s1,
                    low: l1,
                    high: h1,
                },
                SiKind::Interval {
                    stride: s2,
                    low: l2,
                    high: h2,
                },
            ) => {
                let lo = l1.max(l2).clone();
                let hi = h1.min(h2).clone();
                if lo > hi {
                    return Self::empty(self.width);
                }
                match solve_congruences(s1, l1, s2, l2) {
                    None => Self::empty(self.width),
                    Some((stride, base)) => {
                        if stride.is_zero() {
                            if base >= lo && base <= hi {
                                Self::of_int(base, self.width)
                            } else {
                                Self::empty(self.width)
                            }
                        } else {
                            let rem = (&lo - &base).mod_floor(&stride);
                            let first = if rem.is_zero() {
                                lo
                            } else {
                                &lo + (&stride - &rem)
                            };
                            if first > hi {
                                Self::empty(self.width)
                            } else {
                                Self::new(self.width, stride, first, hi)
                            }
                        }
                    }
                }
            }
        }
    }

    /// Widens `self` (the accumulated state) towards `other` (the newly
    /// computed state). Per spec §4.1/§9: jumps an unstable bound straight
    /// to the representable extreme so the lattice has finite height.
    pub fn widen(&self, other: &StridedInterval) -> StridedInterval {
        assert_eq!(self.width, other.width, "strided interval width mismatch");
        match (&self.kind, &other.kind) {
            (SiKind::Top, _) | (_, SiKind::Top) => Self::top(self.width),
            (SiKind::Empty, _) => other.clone(),
            (_, SiKind::Empty) => self.clone(),
            (
                SiKind::Interval {
                    stride: s1,
                    low: l1,
                    high: h1,
                },
                SiKind::Interval {
                    stride: s2,
                    low: l2,
                    high: h2,
                },
            ) => {
                if s1 == s2 && l1 == l2 && h1 == h2 {
                    return self.clone();
                }
                let stride = gcd2(s1, s2);
                let low = if l2 < l1 {
                    signed_min(self.width)
                } else {
                    l1.clone()
                };
                let high = if h2 > h1 {
                    unsigned_max(self.width)
                } else {
                    h1.clone()
                };
                Self::new(self.width, stride, low, high)
            }
        }
    }

    pub fn cast(&self, kind: CastKind, target_width: u32) -> StridedInterval {
        let _ = kind; // raw value is kind-agnostic; see module doc.
        match &self.kind {
            SiKind::Top => Self::top(target_width),
            SiKind::Empty => Self::empty(target_width),
            SiKind::Interval { stride, low, high } => {
                if target_width >= self.width {
                    return Self::new(target_width, stride.clone(), low.clone(), high.clone());
                }
                let m = modulus(target_width);
                if stride.is_zero() {
                    return Self::of_int(low.mod_floor(&m), target_width);
                }
                let span = high - low;
                if span >= m {
                    return Self::top(target_width);
                }
                let lo_t = low.mod_floor(&m);
                let hi_t = high.mod_floor(&m);
                if lo_t <= hi_t {
                    Self::new(target_width, stride.clone(), lo_t, hi_t)
                } else {
                    Self::top(target_width)
                }
            }
        }
    }

    /// Concatenates `self` (high-order bits) with `lo` (low-order bits)
    /// into a value of combined width. Precise only when both sides are a
    /// single concrete point; otherwise over-approximates to top.
    pub fn concat(&self, lo: &StridedInterval) -> StridedInterval {
        let width = self.width + lo.width;
        match (self.singleton(), lo.singleton()) {
            (Some(hi_v), Some(lo_v)) => {
                let combined = (hi_v << lo.width) | lo_v.mod_floor(&modulus(lo.width));
                Self::of_int(combined, width)
            }
            _ if self.is_empty() || lo.is_empty() => Self::empty(width),
            _ => Self::top(width),
        }
    }

    /// Extracts bits `[lo_bit, hi_bit]` (inclusive). Precise only for a
    /// concrete point; spec §4.3 treats `Extract` as unimplemented in the
    /// evaluator proper, this exists to satisfy the library contract (§6).
    pub fn extract(&self, hi_bit: u32, lo_bit: u32) -> StridedInterval {
        let width = hi_bit - lo_bit + 1;
        match self.singleton() {
            Some(v) => {
                let shifted = v >> lo_bit;
                Self::of_int(shifted.mod_floor(&modulus(width)), width)
            }
            None if self.is_empty() => Self::empty(width),
            None => Self::top(width),
        }
    }

    fn scale(point: &BigInt, si: &StridedInterval) -> StridedInterval {
        let (s, l, h) = si.parts();
        let new_stride = point.abs() * s;
        let a = point * l;
        let b = point * h;
        let (lo, hi) = if point.is_negative() { (b, a) } else { (a, b) };
        Self::new(si.width, new_stride, lo, hi)
    }

    pub fn binop(&self, op: BinOp, other: &StridedInterval) -> StridedInterval {
        let width = self.width;
        if self.is_empty() || other.is_empty() {
            return Self::empty(width);
        }
        if self.is_top() || other.is_top() {
            return Self::top(width);
        }
        let (s1, l1, h1) = self.parts();
        let (s2, l2, h2) = other.parts();
        match op {
            BinOp::Add => Self::new(width, gcd2(s1, s2), l1 + l2, h1 + h2),
            BinOp::Sub => Self::new(width, gcd2(s1, s2), l1 - h2, h1 - l2),
            BinOp::Mul => {
                if let Some(p) = self.singleton() {
                    Self::scale(&p, other)
                } else if let Some(p) = other.singleton() {
                    Self::scale(&p, self)
                } else {
                    Self::top(width)
                }
            }
            BinOp::UDiv | BinOp::SDiv => match other.singleton() {
                Some(d) if !d.is_zero() => {
                    let a = l1 / &d;
                    let b = h1 / &d;
                    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                    let stride = if lo == hi { BigInt::zero() } else { BigInt::from(1) };
                    Self::new(width, stride, lo, hi)
                }
                _ => Self::top(width),
            },
            BinOp::UMod => match other.singleton() {
                Some(d) if !d.is_zero() => {
                    Self::new(width, BigInt::from(1), BigInt::zero(), d.abs() - 1)
                }
                _ => Self::top(width),
            },
            BinOp::SMod => match other.singleton() {
                Some(d) if !d.is_zero() => {
                    let bound = d.abs() - 1;
                    Self::new(width, BigInt::from(1), -&bound, bound)
                }
                _ => Self::top(width),
            },
            BinOp::Shl => match other.singleton() {
                Some(k) if !k.is_negative() && k < BigInt::from(width) => {
                    let k = k.to_u32().unwrap();
                    Self::new(width, s1 << k, l1 << k, h1 << k)
                }
                _ => Self::top(width),
            },
            BinOp::LShr => match other.singleton() {
                Some(k) if !k.is_negative() && k < BigInt::from(width) => {
                    let k = k.to_u32().unwrap();
                    let m = modulus(width);
                    let lo_u = l1.mod_floor(&m);
                    let hi_u = h1.mod_floor(&m);
                    if lo_u <= hi_u {
                        let stride = if lo_u == hi_u { BigInt::zero() } else { BigInt::from(1) };
                        Self::new(width, stride, lo_u >> k, hi_u >> k)
                    } else {
                        Self::top(width)
                    }
                }
                _ => Self::top(width),
            },
            BinOp::AShr => match other.singleton() {
                Some(k) if !k.is_negative() && k < BigInt::from(width) => {
                    let k = k.to_u32().unwrap();
                    let stride = if l1 == h1 { BigInt::zero() } else { BigInt::from(1) };
                    Self::new(width, stride, l1 >> k, h1 >> k)
                }
                _ => Self::top(width),
            },
            BinOp::And | BinOp::Or | BinOp::Xor => {
                match (self.singleton(), other.singleton(), width <= 128) {
                    (Some(a), Some(b), true) => {
                        let a = a.to_i128().expect("width <= 128");
                        let b = b.to_i128().expect("width <= 128");
                        let r = match op {
                            BinOp::And => a & b,
                            BinOp::Or => a | b,
                            BinOp::Xor => a ^ b,
                            _ => unreachable!(),
                        };
                        Self::of_int(BigInt::from(r), width)
                    }
                    _ => Self::top(width),
                }
            }
        }
    }

    pub fn unop(&self, op: UnOp) -> StridedInterval {
        let width = self.width;
        if self.is_empty() {
            return Self::empty(width);
        }
        if self.is_top() {
            return Self::top(width);
        }
        let (s, l, h) = self.parts();
        match op {
            UnOp::Neg => Self::new(width, s.clone(), -h, -l),
            UnOp::Not => match (self.singleton(), width <= 128) {
                (Some(v), true) => {
                    let v = v.to_i128().expect("width <= 128");
                    Self::of_int(BigInt::from(!v), width)
                }
                _ => Self::top(width),
            },
        }
    }

    pub fn remove_upper_bound(&self) -> StridedInterval {
        match &self.kind {
            SiKind::Interval { stride, low, .. } => Self {
                width: self.width,
                kind: SiKind::Interval {
                    stride: stride.clone(),
                    low: low.clone(),
                    high: unsigned_max(self.width),
                },
            },
            _ => self.clone(),
        }
    }

    pub fn remove_lower_bound(&self) -> StridedInterval {
        match &self.kind {
            SiKind::Interval { stride, high, .. } => Self {
                width: self.width,
                kind: SiKind::Interval {
                    stride: stride.clone(),
                    low: signed_min(self.width),
                    high: high.clone(),
                },
            },
            _ => self.clone(),
        }
    }

    pub fn unsigned_below(width: u32, k: BigInt) -> StridedInterval {
        Self::new(width, BigInt::from(1), BigInt::zero(), k - 1)
    }

    pub fn unsigned_beloweq(width: u32, k: BigInt) -> StridedInterval {
        Self::new(width, BigInt::from(1), BigInt::zero(), k)
    }

    pub fn unsigned_above(width: u32, k: BigInt) -> StridedInterval {
        Self::new(width, BigInt::from(1), k + 1, unsigned_max(width))
    }

    pub fn unsigned_aboveeq(width: u32, k: BigInt) -> StridedInterval {
        Self::new(width, BigInt::from(1), k, unsigned_max(width))
    }

    pub fn signed_below(width: u32, k: BigInt) -> StridedInterval {
        Self::new(width, BigInt::from(1), signed_min(width), k - 1)
    }

    pub fn signed_beloweq(width: u32, k: BigInt) -> StridedInterval {
        Self::new(width, BigInt::from(1), signed_min(width), k)
    }

    pub fn signed_above(width: u32, k: BigInt) -> StridedInterval {
        Self::new(width, BigInt::from(1), k + 1, signed_max(width))
    }

    pub fn signed_aboveeq(width: u32, k: BigInt) -> StridedInterval {
        Self::new(width, BigInt::from(1), k, signed_max(width))
    }

    /// Enumerates concrete points in increasing order, or `None` if the
    /// count would exceed `bound` (the caller should collapse to top).
    pub fn points(&self, bound: usize) -> Option<Vec<BigInt>> {
        match &self.kind {
            SiKind::Top => None,
            SiKind::Empty => Some(Vec::new()),
            SiKind::Interval { stride, low, high } => {
                if stride.is_zero() {
                    return Some(vec![low.clone()]);
                }
                let count = ((high - low) / stride) + 1;
                let count = count.to_usize()?;
                if count > bound {
                    return None;
                }
                let mut v = Vec::with_capacity(count);
                let mut cur = low.clone();
                for _ in 0..count {
                    v.push(cur.clone());
                    cur += stride;
                }
                Some(v)
            }
        }
    }
}

impl fmt::Display for StridedInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sub = subscript(self.width as u64);
        match &self.kind {
            SiKind::Top => write!(f, "⊤{}", sub),
            SiKind::Empty => write!(f, "⊥{}", sub),
            SiKind::Interval { low, high, .. } if low == high => {
                write!(f, "{}{}", low, sub)
            }
            SiKind::Interval { stride, low, high } => {
                write!(f, "{}[{},{}]{}", stride, low, high, sub)
            }
        }
    }
}
