//! The interval domain over the integers extended with infinities.

use crate::analysis::ai::{Abstraction, Lattice};
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};
use std::cmp;
use std::collections::BTreeSet;
use std::fmt;

/// One end of an interval.
///
/// Bounds are ordered `NegInf < Finite(_) < PosInf`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Bound {
    NegInf,
    Finite(BigInt),
    PosInf,
}

impl Bound {
    pub fn finite<T: Into<BigInt>>(value: T) -> Bound {
        Bound::Finite(value.into())
    }

    pub fn is_finite(&self) -> bool {
        matches!(*self, Bound::Finite(_))
    }

    pub fn is_negative(&self) -> bool {
        match *self {
            Bound::NegInf => true,
            Bound::Finite(ref value) => value.is_negative(),
            Bound::PosInf => false,
        }
    }

    pub fn is_positive(&self) -> bool {
        match *self {
            Bound::NegInf => false,
            Bound::Finite(ref value) => value.is_positive(),
            Bound::PosInf => true,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(*self, Bound::Finite(ref value) if value.is_zero())
    }

    fn infinity(positive: bool) -> Bound {
        if positive {
            Bound::PosInf
        } else {
            Bound::NegInf
        }
    }

    pub(crate) fn neg(&self) -> Bound {
        match *self {
            Bound::NegInf => Bound::PosInf,
            Bound::Finite(ref value) => Bound::Finite(-value),
            Bound::PosInf => Bound::NegInf,
        }
    }

    /// Sum of two bounds. An infinity absorbs any finite bound. The sum of
    /// opposite infinities never arises between two lower or two upper bounds
    /// of non-empty intervals, and is taken to be the left operand.
    pub(crate) fn add(&self, other: &Bound) -> Bound {
        match (self, other) {
            (Bound::Finite(a), Bound::Finite(b)) => Bound::Finite(a + b),
            (Bound::Finite(_), infinity) => infinity.clone(),
            (infinity, _) => infinity.clone(),
        }
    }

    /// Product of two bounds, where zero times an infinity is zero.
    pub(crate) fn mul(&self, other: &Bound) -> Bound {
        match (self, other) {
            (Bound::Finite(a), Bound::Finite(b)) => Bound::Finite(a * b),
            _ if self.is_zero() || other.is_zero() => Bound::finite(0),
            _ => Bound::infinity(self.is_positive() == other.is_positive()),
        }
    }

    /// Quotient of two bounds, truncated toward zero. The divisor must not be
    /// zero. Any infinite divisor yields zero.
    pub(crate) fn div(&self, divisor: &Bound) -> Bound {
        match (self, divisor) {
            (Bound::Finite(a), Bound::Finite(b)) => Bound::Finite(a / b),
            (_, Bound::NegInf) | (_, Bound::PosInf) => Bound::finite(0),
            (infinity, _) => Bound::infinity(infinity.is_positive() == divisor.is_positive()),
        }
    }

    fn abs(&self) -> Bound {
        match *self {
            Bound::Finite(ref value) => Bound::Finite(value.abs()),
            _ => Bound::PosInf,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Bound::NegInf => write!(f, "-inf"),
            Bound::Finite(ref value) => write!(f, "{}", value),
            Bound::PosInf => write!(f, "+inf"),
        }
    }
}

/// An interval `[lb, ub]` of integers.
///
/// Intervals are kept canonical: every empty interval is represented as
/// `[+inf, -inf]`, and a non-empty interval never has `+inf` as its lower
/// bound or `-inf` as its upper bound.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Interval {
    lb: Bound,
    ub: Bound,
}

impl Interval {
    pub fn new(lb: Bound, ub: Bound) -> Interval {
        if lb > ub || lb == Bound::PosInf || ub == Bound::NegInf {
            Interval::bottom()
        } else {
            Interval { lb, ub }
        }
    }

    /// The interval holding exactly `value`.
    pub fn constant<T: Into<BigInt>>(value: T) -> Interval {
        let value = value.into();
        Interval {
            lb: Bound::Finite(value.clone()),
            ub: Bound::Finite(value),
        }
    }

    /// The interval `[lb, ub]` of finite bounds.
    pub fn range<T: Into<BigInt>>(lb: T, ub: T) -> Interval {
        Interval::new(Bound::finite(lb), Bound::finite(ub))
    }

    pub fn top() -> Interval {
        Interval {
            lb: Bound::NegInf,
            ub: Bound::PosInf,
        }
    }

    pub fn lb(&self) -> &Bound {
        &self.lb
    }

    pub fn ub(&self) -> &Bound {
        &self.ub
    }

    /// Returns `true` if zero is in this interval.
    pub fn contains_zero(&self) -> bool {
        !self.is_bottom() && !self.lb.is_positive() && !self.ub.is_negative()
    }

    /// The single value of this interval, if it holds exactly one.
    pub fn as_constant(&self) -> Option<&BigInt> {
        match (&self.lb, &self.ub) {
            (Bound::Finite(lb), Bound::Finite(ub)) if lb == ub => Some(lb),
            _ => None,
        }
    }

    /// The part of this interval below zero.
    pub fn negative_part(&self) -> Interval {
        self.meet(&Interval::new(Bound::NegInf, Bound::finite(-1)))
    }

    /// The part of this interval above zero.
    pub fn positive_part(&self) -> Interval {
        self.meet(&Interval::new(Bound::finite(1), Bound::PosInf))
    }

    /// Widen `self` with `new`, snapping every bound that grew to the nearest
    /// landmark outside of it, or to infinity when there is none.
    ///
    /// Widening with bottom returns the other operand, and widening with an
    /// interval already below `self` returns `self`.
    pub fn widen(&self, new: &Interval, landmarks: &BTreeSet<i64>) -> Interval {
        if new.leq(self) {
            return self.clone();
        }
        if self.is_bottom() {
            return new.clone();
        }

        let lb = cmp::min(&self.lb, &new.lb);
        let lb = if lb.is_finite() {
            landmarks
                .iter()
                .rev()
                .map(|&k| Bound::finite(k))
                .find(|k| k <= lb)
                .unwrap_or(Bound::NegInf)
        } else {
            lb.clone()
        };

        let ub = cmp::max(&self.ub, &new.ub);
        let ub = if ub.is_finite() {
            landmarks
                .iter()
                .map(|&k| Bound::finite(k))
                .find(|k| k >= ub)
                .unwrap_or(Bound::PosInf)
        } else {
            ub.clone()
        };

        Interval::new(lb, ub)
    }

    /// The remainder of `self` divided by `divisor`, which must not contain
    /// zero. The result has the sign of the dividend and a magnitude below
    /// the divisor's largest magnitude.
    pub(crate) fn rem(&self, divisor: &Interval) -> Interval {
        if self.is_bottom() || divisor.is_bottom() {
            return Interval::bottom();
        }

        let m = cmp::max(divisor.lb.abs(), divisor.ub.abs()).add(&Bound::finite(-1));
        let upper = cmp::min(self.ub.clone(), m.clone());
        let lower = cmp::max(self.lb.clone(), m.neg());

        if !self.lb.is_negative() {
            Interval::new(Bound::finite(0), upper)
        } else if !self.ub.is_positive() {
            Interval::new(lower, Bound::finite(0))
        } else {
            Interval::new(lower, upper)
        }
    }
}

impl Lattice for Interval {
    fn bottom() -> Interval {
        Interval {
            lb: Bound::PosInf,
            ub: Bound::NegInf,
        }
    }

    fn leq(&self, other: &Interval) -> bool {
        if self.is_bottom() {
            return true;
        }
        if other.is_bottom() {
            return false;
        }
        other.lb <= self.lb && self.ub <= other.ub
    }

    fn join(&self, other: &Interval) -> Interval {
        if self.is_bottom() {
            return other.clone();
        }
        if other.is_bottom() {
            return self.clone();
        }
        Interval {
            lb: cmp::min(&self.lb, &other.lb).clone(),
            ub: cmp::max(&self.ub, &other.ub).clone(),
        }
    }

    fn meet(&self, other: &Interval) -> Interval {
        Interval::new(
            cmp::max(&self.lb, &other.lb).clone(),
            cmp::min(&self.ub, &other.ub).clone(),
        )
    }
}

impl Abstraction<i64> for Interval {
    fn abstract_set<I>(values: I) -> Interval
    where
        I: IntoIterator<Item = i64>,
    {
        values
            .into_iter()
            .fold(Interval::bottom(), |interval, value| {
                interval.join(&Interval::constant(value))
            })
    }

    fn contains(&self, value: &i64) -> bool {
        let value = Bound::finite(*value);
        self.lb <= value && value <= self.ub
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_bottom() {
            write!(f, "bot")
        } else {
            write!(f, "[{}, {}]", self.lb, self.ub)
        }
    }
}
