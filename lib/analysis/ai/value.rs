//! The values held on the abstract operand stack and in abstract locals.

use crate::analysis::ai::{BoolSet, Interval, Lattice, RefSet, SignSet};
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An abstract value.
///
/// A single analysis uses one integer domain, either `Sign` or `Interval`.
/// Booleans are integers in the JVM, so a `Bool` combined with an integer is
/// first converted into that integer domain, with `false` as `0` and `true`
/// as `1`. Any other combination of different kinds is an error.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum AbstractValue {
    /// No value at all. Absorbing under join.
    Bot,
    Sign(SignSet),
    Interval(Interval),
    Bool(BoolSet),
    Ref(RefSet),
}

/// The signs of the integers standing for a set of booleans.
pub fn bools_as_signs(bools: BoolSet) -> SignSet {
    let mut signs = SignSet::empty();
    if bools.contains(BoolSet::FALSE) {
        signs |= SignSet::ZERO;
    }
    if bools.contains(BoolSet::TRUE) {
        signs |= SignSet::POSITIVE;
    }
    signs
}

/// The interval of the integers standing for a set of booleans.
pub fn bools_as_interval(bools: BoolSet) -> Interval {
    bools.values().fold(Interval::bottom(), |interval, value| {
        interval.join(&Interval::constant(value as i64))
    })
}

impl AbstractValue {
    pub fn is_bot(&self) -> bool {
        matches!(*self, AbstractValue::Bot)
    }

    /// Returns `true` if this value stands for no concrete value.
    pub fn is_empty(&self) -> bool {
        match *self {
            AbstractValue::Bot => true,
            AbstractValue::Sign(ref signs) => signs.is_bottom(),
            AbstractValue::Interval(ref interval) => interval.is_bottom(),
            AbstractValue::Bool(ref bools) => bools.is_bottom(),
            AbstractValue::Ref(ref refs) => refs.is_bottom(),
        }
    }

    /// Bring two values to a common kind.
    fn unify(&self, other: &AbstractValue) -> Result<(AbstractValue, AbstractValue), Error> {
        use self::AbstractValue as V;
        Ok(match (self, other) {
            (V::Bool(b), V::Sign(_)) => (V::Sign(bools_as_signs(*b)), other.clone()),
            (V::Sign(_), V::Bool(b)) => (self.clone(), V::Sign(bools_as_signs(*b))),
            (V::Bool(b), V::Interval(_)) => (V::Interval(bools_as_interval(*b)), other.clone()),
            (V::Interval(_), V::Bool(b)) => (self.clone(), V::Interval(bools_as_interval(*b))),
            (V::Sign(_), V::Sign(_))
            | (V::Interval(_), V::Interval(_))
            | (V::Bool(_), V::Bool(_))
            | (V::Ref(_), V::Ref(_)) => (self.clone(), other.clone()),
            _ => {
                return Err(Error::IncompatibleValues(
                    self.to_string(),
                    other.to_string(),
                ))
            }
        })
    }

    /// The least upper bound of two values.
    pub fn join(&self, other: &AbstractValue) -> Result<AbstractValue, Error> {
        use self::AbstractValue as V;
        if self.is_bot() {
            return Ok(other.clone());
        }
        if other.is_bot() {
            return Ok(self.clone());
        }
        Ok(match self.unify(other)? {
            (V::Sign(a), V::Sign(b)) => V::Sign(a.join(&b)),
            (V::Interval(a), V::Interval(b)) => V::Interval(a.join(&b)),
            (V::Bool(a), V::Bool(b)) => V::Bool(a.join(&b)),
            (V::Ref(a), V::Ref(b)) => V::Ref(a.join(&b)),
            (a, b) => return Err(Error::IncompatibleValues(a.to_string(), b.to_string())),
        })
    }

    /// The greatest lower bound of two values.
    pub fn meet(&self, other: &AbstractValue) -> Result<AbstractValue, Error> {
        use self::AbstractValue as V;
        if self.is_bot() || other.is_bot() {
            return Ok(V::Bot);
        }
        Ok(match self.unify(other)? {
            (V::Sign(a), V::Sign(b)) => V::Sign(a.meet(&b)),
            (V::Interval(a), V::Interval(b)) => V::Interval(a.meet(&b)),
            (V::Bool(a), V::Bool(b)) => V::Bool(a.meet(&b)),
            (V::Ref(a), V::Ref(b)) => V::Ref(a.meet(&b)),
            (a, b) => return Err(Error::IncompatibleValues(a.to_string(), b.to_string())),
        })
    }

    /// Returns `true` if `self` is below or equal to `other`.
    pub fn leq(&self, other: &AbstractValue) -> Result<bool, Error> {
        use self::AbstractValue as V;
        if self.is_empty() {
            return Ok(true);
        }
        if other.is_bot() {
            return Ok(false);
        }
        Ok(match self.unify(other)? {
            (V::Sign(a), V::Sign(b)) => a.leq(&b),
            (V::Interval(a), V::Interval(b)) => a.leq(&b),
            (V::Bool(a), V::Bool(b)) => a.leq(&b),
            (V::Ref(a), V::Ref(b)) => a.leq(&b),
            (a, b) => return Err(Error::IncompatibleValues(a.to_string(), b.to_string())),
        })
    }
}

impl fmt::Display for AbstractValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AbstractValue::Bot => write!(f, "bot"),
            AbstractValue::Sign(ref signs) => write!(f, "{}", signs),
            AbstractValue::Interval(ref interval) => write!(f, "{}", interval),
            AbstractValue::Bool(ref bools) => write!(f, "{}", bools),
            AbstractValue::Ref(ref refs) => write!(f, "{}", refs),
        }
    }
}

impl From<SignSet> for AbstractValue {
    fn from(signs: SignSet) -> AbstractValue {
        AbstractValue::Sign(signs)
    }
}

impl From<Interval> for AbstractValue {
    fn from(interval: Interval) -> AbstractValue {
        AbstractValue::Interval(interval)
    }
}

impl From<BoolSet> for AbstractValue {
    fn from(bools: BoolSet) -> AbstractValue {
        AbstractValue::Bool(bools)
    }
}

impl From<RefSet> for AbstractValue {
    fn from(refs: RefSet) -> AbstractValue {
        AbstractValue::Ref(refs)
    }
}
