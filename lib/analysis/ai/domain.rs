//! Abstract domains for the interpreter.
//!
//! A `Domain` decides which integer lattice the interpreter computes with,
//! converts between that lattice and the `AbstractValue`s the interpreter
//! stores, and decides how a new state is merged into the fixed point.

use crate::analysis::ai::arithmetic::{Arithmetic, BoolArithmetic, IntervalArithmetic, SignArithmetic};
use crate::analysis::ai::{
    bools_as_interval, bools_as_signs, AbstractState, AbstractValue, BoolSet, Interval, Lattice,
    SignSet,
};
use crate::analysis::literals;
use crate::il::{BinaryOperator, Condition, Program};
use crate::Error;
use std::collections::BTreeSet;

/// The integer values of a domain.
pub type DomainValue<D> = <<D as Domain>::Arithmetic as Arithmetic>::Value;

/// An abstract domain which handles every integer operation the interpreter
/// performs.
pub trait Domain {
    type Arithmetic: Arithmetic;

    fn arithmetic(&self) -> &Self::Arithmetic;

    /// A short name for this domain, for logs.
    fn name(&self) -> &'static str;

    /// View an abstract value as a value of this domain.
    ///
    /// # Errors
    /// `Error::IncompatibleValues` if the value is neither an integer of this
    /// domain nor a boolean.
    fn project(&self, value: &AbstractValue) -> Result<DomainValue<Self>, Error>;

    fn inject(&self, value: DomainValue<Self>) -> AbstractValue;

    /// The abstraction of a single integer.
    fn integer(&self, value: i64) -> AbstractValue;

    /// The abstraction of every integer.
    fn top(&self) -> AbstractValue;

    /// Cover the non-zero part of `value`, as parts which do not contain zero.
    fn nonzero_parts(&self, value: &DomainValue<Self>) -> Vec<DomainValue<Self>>;

    /// Merge a new state into the state previously stored at a program
    /// counter.
    fn merge(&self, old: &AbstractState, new: &AbstractState) -> Result<AbstractState, Error> {
        old.join(new)
    }

    fn binary(
        &self,
        operator: BinaryOperator,
        lhs: &AbstractValue,
        rhs: &AbstractValue,
    ) -> Result<AbstractValue, Error> {
        let lhs = self.project(lhs)?;
        let rhs = self.project(rhs)?;
        Ok(self.inject(self.arithmetic().binary(operator, &lhs, &rhs)?))
    }

    fn compare(
        &self,
        condition: Condition,
        lhs: &AbstractValue,
        rhs: &AbstractValue,
    ) -> Result<BoolSet, Error> {
        if let (AbstractValue::Bool(lhs), AbstractValue::Bool(rhs)) = (lhs, rhs) {
            return BoolArithmetic::new().compare(condition, lhs, rhs);
        }
        let lhs = self.project(lhs)?;
        let rhs = self.project(rhs)?;
        self.arithmetic().compare(condition, &lhs, &rhs)
    }

    fn negate(&self, value: &AbstractValue) -> Result<AbstractValue, Error> {
        let value = self.project(value)?;
        Ok(self.inject(self.arithmetic().negate(&value)?))
    }

    /// The non-empty parts of a divisor that exclude zero.
    fn nonzero_divisors(&self, value: &AbstractValue) -> Result<Vec<AbstractValue>, Error> {
        let value = self.project(value)?;
        Ok(self
            .nonzero_parts(&value)
            .into_iter()
            .filter(|part| !part.is_bottom())
            .map(|part| self.inject(part))
            .collect())
    }
}

fn incompatible(value: &AbstractValue, domain: &str) -> Error {
    Error::IncompatibleValues(value.to_string(), format!("the {} domain", domain))
}

/// Integers abstracted by their signs.
#[derive(Clone, Debug, Default)]
pub struct SignDomain {
    arithmetic: SignArithmetic,
}

impl SignDomain {
    pub fn new() -> SignDomain {
        SignDomain::default()
    }
}

impl Domain for SignDomain {
    type Arithmetic = SignArithmetic;

    fn arithmetic(&self) -> &SignArithmetic {
        &self.arithmetic
    }

    fn name(&self) -> &'static str {
        "sign"
    }

    fn project(&self, value: &AbstractValue) -> Result<SignSet, Error> {
        match *value {
            AbstractValue::Bot => Ok(SignSet::bottom()),
            AbstractValue::Sign(signs) => Ok(signs),
            AbstractValue::Bool(bools) => Ok(bools_as_signs(bools)),
            _ => Err(incompatible(value, self.name())),
        }
    }

    fn inject(&self, value: SignSet) -> AbstractValue {
        AbstractValue::Sign(value)
    }

    fn integer(&self, value: i64) -> AbstractValue {
        AbstractValue::Sign(SignSet::of(value))
    }

    fn top(&self) -> AbstractValue {
        AbstractValue::Sign(SignSet::top())
    }

    fn nonzero_parts(&self, value: &SignSet) -> Vec<SignSet> {
        vec![*value & !SignSet::ZERO]
    }
}

/// Integers abstracted by intervals, widened to a set of landmarks.
#[derive(Clone, Debug, Default)]
pub struct IntervalDomain {
    arithmetic: IntervalArithmetic,
    landmarks: BTreeSet<i64>,
}

impl IntervalDomain {
    /// Create an `IntervalDomain` which widens bounds to the given landmarks.
    pub fn new(landmarks: BTreeSet<i64>) -> IntervalDomain {
        IntervalDomain {
            arithmetic: IntervalArithmetic::new(),
            landmarks,
        }
    }

    /// Create an `IntervalDomain` whose landmarks are the integer literals of
    /// `program`.
    pub fn for_program(program: &Program) -> IntervalDomain {
        IntervalDomain::new(literals::interesting_values(program))
    }

    pub fn landmarks(&self) -> &BTreeSet<i64> {
        &self.landmarks
    }

    fn widen(&self, old: &AbstractValue, new: &AbstractValue) -> Result<AbstractValue, Error> {
        use self::AbstractValue as V;
        let widened = match (old, new) {
            (V::Interval(a), V::Interval(b)) => a.widen(b, &self.landmarks),
            (V::Interval(a), V::Bool(b)) => a.widen(&bools_as_interval(*b), &self.landmarks),
            (V::Bool(a), V::Interval(b)) => bools_as_interval(*a).widen(b, &self.landmarks),
            _ => return old.join(new),
        };
        Ok(V::Interval(widened))
    }
}

impl Domain for IntervalDomain {
    type Arithmetic = IntervalArithmetic;

    fn arithmetic(&self) -> &IntervalArithmetic {
        &self.arithmetic
    }

    fn name(&self) -> &'static str {
        "interval"
    }

    fn project(&self, value: &AbstractValue) -> Result<Interval, Error> {
        match *value {
            AbstractValue::Bot => Ok(Interval::bottom()),
            AbstractValue::Interval(ref interval) => Ok(interval.clone()),
            AbstractValue::Bool(bools) => Ok(bools_as_interval(bools)),
            _ => Err(incompatible(value, self.name())),
        }
    }

    fn inject(&self, value: Interval) -> AbstractValue {
        AbstractValue::Interval(value)
    }

    fn integer(&self, value: i64) -> AbstractValue {
        AbstractValue::Interval(Interval::constant(value))
    }

    fn top(&self) -> AbstractValue {
        AbstractValue::Interval(Interval::top())
    }

    fn nonzero_parts(&self, value: &Interval) -> Vec<Interval> {
        vec![value.negative_part(), value.positive_part()]
    }

    fn merge(&self, old: &AbstractState, new: &AbstractState) -> Result<AbstractState, Error> {
        old.combine(new, |a, b| self.widen(a, b))
    }
}
