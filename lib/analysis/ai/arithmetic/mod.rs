//! Abstract arithmetic, one strategy per domain.
//!
//! An `Arithmetic` lifts the JVM's integer operators and comparisons to a
//! domain of abstract values. Every strategy is sound: the abstraction of the
//! concrete results is below the abstract result, and every concrete
//! comparison outcome is in the abstract outcome set.

mod boolean;
mod interval;
mod sign;

pub use self::boolean::BoolArithmetic;
pub use self::interval::IntervalArithmetic;
pub use self::sign::SignArithmetic;

use crate::analysis::ai::{BoolSet, Lattice};
use crate::il::{BinaryOperator, Condition};
use crate::Error;
use std::fmt::Debug;

pub trait Arithmetic {
    type Value: Lattice + Debug;

    /// Apply a binary operator.
    ///
    /// # Errors
    /// `Error::DivisionByZero` if the operator is `div` or `rem` and the
    /// divisor may be zero, and `Error::Unsupported` for operators the
    /// domain does not model.
    fn binary(
        &self,
        operator: BinaryOperator,
        lhs: &Self::Value,
        rhs: &Self::Value,
    ) -> Result<Self::Value, Error>;

    /// The set of outcomes of comparing `lhs` with `rhs`.
    fn compare(
        &self,
        condition: Condition,
        lhs: &Self::Value,
        rhs: &Self::Value,
    ) -> Result<BoolSet, Error>;

    fn negate(&self, value: &Self::Value) -> Result<Self::Value, Error>;
}

pub(crate) fn unsupported_operator(operator: BinaryOperator, domain: &str) -> Error {
    Error::unsupported(
        format!("binary {}", operator),
        format!("the {} domain has no {} operator", domain, operator),
    )
}

/// Helpers for checking arithmetic against concrete evaluation.
#[cfg(test)]
pub(crate) mod soundness {
    use crate::il::{BinaryOperator, Condition};

    /// Every subset of a small universe of integers.
    pub fn subsets(universe: &[i64]) -> Vec<Vec<i64>> {
        (0..(1u32 << universe.len()))
            .map(|mask| {
                universe
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, &v)| v)
                    .collect()
            })
            .collect()
    }

    /// Evaluate an operator the way the JVM does on unbounded integers.
    pub fn concrete(operator: BinaryOperator, x: i64, y: i64) -> i64 {
        match operator {
            BinaryOperator::Add => x + y,
            BinaryOperator::Sub => x - y,
            BinaryOperator::Mul => x * y,
            BinaryOperator::Div => x / y,
            BinaryOperator::Rem => x % y,
            _ => panic!("no concrete semantics for {}", operator),
        }
    }

    pub const OPERATORS: [BinaryOperator; 5] = [
        BinaryOperator::Add,
        BinaryOperator::Sub,
        BinaryOperator::Mul,
        BinaryOperator::Div,
        BinaryOperator::Rem,
    ];

    pub const CONDITIONS: [Condition; 6] = [
        Condition::Eq,
        Condition::Ne,
        Condition::Lt,
        Condition::Le,
        Condition::Gt,
        Condition::Ge,
    ];
}
