use crate::analysis::ai::arithmetic::{unsupported_operator, Arithmetic};
use crate::analysis::ai::BoolSet;
use crate::il::{BinaryOperator, Condition};
use crate::Error;

/// Comparisons of boolean sets, with `false` as `0` and `true` as `1`.
///
/// Booleans only meet arithmetic once they are converted into an integer
/// domain, so every operator other than a comparison is unsupported here.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoolArithmetic;

impl BoolArithmetic {
    pub fn new() -> BoolArithmetic {
        BoolArithmetic
    }
}

impl Arithmetic for BoolArithmetic {
    type Value = BoolSet;

    fn binary(
        &self,
        operator: BinaryOperator,
        _lhs: &BoolSet,
        _rhs: &BoolSet,
    ) -> Result<BoolSet, Error> {
        Err(unsupported_operator(operator, "boolean"))
    }

    fn compare(&self, condition: Condition, lhs: &BoolSet, rhs: &BoolSet) -> Result<BoolSet, Error> {
        let mut outcomes = BoolSet::empty();
        for a in lhs.values() {
            for b in rhs.values() {
                outcomes |= BoolSet::of(condition.holds(a as i64, b as i64));
            }
        }
        Ok(outcomes)
    }

    fn negate(&self, value: &BoolSet) -> Result<BoolSet, Error> {
        Err(Error::unsupported(
            "negate",
            format!("cannot negate the boolean set {}", value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ai::arithmetic::soundness::CONDITIONS;

    #[test]
    fn compare_is_exact() {
        let arithmetic = BoolArithmetic::new();

        assert_eq!(
            arithmetic
                .compare(Condition::Eq, &BoolSet::FALSE, &BoolSet::FALSE)
                .unwrap(),
            BoolSet::TRUE
        );
        assert_eq!(
            arithmetic
                .compare(Condition::Ne, &BoolSet::all(), &BoolSet::FALSE)
                .unwrap(),
            BoolSet::all()
        );
        assert_eq!(
            arithmetic
                .compare(Condition::Gt, &BoolSet::TRUE, &BoolSet::FALSE)
                .unwrap(),
            BoolSet::TRUE
        );

        for &condition in CONDITIONS.iter() {
            assert_eq!(
                arithmetic
                    .compare(condition, &BoolSet::empty(), &BoolSet::all())
                    .unwrap(),
                BoolSet::empty()
            );
        }
    }

    #[test]
    fn arithmetic_is_unsupported() {
        let arithmetic = BoolArithmetic::new();

        assert!(arithmetic
            .binary(BinaryOperator::Add, &BoolSet::TRUE, &BoolSet::TRUE)
            .unwrap_err()
            .is_unsupported());
        assert!(arithmetic.negate(&BoolSet::TRUE).unwrap_err().is_unsupported());
    }
}
