use crate::analysis::ai::arithmetic::{unsupported_operator, Arithmetic};
use crate::analysis::ai::{BoolSet, SignSet};
use crate::il::{BinaryOperator, Condition};
use crate::Error;

const NEG: SignSet = SignSet::NEGATIVE;
const ZERO: SignSet = SignSet::ZERO;
const POS: SignSet = SignSet::POSITIVE;

/// Arithmetic over sets of signs, by case analysis on single signs.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignArithmetic;

impl SignArithmetic {
    pub fn new() -> SignArithmetic {
        SignArithmetic
    }

    /// Union of `f` over every pair of single signs.
    fn lift<T, F>(lhs: SignSet, rhs: SignSet, empty: T, f: F) -> T
    where
        T: std::ops::BitOr<Output = T> + Copy,
        F: Fn(SignSet, SignSet) -> T,
    {
        let mut result = empty;
        for a in lhs.signs() {
            for b in rhs.signs() {
                result = result | f(a, b);
            }
        }
        result
    }

    fn neg(sign: SignSet) -> SignSet {
        match sign {
            NEG => POS,
            POS => NEG,
            other => other,
        }
    }

    fn add(a: SignSet, b: SignSet) -> SignSet {
        match (a, b) {
            (ZERO, x) | (x, ZERO) => x,
            (POS, POS) => POS,
            (NEG, NEG) => NEG,
            _ => SignSet::all(),
        }
    }

    fn mul(a: SignSet, b: SignSet) -> SignSet {
        if a == ZERO || b == ZERO {
            ZERO
        } else if a == b {
            POS
        } else {
            NEG
        }
    }

    // Truncating division: the quotient is zero whenever |a| < |b|.
    fn div(a: SignSet, b: SignSet) -> SignSet {
        if a == ZERO {
            ZERO
        } else if a == b {
            POS | ZERO
        } else {
            NEG | ZERO
        }
    }

    // The remainder takes the sign of the dividend.
    fn rem(a: SignSet, _b: SignSet) -> SignSet {
        if a == ZERO {
            ZERO
        } else {
            a | ZERO
        }
    }

    fn lt(a: SignSet, b: SignSet) -> BoolSet {
        match (a, b) {
            (POS, POS) | (NEG, NEG) => BoolSet::all(),
            (POS, _) => BoolSet::FALSE,
            (ZERO, POS) => BoolSet::TRUE,
            (ZERO, _) => BoolSet::FALSE,
            _ => BoolSet::TRUE,
        }
    }

    fn eq(a: SignSet, b: SignSet) -> BoolSet {
        match (a, b) {
            (POS, POS) | (NEG, NEG) => BoolSet::all(),
            (ZERO, ZERO) => BoolSet::TRUE,
            _ => BoolSet::FALSE,
        }
    }

    fn compare_signs(condition: Condition, a: SignSet, b: SignSet) -> BoolSet {
        match condition {
            Condition::Eq => SignArithmetic::eq(a, b),
            Condition::Ne => SignArithmetic::eq(a, b).negated(),
            Condition::Lt => SignArithmetic::lt(a, b),
            Condition::Gt => SignArithmetic::lt(b, a),
            Condition::Le => SignArithmetic::lt(b, a).negated(),
            Condition::Ge => SignArithmetic::lt(a, b).negated(),
        }
    }
}

impl Arithmetic for SignArithmetic {
    type Value = SignSet;

    fn binary(
        &self,
        operator: BinaryOperator,
        lhs: &SignSet,
        rhs: &SignSet,
    ) -> Result<SignSet, Error> {
        if operator.is_division() && rhs.contains(ZERO) {
            return Err(Error::DivisionByZero);
        }
        let op: fn(SignSet, SignSet) -> SignSet = match operator {
            BinaryOperator::Add => SignArithmetic::add,
            BinaryOperator::Sub => |a, b| SignArithmetic::add(a, SignArithmetic::neg(b)),
            BinaryOperator::Mul => SignArithmetic::mul,
            BinaryOperator::Div => SignArithmetic::div,
            BinaryOperator::Rem => SignArithmetic::rem,
            _ => return Err(unsupported_operator(operator, "sign")),
        };
        Ok(SignArithmetic::lift(*lhs, *rhs, SignSet::empty(), op))
    }

    fn compare(&self, condition: Condition, lhs: &SignSet, rhs: &SignSet) -> Result<BoolSet, Error> {
        Ok(SignArithmetic::lift(*lhs, *rhs, BoolSet::empty(), |a, b| {
            SignArithmetic::compare_signs(condition, a, b)
        }))
    }

    fn negate(&self, value: &SignSet) -> Result<SignSet, Error> {
        Ok(value.signs().fold(SignSet::empty(), |signs, sign| {
            signs | SignArithmetic::neg(sign)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ai::arithmetic::soundness::*;
    use crate::analysis::ai::{Abstraction, Lattice};

    const UNIVERSE: [i64; 6] = [-9, -2, -1, 0, 1, 4];

    #[test]
    fn binary_is_sound() {
        let arithmetic = SignArithmetic::new();
        let subsets = subsets(&UNIVERSE);

        for x in &subsets {
            for y in &subsets {
                let ax = SignSet::abstract_set(x.clone());
                let ay = SignSet::abstract_set(y.clone());
                for &operator in OPERATORS.iter() {
                    if operator.is_division() && y.contains(&0) {
                        assert!(matches!(
                            arithmetic.binary(operator, &ax, &ay),
                            Err(Error::DivisionByZero)
                        ));
                        continue;
                    }
                    let result = arithmetic.binary(operator, &ax, &ay).unwrap();
                    let expected = SignSet::abstract_set(
                        x.iter()
                            .flat_map(|&a| y.iter().map(move |&b| concrete(operator, a, b))),
                    );
                    assert!(
                        expected.leq(&result),
                        "{} {} {} = {}, expected at least {}",
                        ax,
                        operator,
                        ay,
                        result,
                        expected
                    );
                }
            }
        }
    }

    #[test]
    fn compare_is_sound() {
        let arithmetic = SignArithmetic::new();
        let subsets = subsets(&UNIVERSE);

        for x in &subsets {
            for y in &subsets {
                let ax = SignSet::abstract_set(x.clone());
                let ay = SignSet::abstract_set(y.clone());
                for &condition in CONDITIONS.iter() {
                    let result = arithmetic.compare(condition, &ax, &ay).unwrap();
                    for &a in x {
                        for &b in y {
                            assert!(
                                Abstraction::contains(&result, &condition.holds(a, b)),
                                "{} {} {} = {}",
                                a,
                                condition,
                                b,
                                result
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn compare_is_exact_on_signs() {
        let arithmetic = SignArithmetic::new();
        let members = |sign: SignSet| {
            UNIVERSE
                .iter()
                .cloned()
                .filter(move |&v| SignSet::of(v) == sign)
        };

        for a in SignSet::all().signs() {
            for b in SignSet::all().signs() {
                for &condition in CONDITIONS.iter() {
                    let expected = members(a)
                        .flat_map(|x| members(b).map(move |y| condition.holds(x, y)))
                        .fold(BoolSet::empty(), |outcomes, outcome| {
                            outcomes | BoolSet::of(outcome)
                        });
                    assert_eq!(
                        arithmetic.compare(condition, &a, &b).unwrap(),
                        expected,
                        "{} {} {}",
                        a,
                        condition,
                        b
                    );
                }
            }
        }
    }

    #[test]
    fn division_table() {
        let arithmetic = SignArithmetic::new();
        let div = |a, b| arithmetic.binary(BinaryOperator::Div, &a, &b).unwrap();

        assert_eq!(div(POS, POS), POS | ZERO);
        assert_eq!(div(NEG, POS), NEG | ZERO);
        assert_eq!(div(ZERO, NEG), ZERO);
        assert_eq!(div(SignSet::bottom(), POS), SignSet::bottom());
        assert!(matches!(
            arithmetic.binary(BinaryOperator::Rem, &POS, &(POS | ZERO)),
            Err(Error::DivisionByZero)
        ));
    }

    #[test]
    fn comparisons_branch() {
        let arithmetic = SignArithmetic::new();

        assert_eq!(
            arithmetic.compare(Condition::Lt, &POS, &POS).unwrap(),
            BoolSet::all()
        );
        assert_eq!(
            arithmetic.compare(Condition::Ge, &ZERO, &NEG).unwrap(),
            BoolSet::TRUE
        );
        assert_eq!(
            arithmetic.compare(Condition::Ne, &ZERO, &ZERO).unwrap(),
            BoolSet::FALSE
        );
        assert_eq!(
            arithmetic.compare(Condition::Ge, &POS, &ZERO).unwrap(),
            BoolSet::TRUE
        );
        assert_eq!(
            arithmetic.compare(Condition::Le, &NEG, &ZERO).unwrap(),
            BoolSet::TRUE
        );
        assert_eq!(
            arithmetic.compare(Condition::Le, &(POS | ZERO), &ZERO).unwrap(),
            BoolSet::all()
        );
        assert_eq!(
            arithmetic.negate(&(POS | ZERO)).unwrap(),
            NEG | ZERO
        );
        assert!(arithmetic
            .binary(BinaryOperator::Shl, &POS, &POS)
            .unwrap_err()
            .is_unsupported());
    }
}
