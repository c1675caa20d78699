use crate::analysis::ai::arithmetic::{unsupported_operator, Arithmetic};
use crate::analysis::ai::{BoolSet, Bound, Interval, Lattice};
use crate::il::{BinaryOperator, Condition};
use crate::Error;

/// Arithmetic over intervals of unbounded integers.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntervalArithmetic;

impl IntervalArithmetic {
    pub fn new() -> IntervalArithmetic {
        IntervalArithmetic
    }

    fn add(lhs: &Interval, rhs: &Interval) -> Interval {
        Interval::new(lhs.lb().add(rhs.lb()), lhs.ub().add(rhs.ub()))
    }

    fn neg(value: &Interval) -> Interval {
        if value.is_bottom() {
            return Interval::bottom();
        }
        Interval::new(value.ub().neg(), value.lb().neg())
    }

    /// The hull of `f` applied to the four corners of `lhs` and `rhs`.
    fn corners<F>(lhs: &Interval, rhs: &Interval, f: F) -> Interval
    where
        F: Fn(&Bound, &Bound) -> Bound,
    {
        let corners = [
            f(lhs.lb(), rhs.lb()),
            f(lhs.lb(), rhs.ub()),
            f(lhs.ub(), rhs.lb()),
            f(lhs.ub(), rhs.ub()),
        ];
        let lb = corners.iter().min().cloned().unwrap_or(Bound::PosInf);
        let ub = corners.iter().max().cloned().unwrap_or(Bound::NegInf);
        Interval::new(lb, ub)
    }

    fn lt(lhs: &Interval, rhs: &Interval) -> BoolSet {
        let mut outcomes = BoolSet::empty();
        if lhs.lb() < rhs.ub() {
            outcomes |= BoolSet::TRUE;
        }
        if lhs.ub() >= rhs.lb() {
            outcomes |= BoolSet::FALSE;
        }
        outcomes
    }

    fn le(lhs: &Interval, rhs: &Interval) -> BoolSet {
        let mut outcomes = BoolSet::empty();
        if lhs.lb() <= rhs.ub() {
            outcomes |= BoolSet::TRUE;
        }
        if lhs.ub() > rhs.lb() {
            outcomes |= BoolSet::FALSE;
        }
        outcomes
    }

    fn eq(lhs: &Interval, rhs: &Interval) -> BoolSet {
        let mut outcomes = BoolSet::empty();
        if !lhs.meet(rhs).is_bottom() {
            outcomes |= BoolSet::TRUE;
        }
        match (lhs.as_constant(), rhs.as_constant()) {
            (Some(a), Some(b)) if a == b => {}
            _ => outcomes |= BoolSet::FALSE,
        }
        outcomes
    }
}

impl Arithmetic for IntervalArithmetic {
    type Value = Interval;

    fn binary(
        &self,
        operator: BinaryOperator,
        lhs: &Interval,
        rhs: &Interval,
    ) -> Result<Interval, Error> {
        if operator.is_division() && rhs.contains_zero() {
            return Err(Error::DivisionByZero);
        }
        if lhs.is_bottom() || rhs.is_bottom() {
            return Ok(Interval::bottom());
        }
        Ok(match operator {
            BinaryOperator::Add => IntervalArithmetic::add(lhs, rhs),
            BinaryOperator::Sub => IntervalArithmetic::add(lhs, &IntervalArithmetic::neg(rhs)),
            BinaryOperator::Mul => IntervalArithmetic::corners(lhs, rhs, Bound::mul),
            BinaryOperator::Div => IntervalArithmetic::corners(lhs, rhs, Bound::div),
            BinaryOperator::Rem => lhs.rem(rhs),
            _ => return Err(unsupported_operator(operator, "interval")),
        })
    }

    fn compare(
        &self,
        condition: Condition,
        lhs: &Interval,
        rhs: &Interval,
    ) -> Result<BoolSet, Error> {
        if lhs.is_bottom() || rhs.is_bottom() {
            return Ok(BoolSet::empty());
        }
        Ok(match condition {
            Condition::Eq => IntervalArithmetic::eq(lhs, rhs),
            Condition::Ne => IntervalArithmetic::eq(lhs, rhs).negated(),
            Condition::Lt => IntervalArithmetic::lt(lhs, rhs),
            Condition::Le => IntervalArithmetic::le(lhs, rhs),
            Condition::Gt => IntervalArithmetic::lt(rhs, lhs),
            Condition::Ge => IntervalArithmetic::le(rhs, lhs),
        })
    }

    fn negate(&self, value: &Interval) -> Result<Interval, Error> {
        Ok(IntervalArithmetic::neg(value))
    }
}
