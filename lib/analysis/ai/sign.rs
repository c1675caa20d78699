//! The sign domain: sets of the signs `-`, `0` and `+`.

use crate::analysis::ai::{Abstraction, Lattice};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// A set of signs. The empty set is bottom, the full set is top.
    #[derive(Default, Deserialize, Serialize)]
    pub struct SignSet: u8 {
        const NEGATIVE = 0b001;
        const ZERO     = 0b010;
        const POSITIVE = 0b100;
    }
}

impl SignSet {
    pub fn top() -> SignSet {
        SignSet::all()
    }

    /// The sign of a single value.
    pub fn of(value: i64) -> SignSet {
        match value {
            v if v < 0 => SignSet::NEGATIVE,
            0 => SignSet::ZERO,
            _ => SignSet::POSITIVE,
        }
    }

    /// The single signs in this set, in the order `-`, `0`, `+`.
    pub fn signs(self) -> impl Iterator<Item = SignSet> {
        [SignSet::NEGATIVE, SignSet::ZERO, SignSet::POSITIVE]
            .into_iter()
            .filter(move |sign| self.contains(*sign))
    }
}

impl Lattice for SignSet {
    fn bottom() -> SignSet {
        SignSet::empty()
    }

    fn leq(&self, other: &SignSet) -> bool {
        other.contains(*self)
    }

    fn join(&self, other: &SignSet) -> SignSet {
        *self | *other
    }

    fn meet(&self, other: &SignSet) -> SignSet {
        *self & *other
    }
}

impl Abstraction<i64> for SignSet {
    fn abstract_set<I>(values: I) -> SignSet
    where
        I: IntoIterator<Item = i64>,
    {
        values
            .into_iter()
            .fold(SignSet::empty(), |signs, value| signs | SignSet::of(value))
    }

    fn contains(&self, value: &i64) -> bool {
        SignSet::contains(self, SignSet::of(*value))
    }
}

impl fmt::Display for SignSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let signs = self
            .signs()
            .map(|sign| match sign {
                SignSet::NEGATIVE => "-",
                SignSet::ZERO => "0",
                _ => "+",
            })
            .collect::<Vec<&str>>();
        write!(f, "{{{}}}", signs.join(","))
    }
}
