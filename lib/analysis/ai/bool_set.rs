//! Sets of booleans, the results of abstract comparisons.

use crate::analysis::ai::{Abstraction, Lattice};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// A set of booleans. The empty set is bottom.
    #[derive(Default, Deserialize, Serialize)]
    pub struct BoolSet: u8 {
        const FALSE = 0b01;
        const TRUE  = 0b10;
    }
}

impl BoolSet {
    pub fn of(value: bool) -> BoolSet {
        if value {
            BoolSet::TRUE
        } else {
            BoolSet::FALSE
        }
    }

    /// The booleans in this set, `false` first.
    pub fn values(self) -> impl Iterator<Item = bool> {
        [false, true]
            .into_iter()
            .filter(move |&value| self.contains(BoolSet::of(value)))
    }

    /// Swap `true` and `false`.
    pub fn negated(self) -> BoolSet {
        self.values().map(|value| BoolSet::of(!value)).collect()
    }
}

impl Lattice for BoolSet {
    fn bottom() -> BoolSet {
        BoolSet::empty()
    }

    fn leq(&self, other: &BoolSet) -> bool {
        other.contains(*self)
    }

    fn join(&self, other: &BoolSet) -> BoolSet {
        *self | *other
    }

    fn meet(&self, other: &BoolSet) -> BoolSet {
        *self & *other
    }
}

impl Abstraction<bool> for BoolSet {
    fn abstract_set<I>(values: I) -> BoolSet
    where
        I: IntoIterator<Item = bool>,
    {
        values.into_iter().map(BoolSet::of).collect()
    }

    fn contains(&self, value: &bool) -> bool {
        BoolSet::contains(self, BoolSet::of(*value))
    }
}

impl fmt::Display for BoolSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let values = self.values().map(|v| v.to_string()).collect::<Vec<String>>();
        write!(f, "{{{}}}", values.join(","))
    }
}
