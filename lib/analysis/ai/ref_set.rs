//! Sets of class names, for the references the interpreter models.

use crate::analysis::ai::{Abstraction, Lattice};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A set of classes an abstract reference may be an instance of.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct RefSet {
    classes: BTreeSet<String>,
}

impl RefSet {
    /// A reference to an instance of `class`.
    pub fn of<S: Into<String>>(class: S) -> RefSet {
        RefSet {
            classes: vec![class.into()].into_iter().collect(),
        }
    }

    pub fn classes(&self) -> &BTreeSet<String> {
        &self.classes
    }
}

impl Lattice for RefSet {
    fn bottom() -> RefSet {
        RefSet::default()
    }

    fn leq(&self, other: &RefSet) -> bool {
        self.classes.is_subset(&other.classes)
    }

    fn join(&self, other: &RefSet) -> RefSet {
        RefSet {
            classes: self.classes.union(&other.classes).cloned().collect(),
        }
    }

    fn meet(&self, other: &RefSet) -> RefSet {
        RefSet {
            classes: self.classes.intersection(&other.classes).cloned().collect(),
        }
    }
}

impl Abstraction<String> for RefSet {
    fn abstract_set<I>(values: I) -> RefSet
    where
        I: IntoIterator<Item = String>,
    {
        RefSet {
            classes: values.into_iter().collect(),
        }
    }

    fn contains(&self, value: &String) -> bool {
        self.classes.contains(value)
    }
}

impl fmt::Display for RefSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let classes = self.classes.iter().cloned().collect::<Vec<String>>();
        write!(f, "{{{}}}", classes.join(","))
    }
}

#[test]
fn ref_set_lattice_laws() {
    crate::analysis::ai::lattice::check_lattice_laws(&[
        RefSet::bottom(),
        RefSet::of("java/lang/AssertionError"),
        RefSet::of("java/lang/ArithmeticException"),
        RefSet::of("java/lang/AssertionError").join(&RefSet::of("java/lang/ArithmeticException")),
    ]);
}
