//! Predict the tests a change may affect.
//!
//! A `TestPredictor` compares an old and a new snapshot of a program and
//! returns the test methods of the new snapshot whose behaviour may differ
//! between them. Predictions are sound but not minimal: a test which is not
//! predicted is not affected, while a predicted test may not be.

mod abstract_predictor;
mod call_graph_predictor;

pub use self::abstract_predictor::AbstractPredictor;
pub use self::call_graph_predictor::CallGraphPredictor;

use crate::il::{MethodSignature, Program};
use crate::Error;
use std::collections::BTreeSet;

pub trait TestPredictor {
    /// A short name for this predictor, for logs.
    fn name(&self) -> &str;

    /// The tests of `new` which may behave differently than in `old`.
    fn predict(&self, old: &Program, new: &Program) -> Result<BTreeSet<MethodSignature>, Error>;
}
