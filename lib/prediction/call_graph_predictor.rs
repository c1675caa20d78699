use crate::analysis::build_call_graph;
use crate::il::{MethodSignature, Program};
use crate::prediction::TestPredictor;
use crate::Error;
use std::collections::BTreeSet;

/// Predicts every test which reaches a changed or removed method.
///
/// Reachability follows the static calls of the old program. A method
/// reached from a test is compared with the method of the same signature in
/// the new program. Once a changed method is found, its callees are not
/// visited on its account: the test is predicted already.
///
/// Tests with no counterpart in the old program are always predicted.
#[derive(Clone, Copy, Debug, Default)]
pub struct CallGraphPredictor;

impl CallGraphPredictor {
    pub fn new() -> CallGraphPredictor {
        CallGraphPredictor
    }
}

impl TestPredictor for CallGraphPredictor {
    fn name(&self) -> &str {
        "callgraph"
    }

    fn predict(&self, old: &Program, new: &Program) -> Result<BTreeSet<MethodSignature>, Error> {
        let call_graph = build_call_graph(old)?;
        let mut predictions = BTreeSet::new();

        for (_, test) in new.all_test_methods() {
            let test = test.signature();
            if !call_graph.contains(test) {
                debug!("{} is a new test", test);
                predictions.insert(test.clone());
                continue;
            }

            let mut affected = false;
            call_graph.bfs_walk(test, |_, current| {
                let same = match (old.method(current), new.method(current)) {
                    (Ok(old_method), Ok(new_method)) => old_method.same_bytecode(new_method),
                    _ => false,
                };
                if !same {
                    debug!("{} reaches {}, which changed", test, current);
                    affected = true;
                }
                same
            })?;

            if affected {
                predictions.insert(test.clone());
            }
        }

        info!(
            "{} predicted {} tests",
            self.name(),
            predictions.len()
        );

        Ok(predictions)
    }
}
