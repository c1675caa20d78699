use crate::analysis::ai::{AbstractState, Domain, IntervalDomain, Interpreter, SignDomain};
use crate::analysis::{build_call_graph, changed_offsets};
use crate::il::{MethodSignature, Program, ProgramCounter};
use crate::prediction::TestPredictor;
use crate::{Error, RuntimeError};
use std::collections::{BTreeMap, BTreeSet};

/// Changed offsets of the new program, by method.
type Changes = BTreeMap<MethodSignature, BTreeSet<usize>>;

/// Refines call graph prediction with abstract interpretation.
///
/// A test is a candidate when, in the call graph of the new program, it
/// reaches a method whose bytecode changed. Methods which do not exist in the
/// old program changed at every offset. Each candidate is then interpreted in
/// the domain `D`, and it is predicted if
///
/// * the analysis reaches a changed offset, or
/// * the analysis finds a runtime error which the analysis of the same test
///   in the old program did not find.
///
/// A candidate the interpreter can not analyse is predicted.
pub struct AbstractPredictor<D: Domain> {
    name: &'static str,
    domain: fn(&Program) -> D,
}

impl AbstractPredictor<SignDomain> {
    /// Refine predictions in the sign domain.
    pub fn sign() -> AbstractPredictor<SignDomain> {
        AbstractPredictor::new("sign", |_| SignDomain::new())
    }
}

impl AbstractPredictor<IntervalDomain> {
    /// Refine predictions in the interval domain, widening to the integer
    /// literals of the analysed program.
    pub fn interval() -> AbstractPredictor<IntervalDomain> {
        AbstractPredictor::new("interval", IntervalDomain::for_program)
    }
}

impl<D: Domain> AbstractPredictor<D> {
    /// Create a predictor which analyses each program in the domain `domain`
    /// builds for it.
    pub fn new(name: &'static str, domain: fn(&Program) -> D) -> AbstractPredictor<D> {
        AbstractPredictor { name, domain }
    }

    /// Candidate tests, and the changes of every method they reach.
    fn candidates(
        &self,
        old: &Program,
        new: &Program,
    ) -> Result<(BTreeSet<MethodSignature>, Changes), Error> {
        let call_graph = build_call_graph(new)?;
        let mut candidates = BTreeSet::new();
        let mut changes = Changes::new();

        for (_, test) in new.all_test_methods() {
            call_graph.bfs_walk(test.signature(), |start, current| {
                let new_method = match new.method(current) {
                    Ok(method) => method,
                    Err(_) => return false,
                };
                let offsets = match old.method(current) {
                    Ok(old_method) => changed_offsets(old_method.bytecode(), new_method.bytecode()),
                    Err(_) => (0..new_method.bytecode().len()).collect(),
                };
                if !offsets.is_empty() {
                    trace!("{} reaches {}, changed at {:?}", start, current, offsets);
                    candidates.insert(start.clone());
                    changes.entry(current.clone()).or_default().extend(offsets);
                }
                true
            })?;
        }

        Ok((candidates, changes))
    }

    /// Runtime errors the analysis of `test` finds, and the offsets it
    /// reaches.
    fn analyse(
        &self,
        program: &Program,
        test: &MethodSignature,
    ) -> Result<
        (
            BTreeMap<MethodSignature, BTreeSet<usize>>,
            BTreeSet<RuntimeError>,
        ),
        Error,
    > {
        let mut interpreter = Interpreter::new(program, (self.domain)(program));
        let touched = interpreter.analyse(ProgramCounter::entry(test.clone()), AbstractState::new())?;
        Ok((touched, interpreter.errors().clone()))
    }

    fn affected(
        &self,
        old: &Program,
        new: &Program,
        test: &MethodSignature,
        changes: &Changes,
    ) -> Result<bool, Error> {
        let (touched, errors) = self.analyse(new, test)?;

        for (method, offsets) in &touched {
            if let Some(changed) = changes.get(method) {
                if !offsets.is_disjoint(changed) {
                    debug!("{} executes changed instructions of {}", test, method);
                    return Ok(true);
                }
            }
        }

        if errors.is_empty() {
            return Ok(false);
        }

        let previous = if old.contains_method(test) {
            match self.analyse(old, test) {
                Ok((_, errors)) => errors,
                Err(error) => {
                    debug!("{} can not be analysed in the old program: {}", test, error);
                    BTreeSet::new()
                }
            }
        } else {
            BTreeSet::new()
        };

        let introduced = errors.difference(&previous).collect::<Vec<&RuntimeError>>();
        if introduced.is_empty() {
            return Ok(false);
        }
        for error in introduced {
            debug!("{} may now fail with {}", test, error);
        }
        Ok(true)
    }
}

impl<D: Domain> TestPredictor for AbstractPredictor<D> {
    fn name(&self) -> &str {
        self.name
    }

    fn predict(&self, old: &Program, new: &Program) -> Result<BTreeSet<MethodSignature>, Error> {
        let (candidates, changes) = self.candidates(old, new)?;
        debug!(
            "{} candidate tests, {} changed methods",
            candidates.len(),
            changes.len()
        );

        let mut predictions = BTreeSet::new();
        for test in candidates {
            match self.affected(old, new, &test, &changes) {
                Ok(true) => {
                    predictions.insert(test);
                }
                Ok(false) => debug!("{} is not affected", test),
                Err(error) => {
                    warn!("can not analyse {}, predicting it: {}", test, error);
                    predictions.insert(test);
                }
            }
        }

        info!("{} predicted {} tests", self.name, predictions.len());

        Ok(predictions)
    }
}
