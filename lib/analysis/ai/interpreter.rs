//! A worklist fixed point interpreter over abstract domains.
//!
//! The interpreter executes JVM bytecode over abstract values, starting at
//! one program counter. Every program counter reached holds one abstract
//! state, the join (or widening) of every state which flowed into it, and the
//! interpreter runs until none of those states changes anymore.
//!
//! Calls are analysed without a native call stack. A static invoke starts the
//! callee in a fresh state whose `Frame` remembers the call site's
//! continuation, and a return resumes every continuation in its frame. States
//! of a method reached from several call sites are merged, so the analysis is
//! context-insensitive.

use crate::analysis::ai::domain::Domain;
use crate::analysis::ai::{
    AbstractState, AbstractValue, BoolSet, NullObserver, Observer, RefSet, Status,
};
use crate::il::*;
use crate::{Error, RuntimeError};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeMap, BTreeSet};

/// The exception classes `new` may allocate.
pub const MODELED_EXCEPTIONS: [&str; 2] =
    ["java/lang/AssertionError", "java/lang/ArithmeticException"];

/// The synthetic field `javac` reads to decide whether to check assertions.
pub const ASSERTIONS_DISABLED: &str = "$assertionsDisabled";

const STRING_CLASS: &str = "java/lang/String";

/// What flows along an edge out of an instruction.
#[derive(Clone, Debug)]
enum Action {
    /// Continue with this state.
    Next(AbstractState),
    /// Return to a call site's continuation. The caller's state is rebuilt
    /// from the state at the call site, whose top `parameters` values are the
    /// arguments.
    Return {
        value: Option<AbstractValue>,
        parameters: usize,
    },
}

/// An abstract interpreter for a program, over the domain `D`.
pub struct Interpreter<'p, D: Domain, O: Observer = NullObserver> {
    program: &'p Program,
    domain: D,
    observer: O,
    states: FxHashMap<ProgramCounter, AbstractState>,
    worklist: Vec<ProgramCounter>,
    errors: BTreeSet<RuntimeError>,
    terminal_states: Vec<(ProgramCounter, AbstractState)>,
    halted: FxHashSet<(ProgramCounter, AbstractState)>,
    generated: usize,
    // The join of every value each method returned. Void methods which
    // returned map to `Bot`.
    summaries: FxHashMap<MethodSignature, AbstractValue>,
}

impl<'p, D: Domain> Interpreter<'p, D, NullObserver> {
    pub fn new(program: &'p Program, domain: D) -> Interpreter<'p, D, NullObserver> {
        Interpreter::with_observer(program, domain, NullObserver)
    }
}

impl<'p, D: Domain, O: Observer> Interpreter<'p, D, O> {
    /// Create a new `Interpreter` which reports its progress to `observer`.
    pub fn with_observer(program: &'p Program, domain: D, observer: O) -> Interpreter<'p, D, O> {
        Interpreter {
            program,
            domain,
            observer,
            states: FxHashMap::default(),
            worklist: Vec::new(),
            errors: BTreeSet::new(),
            terminal_states: Vec::new(),
            halted: FxHashSet::default(),
            generated: 0,
            summaries: FxHashMap::default(),
        }
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Every runtime error the last analysis found reachable.
    pub fn errors(&self) -> &BTreeSet<RuntimeError> {
        &self.errors
    }

    /// The states in which execution paths of the last analysis ended, with
    /// the program counter they ended at.
    pub fn terminal_states(&self) -> &[(ProgramCounter, AbstractState)] {
        &self.terminal_states
    }

    /// The number of states the last analysis generated.
    pub fn generated(&self) -> usize {
        self.generated
    }

    /// The fixed point state at `pc` after the last analysis.
    pub fn state(&self, pc: &ProgramCounter) -> Option<&AbstractState> {
        self.states.get(pc)
    }

    /// Run the analysis to a fixed point from `pc`, in `initial`.
    ///
    /// Returns the offsets of every instruction reached, by method.
    ///
    /// # Errors
    /// `Error::Unsupported` for instructions the interpreter does not model,
    /// `Error::MethodNotFound` for calls to methods outside of the program,
    /// and `Error::StateShapeMismatch` or `Error::IncompatibleValues` for
    /// states which can not be merged.
    pub fn analyse(
        &mut self,
        pc: ProgramCounter,
        initial: AbstractState,
    ) -> Result<BTreeMap<MethodSignature, BTreeSet<usize>>, Error> {
        self.states.clear();
        self.worklist.clear();
        self.errors.clear();
        self.terminal_states.clear();
        self.halted.clear();
        self.summaries.clear();
        self.generated = 0;

        debug!("analysing {} in the {} domain", pc, self.domain.name());

        self.observer.state_changed(&pc, &initial);
        self.states.insert(pc.clone(), initial);
        self.worklist.push(pc);

        while let Some(pc) = self.worklist.pop() {
            let state = match self.states.get(&pc) {
                Some(state) => state.clone(),
                None => continue,
            };

            for (successor, action) in self.step(&pc, state)? {
                let state = match action {
                    Action::Next(state) => state,
                    Action::Return { value, parameters } => {
                        match self.resume_caller(&successor, value, parameters)? {
                            Some(state) => state,
                            None => continue,
                        }
                    }
                };
                self.generated += 1;
                self.merge(successor, state)?;
            }
        }

        debug!(
            "{} states generated, {} program counters reached, {} errors",
            self.generated,
            self.states.len(),
            self.errors.len()
        );

        let mut touched: BTreeMap<MethodSignature, BTreeSet<usize>> = BTreeMap::new();
        for pc in self.states.keys() {
            touched
                .entry(pc.signature().clone())
                .or_default()
                .insert(pc.offset());
        }
        Ok(touched)
    }

    /// Merge `state` into the fixed point at `pc`, and queue `pc` if its
    /// state changed.
    fn merge(&mut self, pc: ProgramCounter, state: AbstractState) -> Result<(), Error> {
        let merged = match self.states.get(&pc) {
            Some(old) => {
                let merged = self.domain.merge(old, &state)?;
                if merged == *old {
                    return Ok(());
                }
                merged
            }
            None => state,
        };
        self.observer.state_changed(&pc, &merged);
        self.states.insert(pc.clone(), merged);
        self.worklist.push(pc);
        Ok(())
    }

    /// The caller's state at `continuation`, once the callee returned `value`.
    fn resume_caller(
        &self,
        continuation: &ProgramCounter,
        value: Option<AbstractValue>,
        parameters: usize,
    ) -> Result<Option<AbstractState>, Error> {
        let call_site = match continuation.prev() {
            Some(call_site) => call_site,
            None => return Ok(None),
        };
        let mut caller = match self.states.get(&call_site) {
            Some(caller) => caller.clone(),
            None => return Ok(None),
        };
        caller.pop_n(parameters)?;
        if let Some(value) = value {
            caller.push(value);
        }
        Ok(Some(caller))
    }

    fn fault(&mut self, pc: &ProgramCounter, error: RuntimeError) {
        self.observer.fault(pc, &error);
        self.errors.insert(error);
    }

    fn halt(&mut self, pc: &ProgramCounter, state: AbstractState, status: Status) {
        let state = state.halt(status);
        self.observer.halted(pc, &state);
        let terminal = (pc.clone(), state);
        if self.halted.insert(terminal.clone()) {
            self.terminal_states.push(terminal);
        }
    }

    /// Successors for each outcome of a comparison.
    fn branch(
        pc: &ProgramCounter,
        target: usize,
        outcomes: BoolSet,
        state: AbstractState,
    ) -> Vec<(ProgramCounter, Action)> {
        outcomes
            .values()
            .map(|outcome| {
                let successor = if outcome { pc.jump(target) } else { pc.next() };
                (successor, Action::Next(state.clone()))
            })
            .collect()
    }

    fn step(
        &mut self,
        pc: &ProgramCounter,
        mut state: AbstractState,
    ) -> Result<Vec<(ProgramCounter, Action)>, Error> {
        let program = self.program;
        let instruction = program.instruction(pc)?;
        let next = pc.next();

        let successors = match *instruction {
            Instruction::Goto { target, .. } => vec![(pc.jump(target), Action::Next(state))],

            Instruction::Binary { operator, .. } => {
                let rhs = state.pop()?;
                let lhs = state.pop()?;
                match self.domain.binary(operator, &lhs, &rhs) {
                    Ok(result) => {
                        state.push(result);
                        vec![(next, Action::Next(state))]
                    }
                    Err(Error::DivisionByZero) => {
                        self.fault(pc, RuntimeError::DivisionByZero);
                        self.halt(pc, state.clone(), Status::DivisionByZero);
                        let mut successors = Vec::new();
                        for divisor in self.domain.nonzero_divisors(&rhs)? {
                            let mut state = state.clone();
                            state.push(self.domain.binary(operator, &lhs, &divisor)?);
                            successors.push((next.clone(), Action::Next(state)));
                        }
                        successors
                    }
                    Err(error) => return Err(error),
                }
            }

            Instruction::Load { index, .. } => {
                let value = state.local(index);
                state.push(value);
                vec![(next, Action::Next(state))]
            }

            Instruction::Store { index, .. } => {
                let value = state.pop()?;
                state.set_local(index, value);
                vec![(next, Action::Next(state))]
            }

            Instruction::Throw { .. } => {
                let thrown = match state.pop()? {
                    AbstractValue::Ref(refs) => refs,
                    AbstractValue::Bot => RefSet::default(),
                    value => {
                        return Err(Error::unsupported(
                            instruction,
                            format!("cannot throw {}", value),
                        ))
                    }
                };
                for class in thrown.classes() {
                    self.fault(pc, RuntimeError::Exception(class.clone()));
                }
                self.halt(pc, state, Status::Threw(thrown));
                Vec::new()
            }

            Instruction::Invoke {
                access, ref method, ..
            } => {
                let callee = MethodSignature::from_reference(method);
                let parameters = callee.parameters().len();
                match access {
                    InvokeAccess::Static => {
                        program.method(&callee)?;
                        let arguments = state.pop_n(parameters)?;

                        let mut entry = AbstractState::called_from(next.clone());
                        for (index, argument) in arguments.into_iter().enumerate() {
                            entry.set_local(index, argument);
                        }

                        let mut successors =
                            vec![(ProgramCounter::entry(callee.clone()), Action::Next(entry))];
                        if let Some(summary) = self.summaries.get(&callee) {
                            if !callee.is_void() {
                                state.push(summary.clone());
                            }
                            successors.push((next, Action::Next(state)));
                        }
                        successors
                    }
                    // Constructors and private methods. Their receiver is popped
                    // along with the arguments, and object state is not modeled.
                    InvokeAccess::Special => {
                        state.pop_n(parameters + 1)?;
                        if !callee.is_void() {
                            return Err(Error::unsupported(
                                instruction,
                                "special invokes returning a value are not modeled",
                            ));
                        }
                        vec![(next, Action::Next(state))]
                    }
                    _ => {
                        return Err(Error::unsupported(
                            instruction,
                            format!("{} invokes are not modeled", access),
                        ))
                    }
                }
            }

            Instruction::Negate { .. } => {
                let value = state.pop()?;
                state.push(self.domain.negate(&value)?);
                vec![(next, Action::Next(state))]
            }

            Instruction::Dup { words, .. } => {
                let top = state.peek_n(words)?.to_vec();
                for value in top {
                    state.push(value);
                }
                vec![(next, Action::Next(state))]
            }

            Instruction::Push { ref value, .. } => {
                let value = match *value {
                    Some(Literal::Integer(value)) => self.domain.integer(value),
                    Some(Literal::Boolean(value)) => AbstractValue::Bool(BoolSet::of(value)),
                    Some(Literal::String(_)) => AbstractValue::Ref(RefSet::of(STRING_CLASS)),
                    None => {
                        return Err(Error::unsupported(
                            instruction,
                            "null references are not modeled",
                        ))
                    }
                };
                state.push(value);
                vec![(next, Action::Next(state))]
            }

            Instruction::Return { ref type_, .. } => {
                let value = match *type_ {
                    Some(_) => Some(state.pop()?),
                    None => None,
                };

                let summary = value.clone().unwrap_or(AbstractValue::Bot);
                let summary = match self.summaries.get(pc.signature()) {
                    Some(old) => old.join(&summary)?,
                    None => summary,
                };
                self.summaries.insert(pc.signature().clone(), summary);

                // A recursive entry method also returns to its own call sites
                let parameters = pc.signature().parameters().len();
                let successors: Vec<(ProgramCounter, Action)> = state
                    .frame()
                    .return_to()
                    .iter()
                    .map(|continuation| {
                        (
                            continuation.clone(),
                            Action::Return {
                                value: value.clone(),
                                parameters,
                            },
                        )
                    })
                    .collect();
                if state.frame().is_entry() {
                    if let Some(value) = value {
                        state.push(value);
                    }
                    self.halt(pc, state, Status::Returned);
                }
                successors
            }

            Instruction::Ifz {
                condition, target, ..
            } => {
                let value = state.pop()?;
                let zero = match value {
                    AbstractValue::Bool(_) => AbstractValue::Bool(BoolSet::FALSE),
                    _ => self.domain.integer(0),
                };
                let outcomes = self.domain.compare(condition, &value, &zero)?;
                Self::branch(pc, target, outcomes, state)
            }

            Instruction::If {
                condition, target, ..
            } => {
                let rhs = state.pop()?;
                let lhs = state.pop()?;
                let outcomes = self.domain.compare(condition, &lhs, &rhs)?;
                Self::branch(pc, target, outcomes, state)
            }

            Instruction::New { ref class, .. } => {
                if !MODELED_EXCEPTIONS.contains(&class.as_str()) {
                    return Err(Error::unsupported(
                        instruction,
                        format!("instances of {} are not modeled", class),
                    ));
                }
                state.push(AbstractValue::Ref(RefSet::of(class.as_str())));
                vec![(next, Action::Next(state))]
            }

            Instruction::Get {
                static_, ref field, ..
            } => {
                if !static_ || field.name() != ASSERTIONS_DISABLED {
                    return Err(Error::unsupported(
                        instruction,
                        "only the assertions flag is modeled",
                    ));
                }
                state.push(AbstractValue::Bool(BoolSet::FALSE));
                vec![(next, Action::Next(state))]
            }

            Instruction::Incr { index, amount, .. } => {
                let value = self.domain.binary(
                    BinaryOperator::Add,
                    &state.local(index),
                    &self.domain.integer(amount),
                )?;
                state.set_local(index, value);
                vec![(next, Action::Next(state))]
            }

            Instruction::Pop { words, .. } => {
                state.pop_n(words)?;
                vec![(next, Action::Next(state))]
            }

            Instruction::Unknown { .. } => {
                return Err(Error::unsupported(instruction, "unknown opcode"));
            }
        };

        Ok(successors)
    }
}

/// The state for analysing `signature` as an entry point, with every
/// parameter unknown.
///
/// # Errors
/// `Error::Unsupported` if a parameter is neither an integer nor a boolean.
pub fn entry_state<D: Domain>(signature: &MethodSignature, domain: &D) -> Result<AbstractState, Error> {
    let mut state = AbstractState::new();
    for (index, parameter) in signature.parameters().iter().enumerate() {
        let value = match parameter.as_str() {
            "int" | "short" | "byte" | "char" => domain.top(),
            "boolean" => AbstractValue::Bool(BoolSet::all()),
            _ => {
                return Err(Error::unsupported(
                    signature,
                    format!("parameters of type {} are not modeled", parameter),
                ))
            }
        };
        state.set_local(index, value);
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ai::{Interval, IntervalDomain, Lattice, SignDomain, SignSet};

    fn int() -> Option<String> {
        Some("int".to_string())
    }

    fn signature(name: &str, parameters: usize, returns: Option<String>) -> MethodSignature {
        MethodSignature::new("A", name, returns, vec!["int".to_string(); parameters])
    }

    fn invoke(callee: &MethodSignature) -> Instruction {
        Instruction::invoke(
            InvokeAccess::Static,
            MethodReference::new(
                callee.class_name(),
                callee.name(),
                callee.parameters().to_vec(),
                callee.return_type().map(|r| r.to_string()),
            ),
        )
    }

    fn program(methods: Vec<(MethodSignature, Vec<Instruction>)>) -> Program {
        let mut class = Class::new("A");
        for (signature, bytecode) in methods {
            class.add_method(Method::new(signature, bytecode));
        }
        let mut program = Program::new();
        program.add_class(class);
        program
    }

    fn offsets(touched: &BTreeMap<MethodSignature, BTreeSet<usize>>, s: &MethodSignature) -> Vec<usize> {
        touched
            .get(s)
            .map(|offsets| offsets.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[derive(Default)]
    struct Recorder {
        changes: usize,
        halts: usize,
        faults: Vec<RuntimeError>,
    }

    impl Observer for Recorder {
        fn state_changed(&mut self, _pc: &ProgramCounter, _state: &AbstractState) {
            self.changes += 1;
        }

        fn halted(&mut self, _pc: &ProgramCounter, _state: &AbstractState) {
            self.halts += 1;
        }

        fn fault(&mut self, _pc: &ProgramCounter, error: &RuntimeError) {
            self.faults.push(error.clone());
        }
    }

    #[test]
    fn both_branches_of_unknown_comparison() {
        // if (x > 0) return 1; else return -1;
        let f = signature("f", 1, int());
        let program = program(vec![(
            f.clone(),
            vec![
                Instruction::load(0),
                Instruction::ifz(Condition::Le, 4),
                Instruction::push_int(1),
                Instruction::return_(int()),
                Instruction::push_int(-1),
                Instruction::return_(int()),
            ],
        )]);

        let domain = SignDomain::new();
        let initial = entry_state(&f, &domain).unwrap();
        let mut interpreter = Interpreter::new(&program, domain);
        let touched = interpreter
            .analyse(ProgramCounter::entry(f.clone()), initial)
            .unwrap();

        assert_eq!(offsets(&touched, &f), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(interpreter.terminal_states().len(), 2);
        assert!(interpreter.errors().is_empty());
    }

    #[test]
    fn known_comparison_prunes_branch() {
        let f = signature("f", 0, None);
        let program = program(vec![(
            f.clone(),
            vec![
                Instruction::push_int(3),
                Instruction::ifz(Condition::Gt, 3),
                Instruction::return_(None),
                Instruction::return_(None),
            ],
        )]);

        let mut interpreter = Interpreter::new(&program, SignDomain::new());
        let touched = interpreter
            .analyse(ProgramCounter::entry(f.clone()), AbstractState::new())
            .unwrap();

        assert_eq!(offsets(&touched, &f), vec![0, 1, 3]);
    }

    #[test]
    fn calls_return_to_their_continuation() {
        // static int neg(int x) { return -x; }
        // static void f() { int y = neg(5); if (y < 0) return; throw ...; }
        let neg = signature("neg", 1, int());
        let f = signature("f", 0, None);
        let program = program(vec![
            (
                neg.clone(),
                vec![
                    Instruction::load(0),
                    Instruction::negate(),
                    Instruction::return_(int()),
                ],
            ),
            (
                f.clone(),
                vec![
                    Instruction::push_int(5),
                    invoke(&neg),
                    Instruction::store(0),
                    Instruction::load(0),
                    Instruction::ifz(Condition::Lt, 8),
                    Instruction::new_("java/lang/AssertionError"),
                    Instruction::dup(1),
                    Instruction::throw(),
                    Instruction::return_(None),
                ],
            ),
        ]);

        for signs in [true, false] {
            let touched = if signs {
                Interpreter::new(&program, SignDomain::new())
                    .analyse(ProgramCounter::entry(f.clone()), AbstractState::new())
                    .unwrap()
            } else {
                Interpreter::new(&program, IntervalDomain::for_program(&program))
                    .analyse(ProgramCounter::entry(f.clone()), AbstractState::new())
                    .unwrap()
            };
            assert_eq!(offsets(&touched, &neg), vec![0, 1, 2]);
            assert_eq!(offsets(&touched, &f), vec![0, 1, 2, 3, 4, 8]);
        }
    }

    #[test]
    fn assertion_failures_are_errors() {
        // assert false;
        let f = signature("f", 0, None);
        let program = program(vec![(
            f.clone(),
            vec![
                Instruction::get_static(FieldReference::new("A", ASSERTIONS_DISABLED)),
                Instruction::ifz(Condition::Ne, 6),
                Instruction::new_("java/lang/AssertionError"),
                Instruction::dup(1),
                Instruction::invoke(
                    InvokeAccess::Special,
                    MethodReference::new("java/lang/AssertionError", "<init>", vec![], None),
                ),
                Instruction::throw(),
                Instruction::return_(None),
            ],
        )]);

        let mut interpreter =
            Interpreter::with_observer(&program, SignDomain::new(), Recorder::default());
        let touched = interpreter
            .analyse(ProgramCounter::entry(f.clone()), AbstractState::new())
            .unwrap();

        assert_eq!(offsets(&touched, &f), vec![0, 1, 2, 3, 4, 5]);
        let expected = RuntimeError::Exception("java/lang/AssertionError".to_string());
        assert!(interpreter.errors().contains(&expected));
        assert_eq!(interpreter.observer().faults, vec![expected]);
        assert_eq!(interpreter.observer().halts, 1);
        assert!(interpreter.observer().changes >= 6);
        match interpreter.terminal_states()[0].1.done() {
            Some(Status::Threw(refs)) => {
                assert!(refs.classes().contains("java/lang/AssertionError"))
            }
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[test]
    fn division_by_zero_splits_divisor() {
        // return 10 / x;
        let f = signature("f", 1, int());
        let program = program(vec![(
            f.clone(),
            vec![
                Instruction::push_int(10),
                Instruction::load(0),
                Instruction::binary(BinaryOperator::Div),
                Instruction::return_(int()),
            ],
        )]);

        let domain = IntervalDomain::new(vec![-10, 10].into_iter().collect());
        let mut initial = AbstractState::new();
        initial.set_local(0, Interval::range(-2, 5).into());
        let mut interpreter = Interpreter::new(&program, domain);
        let touched = interpreter
            .analyse(ProgramCounter::entry(f.clone()), initial)
            .unwrap();

        assert_eq!(offsets(&touched, &f), vec![0, 1, 2, 3]);
        assert!(interpreter.errors().contains(&RuntimeError::DivisionByZero));

        let returned = ProgramCounter::new(f.clone(), 3);
        assert_eq!(
            interpreter.state(&returned).unwrap().stack(),
            &[AbstractValue::from(Interval::range(-10, 10))]
        );
    }

    #[test]
    fn division_by_exact_zero_stops() {
        let f = signature("f", 0, int());
        let program = program(vec![(
            f.clone(),
            vec![
                Instruction::push_int(1),
                Instruction::push_int(0),
                Instruction::binary(BinaryOperator::Rem),
                Instruction::return_(int()),
            ],
        )]);

        let mut interpreter = Interpreter::new(&program, SignDomain::new());
        let touched = interpreter
            .analyse(ProgramCounter::entry(f.clone()), AbstractState::new())
            .unwrap();

        assert_eq!(offsets(&touched, &f), vec![0, 1, 2]);
        assert_eq!(
            interpreter.terminal_states()[0].1.done(),
            Some(&Status::DivisionByZero)
        );
    }

    #[test]
    fn loops_terminate_with_widening() {
        // int i = 0; while (i < 1000) i++; return i;
        let f = signature("f", 0, int());
        let program = program(vec![(
            f.clone(),
            vec![
                Instruction::push_int(0),
                Instruction::store(0),
                Instruction::load(0),
                Instruction::push_int(1000),
                Instruction::if_(Condition::Ge, 7),
                Instruction::incr(0, 1),
                Instruction::goto(2),
                Instruction::load(0),
                Instruction::return_(int()),
            ],
        )]);

        let domain = IntervalDomain::for_program(&program);
        let mut interpreter = Interpreter::new(&program, domain);
        let touched = interpreter
            .analyse(ProgramCounter::entry(f.clone()), AbstractState::new())
            .unwrap();

        assert_eq!(offsets(&touched, &f), (0..9).collect::<Vec<usize>>());
        let head = interpreter.state(&ProgramCounter::new(f.clone(), 2)).unwrap();
        let counter = match head.local(0) {
            AbstractValue::Interval(interval) => interval,
            other => panic!("unexpected {}", other),
        };
        assert!(Interval::range(0, 1000).leq(&counter));
        assert!(interpreter.generated() < 100);
    }

    #[test]
    fn void_calls_continue() {
        let g = signature("g", 0, None);
        let f = signature("f", 0, None);
        let program = program(vec![
            (g.clone(), vec![Instruction::return_(None)]),
            (
                f.clone(),
                vec![invoke(&g), invoke(&g), Instruction::return_(None)],
            ),
        ]);

        let mut interpreter = Interpreter::new(&program, SignDomain::new());
        let touched = interpreter
            .analyse(ProgramCounter::entry(f.clone()), AbstractState::new())
            .unwrap();

        assert_eq!(offsets(&touched, &f), vec![0, 1, 2]);
        assert_eq!(offsets(&touched, &g), vec![0]);
        assert_eq!(interpreter.terminal_states().len(), 1);
    }

    #[test]
    fn unsupported_instructions_fail() {
        let f = signature("f", 0, None);
        let program = program(vec![(
            f.clone(),
            vec![Instruction::new_("java/util/ArrayList"), Instruction::return_(None)],
        )]);

        let mut interpreter = Interpreter::new(&program, SignDomain::new());
        let error = interpreter
            .analyse(ProgramCounter::entry(f.clone()), AbstractState::new())
            .unwrap_err();
        assert!(error.is_unsupported());

        let missing = signature("missing", 0, None);
        let program = self::program(vec![(
            f.clone(),
            vec![invoke(&missing), Instruction::return_(None)],
        )]);
        let mut interpreter = Interpreter::new(&program, SignDomain::new());
        assert!(matches!(
            interpreter.analyse(ProgramCounter::entry(f), AbstractState::new()),
            Err(Error::MethodNotFound(_))
        ));
    }

    #[test]
    fn recursive_entry_still_returns() {
        // static int f(int x) { if (x <= 0) return 0; return f(x - 1); }
        let f = signature("f", 1, int());
        let program = program(vec![(
            f.clone(),
            vec![
                Instruction::load(0),
                Instruction::ifz(Condition::Gt, 4),
                Instruction::push_int(0),
                Instruction::return_(int()),
                Instruction::load(0),
                Instruction::push_int(1),
                Instruction::binary(BinaryOperator::Sub),
                invoke(&f),
                Instruction::return_(int()),
            ],
        )]);

        let domain = SignDomain::new();
        let initial = entry_state(&f, &domain).unwrap();
        let mut interpreter = Interpreter::new(&program, domain);
        let touched = interpreter
            .analyse(ProgramCounter::entry(f.clone()), initial)
            .unwrap();

        assert_eq!(offsets(&touched, &f), (0..9).collect::<Vec<usize>>());
        let entry = interpreter.state(&ProgramCounter::entry(f.clone())).unwrap();
        assert!(entry.frame().is_entry());
        assert!(entry.frame().return_to().contains(&ProgramCounter::new(f.clone(), 8)));

        let returned_at = interpreter
            .terminal_states()
            .iter()
            .filter(|(_, state)| state.done() == Some(&Status::Returned))
            .map(|(pc, _)| pc.offset())
            .collect::<BTreeSet<usize>>();
        assert_eq!(returned_at, vec![3, 8].into_iter().collect());
    }

    #[test]
    fn terminal_states_are_distinct() {
        let f = signature("f", 0, None);
        let program = program(vec![(f.clone(), vec![Instruction::return_(None)])]);
        let pc = ProgramCounter::entry(f.clone());

        let mut interpreter = Interpreter::new(&program, SignDomain::new());
        interpreter.halt(&pc, AbstractState::new(), Status::Returned);
        interpreter.halt(&pc, AbstractState::new(), Status::Returned);
        interpreter.halt(&pc, AbstractState::new(), Status::DivisionByZero);
        assert_eq!(interpreter.terminal_states().len(), 2);

        interpreter.analyse(pc, AbstractState::new()).unwrap();
        assert_eq!(interpreter.terminal_states().len(), 1);
        assert_eq!(
            interpreter.terminal_states()[0].1.done(),
            Some(&Status::Returned)
        );
    }

    #[test]
    fn unknown_opcodes_are_unsupported() {
        let f = signature("f", 0, None);
        let bytecode: Vec<Instruction> = serde_json::from_str(
            r#"[{"offset": 0, "opr": "arraylength"}, {"offset": 1, "opr": "return", "type": null}]"#,
        )
        .unwrap();
        let program = program(vec![(f.clone(), bytecode)]);

        let mut interpreter = Interpreter::new(&program, SignDomain::new());
        let error = interpreter
            .analyse(ProgramCounter::entry(f), AbstractState::new())
            .unwrap_err();
        assert!(error.is_unsupported());
        assert!(error.to_string().contains("arraylength"));
    }

    #[test]
    fn entry_states() {
        let f = MethodSignature::new(
            "A",
            "f",
            None,
            vec!["int".to_string(), "boolean".to_string()],
        );
        let state = entry_state(&f, &SignDomain::new()).unwrap();
        assert_eq!(state.local(0), SignSet::top().into());
        assert_eq!(state.local(1), BoolSet::all().into());

        let g = MethodSignature::new("A", "g", None, vec!["java/lang/String".to_string()]);
        assert!(entry_state(&g, &SignDomain::new())
            .unwrap_err()
            .is_unsupported());
    }
}
