//! The abstract operand stack and local variables at one program counter.

use crate::analysis::ai::{AbstractValue, Lattice, RefSet};
use crate::il::ProgramCounter;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// How an execution path ended.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Status {
    /// The entry method returned.
    Returned,
    /// An exception was thrown.
    Threw(RefSet),
    /// A division or remainder may have been by zero.
    DivisionByZero,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Status::Returned => write!(f, "returned"),
            Status::Threw(ref refs) => write!(f, "threw {}", refs),
            Status::DivisionByZero => write!(f, "division by zero"),
        }
    }
}

/// Where a method returns to.
///
/// Every call site which reached a method adds its continuation here, so a
/// method analysed from several call sites returns to all of them. The entry
/// method keeps its frame marked as the entry even once recursive calls add
/// continuations to it.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Frame {
    #[serde(default)]
    entry: bool,
    return_to: BTreeSet<ProgramCounter>,
}

impl Frame {
    /// The frame of the entry method.
    pub fn entry() -> Frame {
        Frame {
            entry: true,
            return_to: BTreeSet::new(),
        }
    }

    /// A frame returning to `continuation`.
    pub fn returning_to(continuation: ProgramCounter) -> Frame {
        Frame {
            entry: false,
            return_to: vec![continuation].into_iter().collect(),
        }
    }

    pub fn return_to(&self) -> &BTreeSet<ProgramCounter> {
        &self.return_to
    }

    /// Returns `true` if this frame belongs to the entry method.
    pub fn is_entry(&self) -> bool {
        self.entry
    }

    pub fn join(&self, other: &Frame) -> Frame {
        Frame {
            entry: self.entry || other.entry,
            return_to: self.return_to.union(&other.return_to).cloned().collect(),
        }
    }

    pub fn leq(&self, other: &Frame) -> bool {
        (!self.entry || other.entry) && self.return_to.is_subset(&other.return_to)
    }
}

/// An abstract state: an operand stack, local variables and a frame.
///
/// Locals absent from the table hold `AbstractValue::Bot`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct AbstractState {
    stack: Vec<AbstractValue>,
    locals: BTreeMap<usize, AbstractValue>,
    frame: Frame,
    done: Option<Status>,
}

impl AbstractState {
    /// Create a new, empty `AbstractState` for an entry method.
    pub fn new() -> AbstractState {
        AbstractState {
            stack: Vec::new(),
            locals: BTreeMap::new(),
            frame: Frame::entry(),
            done: None,
        }
    }

    /// Create a new, empty `AbstractState` for a method called from a call
    /// site whose successor is `continuation`.
    pub fn called_from(continuation: ProgramCounter) -> AbstractState {
        AbstractState {
            frame: Frame::returning_to(continuation),
            ..AbstractState::new()
        }
    }

    pub fn stack(&self) -> &[AbstractValue] {
        &self.stack
    }

    pub fn locals(&self) -> &BTreeMap<usize, AbstractValue> {
        &self.locals
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn done(&self) -> Option<&Status> {
        self.done.as_ref()
    }

    /// Mark this state as the end of an execution path.
    pub fn halt(mut self, status: Status) -> AbstractState {
        self.done = Some(status);
        self
    }

    pub fn push(&mut self, value: AbstractValue) {
        self.stack.push(value);
    }

    pub fn pop(&mut self) -> Result<AbstractValue, Error> {
        self.stack.pop().ok_or(Error::StackUnderflow)
    }

    /// Pop the top `n` values, returned in the order they were pushed.
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<AbstractValue>, Error> {
        if n > self.stack.len() {
            return Err(Error::StackUnderflow);
        }
        let at = self.stack.len() - n;
        Ok(self.stack.split_off(at))
    }

    /// The top `n` values, in the order they were pushed.
    pub fn peek_n(&self, n: usize) -> Result<&[AbstractValue], Error> {
        if n > self.stack.len() {
            return Err(Error::StackUnderflow);
        }
        Ok(&self.stack[self.stack.len() - n..])
    }

    pub fn local(&self, index: usize) -> AbstractValue {
        self.locals
            .get(&index)
            .cloned()
            .unwrap_or(AbstractValue::Bot)
    }

    pub fn set_local(&mut self, index: usize, value: AbstractValue) {
        if value.is_bot() {
            self.locals.remove(&index);
        } else {
            self.locals.insert(index, value);
        }
    }

    fn shape_mismatch(&self, other: &AbstractState) -> Error {
        Error::StateShapeMismatch {
            left: self.to_string(),
            right: other.to_string(),
        }
    }

    /// Combine two states value by value with `f`.
    ///
    /// # Errors
    /// `Error::StateShapeMismatch` if the stacks differ in height or the
    /// states ended differently, and any error `f` returns.
    pub fn combine<F>(&self, other: &AbstractState, f: F) -> Result<AbstractState, Error>
    where
        F: Fn(&AbstractValue, &AbstractValue) -> Result<AbstractValue, Error>,
    {
        if self.stack.len() != other.stack.len() {
            return Err(self.shape_mismatch(other));
        }

        let done = match (&self.done, &other.done) {
            (None, None) => None,
            (Some(Status::Threw(a)), Some(Status::Threw(b))) => Some(Status::Threw(a.join(b))),
            (Some(a), Some(b)) if a == b => Some(a.clone()),
            _ => return Err(self.shape_mismatch(other)),
        };

        let stack = self
            .stack
            .iter()
            .zip(other.stack.iter())
            .map(|(a, b)| f(a, b))
            .collect::<Result<Vec<AbstractValue>, Error>>()?;

        let indices = self
            .locals
            .keys()
            .chain(other.locals.keys())
            .cloned()
            .collect::<BTreeSet<usize>>();
        let mut locals = BTreeMap::new();
        for index in indices {
            let value = f(&self.local(index), &other.local(index))?;
            if !value.is_bot() {
                locals.insert(index, value);
            }
        }

        Ok(AbstractState {
            stack,
            locals,
            frame: self.frame.join(&other.frame),
            done,
        })
    }

    /// The least upper bound of two states.
    pub fn join(&self, other: &AbstractState) -> Result<AbstractState, Error> {
        self.combine(other, |a, b| a.join(b))
    }

    /// Returns `true` if `self` is below or equal to `other`.
    pub fn leq(&self, other: &AbstractState) -> Result<bool, Error> {
        if self.stack.len() != other.stack.len() {
            return Err(self.shape_mismatch(other));
        }
        for (a, b) in self.stack.iter().zip(other.stack.iter()) {
            if !a.leq(b)? {
                return Ok(false);
            }
        }
        for (&index, value) in &self.locals {
            if !value.leq(&other.local(index))? {
                return Ok(false);
            }
        }
        Ok(self.frame.leq(&other.frame) && self.done == other.done)
    }
}

impl fmt::Display for AbstractState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let stack = self
            .stack
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<String>>();
        let locals = self
            .locals
            .iter()
            .map(|(index, v)| format!("{}: {}", index, v))
            .collect::<Vec<String>>();
        write!(f, "stack [{}] locals {{{}}}", stack.join(", "), locals.join(", "))?;
        if let Some(ref done) = self.done {
            write!(f, " {}", done)?;
        }
        Ok(())
    }
}
