//! Callbacks for watching the interpreter work.

use crate::analysis::ai::AbstractState;
use crate::il::ProgramCounter;
use crate::RuntimeError;

/// Receives the events of an interpreter run.
///
/// Every method has an empty default, so an observer implements only the
/// events it cares about.
pub trait Observer {
    /// The fixed point state at `pc` grew to `state`.
    fn state_changed(&mut self, _pc: &ProgramCounter, _state: &AbstractState) {}

    /// An execution path ended at `pc`.
    fn halted(&mut self, _pc: &ProgramCounter, _state: &AbstractState) {}

    /// The instruction at `pc` may raise `error`.
    fn fault(&mut self, _pc: &ProgramCounter, _error: &RuntimeError) {}
}

/// An observer which ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl Observer for NullObserver {}

/// An observer which traces every event through the `log` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn state_changed(&mut self, pc: &ProgramCounter, state: &AbstractState) {
        trace!("{} <- {}", pc, state);
    }

    fn halted(&mut self, pc: &ProgramCounter, state: &AbstractState) {
        trace!("{} halted with {}", pc, state);
    }

    fn fault(&mut self, pc: &ProgramCounter, error: &RuntimeError) {
        trace!("{} may raise {}", pc, error);
    }
}
