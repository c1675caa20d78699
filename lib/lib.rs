//! Ripple: predict which JVM test methods a source change may affect.
//!
//! Ripple works over two snapshots of a decompiled Java program, an "old" one
//! and a "new" one, and returns the set of test methods whose behaviour may
//! have changed between them.
//!
//! * The `il` module holds the in-memory program model: signatures,
//! instructions, methods, classes and programs.
//! * The `loader` module reads snapshots of decompiled bytecode from disk.
//! * The `graph` module implements a directed graph used by the call graph.
//! * The `analysis` module holds the abstract interpreter, its domains, the
//! call graph and the bytecode diff.
//! * The `prediction` module holds the test predictors built on top of the
//! analyses.
//!
//! A typical run looks like:
//!
//! ```no_run
//! use ripple::prediction::{AbstractPredictor, TestPredictor};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), ripple::Error> {
//! let old = ripple::loader::load_program(Path::new("data/old"))?;
//! let new = ripple::loader::load_program(Path::new("data/new"))?;
//!
//! for test in AbstractPredictor::interval().predict(&old, &new)? {
//!     println!("{}", test);
//! }
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate log;

pub mod analysis;
pub mod graph;
pub mod il;
pub mod loader;
pub mod prediction;
#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors which abort an analysis.
///
/// Conditions the abstract semantics discovers about the analysed program,
/// such as a possible division by zero, are not errors of the analysis. Those
/// are collected as `RuntimeError` values instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unsupported instruction `{instruction}`: {reason}")]
    Unsupported { instruction: String, reason: String },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Abstract states have incompatible shapes: {left} and {right}")]
    StateShapeMismatch { left: String, right: String },
    #[error("Operand stack underflow")]
    StackUnderflow,
    #[error("Abstract values are incompatible: {0} and {1}")]
    IncompatibleValues(String, String),
    #[error("Method not found: {0}")]
    MethodNotFound(il::MethodSignature),
    #[error("No instruction at {0}")]
    InstructionNotFound(il::ProgramCounter),
    #[error("Invalid type descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("The vertex id {0} does not exist in the graph")]
    GraphVertexNotFound(usize),
    #[error("The vertex id {0} already exists in the graph")]
    DuplicateVertex(usize),
    #[error("The edge with head {0} and tail {1} already exists in the graph")]
    DuplicateEdge(usize, usize),
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Create an `Error::Unsupported` for the given instruction.
    pub fn unsupported<I: fmt::Display, S: Into<String>>(instruction: I, reason: S) -> Error {
        Error::Unsupported {
            instruction: instruction.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error is an unsupported construct.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported { .. })
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Error {
        Error::Custom(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}

/// A condition the abstract interpreter found reachable in the analysed
/// program.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum RuntimeError {
    /// A division or remainder whose divisor may be zero.
    DivisionByZero,
    /// An exception of the named class may be thrown.
    Exception(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RuntimeError::DivisionByZero => write!(f, "division by zero"),
            RuntimeError::Exception(ref class) => write!(f, "exception {}", class),
        }
    }
}
