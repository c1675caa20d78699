//! Abstract interpretation of JVM bytecode.
//!
//! This module implements the lattices, arithmetic and fixed point engine
//! used to execute a program symbolically.
//!
//! We make heavy use of generics so that one interpreter runs every domain.
//!
//! * The `lattice` module holds the `Lattice` and `Abstraction` traits.
//! * The `sign`, `interval`, `bool_set` and `ref_set` modules implement the
//! value lattices, and `value` combines them into an `AbstractValue`.
//! * The `arithmetic` module lifts the JVM's operators to each lattice.
//! * The `domain` module ties an arithmetic to the values the interpreter
//! stores, and decides how states are merged at a fixed point.
//! * The `state` module implements the abstract operand stack and locals.
//! * The `interpreter` module provides the worklist fixed point engine.

pub mod arithmetic;
mod bool_set;
pub mod domain;
mod interval;
pub mod interpreter;
mod lattice;
pub mod observer;
mod ref_set;
mod sign;
pub mod state;
mod value;

pub use self::bool_set::BoolSet;
pub use self::domain::{Domain, IntervalDomain, SignDomain};
pub use self::interpreter::Interpreter;
pub use self::interval::{Bound, Interval};
pub use self::lattice::{Abstraction, Lattice};
pub use self::observer::{LogObserver, NullObserver, Observer};
pub use self::ref_set::RefSet;
pub use self::sign::SignSet;
pub use self::state::{AbstractState, Frame, Status};
pub use self::value::{bools_as_interval, bools_as_signs, AbstractValue};
