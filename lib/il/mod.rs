//! The in-memory model of a decompiled Java program.
//!
//! A `Program` holds production and test `Class`es, each of which holds
//! `Method`s. A method is a `MethodSignature` and an ordered sequence of
//! `Instruction`s. Instructions are addressed by their position in that
//! sequence, and a `ProgramCounter` pairs a signature with such a position.
//!
//! Signatures are the identity of a method across snapshots: a method in the
//! old program and a method in the new program with equal signatures are the
//! same method.

mod class;
pub mod descriptor;
mod instruction;
mod method;
mod method_signature;
mod program;
mod program_counter;

pub use self::class::*;
pub use self::instruction::*;
pub use self::method::*;
pub use self::method_signature::*;
pub use self::program::*;
pub use self::program_counter::*;
