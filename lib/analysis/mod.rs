//! Static analyses over programs.
//!
//! * The `ai` module implements abstract interpretation of bytecode.
//! * The `call_graph` module builds static call graphs.
//! * The `diff` module finds the instructions a change touched.
//! * The `literals` module finds the landmarks for interval widening.

pub mod ai;
pub mod call_graph;
pub mod diff;
pub mod literals;

pub use self::call_graph::{build_call_graph, CallGraph};
pub use self::diff::{changed_offsets, BytecodeDiff};
pub use self::literals::interesting_values;
