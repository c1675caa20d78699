use crate::il::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The annotation JUnit 5 puts on test methods.
pub const TEST_ANNOTATION: &str = "org/junit/jupiter/api/Test";

/// A method and its decompiled bytecode.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Method {
    // The identity of this method
    signature: MethodSignature,
    // Instructions, addressed by their position
    bytecode: Vec<Instruction>,
    // Internal names of the annotations on this method
    annotations: Vec<String>,
}

impl Method {
    pub fn new(signature: MethodSignature, bytecode: Vec<Instruction>) -> Method {
        Method {
            signature,
            bytecode,
            annotations: Vec::new(),
        }
    }

    /// Add an annotation to this method.
    pub fn with_annotation<S: Into<String>>(mut self, annotation: S) -> Method {
        self.annotations.push(annotation.into());
        self
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    pub fn bytecode(&self) -> &[Instruction] {
        &self.bytecode
    }

    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }

    /// Get the instruction at the given position.
    pub fn instruction(&self, offset: usize) -> Option<&Instruction> {
        self.bytecode.get(offset)
    }

    /// Returns `true` if this method carries a JUnit `Test` annotation.
    pub fn is_test(&self) -> bool {
        self.annotations.iter().any(|a| a == TEST_ANNOTATION)
    }

    /// Returns `true` if both methods have the same instructions, ignoring
    /// decompiler offsets.
    pub fn same_bytecode(&self, other: &Method) -> bool {
        self.bytecode.len() == other.bytecode.len()
            && self
                .bytecode
                .iter()
                .zip(other.bytecode.iter())
                .all(|(a, b)| a.same_structure(b))
    }

    /// Every method this method invokes statically.
    pub fn static_callees(&self) -> impl Iterator<Item = MethodSignature> + '_ {
        self.bytecode.iter().filter_map(|i| i.static_callee())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.signature)?;
        for (offset, instruction) in self.bytecode.iter().enumerate() {
            writeln!(f, "  {:>4} {}", offset, instruction)?;
        }
        Ok(())
    }
}
