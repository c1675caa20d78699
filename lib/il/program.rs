use crate::il::*;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A snapshot of a Java program: its production classes and its test
/// classes.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Program {
    classes: BTreeMap<String, Class>,
    test_classes: BTreeMap<String, Class>,
}

impl Program {
    /// Create a new, empty `Program`.
    pub fn new() -> Program {
        Program::default()
    }

    /// Add a production class, replacing any class with the same name.
    pub fn add_class(&mut self, class: Class) {
        self.classes.insert(class.name().to_string(), class);
    }

    /// Add a test class, replacing any class with the same name.
    pub fn add_test_class(&mut self, class: Class) {
        self.test_classes.insert(class.name().to_string(), class);
    }

    /// Get a class by its internal name, looking in production classes first.
    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes
            .get(name)
            .or_else(|| self.test_classes.get(name))
    }

    /// All classes, production classes first.
    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.values().chain(self.test_classes.values())
    }

    pub fn test_classes(&self) -> impl Iterator<Item = &Class> {
        self.test_classes.values()
    }

    /// Get a method by its signature.
    pub fn method(&self, signature: &MethodSignature) -> Result<&Method, Error> {
        self.class(signature.class_name())
            .and_then(|class| class.method(signature))
            .ok_or_else(|| Error::MethodNotFound(signature.clone()))
    }

    /// Returns `true` if this program has a method with the given signature.
    pub fn contains_method(&self, signature: &MethodSignature) -> bool {
        self.method(signature).is_ok()
    }

    /// Get the instruction a program counter points to.
    pub fn instruction(&self, pc: &ProgramCounter) -> Result<&Instruction, Error> {
        self.method(pc.signature())?
            .instruction(pc.offset())
            .ok_or_else(|| Error::InstructionNotFound(pc.clone()))
    }

    /// Every method in the program, production and test.
    pub fn all_methods(&self) -> impl Iterator<Item = &Method> {
        self.classes().flat_map(|class| class.methods())
    }

    /// Every test method, paired with its declaring class.
    ///
    /// A test method is a method of a test class which carries a JUnit `Test`
    /// annotation.
    pub fn all_test_methods(&self) -> impl Iterator<Item = (&Class, &Method)> {
        self.test_classes.values().flat_map(|class| {
            class
                .methods()
                .filter(|method| method.is_test())
                .map(move |method| (class, method))
        })
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for method in self.all_methods() {
            write!(f, "{}", method)?;
        }
        Ok(())
    }
}
