use crate::il::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A class and its methods.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Class {
    name: String,
    methods: BTreeMap<MethodSignature, Method>,
    // Java source text, when it is available
    source: Option<String>,
}

impl Class {
    /// Create a new, empty class with the given internal name.
    pub fn new<S: Into<String>>(name: S) -> Class {
        Class {
            name: name.into(),
            methods: BTreeMap::new(),
            source: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn set_source(&mut self, source: Option<String>) {
        self.source = source;
    }

    /// Add a method to this class, replacing any method with the same
    /// signature.
    pub fn add_method(&mut self, method: Method) {
        self.methods.insert(method.signature().clone(), method);
    }

    pub fn method(&self, signature: &MethodSignature) -> Option<&Method> {
        self.methods.get(signature)
    }

    /// All methods of this class, ordered by signature.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.values()
    }
}
