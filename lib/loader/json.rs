//! Decompiled class files.
//!
//! A class file is the JSON a bytecode decompiler writes for one class:
//!
//! ```json
//! { "name": "org/example/Math",
//!   "methods": [
//!     { "name": "negate",
//!       "params": [ { "type": { "base": "int" } } ],
//!       "returns": { "type": { "base": "int" } },
//!       "annotations": [],
//!       "code": { "bytecode": [ { "opr": "load", "index": 0, ... }, ... ] } } ] }
//! ```

use crate::il;
use crate::il::descriptor;
use crate::Error;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// A class loaded from a decompiled class file.
#[derive(Clone, Debug)]
pub struct Json {
    class: il::Class,
}

impl Json {
    /// Load a class from a decompiled class file.
    pub fn from_file(filename: &Path) -> Result<Json, Error> {
        let text = fs::read_to_string(filename)?;
        Json::parse(&text)
    }

    /// Load a class from the text of a decompiled class file.
    pub fn parse(text: &str) -> Result<Json, Error> {
        let root: Value = serde_json::from_str(text)?;

        let name = match root["name"] {
            Value::String(ref name) => name.to_string(),
            _ => return Err("class name missing".into()),
        };

        let mut class = il::Class::new(name.clone());

        match root["methods"] {
            Value::Array(ref methods) => {
                for method in methods {
                    class.add_method(Json::method(&name, method)?);
                }
            }
            Value::Null => {}
            _ => return Err(format!("methods of {} are not an array", name).into()),
        }

        Ok(Json { class })
    }

    fn method(class_name: &str, method: &Value) -> Result<il::Method, Error> {
        let name = match method["name"] {
            Value::String(ref name) => name.to_string(),
            _ => return Err(format!("name missing for method in {}", class_name).into()),
        };

        let mut parameters = Vec::new();
        if let Value::Array(ref params) = method["params"] {
            for param in params {
                parameters.push(descriptor::type_name(&param["type"])?);
            }
        }

        let return_type = descriptor::return_type_name(&method["returns"]["type"])?;

        let signature = il::MethodSignature::new(class_name, name, return_type, parameters);

        // Abstract and native methods have no code.
        let bytecode = match method["code"]["bytecode"] {
            Value::Null => Vec::new(),
            ref bytecode => serde_json::from_value(bytecode.clone())?,
        };

        let mut result = il::Method::new(signature, bytecode);

        if let Value::Array(ref annotations) = method["annotations"] {
            for annotation in annotations {
                match annotation["type"] {
                    Value::String(ref annotation) => {
                        result = result.with_annotation(annotation.to_string());
                    }
                    ref annotation => {
                        result = result.with_annotation(descriptor::type_name(annotation)?);
                    }
                }
            }
        }

        Ok(result)
    }

    pub fn class(&self) -> &il::Class {
        &self.class
    }

    pub fn into_class(self) -> il::Class {
        self.class
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATH: &str = r#"{
        "name": "org/example/Math",
        "methods": [
            { "name": "negate",
              "params": [ { "type": { "base": "int" } } ],
              "returns": { "type": { "base": "int" } },
              "annotations": [],
              "code": { "bytecode": [
                  { "offset": 0, "opr": "load", "index": 0, "type": "int" },
                  { "offset": 1, "opr": "negate", "type": "int" },
                  { "offset": 2, "opr": "return", "type": "int" } ] } },
            { "name": "testNegate",
              "params": [],
              "returns": { "type": null },
              "annotations": [ { "type": "org/junit/jupiter/api/Test", "values": {} } ],
              "code": { "bytecode": [ { "offset": 0, "opr": "return", "type": null } ] } },
            { "name": "describe",
              "params": [ { "type": { "kind": "class", "name": "java/lang/String" } } ],
              "returns": { "type": null },
              "annotations": [],
              "code": null }
        ]
    }"#;

    #[test]
    fn load_class() {
        let class = Json::parse(MATH).unwrap().into_class();

        assert_eq!(class.name(), "org/example/Math");
        assert_eq!(class.methods().count(), 3);

        let negate = il::MethodSignature::new(
            "org/example/Math",
            "negate",
            Some("int".to_string()),
            vec!["int".to_string()],
        );
        let method = class.method(&negate).unwrap();
        assert_eq!(method.bytecode().len(), 3);
        assert_eq!(method.instruction(1), Some(&il::Instruction::negate().with_offset(1)));
        assert!(!method.is_test());

        let test = il::MethodSignature::new("org/example/Math", "testNegate", None, vec![]);
        assert!(class.method(&test).unwrap().is_test());

        let describe = il::MethodSignature::new(
            "org/example/Math",
            "describe",
            None,
            vec!["java/lang/String".to_string()],
        );
        assert!(class.method(&describe).unwrap().bytecode().is_empty());
    }

    #[test]
    fn unknown_opcodes_do_not_fail_the_class() {
        let text = r#"{
            "name": "org/example/Arrays",
            "methods": [
                { "name": "zero", "params": [], "returns": { "type": { "base": "int" } },
                  "code": { "bytecode": [
                      { "offset": 0, "opr": "push", "value": { "type": "integer", "value": 0 } },
                      { "offset": 1, "opr": "return", "type": "int" } ] } },
                { "name": "length",
                  "params": [ { "type": { "kind": "array", "type": { "base": "int" } } } ],
                  "returns": { "type": { "base": "int" } },
                  "code": { "bytecode": [
                      { "offset": 0, "opr": "load", "index": 0, "type": { "kind": "array" } },
                      { "offset": 1, "opr": "arraylength" },
                      { "offset": 2, "opr": "return", "type": "int" } ] } }
            ]
        }"#;

        let class = Json::parse(text).unwrap().into_class();
        assert_eq!(class.methods().count(), 2);

        let zero = il::MethodSignature::new("org/example/Arrays", "zero", Some("int".to_string()), vec![]);
        assert_eq!(
            class.method(&zero).unwrap().bytecode(),
            &[
                il::Instruction::push_int(0).with_offset(0),
                il::Instruction::return_(Some("int".to_string())).with_offset(1)
            ]
        );

        let length = class
            .methods()
            .find(|method| method.signature().name() == "length")
            .unwrap();
        let unknown = length.instruction(1).unwrap();
        assert_eq!(unknown.offset(), Some(1));
        assert_eq!(unknown.to_string(), "arraylength");
        assert!(unknown.same_structure(
            &serde_json::from_str(r#"{ "offset": 7, "opr": "arraylength" }"#).unwrap()
        ));
        assert!(!unknown.same_structure(
            &serde_json::from_str(r#"{ "offset": 1, "opr": "monitorenter" }"#).unwrap()
        ));
    }

    #[test]
    fn missing_class_name() {
        assert!(Json::parse(r#"{ "methods": [] }"#).is_err());
    }
}
