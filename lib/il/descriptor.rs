//! Type descriptors as the bytecode decompiler writes them.
//!
//! A descriptor is either a bare base type name such as `"int"`, an object
//! `{"base": "int"}`, a class `{"kind": "class", "name": "java/lang/String"}`
//! or an array `{"kind": "array", "type": <descriptor>}`. Ripple names types
//! by strings: base types by their name, classes by their internal name and
//! arrays by their element type followed by `[]`.

use crate::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Render a descriptor as a type name.
pub fn type_name(descriptor: &Value) -> Result<String, Error> {
    match *descriptor {
        Value::String(ref name) => Ok(name.to_string()),
        Value::Object(ref object) => {
            if let Some(Value::String(base)) = object.get("base") {
                return Ok(base.to_string());
            }
            match object.get("kind") {
                Some(Value::String(kind)) if kind == "class" => match object.get("name") {
                    Some(Value::String(name)) => Ok(name.to_string()),
                    _ => Err(Error::InvalidDescriptor(descriptor.to_string())),
                },
                Some(Value::String(kind)) if kind == "array" => match object.get("type") {
                    Some(element) => Ok(format!("{}[]", type_name(element)?)),
                    None => Err(Error::InvalidDescriptor(descriptor.to_string())),
                },
                _ => Err(Error::InvalidDescriptor(descriptor.to_string())),
            }
        }
        _ => Err(Error::InvalidDescriptor(descriptor.to_string())),
    }
}

/// Render an optional descriptor, where `null` is `void`.
pub fn return_type_name(descriptor: &Value) -> Result<Option<String>, Error> {
    match *descriptor {
        Value::Null => Ok(None),
        _ => type_name(descriptor).map(Some),
    }
}

pub(crate) fn deserialize_type_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let descriptors = Vec::<Value>::deserialize(deserializer)?;
    descriptors
        .iter()
        .map(type_name)
        .collect::<Result<Vec<String>, Error>>()
        .map_err(serde::de::Error::custom)
}

pub(crate) fn deserialize_return_type<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let descriptor = Value::deserialize(deserializer)?;
    return_type_name(&descriptor).map_err(serde::de::Error::custom)
}

#[test]
fn descriptor_names() {
    use serde_json::json;

    assert_eq!(type_name(&json!("int")).unwrap(), "int");
    assert_eq!(type_name(&json!({"base": "boolean"})).unwrap(), "boolean");
    assert_eq!(
        type_name(&json!({"kind": "class", "name": "java/lang/String"})).unwrap(),
        "java/lang/String"
    );
    assert_eq!(
        type_name(&json!({"kind": "array", "type": {"base": "int"}})).unwrap(),
        "int[]"
    );
    assert!(type_name(&json!(3)).is_err());
    assert_eq!(return_type_name(&json!(null)).unwrap(), None);
}
