use crate::il::MethodReference;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// The identity of a method across program snapshots.
///
/// Two methods in different snapshots with equal signatures are considered
/// the same method when diffing. Signatures order by their display form.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct MethodSignature {
    class_name: String,
    name: String,
    parameters: Vec<String>,
    return_type: Option<String>,
}

impl MethodSignature {
    /// Create a new `MethodSignature`. A `return_type` of `None` is `void`.
    pub fn new<S, T>(
        class_name: S,
        name: T,
        return_type: Option<String>,
        parameters: Vec<String>,
    ) -> MethodSignature
    where
        S: Into<String>,
        T: Into<String>,
    {
        MethodSignature {
            class_name: class_name.into(),
            name: name.into(),
            parameters,
            return_type,
        }
    }

    /// Build the signature of the method an invoke instruction refers to.
    pub fn from_reference(reference: &MethodReference) -> MethodSignature {
        MethodSignature {
            class_name: reference.class().to_string(),
            name: reference.name().to_string(),
            parameters: reference.arguments().to_vec(),
            return_type: reference.returns().map(|r| r.to_string()),
        }
    }

    /// The internal name of the declaring class, e.g. `org/example/Math`.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> Option<&str> {
        self.return_type.as_deref()
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Returns `true` if this method returns `void`.
    pub fn is_void(&self) -> bool {
        self.return_type.is_none()
    }

    /// The characters of the display form, without allocating it.
    fn chars(&self) -> impl Iterator<Item = char> + '_ {
        let parameters = self
            .parameters
            .iter()
            .enumerate()
            .flat_map(|(index, parameter)| {
                let separator = if index > 0 { Some(',') } else { None };
                separator.into_iter().chain(parameter.chars())
            });
        self.class_name
            .chars()
            .chain(Some('.'))
            .chain(self.name.chars())
            .chain(Some('('))
            .chain(parameters)
            .chain(Some(')'))
            .chain(self.return_type.as_deref().unwrap_or("void").chars())
    }
}

impl Ord for MethodSignature {
    fn cmp(&self, other: &MethodSignature) -> Ordering {
        self.chars().cmp(other.chars()).then_with(|| {
            (&self.class_name, &self.name, &self.parameters, &self.return_type).cmp(&(
                &other.class_name,
                &other.name,
                &other.parameters,
                &other.return_type,
            ))
        })
    }
}

impl PartialOrd for MethodSignature {
    fn partial_cmp(&self, other: &MethodSignature) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}.{}({}){}",
            self.class_name,
            self.name,
            self.parameters.join(","),
            self.return_type.as_deref().unwrap_or("void")
        )
    }
}

#[test]
fn method_signature_display() {
    let signature = MethodSignature::new(
        "org/example/Math",
        "gcd",
        Some("int".to_string()),
        vec!["int".to_string(), "int".to_string()],
    );
    assert_eq!(signature.to_string(), "org/example/Math.gcd(int,int)int");

    let signature = MethodSignature::new("org/example/MathTest", "testGcd", None, vec![]);
    assert!(signature.is_void());
    assert_eq!(signature.to_string(), "org/example/MathTest.testGcd()void");
}

#[test]
fn method_signatures_order_by_display_form() {
    let outer = MethodSignature::new("A", "f", None, vec![]);
    let inner = MethodSignature::new("A$B", "f", None, vec![]);
    assert_eq!(outer.cmp(&inner), Ordering::Greater);
    assert_eq!(
        outer.to_string().cmp(&inner.to_string()),
        Ordering::Greater
    );

    let mut signatures = vec![
        MethodSignature::new("org/example/Math", "negate", Some("int".to_string()), vec!["int".to_string()]),
        MethodSignature::new("org/example/Math", "gcd", Some("int".to_string()), vec!["int".to_string(); 2]),
        MethodSignature::new("org/example/MathTest", "testGcd", None, vec![]),
        MethodSignature::new("org/example/Math", "gcd", None, vec!["int".to_string()]),
        outer,
        inner,
    ];
    let mut rendered = signatures.iter().map(|s| s.to_string()).collect::<Vec<String>>();
    signatures.sort();
    rendered.sort();
    assert_eq!(
        signatures.iter().map(|s| s.to_string()).collect::<Vec<String>>(),
        rendered
    );

    // Equal display forms still order distinct signatures consistently.
    let void = MethodSignature::new("A", "f", None, vec![]);
    let named_void = MethodSignature::new("A", "f", Some("void".to_string()), vec![]);
    assert_eq!(void.to_string(), named_void.to_string());
    assert_ne!(void.cmp(&named_void), Ordering::Equal);
    assert_eq!(void.cmp(&named_void), named_void.cmp(&void).reverse());
}
