use crate::il::{descriptor, MethodSignature};
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// A binary arithmetic operator.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Ushr,
}

impl BinaryOperator {
    /// Returns `true` for the operators which fail on a zero divisor.
    pub fn is_division(&self) -> bool {
        matches!(*self, BinaryOperator::Div | BinaryOperator::Rem)
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match *self {
            BinaryOperator::Add => "add",
            BinaryOperator::Sub => "sub",
            BinaryOperator::Mul => "mul",
            BinaryOperator::Div => "div",
            BinaryOperator::Rem => "rem",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
            BinaryOperator::Xor => "xor",
            BinaryOperator::Shl => "shl",
            BinaryOperator::Shr => "shr",
            BinaryOperator::Ushr => "ushr",
        };
        write!(f, "{}", s)
    }
}

/// A comparison used by conditional jumps.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Condition {
    /// Evaluate this condition over two ordered concrete values.
    pub fn holds<T: Ord>(&self, lhs: T, rhs: T) -> bool {
        match *self {
            Condition::Eq => lhs == rhs,
            Condition::Ne => lhs != rhs,
            Condition::Lt => lhs < rhs,
            Condition::Le => lhs <= rhs,
            Condition::Gt => lhs > rhs,
            Condition::Ge => lhs >= rhs,
        }
    }

    /// The condition with its operands swapped, so `a op b == b op.flip() a`.
    pub fn flip(&self) -> Condition {
        match *self {
            Condition::Eq => Condition::Eq,
            Condition::Ne => Condition::Ne,
            Condition::Lt => Condition::Gt,
            Condition::Le => Condition::Ge,
            Condition::Gt => Condition::Lt,
            Condition::Ge => Condition::Le,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match *self {
            Condition::Eq => "eq",
            Condition::Ne => "ne",
            Condition::Lt => "lt",
            Condition::Le => "le",
            Condition::Gt => "gt",
            Condition::Ge => "ge",
        };
        write!(f, "{}", s)
    }
}

/// A literal pushed onto the operand stack.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Literal {
    Integer(i64),
    Boolean(bool),
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Literal::Integer(value) => write!(f, "{}", value),
            Literal::Boolean(value) => write!(f, "{}", value),
            Literal::String(ref value) => write!(f, "{:?}", value),
        }
    }
}

/// How an invoke instruction dispatches.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvokeAccess {
    Static,
    Special,
    Virtual,
    Interface,
    Dynamic,
}

impl fmt::Display for InvokeAccess {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match *self {
            InvokeAccess::Static => "static",
            InvokeAccess::Special => "special",
            InvokeAccess::Virtual => "virtual",
            InvokeAccess::Interface => "interface",
            InvokeAccess::Dynamic => "dynamic",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ClassReference {
    name: String,
}

/// The method descriptor carried by an invoke instruction.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct MethodReference {
    name: String,
    #[serde(rename = "ref")]
    class: ClassReference,
    #[serde(default, deserialize_with = "descriptor::deserialize_type_names")]
    args: Vec<String>,
    #[serde(default, deserialize_with = "descriptor::deserialize_return_type")]
    returns: Option<String>,
}

impl MethodReference {
    pub fn new<S: Into<String>, T: Into<String>>(
        class: S,
        name: T,
        args: Vec<String>,
        returns: Option<String>,
    ) -> MethodReference {
        MethodReference {
            name: name.into(),
            class: ClassReference { name: class.into() },
            args,
            returns,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> &str {
        &self.class.name
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn returns(&self) -> Option<&str> {
        self.returns.as_deref()
    }
}

/// The field read by a get instruction.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct FieldReference {
    class: String,
    name: String,
}

impl FieldReference {
    pub fn new<S: Into<String>, T: Into<String>>(class: S, name: T) -> FieldReference {
        FieldReference {
            class: class.into(),
            name: name.into(),
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A decompiled JVM instruction.
///
/// Instructions are addressed by their position in a method's bytecode. The
/// `offset` each variant carries is the decompiler's byte offset. It is kept
/// for display only, and is ignored when comparing bytecode across snapshots
/// (see `Instruction::without_offset`).
///
/// Opcodes outside this set load as `Instruction::Unknown`, so a method the
/// analyses cannot interpret does not stop the rest of its class loading.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(remote = "Self", tag = "opr", rename_all = "lowercase")]
pub enum Instruction {
    /// Jump unconditionally to `target`.
    Goto {
        #[serde(default)]
        offset: Option<usize>,
        target: usize,
    },
    /// Pop two values, push `lhs operator rhs`.
    Binary {
        #[serde(default)]
        offset: Option<usize>,
        #[serde(rename = "operant")]
        operator: BinaryOperator,
    },
    /// Push the local at `index`.
    Load {
        #[serde(default)]
        offset: Option<usize>,
        index: usize,
    },
    /// Pop a value into the local at `index`.
    Store {
        #[serde(default)]
        offset: Option<usize>,
        index: usize,
    },
    /// Pop a reference and throw it.
    Throw {
        #[serde(default)]
        offset: Option<usize>,
    },
    /// Call a method.
    Invoke {
        #[serde(default)]
        offset: Option<usize>,
        access: InvokeAccess,
        method: MethodReference,
    },
    /// Negate the top of the stack.
    Negate {
        #[serde(default)]
        offset: Option<usize>,
    },
    /// Duplicate the top `words` stack slots.
    Dup {
        #[serde(default)]
        offset: Option<usize>,
        words: usize,
    },
    /// Push a literal, or `null` when `value` is `None`.
    Push {
        #[serde(default)]
        offset: Option<usize>,
        value: Option<Literal>,
    },
    /// Return from the current method, with a value unless `type_` is `None`.
    Return {
        #[serde(default)]
        offset: Option<usize>,
        #[serde(rename = "type", default)]
        type_: Option<String>,
    },
    /// Pop one value, jump to `target` if `value condition 0`.
    Ifz {
        #[serde(default)]
        offset: Option<usize>,
        condition: Condition,
        target: usize,
    },
    /// Pop two values, jump to `target` if `lhs condition rhs`.
    If {
        #[serde(default)]
        offset: Option<usize>,
        condition: Condition,
        target: usize,
    },
    /// Allocate a new instance of `class`.
    New {
        #[serde(default)]
        offset: Option<usize>,
        class: String,
    },
    /// Read a field.
    Get {
        #[serde(default)]
        offset: Option<usize>,
        #[serde(rename = "static", default)]
        static_: bool,
        field: FieldReference,
    },
    /// Add `amount` to the local at `index`.
    Incr {
        #[serde(default)]
        offset: Option<usize>,
        index: usize,
        amount: i64,
    },
    /// Discard the top `words` stack slots.
    Pop {
        #[serde(default)]
        offset: Option<usize>,
        words: usize,
    },
    /// An opcode no analysis understands. `raw` is the instruction's JSON
    /// object without its offset.
    #[serde(skip)]
    Unknown {
        opr: String,
        offset: Option<usize>,
        raw: String,
    },
}

const OPCODES: [&str; 16] = [
    "goto", "binary", "load", "store", "throw", "invoke", "negate", "dup", "push", "return",
    "ifz", "if", "new", "get", "incr", "pop",
];

impl<'de> Deserialize<'de> for Instruction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Instruction, D::Error> {
        let mut object = Map::<String, Value>::deserialize(deserializer)?;
        let opr = match object.get("opr") {
            Some(Value::String(opr)) => opr.clone(),
            _ => return Err(D::Error::missing_field("opr")),
        };

        if OPCODES.contains(&opr.as_str()) {
            return Instruction::deserialize(Value::Object(object)).map_err(D::Error::custom);
        }

        let offset = match object.remove("offset") {
            None | Some(Value::Null) => None,
            Some(offset) => Some(usize::deserialize(offset).map_err(D::Error::custom)?),
        };
        Ok(Instruction::Unknown {
            opr,
            offset,
            raw: Value::Object(object).to_string(),
        })
    }
}

impl Serialize for Instruction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Instruction::Unknown {
                offset, ref raw, ..
            } => {
                let mut object: Map<String, Value> =
                    serde_json::from_str(raw).map_err(S::Error::custom)?;
                if let Some(offset) = offset {
                    object.insert("offset".to_string(), Value::from(offset));
                }
                object.serialize(serializer)
            }
            _ => Instruction::serialize(self, serializer),
        }
    }
}

impl Instruction {
    pub fn goto(target: usize) -> Instruction {
        Instruction::Goto {
            offset: None,
            target,
        }
    }

    pub fn binary(operator: BinaryOperator) -> Instruction {
        Instruction::Binary {
            offset: None,
            operator,
        }
    }

    pub fn load(index: usize) -> Instruction {
        Instruction::Load {
            offset: None,
            index,
        }
    }

    pub fn store(index: usize) -> Instruction {
        Instruction::Store {
            offset: None,
            index,
        }
    }

    pub fn throw() -> Instruction {
        Instruction::Throw { offset: None }
    }

    pub fn invoke(access: InvokeAccess, method: MethodReference) -> Instruction {
        Instruction::Invoke {
            offset: None,
            access,
            method,
        }
    }

    pub fn negate() -> Instruction {
        Instruction::Negate { offset: None }
    }

    pub fn dup(words: usize) -> Instruction {
        Instruction::Dup {
            offset: None,
            words,
        }
    }

    pub fn push(value: Literal) -> Instruction {
        Instruction::Push {
            offset: None,
            value: Some(value),
        }
    }

    pub fn push_int(value: i64) -> Instruction {
        Instruction::push(Literal::Integer(value))
    }

    pub fn return_(type_: Option<String>) -> Instruction {
        Instruction::Return {
            offset: None,
            type_,
        }
    }

    pub fn ifz(condition: Condition, target: usize) -> Instruction {
        Instruction::Ifz {
            offset: None,
            condition,
            target,
        }
    }

    pub fn if_(condition: Condition, target: usize) -> Instruction {
        Instruction::If {
            offset: None,
            condition,
            target,
        }
    }

    pub fn new_<S: Into<String>>(class: S) -> Instruction {
        Instruction::New {
            offset: None,
            class: class.into(),
        }
    }

    pub fn get_static(field: FieldReference) -> Instruction {
        Instruction::Get {
            offset: None,
            static_: true,
            field,
        }
    }

    pub fn incr(index: usize, amount: i64) -> Instruction {
        Instruction::Incr {
            offset: None,
            index,
            amount,
        }
    }

    pub fn pop(words: usize) -> Instruction {
        Instruction::Pop {
            offset: None,
            words,
        }
    }

    /// The decompiler's byte offset of this instruction, if known.
    pub fn offset(&self) -> Option<usize> {
        match *self {
            Instruction::Goto { offset, .. }
            | Instruction::Binary { offset, .. }
            | Instruction::Load { offset, .. }
            | Instruction::Store { offset, .. }
            | Instruction::Throw { offset }
            | Instruction::Invoke { offset, .. }
            | Instruction::Negate { offset }
            | Instruction::Dup { offset, .. }
            | Instruction::Push { offset, .. }
            | Instruction::Return { offset, .. }
            | Instruction::Ifz { offset, .. }
            | Instruction::If { offset, .. }
            | Instruction::New { offset, .. }
            | Instruction::Get { offset, .. }
            | Instruction::Incr { offset, .. }
            | Instruction::Pop { offset, .. }
            | Instruction::Unknown { offset, .. } => offset,
        }
    }

    fn offset_mut(&mut self) -> &mut Option<usize> {
        match *self {
            Instruction::Goto { ref mut offset, .. }
            | Instruction::Binary { ref mut offset, .. }
            | Instruction::Load { ref mut offset, .. }
            | Instruction::Store { ref mut offset, .. }
            | Instruction::Throw { ref mut offset }
            | Instruction::Invoke { ref mut offset, .. }
            | Instruction::Negate { ref mut offset }
            | Instruction::Dup { ref mut offset, .. }
            | Instruction::Push { ref mut offset, .. }
            | Instruction::Return { ref mut offset, .. }
            | Instruction::Ifz { ref mut offset, .. }
            | Instruction::If { ref mut offset, .. }
            | Instruction::New { ref mut offset, .. }
            | Instruction::Get { ref mut offset, .. }
            | Instruction::Incr { ref mut offset, .. }
            | Instruction::Pop { ref mut offset, .. }
            | Instruction::Unknown { ref mut offset, .. } => offset,
        }
    }

    /// Set the decompiler's byte offset of this instruction.
    pub fn with_offset(mut self, offset: usize) -> Instruction {
        *self.offset_mut() = Some(offset);
        self
    }

    /// A copy of this instruction with the decompiler offset stripped.
    ///
    /// Decompiler offsets shift whenever an earlier instruction changes size,
    /// so they are not part of an instruction's structure.
    pub fn without_offset(&self) -> Instruction {
        let mut instruction = self.clone();
        *instruction.offset_mut() = None;
        instruction
    }

    /// Returns `true` if both instructions are equal, ignoring offsets.
    pub fn same_structure(&self, other: &Instruction) -> bool {
        self.without_offset() == other.without_offset()
    }

    /// The method a `static` invoke resolves to.
    pub fn static_callee(&self) -> Option<MethodSignature> {
        match *self {
            Instruction::Invoke {
                access: InvokeAccess::Static,
                ref method,
                ..
            } => Some(MethodSignature::from_reference(method)),
            _ => None,
        }
    }

    /// The integer literal this instruction introduces, if any.
    pub fn integer_literal(&self) -> Option<i64> {
        match *self {
            Instruction::Push {
                value: Some(Literal::Integer(value)),
                ..
            } => Some(value),
            Instruction::Incr { amount, .. } => Some(amount),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Instruction::Goto { target, .. } => write!(f, "goto {}", target),
            Instruction::Binary { operator, .. } => write!(f, "binary {}", operator),
            Instruction::Load { index, .. } => write!(f, "load {}", index),
            Instruction::Store { index, .. } => write!(f, "store {}", index),
            Instruction::Throw { .. } => write!(f, "throw"),
            Instruction::Invoke {
                access, ref method, ..
            } => write!(
                f,
                "invoke {} {}",
                access,
                MethodSignature::from_reference(method)
            ),
            Instruction::Negate { .. } => write!(f, "negate"),
            Instruction::Dup { words, .. } => write!(f, "dup {}", words),
            Instruction::Push { ref value, .. } => match *value {
                Some(ref value) => write!(f, "push {}", value),
                None => write!(f, "push null"),
            },
            Instruction::Return { ref type_, .. } => match *type_ {
                Some(ref type_) => write!(f, "return {}", type_),
                None => write!(f, "return"),
            },
            Instruction::Ifz {
                condition, target, ..
            } => write!(f, "ifz {} {}", condition, target),
            Instruction::If {
                condition, target, ..
            } => write!(f, "if {} {}", condition, target),
            Instruction::New { ref class, .. } => write!(f, "new {}", class),
            Instruction::Get {
                static_, ref field, ..
            } => write!(
                f,
                "get {}{}.{}",
                if static_ { "static " } else { "" },
                field.class(),
                field.name()
            ),
            Instruction::Incr { index, amount, .. } => write!(f, "incr {} {}", index, amount),
            Instruction::Pop { words, .. } => write!(f, "pop {}", words),
            Instruction::Unknown { ref opr, .. } => write!(f, "{}", opr),
        }
    }
}
