//! Program fixtures shared by the crate's tests.
//!
//! `example` builds the `org.example` project: a `Math` class and the
//! `MathTest` and `FunsTest` test classes which exercise it. Scenarios start
//! from it and patch single methods to build the new snapshot.

mod prediction;

use crate::analysis::ai::interpreter::ASSERTIONS_DISABLED;
use crate::il::*;
use std::collections::BTreeMap;

pub const MATH: &str = "org/example/Math";
pub const MATH_TEST: &str = "org/example/MathTest";
pub const FUNS_TEST: &str = "org/example/FunsTest";

const ASSERTION_ERROR: &str = "java/lang/AssertionError";

fn int() -> Option<String> {
    Some("int".to_string())
}

/// A static method of `Math` over `parameters` ints, returning an int.
pub fn math(name: &str, parameters: usize) -> MethodSignature {
    MethodSignature::new(MATH, name, int(), vec!["int".to_string(); parameters])
}

/// A test method.
pub fn test(class: &str, name: &str) -> MethodSignature {
    MethodSignature::new(class, name, None, vec![])
}

pub fn invoke(callee: &MethodSignature) -> Instruction {
    Instruction::invoke(
        InvokeAccess::Static,
        MethodReference::new(
            callee.class_name(),
            callee.name(),
            callee.parameters().to_vec(),
            callee.return_type().map(|r| r.to_string()),
        ),
    )
}

pub fn return_int() -> Instruction {
    Instruction::return_(int())
}

/// `assert` that local `local` compares to zero with `holds`, for a
/// statement starting at offset `at` of a method of `class`.
///
/// The statement is eight instructions long.
pub fn assertion(class: &str, local: usize, holds: Condition, at: usize) -> Vec<Instruction> {
    let end = at + 8;
    vec![
        Instruction::get_static(FieldReference::new(class, ASSERTIONS_DISABLED)),
        Instruction::ifz(Condition::Ne, end),
        Instruction::load(local),
        Instruction::ifz(holds, end),
        Instruction::new_(ASSERTION_ERROR),
        Instruction::dup(1),
        Instruction::invoke(
            InvokeAccess::Special,
            MethodReference::new(ASSERTION_ERROR, "<init>", vec![], None),
        ),
        Instruction::throw(),
    ]
}

/// `assert false; return -x;`
pub fn failing_negate() -> Vec<Instruction> {
    vec![
        Instruction::get_static(FieldReference::new(MATH, ASSERTIONS_DISABLED)),
        Instruction::ifz(Condition::Ne, 6),
        Instruction::new_(ASSERTION_ERROR),
        Instruction::dup(1),
        Instruction::invoke(
            InvokeAccess::Special,
            MethodReference::new(ASSERTION_ERROR, "<init>", vec![], None),
        ),
        Instruction::throw(),
        Instruction::load(0),
        Instruction::negate(),
        return_int(),
    ]
}

/// Builds programs method by method. Classes whose name ends in `Test` are
/// test classes, and their methods named `test*` are test methods.
#[derive(Clone, Debug, Default)]
pub struct ProgramBuilder {
    methods: BTreeMap<MethodSignature, Vec<Instruction>>,
}

impl ProgramBuilder {
    pub fn new() -> ProgramBuilder {
        ProgramBuilder::default()
    }

    /// Add a method, replacing the method with the same signature.
    pub fn method(mut self, signature: MethodSignature, bytecode: Vec<Instruction>) -> ProgramBuilder {
        self.methods.insert(signature, bytecode);
        self
    }

    pub fn without(mut self, signature: &MethodSignature) -> ProgramBuilder {
        self.methods.remove(signature);
        self
    }

    pub fn build(&self) -> Program {
        let mut classes: BTreeMap<&str, Class> = BTreeMap::new();
        for (signature, bytecode) in &self.methods {
            let mut method = Method::new(signature.clone(), bytecode.clone());
            if signature.name().starts_with("test") {
                method = method.with_annotation(TEST_ANNOTATION);
            }
            classes
                .entry(signature.class_name())
                .or_insert_with(|| Class::new(signature.class_name()))
                .add_method(method);
        }

        let mut program = Program::new();
        for (name, class) in classes {
            if name.ends_with("Test") {
                program.add_test_class(class);
            } else {
                program.add_class(class);
            }
        }
        program
    }
}

pub fn negate() -> Vec<Instruction> {
    vec![Instruction::load(0), Instruction::negate(), return_int()]
}

/// `while (b != 0) { int t = b; b = a % b; a = t; } return a;`
pub fn gcd(update: BinaryOperator) -> Vec<Instruction> {
    vec![
        Instruction::load(1),
        Instruction::ifz(Condition::Eq, 11),
        Instruction::load(1),
        Instruction::store(2),
        Instruction::load(0),
        Instruction::load(1),
        Instruction::binary(update),
        Instruction::store(1),
        Instruction::load(2),
        Instruction::store(0),
        Instruction::goto(0),
        Instruction::load(0),
        return_int(),
    ]
}

/// `int x = <setup>; assert x <holds> 0;`
fn check_call(class: &str, setup: Vec<Instruction>, holds: Condition) -> Vec<Instruction> {
    let mut bytecode = setup;
    bytecode.push(Instruction::store(0));
    let at = bytecode.len();
    bytecode.extend(assertion(class, 0, holds, at));
    bytecode.push(Instruction::return_(None));
    bytecode
}

pub fn test_zero(zero: Instruction) -> Vec<Instruction> {
    check_call(FUNS_TEST, vec![zero], Condition::Eq)
}

/// The `org.example` project.
pub fn example() -> ProgramBuilder {
    let negate_sig = math("negate", 1);
    let abs = math("abs", 1);
    let gcd_sig = math("gcd", 2);
    let zero = math("zero", 0);

    ProgramBuilder::new()
        .method(negate_sig.clone(), negate())
        .method(
            abs.clone(),
            vec![
                Instruction::load(0),
                Instruction::ifz(Condition::Ge, 5),
                Instruction::load(0),
                invoke(&negate_sig),
                return_int(),
                Instruction::load(0),
                return_int(),
            ],
        )
        .method(gcd_sig.clone(), gcd(BinaryOperator::Rem))
        .method(
            zero.clone(),
            vec![Instruction::push_int(0), return_int()],
        )
        .method(
            test(MATH_TEST, "testNegate"),
            check_call(
                MATH_TEST,
                vec![Instruction::push_int(3), invoke(&negate_sig)],
                Condition::Lt,
            ),
        )
        .method(
            test(MATH_TEST, "testAbsNegative"),
            check_call(
                MATH_TEST,
                vec![Instruction::push_int(-4), invoke(&abs)],
                Condition::Gt,
            ),
        )
        .method(
            test(MATH_TEST, "testAbsPositive"),
            check_call(
                MATH_TEST,
                vec![Instruction::push_int(5), invoke(&abs)],
                Condition::Gt,
            ),
        )
        .method(test(FUNS_TEST, "testZero"), test_zero(invoke(&zero)))
        .method(
            test(FUNS_TEST, "testGcd"),
            check_call(
                FUNS_TEST,
                vec![
                    Instruction::push_int(12),
                    Instruction::push_int(8),
                    invoke(&gcd_sig),
                ],
                Condition::Ge,
            ),
        )
        // if (Math.negate(1) > 0) Math.gcd(4, 2);
        .method(
            test(FUNS_TEST, "testGuardedGcd"),
            vec![
                Instruction::push_int(1),
                invoke(&negate_sig),
                Instruction::ifz(Condition::Le, 7),
                Instruction::push_int(4),
                Instruction::push_int(2),
                invoke(&gcd_sig),
                Instruction::pop(1),
                Instruction::return_(None),
            ],
        )
}
