use super::*;
use crate::analysis::{build_call_graph, changed_offsets};
use crate::prediction::{AbstractPredictor, CallGraphPredictor, TestPredictor};
use std::collections::BTreeSet;

fn tests(names: &[(&str, &str)]) -> BTreeSet<MethodSignature> {
    names.iter().map(|&(class, name)| test(class, name)).collect()
}

/// Predictions of the call graph, sign and interval predictors.
fn predict_all(old: &Program, new: &Program) -> Vec<BTreeSet<MethodSignature>> {
    vec![
        CallGraphPredictor::new().predict(old, new).unwrap(),
        AbstractPredictor::sign().predict(old, new).unwrap(),
        AbstractPredictor::interval().predict(old, new).unwrap(),
    ]
}

#[test]
fn unchanged_program() {
    let program = example().build();
    for predictions in predict_all(&program, &program) {
        assert!(predictions.is_empty());
    }
}

#[test]
fn new_tests_are_predicted() {
    let old = example().without(&test(FUNS_TEST, "testZero")).build();
    let new = example().build();

    let expected = tests(&[(FUNS_TEST, "testZero")]);
    for predictions in predict_all(&old, &new) {
        assert_eq!(predictions, expected);
    }
}

#[test]
fn negate_fails_assertion() {
    let old = example().build();
    let new = example().method(math("negate", 1), failing_negate()).build();

    let reaching_negate = tests(&[
        (MATH_TEST, "testNegate"),
        (MATH_TEST, "testAbsNegative"),
        (MATH_TEST, "testAbsPositive"),
        (FUNS_TEST, "testGuardedGcd"),
    ]);
    assert_eq!(
        CallGraphPredictor::new().predict(&old, &new).unwrap(),
        reaching_negate
    );

    // abs(5) never calls negate
    let executing_negate = tests(&[
        (MATH_TEST, "testNegate"),
        (MATH_TEST, "testAbsNegative"),
        (FUNS_TEST, "testGuardedGcd"),
    ]);
    let sign = AbstractPredictor::sign().predict(&old, &new).unwrap();
    let interval = AbstractPredictor::interval().predict(&old, &new).unwrap();
    assert_eq!(sign, executing_negate);
    assert_eq!(interval, executing_negate);
    assert!(!sign.contains(&test(FUNS_TEST, "testZero")));
}

#[test]
fn gcd_update_changed() {
    let old = example().build();
    let new = example()
        .method(math("gcd", 2), gcd(BinaryOperator::Sub))
        .build();

    let changed = changed_offsets(
        old.method(&math("gcd", 2)).unwrap().bytecode(),
        new.method(&math("gcd", 2)).unwrap().bytecode(),
    );
    assert_eq!(changed, vec![6].into_iter().collect::<BTreeSet<usize>>());

    assert_eq!(
        CallGraphPredictor::new().predict(&old, &new).unwrap(),
        tests(&[(FUNS_TEST, "testGcd"), (FUNS_TEST, "testGuardedGcd")])
    );

    // negate(1) > 0 never holds, so testGuardedGcd never reaches gcd
    let expected = tests(&[(FUNS_TEST, "testGcd")]);
    assert_eq!(AbstractPredictor::sign().predict(&old, &new).unwrap(), expected);
    assert_eq!(
        AbstractPredictor::interval().predict(&old, &new).unwrap(),
        expected
    );
}

#[test]
fn removed_method() {
    let zero = math("zero", 0);
    let old = example().build();
    let new = example()
        .without(&zero)
        .method(test(FUNS_TEST, "testZero"), test_zero(Instruction::push_int(0)))
        .build();

    let call_graph = build_call_graph(&old).unwrap();
    let reaching_zero = old
        .all_test_methods()
        .map(|(_, method)| method.signature())
        .filter(|signature| call_graph.reachable(signature).unwrap().contains(&&zero))
        .cloned()
        .collect::<BTreeSet<MethodSignature>>();
    assert_eq!(reaching_zero, tests(&[(FUNS_TEST, "testZero")]));

    for predictions in predict_all(&old, &new) {
        assert_eq!(predictions, reaching_zero);
    }
}

#[test]
fn new_method_behind_new_call() {
    // negate now delegates to a new method
    let flip = math("flip", 1);
    let old = example().build();
    let new = example()
        .method(
            math("negate", 1),
            vec![Instruction::load(0), invoke(&flip), return_int()],
        )
        .method(flip.clone(), negate())
        .build();

    assert!(!build_call_graph(&old).unwrap().contains(&flip));

    assert_eq!(
        CallGraphPredictor::new().predict(&old, &new).unwrap(),
        tests(&[
            (MATH_TEST, "testNegate"),
            (MATH_TEST, "testAbsNegative"),
            (MATH_TEST, "testAbsPositive"),
            (FUNS_TEST, "testGuardedGcd"),
        ])
    );

    let expected = tests(&[
        (MATH_TEST, "testNegate"),
        (MATH_TEST, "testAbsNegative"),
        (FUNS_TEST, "testGuardedGcd"),
    ]);
    assert_eq!(AbstractPredictor::sign().predict(&old, &new).unwrap(), expected);
    assert_eq!(
        AbstractPredictor::interval().predict(&old, &new).unwrap(),
        expected
    );
}

#[test]
fn unanalysable_candidates_are_predicted() {
    let zero = math("zero", 0);
    let print = test(FUNS_TEST, "testPrint");
    let print_body = vec![
        Instruction::push_int(1),
        Instruction::invoke(
            InvokeAccess::Virtual,
            MethodReference::new("java/io/PrintStream", "println", vec!["int".to_string()], None),
        ),
        invoke(&zero),
        Instruction::pop(1),
        Instruction::return_(None),
    ];

    let old = example().method(print.clone(), print_body.clone()).build();
    let new = example()
        .method(print, print_body)
        .method(zero, vec![Instruction::push_int(1), return_int()])
        .build();

    let expected = tests(&[(FUNS_TEST, "testZero"), (FUNS_TEST, "testPrint")]);
    for predictions in predict_all(&old, &new) {
        assert_eq!(predictions, expected);
    }
}
