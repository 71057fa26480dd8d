//! Script (program) completion value tests

use super::harness::*;
use tarn_ast::build::*;
use tarn_ast::*;

#[test]
fn test_script_returns_last_expression() {
    let outcome = expect_same_behavior(program(vec![
        expr_stmt(num(1.0)),
        var("x", Some(num(2.0))),
        expr_stmt(binary(BinaryOp::Add, ident("x"), num(3.0))),
    ]));
    assert_eq!(outcome.returned(), &Value::Number(5.0));
}

#[test]
fn test_script_branch_completion() {
    let outcome = expect_same_behavior(program(vec![
        var("x", Some(num(1.0))),
        if_stmt(ident("x"), vec![expr_stmt(string("yes"))], Some(vec![expr_stmt(string("no"))])),
    ]));
    assert_eq!(outcome.returned(), &Value::Str("yes".into()));
}

#[test]
fn test_script_throw() {
    let outcome = expect_same_behavior(program(vec![
        expr_stmt(num(1.0)),
        throw(new_expr("Error", vec![string("stop")])),
        expr_stmt(num(2.0)),
    ]));
    assert_eq!(outcome.thrown(), &Value::Error("stop".into()));
}

#[test]
fn test_script_declares_return_slot() {
    let lowered = lower(program(vec![throw(num(1.0))]));
    assert!(lowered.flags.needs_return_slot);
    assert!(lowered.body.symbol(&Name::Return).is_some());
}
