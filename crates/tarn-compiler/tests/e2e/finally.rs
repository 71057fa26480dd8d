//! Try/finally splicing tests
//!
//! Every exit from a protected region must run the finally code exactly
//! once: normal completion, return, break, continue, and exceptions.

use super::harness::*;
use tarn_ast::build::*;
use tarn_ast::*;

fn strict_eq(left: Expression, right: Expression) -> Expression {
    binary(BinaryOp::StrictEq, left, right)
}

// ============================================================================
// Normal completion and return
// ============================================================================

#[test]
fn test_normal_completion_runs_finally() {
    let outcome = expect_same_behavior(function(
        "f",
        &[],
        vec![
            var("r", Some(num(0.0))),
            try_finally(
                vec![expr_stmt(assign("r", num(40.0)))],
                vec![expr_stmt(assign("r", binary(BinaryOp::Add, ident("r"), num(2.0))))],
            ),
            ret(Some(ident("r"))),
        ],
    ));
    assert_eq!(outcome.returned(), &Value::Number(42.0));
}

#[test]
fn test_return_runs_finally_once() {
    let outcome = expect_same_behavior(function(
        "f",
        &[],
        vec![try_finally(
            vec![
                expr_stmt(call("log", vec![string("body")])),
                ret(Some(call("sideEffect", vec![]))),
            ],
            vec![expr_stmt(call("log", vec![string("finally")]))],
        )],
    ));
    assert_eq!(outcome.returned(), &Value::Number(1.0));
    assert_eq!(outcome.log, vec!["body", "finally"]);
    assert_eq!(outcome.side_effects, 1);
}

#[test]
fn test_finally_return_overrides_return() {
    let outcome = expect_same_behavior(function(
        "f",
        &[],
        vec![try_finally(vec![ret(Some(num(1.0)))], vec![ret(Some(num(2.0)))])],
    ));
    assert_eq!(outcome.returned(), &Value::Number(2.0));
}

#[test]
fn test_return_value_captured_before_finally() {
    // try { return counter++; } finally { counter = 100; }
    let outcome = expect_same_behavior(function(
        "f",
        &[],
        vec![
            var("counter", Some(num(5.0))),
            try_finally(
                vec![ret(Some(post_increment("counter")))],
                vec![expr_stmt(assign("counter", num(100.0)))],
            ),
        ],
    ));
    assert_eq!(outcome.returned(), &Value::Number(5.0));
}

#[test]
fn test_terminal_finally_skips_return_value() {
    // try { return sideEffect(); } finally { throw new Error("finally"); }
    let func = function(
        "f",
        &[],
        vec![try_finally(
            vec![ret(Some(call("sideEffect", vec![])))],
            vec![throw(new_expr("Error", vec![string("finally")]))],
        )],
    );
    let lowered = lower(func);
    assert_lowered_shape(&lowered);

    let outcome = run(&lowered);
    assert_eq!(outcome.side_effects, 0);
    assert_eq!(outcome.thrown(), &Value::Error("finally".into()));
}

#[test]
fn test_return_slot_reference_is_not_captured() {
    // `return :return` counts as trivial, so the finally code runs before
    // the slot is read again and its assignment wins
    let func = function(
        "f",
        &[],
        vec![try_finally(
            vec![
                expr_stmt(assign_to(name_ref(Name::Return), num(1.0))),
                ret(Some(name_ref(Name::Return))),
            ],
            vec![expr_stmt(assign_to(name_ref(Name::Return), num(2.0)))],
        )],
    );
    assert_eq!(run(&func).returned(), &Value::Number(1.0));

    let lowered = lower(func);
    assert_lowered_shape(&lowered);
    assert_eq!(run(&lowered).returned(), &Value::Number(2.0));
}

// ============================================================================
// Break and continue
// ============================================================================

#[test]
fn test_break_runs_finally() {
    let outcome = expect_same_behavior(function(
        "f",
        &[],
        vec![
            var("i", Some(num(0.0))),
            while_loop(
                boolean(true),
                vec![try_finally(
                    vec![
                        if_stmt(strict_eq(ident("i"), num(3.0)), vec![brk(None)], None),
                        expr_stmt(post_increment("i")),
                    ],
                    vec![expr_stmt(call("log", vec![string("f"), ident("i")]))],
                )],
            ),
            ret(Some(ident("i"))),
        ],
    ));
    assert_eq!(outcome.returned(), &Value::Number(3.0));
    assert_eq!(outcome.log, vec!["f 1", "f 2", "f 3", "f 3"]);
}

#[test]
fn test_continue_to_outer_label_runs_finally() {
    let inner = for_loop(
        Some(for_var("j", num(0.0))),
        Some(binary(BinaryOp::Lt, ident("j"), num(2.0))),
        Some(post_increment("j")),
        vec![try_finally(
            vec![
                if_stmt(strict_eq(ident("j"), num(1.0)), vec![cont(Some("outer"))], None),
                expr_stmt(call("log", vec![ident("i"), ident("j")])),
            ],
            vec![expr_stmt(call("log", vec![string("fin"), ident("i"), ident("j")]))],
        )],
    );
    let outer = label(
        "outer",
        for_loop(
            Some(for_var("i", num(0.0))),
            Some(binary(BinaryOp::Lt, ident("i"), num(2.0))),
            Some(post_increment("i")),
            vec![inner],
        ),
    );
    let outcome = expect_same_behavior(function("f", &[], vec![outer, ret(Some(string("done")))]));
    assert_eq!(outcome.log, vec!["0 0", "fin 0 0", "fin 0 1", "1 0", "fin 1 0", "fin 1 1"]);
}

#[test]
fn test_break_inside_switch_is_not_an_exit() {
    let func = function(
        "f",
        &[],
        vec![for_loop(
            Some(for_var("i", num(0.0))),
            Some(binary(BinaryOp::Lt, ident("i"), num(1.0))),
            Some(post_increment("i")),
            vec![try_finally(
                vec![
                    switch(
                        ident("i"),
                        vec![(Some(num(0.0)), vec![expr_stmt(call("log", vec![string("zero")])), brk(None)])],
                    ),
                    expr_stmt(call("log", vec![string("after")])),
                ],
                vec![expr_stmt(call("log", vec![string("f")]))],
            )],
        )],
    );
    let outcome = expect_same_behavior(func.clone());
    assert_eq!(outcome.log, vec!["zero", "after", "f"]);

    let lowered = lower(func);
    let Statement::For(stmt) = &lowered.body.statements[0] else {
        panic!("expected for loop");
    };
    let Statement::Try(try_stmt) = &stmt.body.statements[0] else {
        panic!("expected spliced try");
    };
    assert!(try_stmt.inlined_finallies.is_empty());
}

// ============================================================================
// Exceptions
// ============================================================================

#[test]
fn test_uncaught_exception_runs_finally() {
    let outcome = expect_same_behavior(function(
        "f",
        &[],
        vec![try_finally(
            vec![expr_stmt(call("fail", vec![string("boom")]))],
            vec![expr_stmt(call("log", vec![string("cleanup")]))],
        )],
    ));
    assert_eq!(outcome.thrown(), &Value::Error("boom".into()));
    assert_eq!(outcome.log, vec!["cleanup"]);
}

#[test]
fn test_catch_then_finally() {
    let outcome = expect_same_behavior(function(
        "f",
        &[],
        vec![
            try_stmt(
                vec![throw(new_expr("Error", vec![string("x")]))],
                vec![catch_clause("e", None, vec![expr_stmt(call("log", vec![string("caught"), ident("e")]))])],
                Some(vec![expr_stmt(call("log", vec![string("finally")]))]),
            ),
            ret(Some(num(1.0))),
        ],
    ));
    assert_eq!(outcome.returned(), &Value::Number(1.0));
    assert_eq!(outcome.log, vec!["caught Error: x", "finally"]);
}

#[test]
fn test_exception_in_catch_runs_finally() {
    let outcome = expect_same_behavior(function(
        "f",
        &[],
        vec![try_stmt(
            vec![expr_stmt(call("fail", vec![string("a")]))],
            vec![catch_clause("e", None, vec![expr_stmt(call("fail", vec![string("b")]))])],
            Some(vec![expr_stmt(call("log", vec![string("finally")]))]),
        )],
    ));
    assert_eq!(outcome.thrown(), &Value::Error("b".into()));
    assert_eq!(outcome.log, vec!["finally"]);
}

#[test]
fn test_guarded_catch_miss_runs_finally() {
    let outcome = expect_same_behavior(function(
        "f",
        &[],
        vec![try_stmt(
            vec![expr_stmt(call("fail", vec![string("a")]))],
            vec![catch_clause("e", Some(boolean(false)), vec![expr_stmt(call("log", vec![string("guarded")]))])],
            Some(vec![expr_stmt(call("log", vec![string("finally")]))]),
        )],
    ));
    assert_eq!(outcome.thrown(), &Value::Error("a".into()));
    assert_eq!(outcome.log, vec!["finally"]);
}

#[test]
fn test_exception_in_inlined_finally_is_not_caught_again() {
    let outcome = expect_same_behavior(function(
        "f",
        &[],
        vec![try_finally(
            vec![ret(Some(num(1.0)))],
            vec![
                expr_stmt(call("log", vec![string("f")])),
                expr_stmt(call("fail", vec![string("in finally")])),
            ],
        )],
    ));
    assert_eq!(outcome.thrown(), &Value::Error("in finally".into()));
    assert_eq!(outcome.log, vec!["f"]);
}

// ============================================================================
// Nesting
// ============================================================================

#[test]
fn test_nested_finally_order() {
    let outcome = expect_same_behavior(function(
        "f",
        &[],
        vec![try_finally(
            vec![try_finally(
                vec![ret(Some(num(1.0)))],
                vec![expr_stmt(call("log", vec![string("inner")]))],
            )],
            vec![expr_stmt(call("log", vec![string("outer")]))],
        )],
    ));
    assert_eq!(outcome.returned(), &Value::Number(1.0));
    assert_eq!(outcome.log, vec!["inner", "outer"]);
}

#[test]
fn test_try_inside_finally() {
    let outcome = expect_same_behavior(function(
        "f",
        &[],
        vec![try_finally(
            vec![ret(Some(call("sideEffect", vec![])))],
            vec![try_finally(
                vec![expr_stmt(call("log", vec![string("a")]))],
                vec![expr_stmt(call("log", vec![string("b")]))],
            )],
        )],
    ));
    assert_eq!(outcome.returned(), &Value::Number(1.0));
    assert_eq!(outcome.log, vec!["a", "b"]);
}

#[test]
fn test_copies_share_no_synthetic_names() {
    // Two exits plus the catch-all copy the inner try three times; the shape
    // check rejects any label or exception binding seen twice
    let func = function(
        "f",
        &["x"],
        vec![try_finally(
            vec![
                if_stmt(ident("x"), vec![ret(Some(num(1.0)))], None),
                ret(Some(num(2.0))),
            ],
            vec![try_finally(
                vec![expr_stmt(call("log", vec![string("a")]))],
                vec![expr_stmt(call("log", vec![string("b")]))],
            )],
        )],
    );
    let outcome = expect_same_behavior(func);
    assert_eq!(outcome.returned(), &Value::Number(2.0));
}
