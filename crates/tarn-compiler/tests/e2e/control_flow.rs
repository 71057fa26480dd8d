//! Loop, switch, label and dead-code tests

use super::harness::*;
use tarn_ast::build::*;
use tarn_ast::*;

fn log(message: &str) -> Statement {
    expr_stmt(call("log", vec![string(message)]))
}

// ============================================================================
// Loops
// ============================================================================

#[test]
fn test_endless_loop_with_break() {
    let outcome = expect_same_behavior(function(
        "f",
        &[],
        vec![
            while_loop(
                boolean(true),
                vec![if_stmt(
                    binary(BinaryOp::Gt, call("sideEffect", vec![]), num(4.0)),
                    vec![brk(None)],
                    None,
                )],
            ),
            ret(Some(call("sideEffect", vec![]))),
        ],
    ));
    assert_eq!(outcome.returned(), &Value::Number(6.0));
}

#[test]
fn test_labeled_break_out_of_nested_endless_loops() {
    // outer: while (true) { while (true) { break outer; } }
    let func = function(
        "f",
        &[],
        vec![
            label(
                "outer",
                while_loop(
                    boolean(true),
                    vec![while_loop(boolean(true), vec![log("inner"), brk(Some("outer"))])],
                ),
            ),
            ret(Some(string("after"))),
        ],
    );
    let outcome = expect_same_behavior(func);
    assert_eq!(outcome.returned(), &Value::Str("after".into()));
    assert_eq!(outcome.log, vec!["inner"]);
}

#[test]
fn test_do_while_runs_body_once() {
    let outcome = expect_same_behavior(function(
        "f",
        &[],
        vec![
            do_while(vec![expr_stmt(call("sideEffect", vec![]))], boolean(false)),
            ret(Some(call("sideEffect", vec![]))),
        ],
    ));
    assert_eq!(outcome.returned(), &Value::Number(2.0));
}

#[test]
fn test_continue_in_classic_for() {
    let outcome = expect_same_behavior(function(
        "f",
        &[],
        vec![for_loop(
            Some(for_var("i", num(0.0))),
            Some(binary(BinaryOp::Lt, ident("i"), num(4.0))),
            Some(post_increment("i")),
            vec![
                if_stmt(
                    binary(BinaryOp::StrictEq, binary(BinaryOp::Mod, ident("i"), num(2.0)), num(0.0)),
                    vec![cont(None)],
                    None,
                ),
                expr_stmt(call("log", vec![ident("i")])),
            ],
        )],
    ));
    assert_eq!(outcome.log, vec!["1", "3"]);
}

// ============================================================================
// Switch
// ============================================================================

#[test]
fn test_string_switch_falls_through() {
    let outcome = expect_same_behavior(function(
        "f",
        &[],
        vec![switch(
            string("b"),
            vec![
                (Some(string("a")), vec![log("a")]),
                (Some(string("b")), vec![log("b")]),
                (Some(string("c")), vec![log("c"), brk(None)]),
                (None, vec![log("default")]),
            ],
        )],
    ));
    assert_eq!(outcome.log, vec!["b", "c"]);
}

#[test]
fn test_switch_discriminant_evaluated_once() {
    let outcome = expect_same_behavior(function(
        "f",
        &[],
        vec![
            switch(
                call("sideEffect", vec![]),
                vec![
                    (Some(string("x")), vec![log("x")]),
                    (Some(num(1.5)), vec![log("one and a half")]),
                    (None, vec![log("default")]),
                ],
            ),
            ret(Some(call("sideEffect", vec![]))),
        ],
    ));
    assert_eq!(outcome.log, vec!["default"]);
    assert_eq!(outcome.returned(), &Value::Number(2.0));
}

#[test]
fn test_terminal_switch_prunes_following_code() {
    let func = function(
        "f",
        &["x"],
        vec![
            switch(
                ident("x"),
                vec![(Some(num(1.0)), vec![ret(Some(num(1.0)))]), (None, vec![ret(Some(num(2.0)))])],
            ),
            log("unreachable"),
        ],
    );
    let outcome = expect_same_behavior(func.clone());
    assert_eq!(outcome.returned(), &Value::Number(2.0));

    let lowered = lower(func);
    assert_eq!(lowered.body.statements.len(), 1);
    assert!(lowered.body.is_terminal);
}

// ============================================================================
// Labels and dead code
// ============================================================================

#[test]
fn test_break_out_of_labeled_block() {
    let outcome = expect_same_behavior(function(
        "f",
        &[],
        vec![
            label("done", block_stmt(vec![log("1"), brk(Some("done")), log("2")])),
            log("3"),
        ],
    ));
    assert_eq!(outcome.log, vec!["1", "3"]);
}

#[test]
fn test_hoisted_declaration_survives_pruning() {
    // x = 1; return x; var x; log("dead")
    let func = function(
        "f",
        &[],
        vec![
            expr_stmt(assign("x", num(1.0))),
            ret(Some(ident("x"))),
            var("x", Some(num(5.0))),
            log("dead"),
        ],
    );
    let outcome = expect_same_behavior(func.clone());
    assert_eq!(outcome.returned(), &Value::Number(1.0));
    assert!(outcome.log.is_empty());

    let lowered = lower(func);
    assert_eq!(lowered.body.statements.len(), 3);
    assert!(lowered.body.statements[2].is_uninitialized_var());
    assert!(lowered.body.symbol(&Name::user("x")).is_some());
}

#[test]
fn test_constant_false_branch_keeps_binding() {
    // x = 1; if (false) { var x = 5; log("dead") } else { log("live") } return x;
    let func = function(
        "f",
        &[],
        vec![
            expr_stmt(assign("x", num(1.0))),
            if_stmt(boolean(false), vec![var("x", Some(num(5.0))), log("dead")], Some(vec![log("live")])),
            ret(Some(ident("x"))),
        ],
    );
    let outcome = expect_same_behavior(func.clone());
    assert_eq!(outcome.returned(), &Value::Number(1.0));
    assert_eq!(outcome.log, vec!["live"]);

    let lowered = lower(func);
    assert!(lowered.body.statements.iter().all(|stmt| !matches!(stmt, Statement::If(_))));
    assert!(lowered.body.symbol(&Name::user("x")).is_some());
}
