use crate::syntax::{position::Position, statement::Statement};

use super::Parser;

fn parse(input: &str) -> String {
    match Parser::parse_source(input, "test") {
        Ok(program) => program.to_string(),
        Err(err) => panic!("{}", err),
    }
}

#[test]
fn operator_precedence() {
    assert_eq!(parse("a + b * c"), "(a + (b * c))");
    assert_eq!(parse("a || b && c == d"), "(a || (b && (c == d)))");
    assert_eq!(parse("-a.b[1]"), "(-(a.b[1]))");
    assert_eq!(parse("a << 1 + b"), "((a << 1) + b)");
}

#[test]
fn ternary_is_right_associative() {
    assert_eq!(parse("a ? b : c ? d : e"), "(a ? b : (c ? d : e))");
}

#[test]
fn statements_separated_by_newlines() {
    assert_eq!(parse("x := 1\nx += 2\nx++"), "x := 1; x += 2; x++");
}

#[test]
fn call_with_spread_and_trailing_newline() {
    assert_eq!(parse("f(a,\n  b...\n)"), "f(a, b...)");
}

#[test]
fn map_literal_spanning_lines() {
    assert_eq!(parse("m := {\n  a: 1,\n  \"b\": 2\n}"), "m := {a: 1, b: 2}");
}

#[test]
fn function_literal_with_variadic_parameter() {
    assert_eq!(
        parse("f := func(a, ...rest) { return rest }"),
        "f := func(a, ...rest) { return rest; }"
    );
}

#[test]
fn slices_and_selectors() {
    assert_eq!(parse("a[1:2]"), "(a[1:2])");
    assert_eq!(parse("a[:n]"), "(a[:n])");
    assert_eq!(parse("a[n:]"), "(a[n:])");
}

#[test]
fn for_loop_forms() {
    let program = Parser::parse_source(
        "for {}\nfor x < 3 {}\nfor i := 0; i < 3; i++ {}\nfor v in xs {}\nfor k, v in m {}",
        "test",
    )
    .unwrap();
    assert_eq!(program.statements.len(), 5);
    assert!(matches!(
        program.statements[0],
        Statement::For {
            condition: None,
            ..
        }
    ));
    assert!(matches!(
        program.statements[2],
        Statement::For {
            init: Some(_),
            post: Some(_),
            ..
        }
    ));
    match &program.statements[3] {
        Statement::ForIn { key, value, .. } => {
            assert_eq!(key, "_");
            assert_eq!(value, "v");
        }
        other => panic!("expected for-in, got {other:?}"),
    }
}

#[test]
fn else_if_chain() {
    assert_eq!(
        parse("if a { x } else if b { y } else { z }"),
        "if a { x; } else if b { y; } else { z; }"
    );
}

#[test]
fn binary_expression_reports_left_operand_position() {
    let program = Parser::parse_source("\n\tif ctx.n < 0 {}", "test").unwrap();
    let Statement::If { condition, .. } = &program.statements[0] else {
        panic!("expected if");
    };
    assert_eq!(condition.position(), Position::new(2, 5));
}

#[test]
fn reports_error_position() {
    let err = Parser::parse_source("a := 1\nb := )", "main").unwrap_err();
    let first = err.first().unwrap();
    assert_eq!(first.position, Position::new(2, 6));
    assert!(err.to_string().starts_with("Parse Error: unexpected ')'"));
    assert!(err.to_string().contains("main:2:6"));
}

#[test]
fn rejects_assignment_to_call() {
    let err = Parser::parse_source("f() = 1", "main").unwrap_err();
    assert!(err.to_string().contains("cannot assign to f()"));
}
