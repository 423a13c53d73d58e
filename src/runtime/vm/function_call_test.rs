use crate::runtime::value::Value;

use super::test_support::{run_err, run_ok, run_with};

#[test]
fn variadic_parameters_collect_the_rest() {
    let source = "
f := func(a, ...rest) { return [a, rest] }
out = f(1, 2, 3)
";
    assert_eq!(
        run_ok(source),
        Value::array(vec![
            Value::Int(1),
            Value::array(vec![Value::Int(2), Value::Int(3)])
        ])
    );
}

#[test]
fn variadic_tail_may_be_empty() {
    assert_eq!(
        run_ok("f := func(...xs) { return len(xs) }\nout = f()"),
        Value::Int(0)
    );
}

#[test]
fn spread_arguments_expand_an_array() {
    let source = "
f := func(a, ...rest) { return len(rest) + a }
out = f(10, [1, 2, 3]...)
";
    assert_eq!(run_ok(source), Value::Int(13));
}

#[test]
fn arity_is_checked() {
    assert!(
        run_err("f := func(a) { return a }\nout = f(1, 2)")
            .contains("wrong number of arguments: want=1, got=2")
    );
    assert!(
        run_err("f := func(a, b, ...c) { return a }\nout = f(1)")
            .contains("wrong number of arguments: want>=2, got=1")
    );
}

#[test]
fn calling_a_non_function_fails() {
    assert!(run_err("x := 1\nx()").contains("not callable: int"));
}

#[test]
fn functions_without_return_yield_undefined() {
    assert!(run_ok("f := func() { x := 1 }\nout = f()").is_undefined());
}

#[test]
fn host_functions_are_called_with_script_arguments() {
    let add = Value::host_fn("add", |args: &[Value]| {
        let sum = args
            .iter()
            .map(|v| match v {
                Value::Int(n) => *n,
                _ => 0,
            })
            .sum();
        Ok(Value::Int(sum))
    });
    let out = run_with("out = add(1, 2, [3, 4]...)", &[("add", add)], -1).unwrap();
    assert_eq!(out, Value::Int(10));
}

#[test]
fn host_function_errors_become_runtime_errors() {
    let fail = Value::host_fn("fail", |_: &[Value]| {
        Err(crate::runtime::error::RuntimeError::custom("host failure"))
    });
    let err = run_with("fail()", &[("fail", fail)], -1).unwrap_err();
    assert!(err.to_string().contains("host failure"));
}

#[test]
fn deep_but_bounded_recursion_succeeds() {
    let source = "
sum := func(n) { return n == 0 ? 0 : n + sum(n - 1) }
out = sum(500)
";
    assert_eq!(run_ok(source), Value::Int(125250));
}
