use crate::runtime::value::Value;

use super::test_support::{run_err, run_ok, run_with};

fn array(items: Vec<Value>) -> Value {
    Value::array(items)
}

#[test]
fn arithmetic_follows_precedence() {
    assert_eq!(run_ok("out = 1 + 2 * 3 - 8 / 4"), Value::Int(5));
    assert_eq!(run_ok("out = 7 % 3 + (1 << 4)"), Value::Int(17));
    assert_eq!(run_ok("out = 1.5 + 1"), Value::Float(2.5));
}

#[test]
fn integer_arithmetic_wraps() {
    assert_eq!(
        run_ok("out = 9223372036854775807 + 1"),
        Value::Int(i64::MIN)
    );
}

#[test]
fn string_concatenation_uses_text_form() {
    assert_eq!(run_ok(r#"out = "a" + 1 + 'b'"#), Value::string("a1b"));
}

#[test]
fn char_arithmetic_yields_chars() {
    assert_eq!(run_ok("out = 'a' + 1"), Value::Char('b'));
}

#[test]
fn logical_operators_return_deciding_operand() {
    assert_eq!(run_ok(r#"out = 0 || "x""#), Value::string("x"));
    assert_eq!(run_ok("out = 1 && 0"), Value::Int(0));
    assert_eq!(run_ok("out = !0"), Value::Bool(true));
}

#[test]
fn equality_is_structural_for_containers() {
    assert_eq!(run_ok("out = [1, {a: 2}] == [1, {a: 2}]"), Value::Bool(true));
    assert_eq!(run_ok(r#"out = 1 == "1""#), Value::Bool(false));
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    assert!(run_err("out = 5 / 0").contains("division by zero"));
}

#[test]
fn closures_share_captured_variables() {
    let source = "
counter := func() {
	n := 0
	return func() {
		n += 1
		return n
	}
}
c := counter()
c()
c()
out = c()
";
    assert_eq!(run_ok(source), Value::Int(3));
}

#[test]
fn inner_writes_are_visible_to_the_enclosing_function() {
    let source = "
f := func() {
	x := 1
	g := func() { x = 5 }
	g()
	return x
}
out = f()
";
    assert_eq!(run_ok(source), Value::Int(5));
}

#[test]
fn for_in_variables_are_fresh_per_iteration() {
    let source = "
f := func() {
	fns := []
	for v in [1, 2, 3] {
		fns = append(fns, func() { return v })
	}
	return fns[0]() + fns[2]()
}
out = f()
";
    assert_eq!(run_ok(source), Value::Int(4));
}

#[test]
fn for_in_over_map_walks_sorted_keys() {
    let source = r#"
s := ""
for k, v in {b: 2, a: 1} {
	s += k + string(v)
}
out = s
"#;
    assert_eq!(run_ok(source), Value::string("a1b2"));
}

#[test]
fn break_and_continue() {
    let source = "
sum := 0
for i := 0; i < 10; i++ {
	if i == 5 {
		break
	}
	if i % 2 == 0 {
		continue
	}
	sum += i
}
out = sum
";
    assert_eq!(run_ok(source), Value::Int(4));
}

#[test]
fn conditional_loops_and_else_if() {
    let source = "
n := 0
for n < 3 {
	n++
}
if n == 1 {
	out = \"one\"
} else if n == 3 {
	out = \"three\"
} else {
	out = \"other\"
}
";
    assert_eq!(run_ok(source), Value::string("three"));
}

#[test]
fn error_values_expose_their_payload() {
    let source = r#"
e := error("boom")
out = [is_error(e), e.value, !e]
"#;
    assert_eq!(
        run_ok(source),
        array(vec![Value::Bool(true), Value::string("boom"), Value::Bool(true)])
    );
}

#[test]
fn missing_map_keys_are_undefined() {
    assert!(run_ok("m := {a: 1}\nout = m.b").is_undefined());
    assert!(run_ok("out = undefined.x").is_undefined());
}

#[test]
fn index_assignment_mutates_in_place() {
    let source = "
a := [1, 2]
b := a
b[0] = 9
m := {}
m.k = a[0]
m[\"k\"] += 1
out = [a[0], m.k]
";
    assert_eq!(run_ok(source), array(vec![Value::Int(9), Value::Int(10)]));
}

#[test]
fn slices() {
    assert_eq!(
        run_ok("out = [1, 2, 3, 4][1:3]"),
        array(vec![Value::Int(2), Value::Int(3)])
    );
    assert_eq!(run_ok(r#"out = "hello"[1:]"#), Value::string("ello"));
    assert_eq!(run_ok(r#"out = "hello"[:2]"#), Value::string("he"));
}

#[test]
fn recursion_through_globals_and_locals() {
    assert_eq!(
        run_ok("fib := func(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2) }\nout = fib(15)"),
        Value::Int(610)
    );
    let source = "
f := func() {
	g := func(n) { return n == 0 ? 0 : n + g(n - 1) }
	return g(4)
}
out = f()
";
    assert_eq!(run_ok(source), Value::Int(10));
}

#[test]
fn unbounded_recursion_overflows() {
    assert!(run_err("f := func() { return f() }\nf()").contains("stack overflow"));
}

#[test]
fn allocation_budget_is_enforced() {
    let source = "a := [1]\nb := [2]\nc := [3]";
    let err = run_with(source, &[], 2).unwrap_err();
    assert!(err.to_string().contains("allocation limit exceeded"));
    assert!(run_with(source, &[], 3).is_ok());
}

#[test]
fn module_free_globals_are_readable_and_writable() {
    let out = run_with("count += 1\nout = count", &[("count", Value::Int(41))], -1).unwrap();
    assert_eq!(out, Value::Int(42));
}
