use std::{collections::BTreeMap, fmt::Write};

use rill::{Error, HostValue, RuntimeError, Script, Value};

fn compile_run(source: &str, vars: &[(&str, HostValue)]) -> rill::Compiled {
    let mut script = Script::new(source);
    for (name, value) in vars {
        script.add(name, value.clone()).unwrap();
    }
    script.compile_run().unwrap_or_else(|err| panic!("{}", err))
}

#[test]
fn add_replaces_pending_values() {
    let mut script = Script::new("a := b; c := inc(b); d := inc(5)");
    script.add("b", 5).unwrap();
    script.add("b", "foo").unwrap();
    let inc = Value::host_fn("inc", |args: &[Value]| match args.first() {
        Some(Value::Int(v)) => Ok(Value::Int(v + 1)),
        _ => Ok(Value::Int(0)),
    });
    script.add("inc", inc).unwrap();

    let compiled = script.compile_run().unwrap();
    assert_eq!(compiled.get("a").value(), HostValue::from("foo"));
    assert_eq!(compiled.get("b").value(), HostValue::from("foo"));
    assert_eq!(compiled.get("c").int64(), 0);
    assert_eq!(compiled.get("d").int64(), 6);
}

#[test]
fn removed_variables_are_unresolved() {
    let mut script = Script::new("a := b");
    script.add("b", 5).unwrap();
    assert!(script.remove("b"));
    assert!(!script.remove("b"));

    let err = script.compile_run().unwrap_err();
    assert!(matches!(err, Error::Compile(_)));
    assert!(err.to_string().contains("unresolved reference 'b'"), "{}", err);
}

#[test]
fn reserved_name_is_rejected() {
    let mut script = Script::new("");
    assert!(matches!(script.add("$out", 1), Err(Error::ReservedName(_))));
}

#[test]
fn compile_run_is_repeatable() {
    let mut script = Script::new("a := b; b = 7");
    script.add("b", 5).unwrap();
    let first = script.compile_run().unwrap();
    let second = script.compile_run().unwrap();
    assert_eq!(first.get("a").int(), 5);
    assert_eq!(second.get("a").int(), 5);
    assert_eq!(second.get("b").int(), 7);
}

#[test]
fn syntax_errors_carry_a_location() {
    let err = Script::new("a := (1 +").compile_run().unwrap_err();
    assert!(matches!(err, Error::Syntax(_)));
    assert!(err.to_string().contains("(main):1:"), "{}", err);
}

#[test]
fn runtime_errors_are_reported_with_their_trace() {
    let err = Script::new("a := 1\nb := a / 0").compile_run().unwrap_err();
    let Error::Runtime(runtime) = &err else {
        panic!("expected a runtime error, got {:?}", err);
    };
    assert_eq!(runtime.error, RuntimeError::DivisionByZero);
    assert_eq!(runtime.trace, vec!["(main):2:6".to_string()]);
}

#[test]
fn get_copies_globals() {
    let compiled = compile_run("a := 5; s := \"x\"; arr := [1, [2]]", &[]);
    assert_eq!(compiled.get("a").int(), 5);
    assert_eq!(compiled.get("a").value_type(), "int");
    assert_eq!(compiled.get("s").string(), "x");
    assert!(compiled.get("missing").is_undefined());

    let arr = compiled.get("arr");
    if let Value::Array(items) = arr.object() {
        items.write().clear();
    }
    assert_eq!(compiled.get("arr").array().len(), 2);
}

#[test]
fn get_all_lists_every_global() {
    let compiled = compile_run("a := b; b = 5", &[("b", HostValue::from("foo"))]);
    let vars = compiled.get_all();
    let names: Vec<&str> = vars.iter().map(|v| v.name()).collect();
    assert_eq!(names, vec!["$out", "a", "b"]);
    assert_eq!(vars[1].value(), HostValue::from("foo"));
    assert_eq!(vars[2].int64(), 5);
    assert_eq!(compiled.global_names(), vec!["$out", "a", "b"]);
}

#[test]
fn set_updates_defined_globals_only() {
    let compiled = compile_run("a := 5", &[]);
    compiled.set("a", 6).unwrap();
    assert_eq!(compiled.get("a").int(), 6);

    assert!(matches!(compiled.set("b", 1), Err(Error::NotDefined(_))));
    assert!(matches!(compiled.set("$out", 1), Err(Error::ReservedName(_))));
}

#[test]
fn is_defined_ignores_undefined_values() {
    let compiled = compile_run("a := 1; b := undefined", &[]);
    assert!(compiled.is_defined("a"));
    assert!(!compiled.is_defined("b"));
    assert!(!compiled.is_defined("c"));
}

#[test]
fn clone_is_independent() {
    let mut data = BTreeMap::new();
    data.insert("a".to_string(), HostValue::from(1));
    let compiled = compile_run(
        "count += 1\ndata[\"b\"] = 2",
        &[("data", HostValue::from(data)), ("count", HostValue::from(1000))],
    );
    assert_eq!(compiled.get("count").int(), 1001);
    assert_eq!(compiled.get("data").map().len(), 2);

    let clone = compiled.clone();
    clone.set("count", 1).unwrap();
    assert_eq!(compiled.get("count").int(), 1001);
    assert_eq!(clone.get("count").int(), 1);
}

#[test]
fn clone_does_not_see_later_writes_to_the_original() {
    let compiled = compile_run(
        r#"
data := {list: [1]}
put := func(k, v) { data[k] = v }
make := func() {
	n := 0
	return func() {
		n += 1
		return n
	}
}
counter := make()
"#,
        &[],
    );
    let clone = compiled.clone();

    assert_eq!(compiled.call_by_name("counter", &[]).unwrap(), HostValue::Int(1));
    assert_eq!(compiled.call_by_name("counter", &[]).unwrap(), HostValue::Int(2));
    assert_eq!(clone.call_by_name("counter", &[]).unwrap(), HostValue::Int(1));
    assert_eq!(compiled.call_by_name("counter", &[]).unwrap(), HostValue::Int(3));

    compiled
        .call_by_name("put", &[HostValue::from("extra"), HostValue::from(1)])
        .unwrap();
    assert_eq!(compiled.get("data").map().len(), 2);
    assert_eq!(clone.get("data").map().len(), 1);
}

#[test]
fn closures_sharing_a_variable_still_share_it_in_a_clone() {
    let compiled = compile_run(
        r#"
pair := func() {
	n := 0
	return [func() { n += 1 }, func() { return n }]
}
fns := pair()
inc := fns[0]
read := fns[1]
"#,
        &[],
    );
    let clone = compiled.clone();
    clone.call_by_name("inc", &[]).unwrap();
    clone.call_by_name("inc", &[]).unwrap();
    assert_eq!(clone.call_by_name("read", &[]).unwrap(), HostValue::Int(2));
    assert_eq!(compiled.call_by_name("read", &[]).unwrap(), HostValue::Int(0));
}

#[test]
fn slots_do_not_depend_on_registration_order() {
    let source = "r := [a, b, c]\nget := func() { return [a, b, c] }";
    let ints = |xs: &[i64]| HostValue::Array(xs.iter().copied().map(HostValue::Int).collect());

    let forward = compile_run(
        source,
        &[("a", HostValue::Int(1)), ("b", HostValue::Int(2)), ("c", HostValue::Int(3))],
    );
    let backward = compile_run(
        source,
        &[("c", HostValue::Int(3)), ("b", HostValue::Int(2)), ("a", HostValue::Int(1))],
    );
    assert_eq!(forward.get("r").value(), ints(&[1, 2, 3]));
    assert_eq!(backward.get("r").value(), ints(&[1, 2, 3]));
    assert_eq!(forward.global_names(), backward.global_names());

    let clone = backward.clone();
    clone.set("b", 20).unwrap();
    assert_eq!(clone.call_by_name("get", &[]).unwrap(), ints(&[1, 20, 3]));
    assert_eq!(backward.call_by_name("get", &[]).unwrap(), ints(&[1, 2, 3]));
}

#[test]
fn too_many_host_variables_is_an_error() {
    let mut script = Script::new("x := 1");
    for i in 0..1023i64 {
        script.add(&format!("v{:04}", i), i).unwrap();
    }
    assert!(script.compile_run().is_err());

    script.remove("v0000");
    let compiled = script.compile_run().unwrap();
    assert_eq!(compiled.get("v1022").int(), 1022);

    script.add("v0000", 0).unwrap();
    script.add("v1023", 1023).unwrap();
    let err = script.compile_run().unwrap_err();
    assert!(
        matches!(err, Error::LimitExceeded { what: "global variables", max: 1024, got: 1025 }),
        "{}",
        err
    );
}

#[test]
fn too_many_script_globals_is_an_error() {
    let mut source = String::new();
    for i in 0..1100 {
        writeln!(source, "g{} := {}", i, i).unwrap();
    }
    let err = Script::new(source).compile_run().unwrap_err();
    assert!(matches!(err, Error::LimitExceeded { what: "global variables", .. }), "{}", err);
}

#[test]
fn constant_pool_overflow_is_a_compile_error() {
    let mut source = String::from("s := 0\n");
    for i in 1..=70_000 {
        writeln!(source, "s += {}", i).unwrap();
    }
    let err = Script::new(source).compile_run().unwrap_err();
    assert!(matches!(err, Error::Compile(_)), "{}", err);
    assert!(err.to_string().contains("too many constants"), "{}", err);
}

#[test]
fn local_slots_are_limited_to_one_byte() {
    let function = |locals: usize| {
        let mut source = String::from("f := func() {\n");
        for i in 0..locals {
            writeln!(source, "\tv{} := {}", i, i).unwrap();
        }
        writeln!(source, "\treturn v0 + v{}\n}}\nr := f()", locals - 1).unwrap();
        source
    };

    let compiled = Script::new(function(256)).compile_run().unwrap();
    assert_eq!(compiled.get("r").int(), 255);

    let err = Script::new(function(300)).compile_run().unwrap_err();
    assert!(err.to_string().contains("too many local variables"), "{}", err);
}

#[test]
fn jumps_past_the_operand_limit_are_rejected() {
    let mut source = String::from("x := 0\nif x == 0 {\n");
    for _ in 0..7_000 {
        source.push_str("\tx += 1\n");
    }
    source.push_str("}\n");
    let err = Script::new(source).compile_run().unwrap_err();
    assert!(err.to_string().contains("too many instructions in one function"), "{}", err);
}

#[test]
fn host_variables_are_not_shared_between_runs() {
    let mut script = Script::new("xs[0] = 9");
    script.add("xs", vec![HostValue::from(1)]).unwrap();
    let first = script.compile_run().unwrap();
    let second = script.compile_run().unwrap();
    first.set("xs", vec![HostValue::from(3)]).unwrap();
    assert_eq!(second.get("xs").array(), vec![HostValue::Int(9)]);
}

#[test]
fn error_values_expose_their_payload() {
    let compiled = compile_run("e := error(\"bad\")", &[]);
    let e = compiled.get("e");
    assert_eq!(e.value_type(), "error");
    assert_eq!(e.error(), Some(HostValue::from("bad")));
    assert_eq!(compiled.get("missing").error(), None);
}

#[test]
fn allocation_limit_stops_the_run() {
    let mut script = Script::new("a := [1]; b := [2]; c := [3]");
    script.set_max_allocs(2);
    let err = script.compile_run().unwrap_err();
    assert!(err.to_string().contains("allocation limit exceeded"), "{}", err);

    script.set_max_allocs(-1);
    assert!(script.compile_run().is_ok());
}

#[test]
fn trace_writes_disassembly() {
    use std::{
        io::{self, Write},
        sync::{Arc, Mutex},
    };

    #[derive(Clone, Default)]
    struct Buf(Arc<Mutex<Vec<u8>>>);

    impl Write for Buf {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let buf = Buf::default();
    let mut script = Script::new("x := 1");
    script.set_trace(buf.clone());
    script.compile_run().unwrap();

    let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    assert!(text.contains("OpSetGlobal"), "{}", text);
}
