use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use parking_lot::Mutex;
use rayon::prelude::*;
use rill::{Callback, Compiled, Context, ContextError, Error, HostValue, Script, Value};

const MODULE: &str = r#"
add := func(a, b, ...c) {
	r := a + b
	for v in c {
		r += v
	}
	return r
}

mul := func(a, b, ...c) {
	r := a * b
	for v in c {
		r *= v
	}
	return r
}

square := func(a) {
	return mul(a, a)
}

fib := func(x) {
	if x == 0 {
		return 0
	} else if x == 1 {
		return 1
	}
	return fib(x-1) + fib(x-2)
}

stringer := func(s) {
	return string(s)
}
"#;

fn ints(values: &[i64]) -> Vec<HostValue> {
    values.iter().map(|v| HostValue::Int(*v)).collect()
}

fn check_calls(compiled: &Compiled) {
    let cases: [(&str, Vec<HostValue>, HostValue); 7] = [
        ("add", ints(&[3, 4]), HostValue::Int(7)),
        ("add", ints(&[1, 2, 3, 4]), HostValue::Int(10)),
        ("mul", ints(&[3, 4]), HostValue::Int(12)),
        ("mul", ints(&[1, 2, 3, 4]), HostValue::Int(24)),
        ("square", ints(&[3]), HostValue::Int(9)),
        ("fib", ints(&[10]), HostValue::Int(55)),
        ("stringer", ints(&[12345]), HostValue::from("12345")),
    ];
    let ctx = Context::background();
    for (name, args, expected) in cases {
        assert_eq!(compiled.call_by_name(name, &args).unwrap(), expected, "{}", name);
        assert_eq!(
            compiled.call_by_name_with_context(&ctx, name, &args).unwrap(),
            expected,
            "{}",
            name
        );
    }
}

#[test]
fn call_by_name_on_same_fresh_and_cloned_programs() {
    let compiled = Script::new(MODULE).compile_run().unwrap();
    check_calls(&compiled);
    check_calls(&Script::new(MODULE).compile_run().unwrap());
    check_calls(&compiled.clone());
}

#[test]
fn calls_do_not_grow_the_constant_pool() {
    let compiled = Script::new(MODULE).compile_run().unwrap();
    let before = compiled.constant_count();
    for _ in 0..10 {
        compiled.call_by_name("add", &ints(&[1, 2, 3])).unwrap();
    }
    let _ = compiled.call_by_name("square", &[HostValue::from("x")]);
    assert_eq!(compiled.constant_count(), before);
}

#[test]
fn output_slot_is_cleared_after_a_call() {
    let compiled = Script::new(MODULE).compile_run().unwrap();
    compiled.call_by_name("square", &ints(&[4])).unwrap();
    assert!(compiled.get("$out").is_undefined());
}

#[test]
fn call_errors() {
    let compiled = Script::new("n := 1; u := undefined; f := func(a) { return a }")
        .compile_run()
        .unwrap();

    let err = compiled.call_by_name("missing", &[]).unwrap_err();
    assert!(err.to_string().contains("not found"), "{}", err);
    assert!(matches!(
        compiled.call_by_name("n", &[]),
        Err(Error::NotCallable(name)) if name == "int"
    ));
    assert!(matches!(
        compiled.call_by_name("u", &[]),
        Err(Error::NotCallable(_)) | Err(Error::NilCallable)
    ));

    let err = compiled.call_by_name("f", &ints(&[1, 2])).unwrap_err();
    assert!(err.to_string().contains("want=1, got=2"), "{}", err);

    let too_many = vec![HostValue::Int(0); 256];
    assert!(matches!(
        compiled.call_by_name("f", &too_many),
        Err(Error::TooManyArguments { max: 255, got: 256 })
    ));
}

#[test]
fn closures_keep_their_captures() {
    let compiled = Script::new(
        r#"
mul_closure := func(a) {
	return func(b) {
		return a * b
	}
}

mul2 := mul_closure(2)
mul3 := mul_closure(3)
"#,
    )
    .compile_run()
    .unwrap();

    assert_eq!(compiled.call_by_name("mul2", &ints(&[3])).unwrap(), HostValue::Int(6));
    assert_eq!(compiled.call_by_name("mul2", &ints(&[5])).unwrap(), HostValue::Int(10));
    assert_eq!(compiled.call_by_name("mul3", &ints(&[5])).unwrap(), HostValue::Int(15));
}

#[test]
fn calls_see_global_updates() {
    let mut script = Script::new(
        r#"
each := func(seq, fn) {
	for x in seq { fn(x) }
}

sum := 0
mul := 1
f := func(x) {
	sum += x
	mul *= x
}

each([a, b, c, d], f)
"#,
    );
    for (name, value) in [("a", 1), ("b", 9), ("c", 8), ("d", 4)] {
        script.add(name, value).unwrap();
    }
    let compiled = script.compile_run_with_context(&Context::background()).unwrap();
    assert_eq!(compiled.get("sum").int(), 22);
    assert_eq!(compiled.get("mul").int(), 288);

    compiled.call_by_name("f", &ints(&[2])).unwrap();
    assert_eq!(compiled.get("sum").int(), 24);
    assert_eq!(compiled.get("mul").int(), 576);
}

#[test]
fn host_callables_can_be_passed_as_arguments() {
    let compiled = Script::new("each := func(seq, fn) { for x in seq { fn(x) } }")
        .compile_run()
        .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = {
        let seen = seen.clone();
        Value::host_fn("record", move |args: &[Value]| {
            seen.lock().push(args[0].clone());
            Ok(Value::Undefined)
        })
    };
    compiled
        .call_by_name("each", &[HostValue::Array(ints(&[1, 2, 3, 4])), record.into()])
        .unwrap();
    let seen: Vec<HostValue> = seen.lock().iter().map(Value::to_host).collect();
    assert_eq!(seen, ints(&[1, 2, 3, 4]));
}

#[test]
fn call_accepts_a_callable_value() {
    let compiled = Script::new("k := 10").compile_run().unwrap();
    let plus = Value::host_fn("plus", |args: &[Value]| match (&args[0], &args[1]) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
        _ => Ok(Value::Undefined),
    });
    assert_eq!(compiled.call(&plus, &ints(&[2, 3])).unwrap(), HostValue::Int(5));
    assert!(matches!(
        compiled.call(&Value::Int(1), &[]),
        Err(Error::NotCallable(_))
    ));
}

#[test]
fn callbacks_observe_later_global_writes() {
    let slot: Arc<Mutex<Option<Callback>>> = Arc::new(Mutex::new(None));
    let pass = {
        let slot = slot.clone();
        Value::host_fn("pass", move |args: &[Value]| {
            *slot.lock() = Some(Callback::new(args[0].clone(), Vec::new()));
            Ok(Value::Undefined)
        })
    };

    let mut script = Script::new("b := 2\n\npass(func(a) {\n\treturn a * b\n})");
    script.add("pass", pass).unwrap();
    let compiled = Arc::new(script.compile_run().unwrap());
    let callback = slot.lock().take().expect("callback captured");

    assert!(matches!(callback.call(&ints(&[3])), Err(Error::NotBound)));

    assert_eq!(callback.set(&compiled).call(&ints(&[3])).unwrap(), HostValue::Int(6));
    assert_eq!(callback.set(&compiled).call(&ints(&[5])).unwrap(), HostValue::Int(10));

    compiled.set("b", 3).unwrap();
    let result = callback.set(&compiled).call(&ints(&[5])).unwrap();
    assert_eq!(result, HostValue::Int(15));
    let with_ctx = callback.call_with_context(&Context::background(), &ints(&[5])).unwrap();
    assert_eq!(with_ctx, result);
}

#[test]
fn callback_prefix_arguments_come_first() {
    let compiled = Arc::new(
        Script::new("sub := func(a, b) { return a - b }")
            .compile_run()
            .unwrap(),
    );
    let sub = compiled.get("sub").object().clone();
    let callback = Callback::new(sub, ints(&[10]));
    callback.set(&compiled);
    assert_eq!(callback.args(), &ints(&[10])[..]);
    assert_eq!(callback.call(&ints(&[3])).unwrap(), HostValue::Int(7));
}

#[test]
fn canceled_context_stops_compile_run() {
    let (ctx, cancel) = Context::with_cancel();
    cancel.cancel();
    let err = Script::new("").compile_run_with_context(&ctx).unwrap_err();
    assert!(err.is_cancellation());
    assert_eq!(err.to_string(), "context canceled");
}

#[test]
fn expired_deadline_stops_calls() {
    let compiled = Script::new(MODULE)
        .compile_run_with_context(&Context::background())
        .unwrap();
    let ctx = Context::with_timeout(Duration::ZERO);
    let err = compiled
        .call_by_name_with_context(&ctx, "square", &ints(&[2]))
        .unwrap_err();
    assert!(matches!(err, Error::Context(ContextError::DeadlineExceeded)));
    assert_eq!(err.to_string(), "context deadline exceeded");
}

#[test]
fn finished_contexts_leave_globals_untouched() {
    let compiled = Script::new("hits := 0\nbump := func() {\n\thits += 1\n\treturn hits\n}")
        .compile_run()
        .unwrap();

    let (canceled, cancel) = Context::with_cancel();
    cancel.cancel();
    let expired = Context::with_timeout(Duration::ZERO);
    for ctx in [&canceled, &expired] {
        let err = compiled
            .call_by_name_with_context(ctx, "bump", &[])
            .unwrap_err();
        assert!(err.is_cancellation(), "{}", err);
        assert_eq!(compiled.get("hits").int(), 0);
    }

    assert_eq!(compiled.call_by_name("bump", &[]).unwrap(), HostValue::Int(1));
}

#[test]
fn host_calls_cannot_overflow_the_constant_pool() {
    let mut source = String::from("count := func(...xs) { return len(xs) }\nx := 0\n");
    for i in 1..65_530 {
        source.push_str(&format!("x = {}\n", i));
    }
    let compiled = Script::new(source).compile_run().unwrap();
    let constants = compiled.constant_count();

    assert_eq!(compiled.call_by_name("count", &ints(&[1, 2])).unwrap(), HostValue::Int(2));
    let err = compiled
        .call_by_name("count", &ints(&[0; 20]))
        .unwrap_err();
    assert!(
        matches!(err, Error::LimitExceeded { what: "constants", .. }),
        "{}",
        err
    );
    assert_eq!(compiled.constant_count(), constants);
}

#[test]
fn timeout_aborts_a_running_loop() {
    let compiled = Script::new("spin := func() { for {} }").compile_run().unwrap();
    let ctx = Context::with_timeout(Duration::from_millis(50));
    let err = compiled
        .call_by_name_with_context(&ctx, "spin", &[])
        .unwrap_err();
    assert!(err.is_cancellation());

    // The program stays usable after an aborted call.
    assert!(compiled.get("spin").object().is_callable());
}

#[test]
fn cancel_from_another_thread() {
    let compiled = Script::new("spin := func() { for {} }").compile_run().unwrap();
    let (ctx, cancel) = Context::with_cancel();
    let canceler = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        cancel.cancel();
    });
    let err = compiled
        .call_by_name_with_context(&ctx, "spin", &[])
        .unwrap_err();
    canceler.join().unwrap();
    assert!(matches!(err, Error::Context(ContextError::Canceled)));
}

#[test]
fn concurrent_calls_share_one_program() {
    let compiled = Arc::new(
        Script::new(
            "hits := 0\nfib := func(x) {\n\thits += 1\n\tif x < 2 { return x }\n\treturn fib(x-1) + fib(x-2)\n}",
        )
        .compile_run()
        .unwrap(),
    );
    let done = AtomicUsize::new(0);
    (0..32i64).into_par_iter().for_each(|i| {
        let n = i % 12;
        let result = compiled.call_by_name("fib", &ints(&[n])).unwrap();
        let expected = (0..n).fold((0i64, 1i64), |(a, b), _| (b, a + b)).0;
        assert_eq!(result, HostValue::Int(expected));
        done.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(done.load(Ordering::SeqCst), 32);
    assert!(compiled.get("hits").int64() > 0);
}
