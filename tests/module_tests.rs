use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use rill::{HostValue, Module, ModuleMap, ModuleResolver, Script, Value, stdlib};

fn temp_dir(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let dir = std::env::temp_dir().join(format!(
        "rill-{}-{}-{}",
        label,
        std::process::id(),
        nanos
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn source_modules_need_a_resolver() {
    let mut script = Script::new(
        "ft := import(\"functools\")\na := ft.all([1, 2, 3], func(v) {\n\treturn v > 0\n})",
    );
    script.set_imports(stdlib::module_map(&["functools"]));
    let compiled = script.compile_run().unwrap();
    assert!(compiled.get("a").bool());

    script.clear_imports();
    assert!(script.compile_run().is_err());
}

#[test]
fn foreach_passes_key_and_value() {
    let mut script = Script::new(
        r#"
ft := import("functools")
keys := ""
total := 0
ft.foreach({a: 1, b: 2}, func(k, v) {
	keys += k
	total += v
})
"#,
    );
    script.set_imports(stdlib::module_map(&stdlib::all_module_names()));
    let compiled = script.compile_run().unwrap();
    assert_eq!(compiled.get("keys").string(), "ab");
    assert_eq!(compiled.get("total").int(), 3);
}

#[test]
fn builtin_modules_are_copied_per_compile() {
    let mut script = Script::new("math := import(\"math\"); a := math.abs(-19.84)");
    script.set_imports(stdlib::module_map(&["math"]));
    for _ in 0..2 {
        let compiled = script.compile_run().unwrap();
        assert_eq!(compiled.get("a").float(), 19.84);
    }

    script.set_imports(stdlib::module_map(&["os"]));
    assert!(script.compile_run().is_err());
    script.clear_imports();
    assert!(script.compile_run().is_err());
}

#[test]
fn imported_host_functions_can_be_called_by_name() {
    let mut script = Script::new("contains := import(\"text\").contains");
    script.set_imports(stdlib::module_map(&stdlib::all_module_names()));
    let compiled = script.compile_run().unwrap();

    let args = [HostValue::from("foo bar"), HostValue::from("bar")];
    assert_eq!(compiled.call_by_name("contains", &args).unwrap(), HostValue::Bool(true));
    let args = [HostValue::from("foo bar"), HostValue::from("baz")];
    assert_eq!(compiled.call_by_name("contains", &args).unwrap(), HostValue::Bool(false));

    let err = compiled.call_by_name("contains_x", &args).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn source_module_exports() {
    let mut modules = ModuleMap::new();
    modules.add_source_module("mod", "export 5");
    let mut script = Script::new("out := import(\"mod\")");
    script.set_imports(modules);
    assert_eq!(script.compile_run().unwrap().get("out").int64(), 5);

    let mut modules = ModuleMap::new();
    modules.add_source_module("mod", "a := 3; export func() { return a + 5 }");
    let mut script = Script::new("fn := import(\"mod\"); out := fn()");
    script.set_imports(modules);
    assert_eq!(script.compile_run().unwrap().get("out").int64(), 8);
}

#[test]
fn source_modules_import_builtin_modules() {
    let mut text = BTreeMap::new();
    text.insert(
        "title".to_string(),
        Value::host_fn("title", |args: &[Value]| {
            let s = args[0].to_text();
            let mut chars = s.chars();
            let titled: String = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            };
            Ok(Value::string(titled))
        }),
    );
    let mut modules = ModuleMap::new();
    modules.add_source_module("mod", "text := import(\"text\"); export text.title(\"foo\")");
    modules.add_builtin_module("text", text);

    let mut script = Script::new("out := import(\"mod\")");
    script.set_imports(modules);
    assert_eq!(script.compile_run().unwrap().get("out").string(), "Foo");

    script.clear_imports();
    assert!(script.compile_run().is_err());
}

#[test]
fn module_runtime_errors_point_into_the_module() {
    let src = r#"
export func(ctx) {
	closure := func() {
		if ctx.actiontimes < 0 {
			return true
		}
		return false
	}

	return closure()
}"#;
    let mut modules = ModuleMap::new();
    modules.add_source_module("expression", src);

    let mut script = Script::new("\n\texp := import(\"expression\")\n\tr := exp(ctx)\n");
    script.set_imports(modules);
    let mut ctx = BTreeMap::new();
    ctx.insert("ctx".to_string(), HostValue::from(12));
    script.add("ctx", ctx).unwrap();

    let err = script.compile_run().unwrap_err();
    assert!(err.to_string().contains("expression:4:6"), "{}", err);
}

#[test]
fn module_globals_are_isolated() {
    let mut modules = ModuleMap::new();
    modules.add_source_module("mod", "export func() { return secret }");
    let mut script = Script::new("secret := 1; f := import(\"mod\")");
    script.set_imports(modules);
    let err = script.compile_run().unwrap_err();
    assert!(err.to_string().contains("unresolved reference 'secret'"), "{}", err);
}

#[test]
fn each_import_runs_the_module_body() {
    let mut modules = ModuleMap::new();
    modules.add_source_module("counter", "n := 0\nexport func() { n += 1; return n }");
    let mut script = Script::new(
        "a := import(\"counter\")\nb := import(\"counter\")\nx := a()\ny := b()",
    );
    script.set_imports(modules);
    let compiled = script.compile_run().unwrap();
    assert_eq!(compiled.get("x").int(), 1);
    assert_eq!(compiled.get("y").int(), 1);
}

#[test]
fn file_imports_resolve_against_the_import_dir() {
    let dir = temp_dir("files");
    fs::create_dir_all(dir.join("lib")).unwrap();
    fs::write(
        dir.join("lib").join("util.rill"),
        "helper := import(\"./helper\")\nexport { twice: func(x) { return helper.double(x) } }",
    )
    .unwrap();
    fs::write(
        dir.join("lib").join("helper.rill"),
        "export { double: func(x) { return x * 2 } }",
    )
    .unwrap();

    let mut script = Script::new("util := import(\"./lib/util\")\nout := util.twice(21)");
    script.set_import_dir(&dir).unwrap();
    let compiled = script.compile_run().unwrap();
    assert_eq!(compiled.get("out").int(), 42);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn cyclic_file_imports_fail() {
    let dir = temp_dir("cycle");
    fs::write(dir.join("a.rill"), "b := import(\"./b\")\nexport 1").unwrap();
    fs::write(dir.join("b.rill"), "a := import(\"./a\")\nexport 2").unwrap();

    let mut script = Script::new("a := import(\"./a\")");
    script.set_import_dir(&dir).unwrap();
    let err = script.compile_run().unwrap_err();
    assert!(err.to_string().contains("cyclic module import"), "{}", err);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_files_report_the_path() {
    let dir = temp_dir("missing");
    let mut script = Script::new("a := import(\"./nope\")");
    script.set_import_dir(&dir).unwrap();
    let err = script.compile_run().unwrap_err();
    assert!(err.to_string().contains("module file read error"), "{}", err);
    fs::remove_dir_all(&dir).ok();
}

struct Fixed;

impl ModuleResolver for Fixed {
    fn resolve(&self, name: &str) -> Option<Module> {
        (name == "answer").then(|| Module::Source("export 42".into()))
    }
}

#[test]
fn custom_resolvers_supply_modules() {
    let mut script = Script::new("out := import(\"answer\")");
    script.set_imports(Fixed);
    assert_eq!(script.compile_run().unwrap().get("out").int(), 42);
}

#[test]
fn module_map_merge_and_names() {
    let mut a = stdlib::module_map(&["math"]);
    let b = stdlib::module_map(&["text", "functools"]);
    a.merge(&b);
    assert_eq!(a.names(), vec!["functools", "math", "text"]);
    assert!(a.remove("text").is_some());
    assert!(a.get("text").is_none());
    assert_eq!(a.len(), 2);
}
