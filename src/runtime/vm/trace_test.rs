use std::{
    io::{self, Write},
    sync::Arc,
};

use parking_lot::Mutex;

use crate::{
    bytecode::{compiler::Compiler, constant_pool::ConstantPool},
    runtime::error::RuntimeError,
    syntax::parser::Parser,
    trace::TraceSink,
};

use super::{GLOBALS_SIZE, VM, test_support::run};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn compile(source: &str) -> (Arc<crate::runtime::compiled_function::CompiledFunction>, ConstantPool) {
    let program = Parser::parse_source(source, "test").unwrap();
    let mut compiler = Compiler::new("test");
    compiler.compile(&program).unwrap();
    let (bytecode, _) = compiler.finish();
    (
        Arc::new(bytecode.main_function),
        ConstantPool::new(bytecode.constants),
    )
}

#[test]
fn error_reports_statement_position() {
    let err = run("a := 1\nb := \"s\" - a").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Runtime Error: invalid operation: string - int\n\tat test:2:6"
    );
}

#[test]
fn error_trace_walks_caller_frames() {
    let source = "f := func() {\n\treturn 1 - \"x\"\n}\n\nf()";
    let err = run(source).unwrap_err();
    assert_eq!(err.trace, vec!["test:2:9", "test:5:1"]);
}

#[test]
fn aborted_vm_stops_before_running() {
    let (entry, constants) = compile("for {}");
    let mut globals = vec![None; GLOBALS_SIZE];
    let mut vm = VM::new(entry, &constants, &mut globals, -1);
    vm.abort_handle().abort();
    let err = vm.run().unwrap_err();
    assert_eq!(err.error, RuntimeError::Aborted);
}

#[test]
fn abort_from_another_thread_stops_a_loop() {
    let (entry, constants) = compile("for {}");
    let mut globals = vec![None; GLOBALS_SIZE];
    let mut vm = VM::new(entry, &constants, &mut globals, -1);
    let handle = vm.abort_handle();
    let stopper = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(20));
        handle.abort();
    });
    let err = vm.run().unwrap_err();
    stopper.join().unwrap();
    assert_eq!(err.error, RuntimeError::Aborted);
}

#[test]
fn trace_sink_receives_each_instruction() {
    let (entry, constants) = compile("x := 1");
    let buf = SharedBuf::default();
    let mut globals = vec![None; GLOBALS_SIZE];
    let mut vm = VM::new(entry, &constants, &mut globals, -1);
    vm.set_trace(Some(TraceSink::new(buf.clone())));
    vm.run().unwrap();

    let output = String::from_utf8(buf.0.lock().clone()).unwrap();
    insta::assert_snapshot!(output.replace('\n', "|"), @"IP=0000 OpConstant 0|IP=0003 OpSetGlobal 0|IP=0006 OpSuspend|");
}
