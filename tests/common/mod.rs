#![allow(dead_code)]

use altair_ego::mach::{Console, Runtime};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Console with scripted input and captured output. Prompts are echoed
/// into the output so tests can assert on them.
pub struct TestConsole {
    input: VecDeque<String>,
    output: Rc<RefCell<String>>,
}

impl Console for TestConsole {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.output.borrow_mut().push_str(prompt);
        self.input.pop_front()
    }

    fn write(&mut self, text: &str) {
        self.output.borrow_mut().push_str(text);
    }
}

pub fn runtime() -> (Runtime, Rc<RefCell<String>>) {
    runtime_with_input(&[])
}

pub fn runtime_with_input(input: &[&str]) -> (Runtime, Rc<RefCell<String>>) {
    let output = Rc::new(RefCell::new(String::new()));
    let console = TestConsole {
        input: input.iter().map(|s| s.to_string()).collect(),
        output: Rc::clone(&output),
    };
    (Runtime::new(Box::new(console)), output)
}

/// Feed lines to the runtime and drain the captured output, trimming the
/// trailing `OK` prompt.
pub fn enter(runtime: &mut Runtime, output: &Rc<RefCell<String>>, lines: &[&str]) -> String {
    for line in lines {
        runtime.process_line(line);
    }
    let text = output.borrow().clone();
    output.borrow_mut().clear();
    text.trim_end_matches("OK\n").to_string()
}

pub fn run(lines: &[&str]) -> String {
    let (mut runtime, output) = runtime();
    enter(&mut runtime, &output, lines)
}

pub fn run_with_input(input: &[&str], lines: &[&str]) -> String {
    let (mut runtime, output) = runtime_with_input(input);
    enter(&mut runtime, &output, lines)
}
