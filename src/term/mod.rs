/*!
## Terminal Module

Interactive REPL and batch file driver around the runtime.

*/

extern crate ansi_term;
extern crate ctrlc;
extern crate linefeed;

use crate::mach::{Console, Runtime};
use ansi_term::Style;
use linefeed::{DefaultTerminal, Interface, ReadResult, Signal};
use std::fs;
use std::io::{BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub fn main() {
    if std::env::args().count() > 2 {
        eprintln!("Usage: altair-ego [FILENAME]");
        std::process::exit(1);
    }
    let code = match std::env::args().nth(1) {
        Some(filename) => batch(&filename),
        None => repl(),
    };
    std::process::exit(code);
}

/// Load a file line by line, then run it.
fn batch(filename: &str) -> i32 {
    let file = match fs::File::open(filename) {
        Ok(file) => file,
        Err(_) => {
            eprintln!("CAN'T OPEN {}", filename);
            return 1;
        }
    };
    let mut runtime = Runtime::default();
    for line in BufReader::new(file).lines() {
        match line {
            Ok(line) => {
                runtime.process_line(&line);
            }
            Err(_) => return 1,
        }
    }
    runtime.run();
    0
}

fn repl() -> i32 {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    if ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .is_err()
    {
        eprintln!("Error setting Ctrl-C handler");
    }
    let interface = match Interface::new("BASIC") {
        Ok(interface) => Arc::new(interface),
        Err(error) => {
            eprintln!("{}", error);
            return 1;
        }
    };
    interface.set_report_signal(Signal::Interrupt, true);
    let mut runtime = Runtime::new(Box::new(TermConsole {
        interface: Arc::clone(&interface),
    }));
    runtime.set_interrupt(Arc::clone(&interrupted));
    let _ = interface.write_fmt(format_args!(
        "Altair Ego: Emulating Altair BASIC 32K Rev. 3.2\nOK\n"
    ));
    loop {
        interrupted.store(false, Ordering::SeqCst);
        match interface.read_line() {
            Ok(ReadResult::Input(line)) => {
                if runtime.process_line(&line) {
                    interface.add_history_unique(line);
                }
            }
            Ok(ReadResult::Signal(_)) => continue,
            Ok(ReadResult::Eof) | Err(_) => break,
        }
    }
    0
}

/// Console over the shared linefeed interface: INPUT prompts become the
/// line editor's prompt, and error messages come out bold.
struct TermConsole {
    interface: Arc<Interface<DefaultTerminal>>,
}

impl Console for TermConsole {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        if self.interface.set_prompt(prompt).is_err() {
            return None;
        }
        let result = match self.interface.read_line() {
            Ok(ReadResult::Input(line)) => Some(line),
            _ => None,
        };
        let _ = self.interface.set_prompt("");
        if let Some(line) = &result {
            self.interface.add_history_unique(line.clone());
        }
        result
    }

    fn write(&mut self, text: &str) {
        let _ = self.interface.write_fmt(format_args!("{}", text));
    }

    fn write_message(&mut self, text: &str) {
        let _ = self
            .interface
            .write_fmt(format_args!("{}", Style::new().bold().paint(text)));
    }
}
