use std::io::Write;

/// Abstract I/O sink. The engine talks to the outside world only through
/// this trait: `PRINT` and messages go out via `write`, `INPUT` comes in
/// via `read_line`. The prompt rides along so a line-editing terminal can
/// render it; `None` means end of input.
pub trait Console {
    fn read_line(&mut self, prompt: &str) -> Option<String>;
    fn write(&mut self, text: &str);
    fn write_message(&mut self, text: &str) {
        self.write(text);
    }
}

/// Plain stdin/stdout console used by batch mode.
#[derive(Debug, Default)]
pub struct StdioConsole {}

impl StdioConsole {
    pub fn new() -> StdioConsole {
        StdioConsole {}
    }
}

impl Console for StdioConsole {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.write(prompt);
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                Some(line)
            }
        }
    }

    fn write(&mut self, text: &str) {
        let stdout = std::io::stdout();
        let mut stdout = stdout.lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}
