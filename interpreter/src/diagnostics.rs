use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crate::error::Error;
use tarn_core::Type;

// Explicit reporting context instead of process-global error flags. The
// front end queries the flags after each run to pick its exit status; the
// REPL clears the syntax flag between lines.
pub struct Diagnostics {
    had_error: bool,
    had_runtime_error: bool,
    out: Rc<RefCell<dyn Write>>,
}

impl Diagnostics {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self::with_output(Rc::new(RefCell::new(io::stderr())))
    }

    pub fn with_output(out: Rc<RefCell<dyn Write>>) -> Self {
        Diagnostics {
            had_error: false,
            had_runtime_error: false,
            out,
        }
    }

    pub fn report(&mut self, err: &Error) {
        match err {
            Error::ScannerError { line, msg } => self.syntax_error(*line, "", msg),
            Error::ParserError { token, line, msg } => {
                if token.ty == Type::Eof {
                    self.syntax_error(*line, " at end", msg);
                } else {
                    let location = format!(" at '{}'", token.lexeme);
                    self.syntax_error(*line, &location, msg);
                }
            }
            Error::RuntimeError { token, msg } => {
                writeln!(
                    RefCell::borrow_mut(&self.out),
                    "{}\n[line {}]",
                    msg,
                    token.line
                )
                .unwrap();
                self.had_runtime_error = true;
            }
        }
    }

    fn syntax_error(&mut self, line: usize, location: &str, msg: &str) {
        writeln!(
            RefCell::borrow_mut(&self.out),
            "[line {}] Error{}: {}",
            line,
            location,
            msg
        )
        .unwrap();
        self.had_error = true;
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    // A syntax error on one prompt line must not block the next one. The
    // runtime flag stays, it only matters for file runs.
    pub fn reset(&mut self) {
        self.had_error = false;
    }
}
