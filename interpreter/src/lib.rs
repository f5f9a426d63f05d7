pub mod diagnostics;
pub mod error;
pub mod interpreter;
pub mod parser;

pub(crate) mod ast;
pub(crate) mod env;
pub(crate) mod value;

use tarn_core::{Scanner, Token};

use crate::diagnostics::Diagnostics;
use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::parser::Parser;

// One complete unit of work: scan, parse, evaluate. Every diagnostic goes
// through `diag`; the caller inspects its flags afterwards to decide what a
// failed run means (exit status, prompt reset).
pub fn run(source: &str, interpreter: &mut Interpreter, diag: &mut Diagnostics) {
    let mut scanner = Scanner::new();
    let mut stream = scanner.scan_tokens(source);
    let tokens: Vec<Token> = stream.by_ref().collect();
    for err in stream.errors() {
        diag.report(&Error::from(err.clone()));
    }

    let mut parser = Parser::new(&tokens);
    match parser.parse() {
        Ok(stmts) => {
            // Parsing still ran after a lexical error to surface more
            // diagnostics, but the program must not execute.
            if diag.had_error() {
                return;
            }

            if let Err(err) = interpreter.interpret(&stmts) {
                diag.report(&err);
            }
        }
        Err(errs) => {
            for err in &errs {
                diag.report(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::str;

    use crate::diagnostics::Diagnostics;
    use crate::interpreter::Interpreter;
    use crate::run;

    struct Harness {
        interpreter: Interpreter,
        diag: Diagnostics,
        out: Rc<RefCell<Vec<u8>>>,
        errs: Rc<RefCell<Vec<u8>>>,
    }

    impl Harness {
        fn new() -> Self {
            let out: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
            let errs: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
            Harness {
                interpreter: Interpreter::new(out.clone()),
                diag: Diagnostics::with_output(errs.clone()),
                out,
                errs,
            }
        }

        fn run(&mut self, source: &str) {
            run(source, &mut self.interpreter, &mut self.diag);
        }

        fn output(&self) -> String {
            String::from(str::from_utf8(&self.out.borrow()).unwrap())
        }

        fn error_output(&self) -> String {
            String::from(str::from_utf8(&self.errs.borrow()).unwrap())
        }
    }

    #[test]
    fn test_clean_run() {
        let mut h = Harness::new();
        h.run("print 1 + 2;");

        assert_eq!(h.output(), "3\n");
        assert_eq!(h.error_output(), "");
        assert!(!h.diag.had_error());
        assert!(!h.diag.had_runtime_error());
    }

    #[test]
    fn test_syntax_error_blocks_execution() {
        let mut h = Harness::new();
        h.run("print 1");

        assert_eq!(h.output(), "");
        assert!(h.diag.had_error());
        assert_eq!(
            h.error_output(),
            "[line 1] Error at end: Expect ';' after value.\n"
        );
    }

    #[test]
    fn test_lexical_error_blocks_execution() {
        // The '@' is skipped, so the remainder parses, but nothing may run.
        let mut h = Harness::new();
        h.run("print @ 1;");

        assert_eq!(h.output(), "");
        assert!(h.diag.had_error());
        assert_eq!(
            h.error_output(),
            "[line 1] Error: Unexpected character '@'.\n"
        );
    }

    #[test]
    fn test_runtime_error_is_reported_with_line() {
        let mut h = Harness::new();
        h.run("print 1;\nprint 1 + \"a\";");

        assert_eq!(h.output(), "1\n");
        assert!(h.diag.had_runtime_error());
        assert_eq!(
            h.error_output(),
            "Operands must be two numbers or two strings.\n[line 2]\n"
        );
    }

    #[test]
    fn test_prompt_style_reset_keeps_state() {
        let mut h = Harness::new();

        h.run("var x = 1;");
        h.run("print x");
        assert!(h.diag.had_error());

        // After a reset the next line runs, against the same globals.
        h.diag.reset();
        h.run("print x;");

        assert!(!h.diag.had_error());
        assert_eq!(h.output(), "1\n");
    }
}
