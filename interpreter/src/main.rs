use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::{env, fs, process};

use interpreter::diagnostics::Diagnostics;
use interpreter::interpreter::Interpreter;
use interpreter::run;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    match args.len() {
        0 => run_prompt(),
        1 => run_file(&args[0]),
        _ => {
            eprintln!("Usage: tarn [script]");
            process::exit(64);
        }
    }
}

fn run_file(path: &str) {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("tarn: {}: {}", path, err);
            process::exit(74);
        }
    };

    let mut diag = Diagnostics::new();
    let mut interpreter = Interpreter::new(Rc::new(RefCell::new(io::stdout())));
    run(&source, &mut interpreter, &mut diag);

    if diag.had_error() {
        process::exit(65);
    }
    if diag.had_runtime_error() {
        process::exit(70);
    }
}

fn run_prompt() {
    let stdin = io::stdin();
    let mut diag = Diagnostics::new();
    // A single interpreter across lines, so definitions persist in the
    // session's globals.
    let mut interpreter = Interpreter::new(Rc::new(RefCell::new(io::stdout())));

    loop {
        print!("> ");
        io::stdout().flush().unwrap();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        run(&line, &mut interpreter, &mut diag);
        diag.reset();
    }
}
