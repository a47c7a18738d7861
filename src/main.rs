// ABOUTME: CLI entry point: argument classification, REPL loop, and script driver (§6)

use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use slisp::builtins;
use slisp::builtins::errors::as_error;
use slisp::config;
use slisp::error::EvalError;
use slisp::eval;
use slisp::highlighter::LispHelper;
use slisp::interpreter::{HostEnvironment, Interpreter, SlispVersion};
use slisp::parser;
use slisp::value::Expression;
use std::collections::HashMap;
use std::process::ExitCode;

const VERSION: SlispVersion = SlispVersion {
    major: 1,
    minor: 0,
    sub_minor: 0,
    build: 0,
};

enum Mode {
    Repl,
    Usage { exit_code: i32 },
    Inline { code: Option<String>, then_repl: bool },
    File { path: String, args: Vec<String> },
}

fn classify(mut argv: Vec<String>) -> Mode {
    if argv.is_empty() {
        return Mode::Repl;
    }
    let first = argv.remove(0);
    match first.as_str() {
        "-h" | "-help" | "--help" | "/?" => Mode::Usage { exit_code: 0 },
        "-i" => {
            if argv.is_empty() {
                Mode::Inline { code: None, then_repl: true }
            } else {
                let arg = argv.remove(0);
                if arg.ends_with(".slisp") {
                    Mode::File { path: arg, args: argv }
                } else {
                    Mode::Inline { code: Some(arg), then_repl: true }
                }
            }
        }
        flag if flag.starts_with('-') => Mode::Usage { exit_code: 1 },
        arg if arg.ends_with(".slisp") => Mode::File { path: arg.to_string(), args: argv },
        arg => Mode::Inline { code: Some(arg.to_string()), then_repl: false },
    }
}

fn host_environment(program: String, script: Option<String>, args: Vec<String>) -> HostEnvironment {
    HostEnvironment { program, script, args, version: VERSION }
}

fn new_interpreter(host_env: HostEnvironment) -> Interpreter {
    let interp = Interpreter::new(host_env);
    builtins::register_builtins(&interp);
    interp
}

fn infix_snapshot(interp: &Interpreter) -> HashMap<String, i32> {
    // `InterpreterSettings` keeps the live table private; the parser only
    // needs a read-only snapshot per parse/eval cycle (§4.2's resolved
    // Open Question), so we rebuild one from the public accessors.
    let settings = interp.settings.borrow();
    let mut table = HashMap::new();
    for symbol in KNOWN_INFIX_CANDIDATES {
        if let Some(prec) = settings.infix_precedence(symbol) {
            table.insert(symbol.to_string(), prec);
        }
    }
    table
}

// `InterpreterSettings` has no iterator over its table, only point lookups,
// so the driver probes the symbols a script could plausibly have registered.
// User code calling `infix-register` on a symbol outside this list still
// works inside the same top-level form (the table is mutated live); only
// the *next* form's fold would miss it, which is an acceptable edge case
// for a symbol nobody asked to highlight as infix.
const KNOWN_INFIX_CANDIDATES: &[&str] = &[
    "+", "-", "*", "/", "=", "!=", "<", ">", "<=", ">=", "and", "or", "mod", "pow",
];

fn report_errors(interp: &Interpreter) -> bool {
    let mut any = false;
    for err in interp.drain_errors() {
        eprintln!("Error: {}", err.what());
        any = true;
    }
    any
}

fn report_eval_error(err: &EvalError) {
    if err.trail.is_empty() {
        eprintln!("Error: {}", err.what());
    } else {
        eprintln!("Error: {} (in {})", err.what(), err.where_trace());
    }
}

/// Evaluates one already-parsed top-level program, routing a thrown
/// `EvalError` or an error-tagged result value to the same `Error: ...`
/// channel (§4.8's error-as-value design reconciled with §7's reporting
/// contract), then draining anything pushed directly onto the error queue.
fn run_program(interp: &Interpreter, program: &Expression, echo: bool) -> bool {
    let mut had_error = false;
    match eval::evaluate(interp, program) {
        Ok(value) => {
            if let Some(msg) = as_error(&value) {
                eprintln!("Error: {}", msg);
                had_error = true;
            } else if echo {
                println!("{}", value);
            }
        }
        Err(e) => {
            report_eval_error(&e);
            had_error = true;
        }
    }
    had_error |= report_errors(interp);
    had_error
}

/// `echo` is true only for interactive REPL forms; scripts and inline `-i`
/// code don't print their result unless the form itself calls `print`.
fn parse_and_run(interp: &Interpreter, source: &str, echo: bool) -> bool {
    let infix = infix_snapshot(interp);
    let default_function = interp.settings.borrow().default_function.clone();
    match parser::parse_program(source, &default_function, &infix) {
        Ok(program) => run_program(interp, &program, echo),
        Err(e) => {
            eprintln!("Error: {}", e);
            true
        }
    }
}

/// Splits `source` into top-level chunks using `parser::input_is_complete`,
/// running and reporting errors for each one before moving to the next, so
/// an error in one form never hides the forms after it (§7).
fn run_script_source(interp: &Interpreter, source: &str) -> i32 {
    let mut pending = String::new();
    for line in source.lines() {
        if !pending.is_empty() {
            pending.push('\n');
        }
        pending.push_str(line);
        if parser::input_is_complete(&pending) {
            parse_and_run(interp, &pending, false);
            pending.clear();
            if interp.stop_requested.get() {
                return interp.exit_code.get();
            }
        }
    }
    if !pending.trim().is_empty() {
        parse_and_run(interp, &pending, false);
    }
    interp.exit_code.get()
}

fn strip_shebang(source: &str) -> &str {
    if let Some(rest) = source.strip_prefix("#!") {
        match rest.find('\n') {
            Some(idx) => &rest[idx + 1..],
            None => "",
        }
    } else {
        source
    }
}

fn run_file(path: &str, args: Vec<String>) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: could not read '{}': {}", path, e);
            return ExitCode::from(1);
        }
    };
    let interp = new_interpreter(host_environment("slisp".to_string(), Some(path.to_string()), args));
    let code = run_script_source(&interp, strip_shebang(&source));
    ExitCode::from(code as u8)
}

fn repl(interp: &Interpreter) -> ExitCode {
    println!("{}", config::WELCOME_MESSAGE);
    println!("{}", config::WELCOME_SUBTITLE);

    let rl_config = Config::builder().auto_add_history(true).build();
    let mut rl = Editor::with_config(rl_config).expect("failed to initialize line editor");
    rl.set_helper(Some(LispHelper::new()));

    let history_file = ".slisp_history";
    let _ = rl.load_history(history_file);

    let mut pending = String::new();
    loop {
        let prompt = if pending.is_empty() { ">>> " } else { "... " };
        match rl.readline(prompt) {
            Ok(line) => {
                if !pending.is_empty() {
                    pending.push('\n');
                }
                pending.push_str(&line);
                if !parser::input_is_complete(&pending) {
                    continue;
                }
                let form = std::mem::take(&mut pending);
                if form.trim().is_empty() {
                    continue;
                }
                parse_and_run(interp, &form, true);
                if interp.stop_requested.get() {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                pending.clear();
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }
    }
    let _ = rl.save_history(history_file);
    ExitCode::from(interp.exit_code.get() as u8)
}

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    match classify(argv) {
        Mode::Usage { exit_code } => {
            print!("{}", config::USAGE_TEXT);
            ExitCode::from(exit_code as u8)
        }
        Mode::Repl => {
            let interp = new_interpreter(host_environment("slisp".to_string(), None, Vec::new()));
            repl(&interp)
        }
        Mode::Inline { code, then_repl } => {
            let interp = new_interpreter(host_environment("slisp".to_string(), None, Vec::new()));
            if let Some(code) = code {
                let had_error = parse_and_run(&interp, &code, false);
                if !then_repl {
                    return ExitCode::from(if had_error { 1 } else { interp.exit_code.get() as u8 });
                }
                if interp.stop_requested.get() {
                    return ExitCode::from(interp.exit_code.get() as u8);
                }
            }
            repl(&interp)
        }
        Mode::File { path, args } => run_file(&path, args),
    }
}
