//! File I/O: open, read-line, write-line, reset, close
//!
//! Handles are plain Int ids keyed into the interpreter's file table; a
//! `std::fs`-backed adapter with no sandboxing, unlike the teacher's
//! cap-std-based filesystem tool. Opening for write truncates an existing
//! file; writing to a read-opened handle (or reading a write-opened one)
//! fails.

use crate::funcdef::{FuncDef, TypeTag};
use crate::interpreter::{EvaluationContext, FileHandleState, Interpreter};
use crate::value::{BuiltinHandle, Expression};
use crate::error::EvalError;
use std::io::BufReader;
use std::rc::Rc;

fn compiled(name: &str, def: FuncDef, handle: BuiltinHandle) -> Expression {
    Expression::CompiledFunction {
        name: name.to_string(),
        def: Rc::new(def),
        handle,
    }
}

fn builtin_open(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let path = ctx.get_required_str(&ctx.args[0].clone(), 0)?;
    let mode = ctx.get_required_str(&ctx.args[1].clone(), 1)?;
    let state = match mode.as_str() {
        "read" => {
            let file = std::fs::File::open(&path).map_err(|e| ctx.error(format!("open: {}", e)))?;
            FileHandleState::Read(BufReader::new(file))
        }
        "write" => {
            let file = std::fs::File::create(&path).map_err(|e| ctx.error(format!("open: {}", e)))?;
            FileHandleState::Write(file)
        }
        other => return Err(ctx.error(format!("open: unknown mode '{}', expected \"read\" or \"write\"", other))),
    };
    Ok(Expression::Int(ctx.interp.insert_file(state)))
}

fn builtin_read_line(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let handle = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    let mut files = ctx.interp.files.borrow_mut();
    let state = files
        .get_mut(&handle)
        .ok_or_else(|| ctx.error(format!("read-line: no open file for handle {}", handle)))?;
    match state.read_line() {
        Ok(Some(line)) => Ok(Expression::Str(line)),
        Ok(None) => Ok(Expression::Bool(false)),
        Err(e) => Err(ctx.error(format!("read-line: {}", e))),
    }
}

fn builtin_write_line(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let handle = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    let line = ctx.get_required_str(&ctx.args[1].clone(), 1)?;
    let mut files = ctx.interp.files.borrow_mut();
    let state = files
        .get_mut(&handle)
        .ok_or_else(|| ctx.error(format!("write-line: no open file for handle {}", handle)))?;
    state
        .write_line(&line)
        .map(|_| Expression::Bool(true))
        .map_err(|e| ctx.error(format!("write-line: {}", e)))
}

fn builtin_reset(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let handle = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    let mut files = ctx.interp.files.borrow_mut();
    let state = files
        .get_mut(&handle)
        .ok_or_else(|| ctx.error(format!("reset: no open file for handle {}", handle)))?;
    state
        .reset()
        .map(|_| Expression::Bool(true))
        .map_err(|e| ctx.error(format!("reset: {}", e)))
}

fn builtin_close(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let handle = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    let removed = ctx.interp.files.borrow_mut().remove(&handle);
    if removed.is_none() {
        return Err(ctx.error(format!("close: no open file for handle {}", handle)));
    }
    Ok(Expression::Bool(true))
}

pub fn register(interp: &Interpreter) {
    interp.define_global(
        "open",
        compiled("open", FuncDef::fixed(vec![TypeTag::Str, TypeTag::Str], TypeTag::Int), builtin_open),
    );
    interp.define_global(
        "read-line",
        compiled("read-line", FuncDef::fixed(vec![TypeTag::Int], TypeTag::Any), builtin_read_line),
    );
    interp.define_global(
        "write-line",
        compiled("write-line", FuncDef::fixed(vec![TypeTag::Int, TypeTag::Str], TypeTag::Bool), builtin_write_line),
    );
    interp.define_global(
        "reset",
        compiled("reset", FuncDef::fixed(vec![TypeTag::Int], TypeTag::Bool), builtin_reset),
    );
    interp.define_global(
        "close",
        compiled("close", FuncDef::fixed(vec![TypeTag::Int], TypeTag::Bool), builtin_close),
    );

    use crate::help::{register_help, HelpEntry};
    register_help(HelpEntry {
        name: "open".to_string(),
        category: "File I/O".to_string(),
        signature: "(open path mode)".to_string(),
        description: "Opens path for \"read\" or \"write\" and returns a handle. Opening for write truncates an existing file.".to_string(),
        examples: vec!["(open \"data.txt\" \"read\") => 1".to_string()],
        related: vec!["read-line".to_string(), "write-line".to_string(), "close".to_string()],
    });
    register_help(HelpEntry {
        name: "read-line".to_string(),
        category: "File I/O".to_string(),
        signature: "(read-line handle)".to_string(),
        description: "Reads one line from a read-opened handle; returns false at end of file.".to_string(),
        examples: vec!["(read-line h) => \"first line\"".to_string()],
        related: vec!["open".to_string(), "write-line".to_string()],
    });
    register_help(HelpEntry {
        name: "write-line".to_string(),
        category: "File I/O".to_string(),
        signature: "(write-line handle line)".to_string(),
        description: "Appends line and a newline to a write-opened handle.".to_string(),
        examples: vec!["(write-line h \"hello\") => true".to_string()],
        related: vec!["open".to_string(), "read-line".to_string()],
    });
    register_help(HelpEntry {
        name: "reset".to_string(),
        category: "File I/O".to_string(),
        signature: "(reset handle)".to_string(),
        description: "Seeks a handle back to the start of the file (truncating a write handle).".to_string(),
        examples: vec!["(reset h) => true".to_string()],
        related: vec!["open".to_string()],
    });
    register_help(HelpEntry {
        name: "close".to_string(),
        category: "File I/O".to_string(),
        signature: "(close handle)".to_string(),
        description: "Releases a handle. Further operations on it fail.".to_string(),
        examples: vec!["(close h) => true".to_string()],
        related: vec!["open".to_string()],
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::HostEnvironment;

    fn interp() -> Interpreter {
        let interp = Interpreter::new(HostEnvironment::default());
        register(&interp);
        interp
    }

    fn call(name: &str, args: Vec<Expression>) -> Expression {
        let mut items = vec![Expression::Symbol(name.to_string())];
        items.extend(args);
        Expression::Sexp(items)
    }

    #[test]
    fn write_then_read_round_trips_a_line() {
        let interp = interp();
        let dir = std::env::temp_dir().join(format!("slisp-test-{}.txt", std::process::id()));
        let path = dir.to_str().unwrap().to_string();

        let handle = crate::eval::evaluate(
            &interp,
            &call("open", vec![Expression::Str(path.clone()), Expression::Str("write".into())]),
        )
        .unwrap();
        crate::eval::evaluate(&interp, &call("write-line", vec![handle.clone(), Expression::Str("hello".into())])).unwrap();
        crate::eval::evaluate(&interp, &call("close", vec![handle])).unwrap();

        let read_handle = crate::eval::evaluate(
            &interp,
            &call("open", vec![Expression::Str(path.clone()), Expression::Str("read".into())]),
        )
        .unwrap();
        let line = crate::eval::evaluate(&interp, &call("read-line", vec![read_handle.clone()])).unwrap();
        assert_eq!(line, Expression::Str("hello".to_string()));
        let eof = crate::eval::evaluate(&interp, &call("read-line", vec![read_handle.clone()])).unwrap();
        assert_eq!(eof, Expression::Bool(false));
        crate::eval::evaluate(&interp, &call("close", vec![read_handle])).unwrap();

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn operations_on_unknown_handle_error() {
        let interp = interp();
        assert!(crate::eval::evaluate(&interp, &call("read-line", vec![Expression::Int(999)])).is_err());
    }
}
