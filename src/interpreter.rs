// ABOUTME: Interpreter-wide state: settings, dynamic table, call stack, and the
// ABOUTME: EvaluationContext handle passed to every CompiledFunction

use crate::env::{SymbolTable, StackFrame};
use crate::error::{EvalError, LispError};
use crate::value::Expression;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::rc::Rc;

pub const DEFAULT_FUNCTION: &str = "default";
pub const LIST_FUNCTION: &str = "list";

pub const NO_PRECEDENCE: i32 = -1;

#[derive(Debug, Clone, Copy, Default)]
pub struct SlispVersion {
    pub major: u32,
    pub minor: u32,
    pub sub_minor: u32,
    pub build: u32,
}

impl std::fmt::Display for SlispVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Slisp {}.{}.{}.{}",
            self.major, self.minor, self.sub_minor, self.build
        )
    }
}

/// Program name / script path / script args, exposed read-only as `sys.*`.
#[derive(Debug, Clone, Default)]
pub struct HostEnvironment {
    pub program: String,
    pub script: Option<String>,
    pub args: Vec<String>,
    pub version: SlispVersion,
}

/// The interpreter-wide configurable names and infix precedence table.
pub struct InterpreterSettings {
    pub default_function: String,
    pub list_function: String,
    infix: HashMap<String, i32>,
}

impl Default for InterpreterSettings {
    fn default() -> Self {
        InterpreterSettings {
            default_function: DEFAULT_FUNCTION.to_string(),
            list_function: LIST_FUNCTION.to_string(),
            infix: HashMap::new(),
        }
    }
}

impl InterpreterSettings {
    pub fn register_infix(&mut self, symbol: impl Into<String>, precedence: i32) {
        self.infix.insert(symbol.into(), precedence);
    }

    pub fn unregister_infix(&mut self, symbol: &str) {
        self.infix.remove(symbol);
    }

    pub fn infix_precedence(&self, symbol: &str) -> Option<i32> {
        self.infix.get(symbol).copied()
    }

    pub fn is_infix(&self, symbol: &str) -> bool {
        self.infix.contains_key(symbol)
    }
}

/// One open file, as tracked by the `open`/`read-line`/`write-line`/
/// `reset`/`close` builtins (§6 File I/O contract). A plain `std::fs`
/// adapter; no sandboxing or capability layer.
pub enum FileHandleState {
    Read(BufReader<std::fs::File>),
    Write(std::fs::File),
}

impl FileHandleState {
    pub fn read_line(&mut self) -> std::io::Result<Option<String>> {
        match self {
            FileHandleState::Read(reader) => {
                let mut line = String::new();
                let n = reader.read_line(&mut line)?;
                if n == 0 {
                    Ok(None)
                } else {
                    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
                }
            }
            FileHandleState::Write(_) => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "file not opened for reading",
            )),
        }
    }

    pub fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        match self {
            FileHandleState::Write(file) => {
                writeln!(file, "{}", line)
            }
            FileHandleState::Read(_) => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "file not opened for writing",
            )),
        }
    }

    pub fn reset(&mut self) -> std::io::Result<()> {
        match self {
            FileHandleState::Read(reader) => {
                reader.seek(SeekFrom::Start(0))?;
                Ok(())
            }
            FileHandleState::Write(file) => {
                file.seek(SeekFrom::Start(0))?;
                file.set_len(0)?;
                Ok(())
            }
        }
    }
}

/// Top-level interpreter state: the dynamic symbol table, the active call
/// stack, interpreter-wide settings, the error queue, and the stop flag.
pub struct Interpreter {
    pub dynamic: Rc<RefCell<SymbolTable>>,
    pub frames: RefCell<Vec<StackFrame>>,
    pub settings: RefCell<InterpreterSettings>,
    pub errors: RefCell<Vec<EvalError>>,
    pub stop_requested: Cell<bool>,
    pub exit_code: Cell<i32>,
    pub host_env: RefCell<HostEnvironment>,
    pub files: RefCell<HashMap<i64, FileHandleState>>,
    next_handle: Cell<i64>,
}

impl Interpreter {
    pub fn new(host_env: HostEnvironment) -> Self {
        Interpreter {
            dynamic: Rc::new(RefCell::new(SymbolTable::new())),
            frames: RefCell::new(Vec::new()),
            settings: RefCell::new(InterpreterSettings::default()),
            errors: RefCell::new(Vec::new()),
            stop_requested: Cell::new(false),
            exit_code: Cell::new(0),
            host_env: RefCell::new(host_env),
            files: RefCell::new(HashMap::new()),
            next_handle: Cell::new(1),
        }
    }

    /// Stores a newly opened file and returns its handle id.
    pub fn insert_file(&self, state: FileHandleState) -> i64 {
        let id = self.next_handle.get();
        self.next_handle.set(id + 1);
        self.files.borrow_mut().insert(id, state);
        id
    }

    pub fn define_global(&self, name: impl Into<String>, value: Expression) {
        self.dynamic.borrow_mut().put(name, value);
    }

    pub fn get_symbol(&self, name: &str) -> Option<Expression> {
        if let Some(frame) = self.frames.borrow().last() {
            frame.get(name)
        } else {
            self.dynamic.borrow().get(name)
        }
    }

    /// Resolves a symbol without committing to a full evaluation; used by
    /// `FuncDef::validate`'s peek hook.
    pub fn peek_symbol(&self, name: &str) -> Option<Expression> {
        self.get_symbol(name)
    }

    pub fn push_frame(&self, frame: StackFrame) {
        self.frames.borrow_mut().push(frame);
    }

    pub fn pop_frame(&self) -> Option<StackFrame> {
        self.frames.borrow_mut().pop()
    }

    pub fn current_function_name(&self) -> String {
        self.frames
            .borrow()
            .last()
            .map(|f| f.function_name.clone())
            .unwrap_or_else(|| "<top-level>".to_string())
    }

    pub fn push_error(&self, error: EvalError) {
        self.errors.borrow_mut().push(error);
    }

    pub fn drain_errors(&self) -> Vec<EvalError> {
        self.errors.borrow_mut().drain(..).collect()
    }

    pub fn request_stop(&self, exit_code: i32) {
        self.stop_requested.set(true);
        self.exit_code.set(exit_code);
    }
}

/// The calling contract handed to every `CompiledFunction` handle (§4.7).
/// Exposes the call form, eager/lazy evaluation accessors, typed getters,
/// and error constructors that automatically stamp the current function
/// name onto the `where` trail.
pub struct EvaluationContext<'a> {
    pub interp: &'a Interpreter,
    pub call: &'a Expression,
    pub args: &'a [Expression],
    pub function_name: &'a str,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(
        interp: &'a Interpreter,
        call: &'a Expression,
        args: &'a [Expression],
        function_name: &'a str,
    ) -> Self {
        EvaluationContext {
            interp,
            call,
            args,
            function_name,
        }
    }

    pub fn evaluate(&self, expr: &Expression) -> Result<Expression, EvalError> {
        crate::eval::evaluate(self.interp, expr)
            .map_err(|e| e.with_frame(self.function_name.to_string()))
    }

    pub fn evaluate_no_error(&self, expr: &Expression) -> Option<Expression> {
        crate::eval::evaluate(self.interp, expr).ok()
    }

    pub fn get_symbol(&self, name: &str) -> Option<Expression> {
        self.interp.get_symbol(name)
    }

    pub fn get_list(&self, expr: &Expression) -> Result<Vec<Expression>, EvalError> {
        let evaluated = self.evaluate(expr)?;
        match evaluated {
            Expression::Sexp(items) => Ok(items),
            other => Err(self.type_error(crate::funcdef::TypeTag::Sexp, &other, 0)),
        }
    }

    pub fn get_required_int(&self, expr: &Expression, position: usize) -> Result<i64, EvalError> {
        let evaluated = self.evaluate(expr)?;
        evaluated
            .as_int()
            .ok_or_else(|| self.type_error(crate::funcdef::TypeTag::Int, &evaluated, position))
    }

    pub fn get_required_float(&self, expr: &Expression, position: usize) -> Result<f64, EvalError> {
        let evaluated = self.evaluate(expr)?;
        evaluated
            .as_float()
            .ok_or_else(|| self.type_error(crate::funcdef::TypeTag::Float, &evaluated, position))
    }

    pub fn get_required_str(&self, expr: &Expression, position: usize) -> Result<String, EvalError> {
        let evaluated = self.evaluate(expr)?;
        evaluated
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| self.type_error(crate::funcdef::TypeTag::Str, &evaluated, position))
    }

    pub fn get_required_bool(&self, expr: &Expression, position: usize) -> Result<bool, EvalError> {
        let evaluated = self.evaluate(expr)?;
        match evaluated {
            Expression::Bool(b) => Ok(b),
            other => Err(self.type_error(crate::funcdef::TypeTag::Bool, &other, position)),
        }
    }

    pub fn return_nil(&self) -> Result<Expression, EvalError> {
        Ok(Expression::nil())
    }

    pub fn error(&self, message: impl Into<String>) -> EvalError {
        EvalError::new(LispError::generic(message)).with_frame(self.function_name.to_string())
    }

    pub fn type_error(&self, expected: crate::funcdef::TypeTag, actual: &Expression, position: usize) -> EvalError {
        EvalError::new(LispError::type_error(
            self.function_name,
            expected,
            actual.type_name(),
            position,
        ))
        .with_frame(self.function_name.to_string())
    }

    pub fn arity_error(&self, expected: impl Into<String>) -> EvalError {
        EvalError::new(LispError::arity_error(
            self.function_name,
            expected,
            self.args.len(),
        ))
        .with_frame(self.function_name.to_string())
    }

    pub fn unknown_symbol_error(&self, name: &str) -> EvalError {
        EvalError::new(LispError::UnknownSymbol(name.to_string()))
            .with_frame(self.function_name.to_string())
    }

    pub fn divide_by_zero_error(&self) -> EvalError {
        EvalError::new(LispError::DivideByZero(self.function_name.to_string()))
            .with_frame(self.function_name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_names_match_spec() {
        let settings = InterpreterSettings::default();
        assert_eq!(settings.default_function, DEFAULT_FUNCTION);
        assert_eq!(settings.list_function, LIST_FUNCTION);
    }

    #[test]
    fn infix_registration_round_trips() {
        let mut settings = InterpreterSettings::default();
        settings.register_infix("+", 10);
        assert_eq!(settings.infix_precedence("+"), Some(10));
        settings.unregister_infix("+");
        assert_eq!(settings.infix_precedence("+"), None);
    }

    #[test]
    fn stop_flag_carries_exit_code() {
        let interp = Interpreter::new(HostEnvironment::default());
        assert!(!interp.stop_requested.get());
        interp.request_stop(2);
        assert!(interp.stop_requested.get());
        assert_eq!(interp.exit_code.get(), 2);
    }
}
