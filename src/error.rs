// ABOUTME: Error types for the Slisp interpreter: kinds, stack-trace context, and helpers

use thiserror::Error;

pub const ARITY_ONE: &str = "1";
pub const ARITY_TWO: &str = "2";
pub const ARITY_AT_LEAST_ONE: &str = "at least 1";
pub const ARITY_ANY: &str = "any";

/// One of the error kinds named by the design: each carries only the
/// message text (`what`); the call-stack trail (`where`) is layered on by
/// `EvalError` so a kind stays reusable across call sites.
#[derive(Error, Debug, Clone)]
pub enum LispError {
    #[error("{0}")]
    Tokenize(String),

    #[error("{0}")]
    Parse(String),

    #[error("{function}: expected {expected} argument{}, got {actual}", if expected == "1" { "" } else { "s" })]
    Arity {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("{function}: expected {expected}, got {actual} at argument {position}")]
    Type {
        function: String,
        expected: String,
        actual: String,
        position: usize,
    },

    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("{0}: divide by zero")]
    DivideByZero(String),

    #[error("allocation error: {0}")]
    Allocation(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("{0}")]
    Generic(String),

    #[error("value is not callable")]
    NotCallable,
}

impl LispError {
    pub fn type_error(function: &str, expected: impl ToString, actual: &str, position: usize) -> Self {
        LispError::Type {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
            position,
        }
    }

    pub fn arity_error(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        LispError::Arity {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn generic(message: impl Into<String>) -> Self {
        LispError::Generic(message.into())
    }
}

/// An error in flight: the underlying kind plus the trail of enclosing
/// function names it has passed through, joined with `→` for display (§7).
#[derive(Debug, Clone)]
pub struct EvalError {
    pub kind: LispError,
    pub trail: Vec<String>,
}

impl EvalError {
    pub fn new(kind: LispError) -> Self {
        EvalError {
            kind,
            trail: Vec::new(),
        }
    }

    /// Adds an enclosing frame name without masking the root cause.
    pub fn with_frame(mut self, name: impl Into<String>) -> Self {
        self.trail.push(name.into());
        self
    }

    pub fn what(&self) -> String {
        self.kind.to_string()
    }

    pub fn where_trace(&self) -> String {
        self.trail.join(" \u{2192} ")
    }
}

impl From<LispError> for EvalError {
    fn from(kind: LispError) -> Self {
        EvalError::new(kind)
    }
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.what())
    }
}

impl std::error::Error for EvalError {}
