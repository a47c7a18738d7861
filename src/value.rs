// ABOUTME: Expression type representing every value and AST node in Slisp

use crate::funcdef::FuncDef;
use crate::interpreter::EvaluationContext;
use crate::error::EvalError;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A native implementation backing a `CompiledFunction`. The handle decides
/// its own argument-evaluation strategy by calling back into the context
/// (eagerly via `ctx.evaluate`, or not at all for lazy control forms).
pub type BuiltinHandle = fn(&mut EvaluationContext) -> Result<Expression, EvalError>;

#[derive(Clone)]
pub enum Expression {
    Void,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(String),
    Quote(Box<Expression>),
    Sexp(Vec<Expression>),
    CompiledFunction {
        name: String,
        def: Rc<FuncDef>,
        handle: BuiltinHandle,
    },
    InterpretedFunction {
        name: Option<String>,
        def: Rc<FuncDef>,
        params: Vec<String>,
        body: Rc<Expression>,
        closure: Rc<HashMap<String, Expression>>,
    },
}

impl Expression {
    pub fn nil() -> Expression {
        Expression::Sexp(Vec::new())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Expression::Sexp(items) if items.is_empty())
    }

    pub fn bool_is_truthy(&self) -> bool {
        !matches!(self, Expression::Bool(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Expression::Void => "void",
            Expression::Bool(_) => "bool",
            Expression::Int(_) => "int",
            Expression::Float(_) => "float",
            Expression::Str(_) => "string",
            Expression::Symbol(_) => "symbol",
            Expression::Quote(_) => "quote",
            Expression::Sexp(items) if items.is_empty() => "nil",
            Expression::Sexp(_) => "sexp",
            Expression::CompiledFunction { .. } => "function",
            Expression::InterpretedFunction { .. } => "function",
        }
    }

    pub fn as_list(&self) -> Option<&[Expression]> {
        match self {
            Expression::Sexp(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expression::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expression::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Expression::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Expression::Float(n) => Some(*n),
            Expression::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(
            self,
            Expression::CompiledFunction { .. } | Expression::InterpretedFunction { .. }
        )
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expression::Void, Expression::Void) => true,
            (Expression::Bool(a), Expression::Bool(b)) => a == b,
            (Expression::Int(a), Expression::Int(b)) => a == b,
            (Expression::Float(a), Expression::Float(b)) => a == b,
            (Expression::Str(a), Expression::Str(b)) => a == b,
            (Expression::Symbol(a), Expression::Symbol(b)) => a == b,
            (Expression::Quote(a), Expression::Quote(b)) => a == b,
            (Expression::Sexp(a), Expression::Sexp(b)) => a == b,
            // Functions compare equal only reflexively, by identity of their definition.
            (Expression::CompiledFunction { handle: a, .. }, Expression::CompiledFunction { handle: b, .. }) => {
                std::ptr::eq(*a as *const (), *b as *const ())
            }
            (
                Expression::InterpretedFunction { body: a, .. },
                Expression::InterpretedFunction { body: b, .. },
            ) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Expression {
    /// Shared by the top-level `Display` impl and `Sexp`'s own formatting of
    /// its children, which print a nested function differently (`<Function:
    /// name>`) than a function that is itself the whole printed value
    /// (`Function`).
    fn fmt_inner(&self, f: &mut fmt::Formatter<'_>, nested: bool) -> fmt::Result {
        match self {
            Expression::Void => write!(f, ""),
            Expression::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Expression::Int(n) => write!(f, "{}", n),
            Expression::Float(n) => write!(f, "{}", n),
            Expression::Str(s) => write!(f, "\"{}\"", s),
            Expression::Symbol(s) => write!(f, "{}", s),
            Expression::Quote(inner) => write!(f, "'{}", inner),
            Expression::Sexp(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    item.fmt_inner(f, true)?;
                }
                write!(f, ")")
            }
            Expression::CompiledFunction { name, .. } => {
                if nested {
                    write!(f, "<Function:{}>", name)
                } else {
                    write!(f, "Function")
                }
            }
            Expression::InterpretedFunction { name, .. } => {
                if nested {
                    match name {
                        Some(name) => write!(f, "<Function:{}>", name),
                        None => write!(f, "<Function>"),
                    }
                } else {
                    write!(f, "Function")
                }
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_inner(f, false)
    }
}
