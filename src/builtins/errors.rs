//! Error handling: error, error?, error-msg
//!
//! Errors here are first-class Sexp-tagged values rather than host
//! exceptions: `error` never returns `Err`, it builds a tagged value that
//! composes like any other value. A top-level form whose result is still
//! error-tagged once the host inspects it is pushed onto the error queue
//! exactly as a thrown `EvalError` would be (see `is_error_value` below,
//! used by the REPL/script driver); `error?`/`error-msg` let a caller
//! intercept it before that happens.

use crate::funcdef::{FuncDef, TypeTag};
use crate::interpreter::{EvaluationContext, Interpreter};
use crate::value::{BuiltinHandle, Expression};
use crate::error::EvalError;
use std::rc::Rc;

const ERROR_TAG: &str = "error";

fn compiled(name: &str, def: FuncDef, handle: BuiltinHandle) -> Expression {
    Expression::CompiledFunction {
        name: name.to_string(),
        def: Rc::new(def),
        handle,
    }
}

/// Builds the tagged value `(error "msg")` returned by the `error` builtin.
pub fn tag(message: impl Into<String>) -> Expression {
    Expression::Sexp(vec![Expression::Symbol(ERROR_TAG.to_string()), Expression::Str(message.into())])
}

/// Recognizes a value built by `tag`, returning its message.
pub fn as_error(value: &Expression) -> Option<&str> {
    match value {
        Expression::Sexp(items) => match items.as_slice() {
            [Expression::Symbol(head), Expression::Str(msg)] if head == ERROR_TAG => Some(msg),
            _ => None,
        },
        _ => None,
    }
}

fn builtin_error(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let msg = ctx.evaluate(&ctx.args[0].clone())?;
    Ok(tag(crate::builtins::types::natural_string(&msg)))
}

fn builtin_error_q(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let value = ctx.evaluate(&ctx.args[0].clone())?;
    Ok(Expression::Bool(as_error(&value).is_some()))
}

fn builtin_error_msg(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let value = ctx.evaluate(&ctx.args[0].clone())?;
    match as_error(&value) {
        Some(msg) => Ok(Expression::Str(msg.to_string())),
        None => Err(ctx.error("error-msg: argument is not an error value")),
    }
}

pub fn register(interp: &Interpreter) {
    interp.define_global(
        "error",
        compiled("error", FuncDef::fixed(vec![TypeTag::Any], TypeTag::Sexp), builtin_error),
    );
    interp.define_global(
        "error?",
        compiled("error?", FuncDef::fixed(vec![TypeTag::Any], TypeTag::Bool), builtin_error_q),
    );
    interp.define_global(
        "error-msg",
        compiled("error-msg", FuncDef::fixed(vec![TypeTag::Any], TypeTag::Str), builtin_error_msg),
    );

    use crate::help::{register_help, HelpEntry};
    register_help(HelpEntry {
        name: "error".to_string(),
        category: "Error handling".to_string(),
        signature: "(error msg)".to_string(),
        description: "Builds a first-class error value carrying msg. Does not raise by itself; an uncaught error reaching the top level is reported as a failure.".to_string(),
        examples: vec!["(error \"invalid input\") => (error \"invalid input\")".to_string()],
        related: vec!["error?".to_string(), "error-msg".to_string()],
    });
    register_help(HelpEntry {
        name: "error?".to_string(),
        category: "Error handling".to_string(),
        signature: "(error? val)".to_string(),
        description: "Tests whether val is an error value.".to_string(),
        examples: vec!["(error? (error \"x\")) => true".to_string(), "(error? 5) => false".to_string()],
        related: vec!["error".to_string(), "error-msg".to_string()],
    });
    register_help(HelpEntry {
        name: "error-msg".to_string(),
        category: "Error handling".to_string(),
        signature: "(error-msg val)".to_string(),
        description: "Extracts the message from an error value; raises a type error otherwise.".to_string(),
        examples: vec!["(error-msg (error \"bad\")) => \"bad\"".to_string()],
        related: vec!["error".to_string(), "error?".to_string()],
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::HostEnvironment;

    fn interp() -> Interpreter {
        let interp = Interpreter::new(HostEnvironment::default());
        register(&interp);
        crate::builtins::types::register(&interp);
        interp
    }

    fn call(name: &str, args: Vec<Expression>) -> Expression {
        let mut items = vec![Expression::Symbol(name.to_string())];
        items.extend(args);
        Expression::Sexp(items)
    }

    #[test]
    fn error_builds_a_tagged_value_without_raising() {
        let interp = interp();
        let result = crate::eval::evaluate(&interp, &call("error", vec![Expression::Str("boom".into())])).unwrap();
        assert_eq!(as_error(&result), Some("boom"));
    }

    #[test]
    fn error_q_detects_tagged_values_only() {
        let interp = interp();
        let errored = call("error", vec![Expression::Str("boom".into())]);
        assert_eq!(
            crate::eval::evaluate(&interp, &call("error?", vec![errored])).unwrap(),
            Expression::Bool(true)
        );
        assert_eq!(
            crate::eval::evaluate(&interp, &call("error?", vec![Expression::Int(5)])).unwrap(),
            Expression::Bool(false)
        );
    }

    #[test]
    fn error_msg_unwraps_the_message() {
        let interp = interp();
        let errored = call("error", vec![Expression::Str("bad input".into())]);
        assert_eq!(
            crate::eval::evaluate(&interp, &call("error-msg", vec![errored])).unwrap(),
            Expression::Str("bad input".to_string())
        );
    }

    #[test]
    fn error_msg_on_non_error_raises() {
        let interp = interp();
        assert!(crate::eval::evaluate(&interp, &call("error-msg", vec![Expression::Int(1)])).is_err());
    }
}
