// ABOUTME: The tree-walking evaluator: expression reduction and function-call dispatch (§4.6)

use crate::env::StackFrame;
use crate::error::{EvalError, LispError};
use crate::funcdef::{FuncDef, ValidationError};
use crate::interpreter::{EvaluationContext, Interpreter};
use crate::value::Expression;
use std::rc::Rc;

/// Reduces `expr` to a normal form, dispatching on its variant (§4.6).
pub fn evaluate(interp: &Interpreter, expr: &Expression) -> Result<Expression, EvalError> {
    match expr {
        Expression::Void
        | Expression::Bool(_)
        | Expression::Int(_)
        | Expression::Float(_)
        | Expression::Str(_)
        | Expression::CompiledFunction { .. }
        | Expression::InterpretedFunction { .. } => Ok(expr.clone()),

        Expression::Quote(_) => Ok(expr.clone()),

        Expression::Symbol(name) => match interp.get_symbol(name) {
            Some(value) => evaluate(interp, &value),
            None => Err(LispError::UnknownSymbol(name.clone()).into()),
        },

        Expression::Sexp(items) if items.is_empty() => Ok(expr.clone()),
        Expression::Sexp(items) => eval_call(interp, items),
    }
}

fn eval_call(interp: &Interpreter, items: &[Expression]) -> Result<Expression, EvalError> {
    let head = &items[0];
    let raw_args = &items[1..];

    if let Expression::Symbol(name) = head {
        if name == &interp.settings.borrow().list_function {
            let mut values = Vec::with_capacity(raw_args.len());
            for arg in raw_args {
                values.push(evaluate(interp, arg)?);
            }
            return Ok(Expression::Sexp(values));
        }
    }

    match resolve_head(interp, head)? {
        Some((func, name_hint)) => call(interp, &func, raw_args.to_vec(), &name_hint),
        // Head didn't resolve to a function: treat the whole form as a
        // self-evaluating list literal rather than raising NotCallable,
        // e.g. `(1 2 3)` or `(1 "foo" #f)` evaluate to themselves.
        None => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(evaluate(interp, item)?);
            }
            Ok(Expression::Sexp(values))
        }
    }
}

/// Resolves a call form's head to a function value. Returns `Ok(None)` when
/// the head is not a function (a literal, a nested Sexp that doesn't reduce
/// to one, or a symbol bound to a non-function value) so the caller can fall
/// back to list-literal semantics; an unbound symbol is still a hard error.
fn resolve_head(interp: &Interpreter, head: &Expression) -> Result<Option<(Expression, String)>, EvalError> {
    match head {
        Expression::Sexp(_) => {
            let value = evaluate(interp, head)?;
            if value.is_function() {
                Ok(Some((value, "<lambda>".to_string())))
            } else {
                Ok(None)
            }
        }
        Expression::Symbol(name) => match interp.get_symbol(name) {
            Some(value) if value.is_function() => Ok(Some((value, name.clone()))),
            Some(_) => Ok(None),
            None if name == &interp.settings.borrow().default_function => {
                Ok(Some((crate::builtins::control::default_function_expr(), name.clone())))
            }
            None => Err(LispError::UnknownSymbol(name.clone()).into()),
        },
        _ => Ok(None),
    }
}

/// Validates and dispatches a call to an already-resolved function value.
/// Shared by the evaluator's own call-form reduction and by any built-in
/// (`map`, `filter`, `apply`, ...) that needs to invoke a function value it
/// was handed as data.
pub fn call(
    interp: &Interpreter,
    func: &Expression,
    raw_args: Vec<Expression>,
    name_hint: &str,
) -> Result<Expression, EvalError> {
    let def = function_def(func);
    let display_name = match func {
        Expression::CompiledFunction { name, .. } => name.as_str(),
        _ => name_hint,
    };

    def.validate(&raw_args, |name| interp.peek_symbol(name))
        .map_err(|e| validation_to_eval_error(e, display_name))?;

    match func {
        Expression::CompiledFunction { name, handle, .. } => {
            let call_expr = Expression::Sexp(
                std::iter::once(func.clone()).chain(raw_args.iter().cloned()).collect(),
            );
            let mut ctx = EvaluationContext::new(interp, &call_expr, &raw_args, name);
            handle(&mut ctx)
        }
        Expression::InterpretedFunction { params, body, closure, .. } => {
            call_interpreted(interp, params, body, closure, raw_args, display_name)
        }
        _ => Err(LispError::NotCallable.into()),
    }
}

fn function_def(func: &Expression) -> Rc<FuncDef> {
    match func {
        Expression::CompiledFunction { def, .. } => def.clone(),
        Expression::InterpretedFunction { def, .. } => def.clone(),
        _ => unreachable!("function_def called on a non-function Expression"),
    }
}

fn validation_to_eval_error(err: ValidationError, function: &str) -> EvalError {
    match err {
        ValidationError::Arity { expected, actual } => {
            LispError::arity_error(function, expected, actual).into()
        }
        ValidationError::Type { expected, actual, position } => {
            LispError::type_error(function, expected, &actual, position).into()
        }
    }
}

fn call_interpreted(
    interp: &Interpreter,
    params: &[String],
    body: &Rc<Expression>,
    closure: &Rc<std::collections::HashMap<String, Expression>>,
    raw_args: Vec<Expression>,
    name: &str,
) -> Result<Expression, EvalError> {
    let mut evaluated = Vec::with_capacity(raw_args.len());
    for arg in &raw_args {
        evaluated.push(evaluate(interp, arg).map_err(|e| e.with_frame(name.to_string()))?);
    }

    let mut frame = StackFrame::new(name.to_string(), closure.clone(), interp.dynamic.clone());
    for (param, value) in params.iter().zip(evaluated) {
        frame.put_local(param.clone(), value);
    }
    interp.push_frame(frame);
    let result = evaluate(interp, body);
    interp.pop_frame();
    result.map_err(|e| e.with_frame(name.to_string()))
}
