//! Logical operators: and, or, not
//!
//! `and`/`or` are short-circuiting and lazily evaluate their arguments one at
//! a time via `ctx.evaluate`, rather than having the evaluator eagerly reduce
//! every argument first.

use crate::funcdef::{Arity, FuncDef, TypeTag};
use crate::interpreter::{EvaluationContext, Interpreter};
use crate::value::{BuiltinHandle, Expression};
use crate::error::EvalError;
use std::rc::Rc;

fn compiled(name: &str, def: FuncDef, handle: BuiltinHandle) -> Expression {
    Expression::CompiledFunction {
        name: name.to_string(),
        def: Rc::new(def),
        handle,
    }
}

fn builtin_and(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let mut last = Expression::Bool(true);
    for arg in ctx.args.to_vec() {
        last = ctx.evaluate(&arg)?;
        if !last.bool_is_truthy() {
            return Ok(Expression::Bool(false));
        }
    }
    Ok(last)
}

fn builtin_or(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    for arg in ctx.args.to_vec() {
        let value = ctx.evaluate(&arg)?;
        if value.bool_is_truthy() {
            return Ok(value);
        }
    }
    Ok(Expression::Bool(false))
}

fn builtin_not(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let value = ctx.evaluate(&ctx.args[0].clone())?;
    Ok(Expression::Bool(!value.bool_is_truthy()))
}

pub fn register(interp: &Interpreter) {
    interp.define_global(
        "and",
        compiled("and", FuncDef::varargs(TypeTag::Any, Arity::Any, TypeTag::Any), builtin_and),
    );
    interp.define_global(
        "or",
        compiled("or", FuncDef::varargs(TypeTag::Any, Arity::Any, TypeTag::Any), builtin_or),
    );
    interp.define_global(
        "not",
        compiled("not", FuncDef::fixed(vec![TypeTag::Any], TypeTag::Bool), builtin_not),
    );

    use crate::help::{register_help, HelpEntry};
    register_help(HelpEntry {
        name: "and".to_string(),
        category: "Logic".to_string(),
        signature: "(and val...)".to_string(),
        description: "Short-circuiting logical AND; returns false on the first falsy value, else the last value.".to_string(),
        examples: vec!["(and true true) => true".to_string(), "(and true false 1) => false".to_string()],
        related: vec!["or".to_string(), "not".to_string()],
    });
    register_help(HelpEntry {
        name: "or".to_string(),
        category: "Logic".to_string(),
        signature: "(or val...)".to_string(),
        description: "Short-circuiting logical OR; returns the first truthy value, else false.".to_string(),
        examples: vec!["(or false 2) => 2".to_string()],
        related: vec!["and".to_string(), "not".to_string()],
    });
    register_help(HelpEntry {
        name: "not".to_string(),
        category: "Logic".to_string(),
        signature: "(not val)".to_string(),
        description: "Returns true if val is falsy, else false.".to_string(),
        examples: vec!["(not false) => true".to_string()],
        related: vec!["and".to_string(), "or".to_string()],
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::HostEnvironment;

    #[test]
    fn and_short_circuits_on_first_falsy() {
        let interp = Interpreter::new(HostEnvironment::default());
        register(&interp);
        let call = Expression::Sexp(vec![
            Expression::Symbol("and".into()),
            Expression::Bool(false),
            Expression::Symbol("undefined-var".into()),
        ]);
        assert_eq!(crate::eval::evaluate(&interp, &call).unwrap(), Expression::Bool(false));
    }

    #[test]
    fn or_returns_first_truthy_value() {
        let interp = Interpreter::new(HostEnvironment::default());
        register(&interp);
        let call = Expression::Sexp(vec![
            Expression::Symbol("or".into()),
            Expression::Bool(false),
            Expression::Int(7),
        ]);
        assert_eq!(crate::eval::evaluate(&interp, &call).unwrap(), Expression::Int(7));
    }
}
