//! Comparison operations: =, !=, <, >, <=, >=
//!
//! Binary relational operators. `=`/`!=` work over any value via
//! `Expression`'s own `PartialEq`; the ordering operators require both sides
//! to be numeric (Int/Float, freely mixed) or both Str.

use crate::funcdef::{FuncDef, TypeTag};
use crate::interpreter::{EvaluationContext, Interpreter};
use crate::value::{BuiltinHandle, Expression};
use crate::error::EvalError;
use std::rc::Rc;
use std::cmp::Ordering;

fn compiled(name: &str, handle: BuiltinHandle) -> Expression {
    Expression::CompiledFunction {
        name: name.to_string(),
        def: Rc::new(FuncDef::fixed(vec![TypeTag::Any, TypeTag::Any], TypeTag::Bool)),
        handle,
    }
}

fn ordering(ctx: &EvaluationContext, a: &Expression, b: &Expression) -> Result<Ordering, EvalError> {
    match (a, b) {
        (Expression::Str(x), Expression::Str(y)) => Ok(x.cmp(y)),
        _ => {
            let x = a
                .as_float()
                .ok_or_else(|| ctx.type_error(TypeTag::Float, a, 0))?;
            let y = b
                .as_float()
                .ok_or_else(|| ctx.type_error(TypeTag::Float, b, 1))?;
            x.partial_cmp(&y)
                .ok_or_else(|| ctx.error("cannot order NaN"))
        }
    }
}

fn builtin_eq(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let a = ctx.evaluate(&ctx.args[0].clone())?;
    let b = ctx.evaluate(&ctx.args[1].clone())?;
    Ok(Expression::Bool(a == b))
}

fn builtin_neq(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let a = ctx.evaluate(&ctx.args[0].clone())?;
    let b = ctx.evaluate(&ctx.args[1].clone())?;
    Ok(Expression::Bool(a != b))
}

fn builtin_lt(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let a = ctx.evaluate(&ctx.args[0].clone())?;
    let b = ctx.evaluate(&ctx.args[1].clone())?;
    Ok(Expression::Bool(ordering(ctx, &a, &b)? == Ordering::Less))
}

fn builtin_gt(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let a = ctx.evaluate(&ctx.args[0].clone())?;
    let b = ctx.evaluate(&ctx.args[1].clone())?;
    Ok(Expression::Bool(ordering(ctx, &a, &b)? == Ordering::Greater))
}

fn builtin_le(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let a = ctx.evaluate(&ctx.args[0].clone())?;
    let b = ctx.evaluate(&ctx.args[1].clone())?;
    Ok(Expression::Bool(ordering(ctx, &a, &b)? != Ordering::Greater))
}

fn builtin_ge(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let a = ctx.evaluate(&ctx.args[0].clone())?;
    let b = ctx.evaluate(&ctx.args[1].clone())?;
    Ok(Expression::Bool(ordering(ctx, &a, &b)? != Ordering::Less))
}

pub fn register(interp: &Interpreter) {
    interp.define_global("=", compiled("=", builtin_eq));
    interp.define_global("!=", compiled("!=", builtin_neq));
    interp.define_global("<", compiled("<", builtin_lt));
    interp.define_global(">", compiled(">", builtin_gt));
    interp.define_global("<=", compiled("<=", builtin_le));
    interp.define_global(">=", compiled(">=", builtin_ge));

    use crate::help::{register_help, HelpEntry};
    register_help(HelpEntry {
        name: "=".to_string(),
        category: "Comparison".to_string(),
        signature: "(= a b)".to_string(),
        description: "Tests a and b for equality.".to_string(),
        examples: vec!["(= 5 5) => true".to_string(), "(= \"a\" \"b\") => false".to_string()],
        related: vec!["!=".to_string()],
    });
    register_help(HelpEntry {
        name: "!=".to_string(),
        category: "Comparison".to_string(),
        signature: "(!= a b)".to_string(),
        description: "Tests a and b for inequality.".to_string(),
        examples: vec!["(!= 5 6) => true".to_string()],
        related: vec!["=".to_string()],
    });
    register_help(HelpEntry {
        name: "<".to_string(),
        category: "Comparison".to_string(),
        signature: "(< a b)".to_string(),
        description: "Tests if a is strictly less than b. Works on numbers and strings.".to_string(),
        examples: vec!["(< 1 2) => true".to_string()],
        related: vec![">".to_string(), "<=".to_string()],
    });
    register_help(HelpEntry {
        name: ">".to_string(),
        category: "Comparison".to_string(),
        signature: "(> a b)".to_string(),
        description: "Tests if a is strictly greater than b.".to_string(),
        examples: vec!["(> 3 2) => true".to_string()],
        related: vec!["<".to_string(), ">=".to_string()],
    });
    register_help(HelpEntry {
        name: "<=".to_string(),
        category: "Comparison".to_string(),
        signature: "(<= a b)".to_string(),
        description: "Tests if a is less than or equal to b.".to_string(),
        examples: vec!["(<= 5 5) => true".to_string()],
        related: vec!["<".to_string(), ">=".to_string()],
    });
    register_help(HelpEntry {
        name: ">=".to_string(),
        category: "Comparison".to_string(),
        signature: "(>= a b)".to_string(),
        description: "Tests if a is greater than or equal to b.".to_string(),
        examples: vec!["(>= 5 5) => true".to_string()],
        related: vec![">".to_string(), "<=".to_string()],
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

    fn eval(interp: &Interpreter, src: &str) -> Expression {
        let program = crate::parser::parse_program(src, "default", &std::collections::HashMap::new()).unwrap();
        crate::eval::evaluate(interp, &program).unwrap()
    }

    #[test]
    fn numeric_ordering_mixes_int_and_float() {
        let interp = interp();
        assert_eq!(eval(&interp, "(< 1 2.5)"), Expression::Bool(true));
    }

    #[test]
    fn string_ordering_is_lexical() {
        let interp = interp();
        assert_eq!(eval(&interp, "(< \"abc\" \"abd\")"), Expression::Bool(true));
    }

    #[test]
    fn equality_is_type_sensitive() {
        let interp = interp();
        assert_eq!(eval(&interp, "(= 2 2.0)"), Expression::Bool(false));
    }
}
