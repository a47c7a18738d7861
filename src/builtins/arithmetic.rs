//! Generic arithmetic: +, -, *, /, pow, abs, max, min
//!
//! Int arguments stay Int (wrapping on overflow, per the interpreter's
//! resolved overflow semantics); mixing in any Float promotes the whole
//! operation to Float. `-`/`/` with one argument negate/reciprocate; `+`/`*`
//! accept zero arguments, returning their identity.

use crate::funcdef::{Arity, FuncDef, TypeTag};
use crate::interpreter::{EvaluationContext, Interpreter};
use crate::value::{BuiltinHandle, Expression};
use crate::error::EvalError;
use std::rc::Rc;

fn compiled(name: &str, handle: BuiltinHandle) -> Expression {
    Expression::CompiledFunction {
        name: name.to_string(),
        def: Rc::new(FuncDef::varargs(TypeTag::Any, Arity::Any, TypeTag::Any)),
        handle,
    }
}

fn numeric_args(ctx: &mut EvaluationContext) -> Result<Vec<Expression>, EvalError> {
    let raw = ctx.args.to_vec();
    let mut out = Vec::with_capacity(raw.len());
    for (position, arg) in raw.iter().enumerate() {
        let value = ctx.evaluate(arg)?;
        if !matches!(value, Expression::Int(_) | Expression::Float(_)) {
            return Err(ctx.type_error(TypeTag::Float, &value, position));
        }
        out.push(value);
    }
    Ok(out)
}

fn add2(a: &Expression, b: &Expression) -> Expression {
    match (a, b) {
        (Expression::Int(x), Expression::Int(y)) => Expression::Int(x.wrapping_add(*y)),
        _ => Expression::Float(a.as_float().unwrap() + b.as_float().unwrap()),
    }
}

fn sub2(a: &Expression, b: &Expression) -> Expression {
    match (a, b) {
        (Expression::Int(x), Expression::Int(y)) => Expression::Int(x.wrapping_sub(*y)),
        _ => Expression::Float(a.as_float().unwrap() - b.as_float().unwrap()),
    }
}

fn mul2(a: &Expression, b: &Expression) -> Expression {
    match (a, b) {
        (Expression::Int(x), Expression::Int(y)) => Expression::Int(x.wrapping_mul(*y)),
        _ => Expression::Float(a.as_float().unwrap() * b.as_float().unwrap()),
    }
}

fn div2(ctx: &EvaluationContext, a: &Expression, b: &Expression) -> Result<Expression, EvalError> {
    match (a, b) {
        (Expression::Int(x), Expression::Int(y)) => {
            if *y == 0 {
                return Err(ctx.divide_by_zero_error());
            }
            Ok(Expression::Int(x.wrapping_div(*y)))
        }
        _ => {
            let y = b.as_float().unwrap();
            if y == 0.0 {
                return Err(ctx.divide_by_zero_error());
            }
            Ok(Expression::Float(a.as_float().unwrap() / y))
        }
    }
}

fn builtin_add(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let args = numeric_args(ctx)?;
    Ok(args.iter().fold(Expression::Int(0), |acc, v| add2(&acc, v)))
}

fn builtin_sub(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let args = numeric_args(ctx)?;
    if args.is_empty() {
        return Err(ctx.arity_error("at least 1"));
    }
    if args.len() == 1 {
        return Ok(sub2(&Expression::Int(0), &args[0]));
    }
    Ok(args[1..].iter().fold(args[0].clone(), |acc, v| sub2(&acc, v)))
}

fn builtin_mul(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let args = numeric_args(ctx)?;
    Ok(args.iter().fold(Expression::Int(1), |acc, v| mul2(&acc, v)))
}

fn builtin_div(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let args = numeric_args(ctx)?;
    if args.is_empty() {
        return Err(ctx.arity_error("at least 1"));
    }
    if args.len() == 1 {
        return div2(ctx, &Expression::Int(1), &args[0]);
    }
    let mut acc = args[0].clone();
    for v in &args[1..] {
        acc = div2(ctx, &acc, v)?;
    }
    Ok(acc)
}

fn builtin_pow(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let args = numeric_args(ctx)?;
    if args.len() != 2 {
        return Err(ctx.arity_error("2"));
    }
    if let (Expression::Int(base), Expression::Int(exp)) = (&args[0], &args[1]) {
        if *exp >= 0 && *exp <= u32::MAX as i64 {
            return Ok(Expression::Int(base.wrapping_pow(*exp as u32)));
        }
    }
    let base = args[0].as_float().unwrap();
    let exp = args[1].as_float().unwrap();
    Ok(Expression::Float(base.powf(exp)))
}

fn builtin_abs(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let args = numeric_args(ctx)?;
    if args.len() != 1 {
        return Err(ctx.arity_error("1"));
    }
    Ok(match &args[0] {
        Expression::Int(n) => Expression::Int(n.wrapping_abs()),
        Expression::Float(n) => Expression::Float(n.abs()),
        _ => unreachable!(),
    })
}

fn builtin_max(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let args = numeric_args(ctx)?;
    if args.is_empty() {
        return Err(ctx.arity_error("at least 1"));
    }
    Ok(args
        .into_iter()
        .reduce(|a, b| if b.as_float() > a.as_float() { b } else { a })
        .unwrap())
}

fn builtin_min(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let args = numeric_args(ctx)?;
    if args.is_empty() {
        return Err(ctx.arity_error("at least 1"));
    }
    Ok(args
        .into_iter()
        .reduce(|a, b| if b.as_float() < a.as_float() { b } else { a })
        .unwrap())
}

pub fn register(interp: &Interpreter) {
    interp.define_global("+", compiled("+", builtin_add));
    interp.define_global("-", compiled("-", builtin_sub));
    interp.define_global("*", compiled("*", builtin_mul));
    interp.define_global("/", compiled("/", builtin_div));
    interp.define_global("pow", compiled("pow", builtin_pow));
    interp.define_global("abs", compiled("abs", builtin_abs));
    interp.define_global("max", compiled("max", builtin_max));
    interp.define_global("min", compiled("min", builtin_min));

    use crate::help::{register_help, HelpEntry};
    register_help(HelpEntry {
        name: "+".to_string(),
        category: "Arithmetic".to_string(),
        signature: "(+ num...)".to_string(),
        description: "Sum of all arguments; mixing a Float promotes the result to Float.".to_string(),
        examples: vec!["(+ 1 2 3) => 6".to_string(), "(+) => 0".to_string()],
        related: vec!["-".to_string(), "*".to_string(), "/".to_string()],
    });
    register_help(HelpEntry {
        name: "-".to_string(),
        category: "Arithmetic".to_string(),
        signature: "(- num...)".to_string(),
        description: "Subtracts subsequent arguments from the first; negates a single argument.".to_string(),
        examples: vec!["(- 10 3 2) => 5".to_string(), "(- 5) => -5".to_string()],
        related: vec!["+".to_string()],
    });
    register_help(HelpEntry {
        name: "*".to_string(),
        category: "Arithmetic".to_string(),
        signature: "(* num...)".to_string(),
        description: "Product of all arguments.".to_string(),
        examples: vec!["(* 2 3 4) => 24".to_string(), "(*) => 1".to_string()],
        related: vec!["/".to_string()],
    });
    register_help(HelpEntry {
        name: "/".to_string(),
        category: "Arithmetic".to_string(),
        signature: "(/ num...)".to_string(),
        description: "Divides the first argument by the rest; Int/Int truncates, any Float promotes.".to_string(),
        examples: vec!["(/ 20 4) => 5".to_string(), "(/ 5 2) => 2".to_string(), "(/ 5.0 2) => 2.5".to_string()],
        related: vec!["*".to_string(), "mod".to_string()],
    });
    register_help(HelpEntry {
        name: "pow".to_string(),
        category: "Arithmetic".to_string(),
        signature: "(pow base exp)".to_string(),
        description: "Raises base to exp.".to_string(),
        examples: vec!["(pow 2 10) => 1024".to_string()],
        related: vec!["sqrt".to_string()],
    });
    register_help(HelpEntry {
        name: "abs".to_string(),
        category: "Arithmetic".to_string(),
        signature: "(abs num)".to_string(),
        description: "Absolute value.".to_string(),
        examples: vec!["(abs -5) => 5".to_string()],
        related: vec![],
    });
    register_help(HelpEntry {
        name: "max".to_string(),
        category: "Arithmetic".to_string(),
        signature: "(max num...)".to_string(),
        description: "Returns the largest argument.".to_string(),
        examples: vec!["(max 1 5 3) => 5".to_string()],
        related: vec!["min".to_string()],
    });
    register_help(HelpEntry {
        name: "min".to_string(),
        category: "Arithmetic".to_string(),
        signature: "(min num...)".to_string(),
        description: "Returns the smallest argument.".to_string(),
        examples: vec!["(min 1 5 3) => 1".to_string()],
        related: vec!["max".to_string()],
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
    fn add_stays_int_for_int_args() {
        let interp = interp();
        assert_eq!(
            crate::eval::evaluate(&interp, &call("+", vec![Expression::Int(2), Expression::Int(3)])).unwrap(),
            Expression::Int(5)
        );
    }

    #[test]
    fn mixing_float_promotes_result() {
        let interp = interp();
        assert_eq!(
            crate::eval::evaluate(&interp, &call("+", vec![Expression::Int(2), Expression::Float(0.5)])).unwrap(),
            Expression::Float(2.5)
        );
    }

    #[test]
    fn int_division_truncates() {
        let interp = interp();
        assert_eq!(
            crate::eval::evaluate(&interp, &call("/", vec![Expression::Int(5), Expression::Int(2)])).unwrap(),
            Expression::Int(2)
        );
    }

    #[test]
    fn division_by_zero_errors() {
        let interp = interp();
        let err = crate::eval::evaluate(&interp, &call("/", vec![Expression::Int(1), Expression::Int(0)])).unwrap_err();
        assert!(matches!(err.kind, crate::error::LispError::DivideByZero(_)));
    }

    #[test]
    fn int_add_wraps_on_overflow() {
        let interp = interp();
        assert_eq!(
            crate::eval::evaluate(&interp, &call("+", vec![Expression::Int(i64::MAX), Expression::Int(1)])).unwrap(),
            Expression::Int(i64::MIN)
        );
    }

    #[test]
    fn max_returns_largest() {
        let interp = interp();
        assert_eq!(
            crate::eval::evaluate(&interp, &call("max", vec![Expression::Int(1), Expression::Int(9), Expression::Int(4)])).unwrap(),
            Expression::Int(9)
        );
    }
}
