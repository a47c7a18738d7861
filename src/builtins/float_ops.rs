//! Float-specific operations: sqrt, exp, log, ceil, floor, round, and the
//! trigonometric/hyperbolic family.

use crate::funcdef::{FuncDef, TypeTag};
use crate::interpreter::{EvaluationContext, Interpreter};
use crate::value::{BuiltinHandle, Expression};
use crate::error::EvalError;
use std::rc::Rc;

fn compiled(name: &str, arity: usize, handle: BuiltinHandle) -> Expression {
    Expression::CompiledFunction {
        name: name.to_string(),
        def: Rc::new(FuncDef::fixed(vec![TypeTag::Float; arity], TypeTag::Float)),
        handle,
    }
}

macro_rules! unary_float_fn {
    ($fn_name:ident, $method:ident) => {
        fn $fn_name(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
            let n = ctx.get_required_float(&ctx.args[0].clone(), 0)?;
            Ok(Expression::Float(n.$method()))
        }
    };
}

unary_float_fn!(builtin_sqrt, sqrt);
unary_float_fn!(builtin_exp, exp);
unary_float_fn!(builtin_ln, ln);
unary_float_fn!(builtin_ceil, ceil);
unary_float_fn!(builtin_floor, floor);
unary_float_fn!(builtin_round, round);
unary_float_fn!(builtin_sin, sin);
unary_float_fn!(builtin_cos, cos);
unary_float_fn!(builtin_tan, tan);
unary_float_fn!(builtin_asin, asin);
unary_float_fn!(builtin_acos, acos);
unary_float_fn!(builtin_atan, atan);
unary_float_fn!(builtin_sinh, sinh);
unary_float_fn!(builtin_cosh, cosh);
unary_float_fn!(builtin_tanh, tanh);
unary_float_fn!(builtin_asinh, asinh);
unary_float_fn!(builtin_acosh, acosh);
unary_float_fn!(builtin_atanh, atanh);

fn builtin_atan2(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let y = ctx.get_required_float(&ctx.args[0].clone(), 0)?;
    let x = ctx.get_required_float(&ctx.args[1].clone(), 1)?;
    Ok(Expression::Float(y.atan2(x)))
}

pub fn register(interp: &Interpreter) {
    interp.define_global("sqrt", compiled("sqrt", 1, builtin_sqrt));
    interp.define_global("exp", compiled("exp", 1, builtin_exp));
    interp.define_global("log", compiled("log", 1, builtin_ln));
    interp.define_global("ceil", compiled("ceil", 1, builtin_ceil));
    interp.define_global("floor", compiled("floor", 1, builtin_floor));
    interp.define_global("round", compiled("round", 1, builtin_round));
    interp.define_global("sin", compiled("sin", 1, builtin_sin));
    interp.define_global("cos", compiled("cos", 1, builtin_cos));
    interp.define_global("tan", compiled("tan", 1, builtin_tan));
    interp.define_global("asin", compiled("asin", 1, builtin_asin));
    interp.define_global("acos", compiled("acos", 1, builtin_acos));
    interp.define_global("atan", compiled("atan", 1, builtin_atan));
    interp.define_global("atan2", compiled("atan2", 2, builtin_atan2));
    interp.define_global("sinh", compiled("sinh", 1, builtin_sinh));
    interp.define_global("cosh", compiled("cosh", 1, builtin_cosh));
    interp.define_global("tanh", compiled("tanh", 1, builtin_tanh));
    interp.define_global("asinh", compiled("asinh", 1, builtin_asinh));
    interp.define_global("acosh", compiled("acosh", 1, builtin_acosh));
    interp.define_global("atanh", compiled("atanh", 1, builtin_atanh));

    use crate::help::{register_help, HelpEntry};
    register_help(HelpEntry {
        name: "sqrt".to_string(),
        category: "Float".to_string(),
        signature: "(sqrt n)".to_string(),
        description: "Square root of n.".to_string(),
        examples: vec!["(sqrt 9.0) => 3".to_string()],
        related: vec!["pow".to_string()],
    });
    register_help(HelpEntry {
        name: "log".to_string(),
        category: "Float".to_string(),
        signature: "(log n)".to_string(),
        description: "Natural logarithm of n.".to_string(),
        examples: vec!["(log 1.0) => 0".to_string()],
        related: vec!["exp".to_string()],
    });
    register_help(HelpEntry {
        name: "round".to_string(),
        category: "Float".to_string(),
        signature: "(round n)".to_string(),
        description: "Rounds n to the nearest whole number, ties away from zero.".to_string(),
        examples: vec!["(round 2.5) => 3".to_string()],
        related: vec!["ceil".to_string(), "floor".to_string()],
    });
}
