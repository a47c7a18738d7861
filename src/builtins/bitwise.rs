//! Bitwise operations: bit-and, bit-or, bit-xor, bit-not, left-shift, right-shift

use crate::funcdef::{FuncDef, TypeTag};
use crate::interpreter::{EvaluationContext, Interpreter};
use crate::value::{BuiltinHandle, Expression};
use crate::error::EvalError;
use std::rc::Rc;

fn compiled(name: &str, arity: usize, handle: BuiltinHandle) -> Expression {
    Expression::CompiledFunction {
        name: name.to_string(),
        def: Rc::new(FuncDef::fixed(vec![TypeTag::Int; arity], TypeTag::Int)),
        handle,
    }
}

fn builtin_bit_and(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let a = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    let b = ctx.get_required_int(&ctx.args[1].clone(), 1)?;
    Ok(Expression::Int(a & b))
}

fn builtin_bit_or(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let a = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    let b = ctx.get_required_int(&ctx.args[1].clone(), 1)?;
    Ok(Expression::Int(a | b))
}

fn builtin_bit_xor(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let a = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    let b = ctx.get_required_int(&ctx.args[1].clone(), 1)?;
    Ok(Expression::Int(a ^ b))
}

fn builtin_bit_not(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let a = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    Ok(Expression::Int(!a))
}

fn builtin_left_shift(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let a = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    let b = ctx.get_required_int(&ctx.args[1].clone(), 1)?;
    Ok(Expression::Int(a.wrapping_shl(b as u32)))
}

fn builtin_right_shift(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let a = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    let b = ctx.get_required_int(&ctx.args[1].clone(), 1)?;
    Ok(Expression::Int(a.wrapping_shr(b as u32)))
}

pub fn register(interp: &Interpreter) {
    interp.define_global("bit-and", compiled("bit-and", 2, builtin_bit_and));
    interp.define_global("bit-or", compiled("bit-or", 2, builtin_bit_or));
    interp.define_global("bit-xor", compiled("bit-xor", 2, builtin_bit_xor));
    interp.define_global("bit-not", compiled("bit-not", 1, builtin_bit_not));
    interp.define_global("left-shift", compiled("left-shift", 2, builtin_left_shift));
    interp.define_global("right-shift", compiled("right-shift", 2, builtin_right_shift));

    use crate::help::{register_help, HelpEntry};
    register_help(HelpEntry {
        name: "bit-and".to_string(),
        category: "Bitwise".to_string(),
        signature: "(bit-and a b)".to_string(),
        description: "Bitwise AND.".to_string(),
        examples: vec!["(bit-and 0b1100 0b1010) => 8".to_string()],
        related: vec!["bit-or".to_string(), "bit-xor".to_string()],
    });
    register_help(HelpEntry {
        name: "bit-or".to_string(),
        category: "Bitwise".to_string(),
        signature: "(bit-or a b)".to_string(),
        description: "Bitwise OR.".to_string(),
        examples: vec!["(bit-or 0b1100 0b0010) => 14".to_string()],
        related: vec!["bit-and".to_string()],
    });
    register_help(HelpEntry {
        name: "bit-xor".to_string(),
        category: "Bitwise".to_string(),
        signature: "(bit-xor a b)".to_string(),
        description: "Bitwise XOR.".to_string(),
        examples: vec!["(bit-xor 0b1100 0b1010) => 6".to_string()],
        related: vec!["bit-and".to_string(), "bit-or".to_string()],
    });
    register_help(HelpEntry {
        name: "bit-not".to_string(),
        category: "Bitwise".to_string(),
        signature: "(bit-not a)".to_string(),
        description: "Bitwise complement.".to_string(),
        examples: vec!["(bit-not 0) => -1".to_string()],
        related: vec![],
    });
    register_help(HelpEntry {
        name: "left-shift".to_string(),
        category: "Bitwise".to_string(),
        signature: "(left-shift a n)".to_string(),
        description: "Shifts a left by n bits.".to_string(),
        examples: vec!["(left-shift 1 4) => 16".to_string()],
        related: vec!["right-shift".to_string()],
    });
    register_help(HelpEntry {
        name: "right-shift".to_string(),
        category: "Bitwise".to_string(),
        signature: "(right-shift a n)".to_string(),
        description: "Shifts a right by n bits.".to_string(),
        examples: vec!["(right-shift 16 4) => 1".to_string()],
        related: vec!["left-shift".to_string()],
    });
}
