//! Conversion: type, type?, bool, int, float, str
//!
//! These coerce and introspect values rather than test predicates; the type
//! tag itself is just the Str returned by `Expression::type_name()`.

use crate::funcdef::{FuncDef, TypeTag};
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

/// The "natural" unquoted string form of a value, shared by `str` and the
/// Host interaction category's `display`.
pub fn natural_string(value: &Expression) -> String {
    match value {
        Expression::Str(s) => s.clone(),
        Expression::Symbol(s) => s.clone(),
        Expression::Bool(_) | Expression::Int(_) | Expression::Float(_) => value.to_string(),
        other => other.to_string(),
    }
}

fn builtin_type(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let value = ctx.evaluate(&ctx.args[0].clone())?;
    Ok(Expression::Str(value.type_name().to_string()))
}

fn builtin_type_q(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let value = ctx.evaluate(&ctx.args[0].clone())?;
    let tag = ctx.get_required_str(&ctx.args[1].clone(), 1)?;
    Ok(Expression::Bool(value.type_name() == tag))
}

fn builtin_bool(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let value = ctx.evaluate(&ctx.args[0].clone())?;
    Ok(Expression::Bool(value.bool_is_truthy()))
}

fn parse_int(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if let Some(hex) = trimmed.strip_prefix("0x") {
        return i64::from_str_radix(hex, 16).ok();
    }
    if let Some(bin) = trimmed.strip_prefix("0b") {
        return i64::from_str_radix(bin, 2).ok();
    }
    trimmed.parse::<i64>().ok()
}

fn builtin_int(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let value = ctx.evaluate(&ctx.args[0].clone())?;
    match &value {
        Expression::Int(_) => Ok(value),
        Expression::Float(n) => Ok(Expression::Int(*n as i64)),
        Expression::Bool(b) => Ok(Expression::Int(if *b { 1 } else { 0 })),
        Expression::Str(s) => parse_int(s)
            .map(Expression::Int)
            .ok_or_else(|| ctx.error(format!("int: \"{}\" is not a valid integer", s))),
        other => Err(ctx.type_error(TypeTag::Int, other, 0)),
    }
}

fn builtin_float(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let value = ctx.evaluate(&ctx.args[0].clone())?;
    match &value {
        Expression::Float(_) => Ok(value),
        Expression::Int(n) => Ok(Expression::Float(*n as f64)),
        Expression::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Expression::Float)
            .map_err(|_| ctx.error(format!("float: \"{}\" is not a valid float", s))),
        other => Err(ctx.type_error(TypeTag::Float, other, 0)),
    }
}

fn builtin_str(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let value = ctx.evaluate(&ctx.args[0].clone())?;
    Ok(Expression::Str(natural_string(&value)))
}

pub fn register(interp: &Interpreter) {
    interp.define_global("type", compiled("type", FuncDef::fixed(vec![TypeTag::Any], TypeTag::Str), builtin_type));
    interp.define_global(
        "type?",
        compiled("type?", FuncDef::fixed(vec![TypeTag::Any, TypeTag::Str], TypeTag::Bool), builtin_type_q),
    );
    interp.define_global("bool", compiled("bool", FuncDef::fixed(vec![TypeTag::Any], TypeTag::Bool), builtin_bool));
    interp.define_global("int", compiled("int", FuncDef::fixed(vec![TypeTag::Any], TypeTag::Int), builtin_int));
    interp.define_global("float", compiled("float", FuncDef::fixed(vec![TypeTag::Any], TypeTag::Float), builtin_float));
    interp.define_global("str", compiled("str", FuncDef::fixed(vec![TypeTag::Any], TypeTag::Str), builtin_str));

    use crate::help::{register_help, HelpEntry};
    register_help(HelpEntry {
        name: "type".to_string(),
        category: "Conversion".to_string(),
        signature: "(type val)".to_string(),
        description: "Returns val's type tag as a Str.".to_string(),
        examples: vec!["(type 5) => \"int\"".to_string(), "(type \"hi\") => \"string\"".to_string()],
        related: vec!["type?".to_string()],
    });
    register_help(HelpEntry {
        name: "type?".to_string(),
        category: "Conversion".to_string(),
        signature: "(type? val tag)".to_string(),
        description: "Tests whether val's type tag equals tag.".to_string(),
        examples: vec!["(type? 5 \"int\") => true".to_string()],
        related: vec!["type".to_string()],
    });
    register_help(HelpEntry {
        name: "bool".to_string(),
        category: "Conversion".to_string(),
        signature: "(bool val)".to_string(),
        description: "Converts val to true or false using its truthiness.".to_string(),
        examples: vec!["(bool 0) => true".to_string(), "(bool false) => false".to_string()],
        related: vec!["int".to_string(), "str".to_string()],
    });
    register_help(HelpEntry {
        name: "int".to_string(),
        category: "Conversion".to_string(),
        signature: "(int val)".to_string(),
        description: "Converts val to an Int: truncates a Float, parses a Str (0x/0b prefixes honored).".to_string(),
        examples: vec!["(int 3.9) => 3".to_string(), "(int \"42\") => 42".to_string()],
        related: vec!["float".to_string(), "str".to_string()],
    });
    register_help(HelpEntry {
        name: "float".to_string(),
        category: "Conversion".to_string(),
        signature: "(float val)".to_string(),
        description: "Converts val to a Float: widens an Int, parses a Str.".to_string(),
        examples: vec!["(float 3) => 3".to_string(), "(float \"3.5\") => 3.5".to_string()],
        related: vec!["int".to_string()],
    });
    register_help(HelpEntry {
        name: "str".to_string(),
        category: "Conversion".to_string(),
        signature: "(str val)".to_string(),
        description: "Converts val to its natural (unquoted) Str representation.".to_string(),
        examples: vec!["(str 42) => \"42\"".to_string(), "(str true) => \"true\"".to_string()],
        related: vec!["type".to_string()],
    });
}
