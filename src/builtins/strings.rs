//! String operations: str+, trim, upper, lower, substr, contains?, compare,
//! starts-with?, ends-with?, find, rfind, replace, split, join, length

use crate::funcdef::{Arity, FuncDef, TypeTag};
use crate::interpreter::{EvaluationContext, Interpreter};
use crate::value::{BuiltinHandle, Expression};
use crate::error::EvalError;
use std::cmp::Ordering;
use std::rc::Rc;

fn compiled(name: &str, def: FuncDef, handle: BuiltinHandle) -> Expression {
    Expression::CompiledFunction {
        name: name.to_string(),
        def: Rc::new(def),
        handle,
    }
}

fn fixed_str(name: &str, arity: usize, out: TypeTag, handle: BuiltinHandle) -> Expression {
    compiled(name, FuncDef::fixed(vec![TypeTag::Str; arity], out), handle)
}

fn builtin_str_plus(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let mut out = String::new();
    for (i, arg) in ctx.args.to_vec().iter().enumerate() {
        out.push_str(&ctx.get_required_str(arg, i)?);
    }
    Ok(Expression::Str(out))
}

fn builtin_trim(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let s = ctx.get_required_str(&ctx.args[0].clone(), 0)?;
    Ok(Expression::Str(s.trim().to_string()))
}

fn builtin_upper(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let s = ctx.get_required_str(&ctx.args[0].clone(), 0)?;
    Ok(Expression::Str(s.to_uppercase()))
}

fn builtin_lower(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let s = ctx.get_required_str(&ctx.args[0].clone(), 0)?;
    Ok(Expression::Str(s.to_lowercase()))
}

fn builtin_substr(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let s = ctx.get_required_str(&ctx.args[0].clone(), 0)?;
    let start = ctx.get_required_int(&ctx.args[1].clone(), 1)?;
    let end = ctx.get_required_int(&ctx.args[2].clone(), 2)?;
    let chars: Vec<char> = s.chars().collect();
    if start < 0 || end < 0 || start as usize > chars.len() || end as usize > chars.len() || start > end {
        return Err(ctx.error(format!("substr: indices out of range for a {}-character string", chars.len())));
    }
    Ok(Expression::Str(chars[start as usize..end as usize].iter().collect()))
}

fn builtin_contains(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let s = ctx.get_required_str(&ctx.args[0].clone(), 0)?;
    let needle = ctx.get_required_str(&ctx.args[1].clone(), 1)?;
    Ok(Expression::Bool(s.contains(&needle)))
}

fn builtin_compare(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let a = ctx.get_required_str(&ctx.args[0].clone(), 0)?;
    let b = ctx.get_required_str(&ctx.args[1].clone(), 1)?;
    Ok(Expression::Int(match a.cmp(&b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }))
}

fn builtin_starts_with(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let s = ctx.get_required_str(&ctx.args[0].clone(), 0)?;
    let prefix = ctx.get_required_str(&ctx.args[1].clone(), 1)?;
    Ok(Expression::Bool(s.starts_with(&prefix)))
}

fn builtin_ends_with(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let s = ctx.get_required_str(&ctx.args[0].clone(), 0)?;
    let suffix = ctx.get_required_str(&ctx.args[1].clone(), 1)?;
    Ok(Expression::Bool(s.ends_with(&suffix)))
}

fn builtin_find(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let s = ctx.get_required_str(&ctx.args[0].clone(), 0)?;
    let needle = ctx.get_required_str(&ctx.args[1].clone(), 1)?;
    Ok(match s.find(&needle) {
        Some(byte_pos) => Expression::Int(s[..byte_pos].chars().count() as i64),
        None => Expression::Int(-1),
    })
}

fn builtin_rfind(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let s = ctx.get_required_str(&ctx.args[0].clone(), 0)?;
    let needle = ctx.get_required_str(&ctx.args[1].clone(), 1)?;
    Ok(match s.rfind(&needle) {
        Some(byte_pos) => Expression::Int(s[..byte_pos].chars().count() as i64),
        None => Expression::Int(-1),
    })
}

fn builtin_replace(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let s = ctx.get_required_str(&ctx.args[0].clone(), 0)?;
    let pattern = ctx.get_required_str(&ctx.args[1].clone(), 1)?;
    let replacement = ctx.get_required_str(&ctx.args[2].clone(), 2)?;
    Ok(Expression::Str(s.replace(&pattern, &replacement)))
}

fn builtin_split(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let s = ctx.get_required_str(&ctx.args[0].clone(), 0)?;
    let delim = ctx.get_required_str(&ctx.args[1].clone(), 1)?;
    let parts = if delim.is_empty() {
        s.chars().map(|c| Expression::Str(c.to_string())).collect()
    } else {
        s.split(delim.as_str()).map(|p| Expression::Str(p.to_string())).collect()
    };
    Ok(Expression::Sexp(parts))
}

fn builtin_join(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let list = ctx.get_list(&ctx.args[0].clone())?;
    let delim = ctx.get_required_str(&ctx.args[1].clone(), 1)?;
    let mut parts = Vec::with_capacity(list.len());
    for (i, item) in list.iter().enumerate() {
        parts.push(item.as_str().map(str::to_string).ok_or_else(|| ctx.type_error(TypeTag::Str, item, i))?);
    }
    Ok(Expression::Str(parts.join(&delim)))
}

fn builtin_str_length(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let s = ctx.get_required_str(&ctx.args[0].clone(), 0)?;
    Ok(Expression::Int(s.chars().count() as i64))
}

pub fn register(interp: &Interpreter) {
    interp.define_global(
        "str+",
        compiled("str+", FuncDef::varargs(TypeTag::Str, Arity::Any, TypeTag::Str), builtin_str_plus),
    );
    interp.define_global("trim", fixed_str("trim", 1, TypeTag::Str, builtin_trim));
    interp.define_global("upper", fixed_str("upper", 1, TypeTag::Str, builtin_upper));
    interp.define_global("lower", fixed_str("lower", 1, TypeTag::Str, builtin_lower));
    interp.define_global(
        "substr",
        compiled("substr", FuncDef::fixed(vec![TypeTag::Str, TypeTag::Int, TypeTag::Int], TypeTag::Str), builtin_substr),
    );
    interp.define_global("contains?", fixed_str("contains?", 2, TypeTag::Bool, builtin_contains));
    interp.define_global("compare", fixed_str("compare", 2, TypeTag::Int, builtin_compare));
    interp.define_global("starts-with?", fixed_str("starts-with?", 2, TypeTag::Bool, builtin_starts_with));
    interp.define_global("ends-with?", fixed_str("ends-with?", 2, TypeTag::Bool, builtin_ends_with));
    interp.define_global("find", fixed_str("find", 2, TypeTag::Int, builtin_find));
    interp.define_global("rfind", fixed_str("rfind", 2, TypeTag::Int, builtin_rfind));
    interp.define_global("replace", fixed_str("replace", 3, TypeTag::Str, builtin_replace));
    interp.define_global("split", fixed_str("split", 2, TypeTag::Sexp, builtin_split));
    interp.define_global(
        "join",
        compiled("join", FuncDef::fixed(vec![TypeTag::Sexp, TypeTag::Str], TypeTag::Str), builtin_join),
    );
    interp.define_global("length", fixed_str("length", 1, TypeTag::Int, builtin_str_length));

    use crate::help::{register_help, HelpEntry};
    register_help(HelpEntry {
        name: "str+".to_string(),
        category: "String".to_string(),
        signature: "(str+ s...)".to_string(),
        description: "Concatenates strings.".to_string(),
        examples: vec!["(str+ \"foo\" \"bar\") => \"foobar\"".to_string()],
        related: vec!["join".to_string()],
    });
    register_help(HelpEntry {
        name: "substr".to_string(),
        category: "String".to_string(),
        signature: "(substr s start end)".to_string(),
        description: "Returns the characters of s from start (inclusive) to end (exclusive).".to_string(),
        examples: vec!["(substr \"hello\" 0 3) => \"hel\"".to_string()],
        related: vec!["find".to_string()],
    });
    register_help(HelpEntry {
        name: "split".to_string(),
        category: "String".to_string(),
        signature: "(split s delim)".to_string(),
        description: "Splits s on delim into a list of strings.".to_string(),
        examples: vec!["(split \"a,b,c\" \",\") => (\"a\" \"b\" \"c\")".to_string()],
        related: vec!["join".to_string()],
    });
    register_help(HelpEntry {
        name: "join".to_string(),
        category: "String".to_string(),
        signature: "(join list delim)".to_string(),
        description: "Joins a list of strings with delim.".to_string(),
        examples: vec!["(join (list \"a\" \"b\") \",\") => \"a,b\"".to_string()],
        related: vec!["split".to_string()],
    });
}
