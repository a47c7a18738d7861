//! List operations: list, cons, head, tail, last, at, length, empty?,
//! reverse, map, filter, reduce, zip, any, all, foreach, range
//!
//! The higher-order functions (`map`/`filter`/`reduce`/`zip`/`any`/`all`/
//! `foreach`) hold their function argument as an already-evaluated value and
//! invoke it through `crate::eval::call`, the same dispatch path the
//! evaluator itself uses for an ordinary call-form head.

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

fn builtin_list(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let mut out = Vec::with_capacity(ctx.args.len());
    for arg in ctx.args.to_vec() {
        out.push(ctx.evaluate(&arg)?);
    }
    Ok(Expression::Sexp(out))
}

fn builtin_cons(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let head = ctx.evaluate(&ctx.args[0].clone())?;
    let mut tail = ctx.get_list(&ctx.args[1].clone())?;
    tail.insert(0, head);
    Ok(Expression::Sexp(tail))
}

fn builtin_head(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let list = ctx.get_list(&ctx.args[0].clone())?;
    list.first().cloned().ok_or_else(|| ctx.error("head: empty list"))
}

fn builtin_tail(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let list = ctx.get_list(&ctx.args[0].clone())?;
    if list.is_empty() {
        return Err(ctx.error("tail: empty list"));
    }
    Ok(Expression::Sexp(list[1..].to_vec()))
}

fn builtin_last(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let list = ctx.get_list(&ctx.args[0].clone())?;
    list.last().cloned().ok_or_else(|| ctx.error("last: empty list"))
}

fn builtin_at(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let list = ctx.get_list(&ctx.args[0].clone())?;
    let index = ctx.get_required_int(&ctx.args[1].clone(), 1)?;
    if index < 0 || index as usize >= list.len() {
        return Err(ctx.error(format!("at: index {} out of bounds for a {}-element list", index, list.len())));
    }
    Ok(list[index as usize].clone())
}

fn builtin_length(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let list = ctx.get_list(&ctx.args[0].clone())?;
    Ok(Expression::Int(list.len() as i64))
}

fn builtin_empty(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let list = ctx.get_list(&ctx.args[0].clone())?;
    Ok(Expression::Bool(list.is_empty()))
}

fn builtin_reverse(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let mut list = ctx.get_list(&ctx.args[0].clone())?;
    list.reverse();
    Ok(Expression::Sexp(list))
}

fn builtin_map(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let func = ctx.evaluate(&ctx.args[0].clone())?;
    let list = ctx.get_list(&ctx.args[1].clone())?;
    let mut out = Vec::with_capacity(list.len());
    for item in list {
        out.push(crate::eval::call(ctx.interp, &func, vec![item], "<map>")?);
    }
    Ok(Expression::Sexp(out))
}

fn builtin_filter(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let func = ctx.evaluate(&ctx.args[0].clone())?;
    let list = ctx.get_list(&ctx.args[1].clone())?;
    let mut out = Vec::new();
    for item in list {
        let keep = crate::eval::call(ctx.interp, &func, vec![item.clone()], "<filter>")?;
        if keep.bool_is_truthy() {
            out.push(item);
        }
    }
    Ok(Expression::Sexp(out))
}

fn builtin_reduce(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let func = ctx.evaluate(&ctx.args[0].clone())?;
    let list = ctx.get_list(&ctx.args[1].clone())?;
    let init = ctx.evaluate(&ctx.args[2].clone())?;
    let mut acc = init;
    for item in list {
        acc = crate::eval::call(ctx.interp, &func, vec![acc, item], "<reduce>")?;
    }
    Ok(acc)
}

fn builtin_zip(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let a = ctx.get_list(&ctx.args[0].clone())?;
    let b = ctx.get_list(&ctx.args[1].clone())?;
    let pairs = a
        .into_iter()
        .zip(b)
        .map(|(x, y)| Expression::Sexp(vec![x, y]))
        .collect();
    Ok(Expression::Sexp(pairs))
}

fn builtin_any(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let func = ctx.evaluate(&ctx.args[0].clone())?;
    let list = ctx.get_list(&ctx.args[1].clone())?;
    for item in list {
        if crate::eval::call(ctx.interp, &func, vec![item], "<any>")?.bool_is_truthy() {
            return Ok(Expression::Bool(true));
        }
    }
    Ok(Expression::Bool(false))
}

fn builtin_all(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let func = ctx.evaluate(&ctx.args[0].clone())?;
    let list = ctx.get_list(&ctx.args[1].clone())?;
    for item in list {
        if !crate::eval::call(ctx.interp, &func, vec![item], "<all>")?.bool_is_truthy() {
            return Ok(Expression::Bool(false));
        }
    }
    Ok(Expression::Bool(true))
}

fn builtin_foreach(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let func = ctx.evaluate(&ctx.args[0].clone())?;
    let list = ctx.get_list(&ctx.args[1].clone())?;
    for item in list {
        crate::eval::call(ctx.interp, &func, vec![item], "<foreach>")?;
    }
    ctx.return_nil()
}

fn builtin_range(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let (start, end) = match ctx.args.len() {
        1 => (0, ctx.get_required_int(&ctx.args[0].clone(), 0)?),
        2 => (
            ctx.get_required_int(&ctx.args[0].clone(), 0)?,
            ctx.get_required_int(&ctx.args[1].clone(), 1)?,
        ),
        _ => return Err(ctx.arity_error("1 or 2")),
    };
    Ok(Expression::Sexp((start..end).map(Expression::Int).collect()))
}

pub fn register(interp: &Interpreter) {
    interp.define_global(
        "list",
        compiled("list", FuncDef::varargs(TypeTag::Any, Arity::Any, TypeTag::Sexp), builtin_list),
    );
    interp.define_global("cons", compiled("cons", FuncDef::fixed(vec![TypeTag::Any, TypeTag::Sexp], TypeTag::Sexp), builtin_cons));
    interp.define_global("head", compiled("head", FuncDef::fixed(vec![TypeTag::Sexp], TypeTag::Any), builtin_head));
    interp.define_global("car", compiled("car", FuncDef::fixed(vec![TypeTag::Sexp], TypeTag::Any), builtin_head));
    interp.define_global("tail", compiled("tail", FuncDef::fixed(vec![TypeTag::Sexp], TypeTag::Sexp), builtin_tail));
    interp.define_global("cdr", compiled("cdr", FuncDef::fixed(vec![TypeTag::Sexp], TypeTag::Sexp), builtin_tail));
    interp.define_global("last", compiled("last", FuncDef::fixed(vec![TypeTag::Sexp], TypeTag::Any), builtin_last));
    interp.define_global("at", compiled("at", FuncDef::fixed(vec![TypeTag::Sexp, TypeTag::Int], TypeTag::Any), builtin_at));
    interp.define_global("nth", compiled("nth", FuncDef::fixed(vec![TypeTag::Sexp, TypeTag::Int], TypeTag::Any), builtin_at));
    interp.define_global("length", compiled("length", FuncDef::fixed(vec![TypeTag::Sexp], TypeTag::Int), builtin_length));
    interp.define_global("empty?", compiled("empty?", FuncDef::fixed(vec![TypeTag::Sexp], TypeTag::Bool), builtin_empty));
    interp.define_global("reverse", compiled("reverse", FuncDef::fixed(vec![TypeTag::Sexp], TypeTag::Sexp), builtin_reverse));
    interp.define_global("map", compiled("map", FuncDef::fixed(vec![TypeTag::Function, TypeTag::Sexp], TypeTag::Sexp), builtin_map));
    interp.define_global("filter", compiled("filter", FuncDef::fixed(vec![TypeTag::Function, TypeTag::Sexp], TypeTag::Sexp), builtin_filter));
    interp.define_global("reduce", compiled("reduce", FuncDef::fixed(vec![TypeTag::Function, TypeTag::Sexp, TypeTag::Any], TypeTag::Any), builtin_reduce));
    interp.define_global("zip", compiled("zip", FuncDef::fixed(vec![TypeTag::Sexp, TypeTag::Sexp], TypeTag::Sexp), builtin_zip));
    interp.define_global("any", compiled("any", FuncDef::fixed(vec![TypeTag::Function, TypeTag::Sexp], TypeTag::Bool), builtin_any));
    interp.define_global("all", compiled("all", FuncDef::fixed(vec![TypeTag::Function, TypeTag::Sexp], TypeTag::Bool), builtin_all));
    interp.define_global("foreach", compiled("foreach", FuncDef::fixed(vec![TypeTag::Function, TypeTag::Sexp], TypeTag::Any), builtin_foreach));
    interp.define_global("range", compiled("range", FuncDef::varargs(TypeTag::Int, Arity::Any, TypeTag::Sexp), builtin_range));

    use crate::help::{register_help, HelpEntry};
    register_help(HelpEntry {
        name: "list".to_string(),
        category: "List".to_string(),
        signature: "(list val...)".to_string(),
        description: "Builds a new list from its evaluated arguments.".to_string(),
        examples: vec!["(list 1 2 3) => (1 2 3)".to_string()],
        related: vec!["cons".to_string()],
    });
    register_help(HelpEntry {
        name: "cons".to_string(),
        category: "List".to_string(),
        signature: "(cons elem list)".to_string(),
        description: "Prepends elem to list.".to_string(),
        examples: vec!["(cons 1 (list 2 3)) => (1 2 3)".to_string()],
        related: vec!["head".to_string(), "tail".to_string()],
    });
    register_help(HelpEntry {
        name: "head".to_string(),
        category: "List".to_string(),
        signature: "(head list)".to_string(),
        description: "Returns the first element of list.".to_string(),
        examples: vec!["(head (list 1 2)) => 1".to_string()],
        related: vec!["tail".to_string(), "car".to_string()],
    });
    register_help(HelpEntry {
        name: "tail".to_string(),
        category: "List".to_string(),
        signature: "(tail list)".to_string(),
        description: "Returns every element of list except the first.".to_string(),
        examples: vec!["(tail (list 1 2 3)) => (2 3)".to_string()],
        related: vec!["head".to_string(), "cdr".to_string()],
    });
    register_help(HelpEntry {
        name: "map".to_string(),
        category: "List".to_string(),
        signature: "(map func list)".to_string(),
        description: "Returns a new list of func applied to each element.".to_string(),
        examples: vec!["(map incr (list 1 2 3)) => (2 3 4)".to_string()],
        related: vec!["filter".to_string(), "reduce".to_string()],
    });
    register_help(HelpEntry {
        name: "filter".to_string(),
        category: "List".to_string(),
        signature: "(filter pred list)".to_string(),
        description: "Returns the elements of list for which pred is truthy.".to_string(),
        examples: vec!["(filter even? (list 1 2 3 4)) => (2 4)".to_string()],
        related: vec!["map".to_string()],
    });
    register_help(HelpEntry {
        name: "reduce".to_string(),
        category: "List".to_string(),
        signature: "(reduce func list init)".to_string(),
        description: "Folds func over list starting from init.".to_string(),
        examples: vec!["(reduce + (list 1 2 3) 0) => 6".to_string()],
        related: vec!["map".to_string()],
    });
    register_help(HelpEntry {
        name: "range".to_string(),
        category: "List".to_string(),
        signature: "(range end) | (range start end)".to_string(),
        description: "Builds a list of integers from start (default 0, inclusive) to end (exclusive).".to_string(),
        examples: vec!["(range 3) => (0 1 2)".to_string(), "(range 2 5) => (2 3 4)".to_string()],
        related: vec!["map".to_string()],
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::HostEnvironment;

    fn interp() -> Interpreter {
        let interp = Interpreter::new(HostEnvironment::default());
        register(&interp);
        crate::builtins::arithmetic::register(&interp);
        crate::builtins::int_ops::register(&interp);
        interp
    }

    fn call(name: &str, args: Vec<Expression>) -> Expression {
        let mut items = vec![Expression::Symbol(name.to_string())];
        items.extend(args);
        Expression::Sexp(items)
    }

    #[test]
    fn cons_prepends_to_list() {
        let interp = interp();
        let list = Expression::Sexp(vec![Expression::Int(2), Expression::Int(3)]);
        assert_eq!(
            crate::eval::evaluate(&interp, &call("cons", vec![Expression::Int(1), list])).unwrap(),
            Expression::Sexp(vec![Expression::Int(1), Expression::Int(2), Expression::Int(3)])
        );
    }

    #[test]
    fn map_applies_function_across_list() {
        let interp = interp();
        let list = Expression::Sexp(vec![Expression::Int(1), Expression::Int(2), Expression::Int(3)]);
        let result = crate::eval::evaluate(&interp, &call("map", vec![Expression::Symbol("incr".into()), list])).unwrap();
        assert_eq!(result, Expression::Sexp(vec![Expression::Int(2), Expression::Int(3), Expression::Int(4)]));
    }

    #[test]
    fn filter_keeps_truthy_elements() {
        let interp = interp();
        let list = Expression::Sexp(vec![Expression::Int(1), Expression::Int(2), Expression::Int(3), Expression::Int(4)]);
        let result = crate::eval::evaluate(&interp, &call("filter", vec![Expression::Symbol("even?".into()), list])).unwrap();
        assert_eq!(result, Expression::Sexp(vec![Expression::Int(2), Expression::Int(4)]));
    }

    #[test]
    fn range_defaults_start_to_zero() {
        let interp = interp();
        assert_eq!(
            crate::eval::evaluate(&interp, &call("range", vec![Expression::Int(3)])).unwrap(),
            Expression::Sexp(vec![Expression::Int(0), Expression::Int(1), Expression::Int(2)])
        );
    }

    #[test]
    fn at_out_of_bounds_errors() {
        let interp = interp();
        let list = Expression::Sexp(vec![Expression::Int(1)]);
        assert!(crate::eval::evaluate(&interp, &call("at", vec![list, Expression::Int(5)])).is_err());
    }

    #[test]
    fn map_over_a_parsed_literal_list_argument() {
        let interp = interp();
        let program = crate::parser::parse_program(
            "(map incr (1 2 3))",
            &interp.settings.borrow().default_function.clone(),
            &std::collections::HashMap::new(),
        )
        .unwrap();
        let result = crate::eval::evaluate(&interp, &program).unwrap();
        assert_eq!(result, Expression::Sexp(vec![Expression::Int(2), Expression::Int(3), Expression::Int(4)]));
    }
}
