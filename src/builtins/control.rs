//! Control, scoping, and evaluation forms.
//!
//! These are ordinary `CompiledFunction` entries, not evaluator special
//! cases: each handle decides its own argument-evaluation eagerness by
//! calling (or not calling) `ctx.evaluate`. This is how `if`/`cond`/`while`/
//! `and`/`or`/`let`/`def`/`lambda`/`quote` get their lazy semantics without
//! the evaluator knowing their names.

use crate::env::Scope;
use crate::error::{EvalError, LispError};
use crate::funcdef::{Arity, FuncDef, TypeTag};
use crate::interpreter::{EvaluationContext, Interpreter, DEFAULT_FUNCTION};
use crate::value::{BuiltinHandle, Expression};
use std::collections::HashMap;
use std::rc::Rc;

fn compiled(name: &str, def: FuncDef, handle: BuiltinHandle) -> Expression {
    Expression::CompiledFunction {
        name: name.to_string(),
        def: Rc::new(def),
        handle,
    }
}

/// The interpreter's built-in `default` function: evaluates its arguments in
/// order and returns the last (§4.7's "configured default-function"). Used
/// both as the normal binding for `"default"` and as the fallback the
/// evaluator synthesizes if that binding is ever unset.
pub fn default_function_expr() -> Expression {
    compiled(
        DEFAULT_FUNCTION,
        FuncDef::varargs(TypeTag::Any, Arity::Any, TypeTag::Any),
        builtin_begin,
    )
}

fn eval_body(ctx: &mut EvaluationContext, forms: &[Expression]) -> Result<Expression, EvalError> {
    let mut last = Expression::nil();
    for form in forms {
        last = ctx.evaluate(form)?;
    }
    Ok(last)
}

fn builtin_begin(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let forms = ctx.args.to_vec();
    eval_body(ctx, &forms)
}

fn builtin_if(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    if ctx.args.len() != 2 && ctx.args.len() != 3 {
        return Err(ctx.arity_error("2 or 3"));
    }
    let test = ctx.evaluate(&ctx.args[0].clone())?;
    if test.bool_is_truthy() {
        ctx.evaluate(&ctx.args[1].clone())
    } else if ctx.args.len() == 3 {
        ctx.evaluate(&ctx.args[2].clone())
    } else {
        ctx.return_nil()
    }
}

fn builtin_cond(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    for clause in ctx.args.to_vec() {
        let Expression::Sexp(parts) = &clause else {
            return Err(ctx.error("cond: each clause must be a list of (test result...)"));
        };
        if parts.is_empty() {
            continue;
        }
        let test = ctx.evaluate(&parts[0])?;
        if test.bool_is_truthy() {
            return eval_body(ctx, &parts[1..]);
        }
    }
    ctx.return_nil()
}

fn builtin_while(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    if ctx.args.is_empty() {
        return Err(ctx.arity_error("at least 1"));
    }
    let cond = ctx.args[0].clone();
    let body = ctx.args[1..].to_vec();
    let mut last = Expression::nil();
    loop {
        let test = ctx.evaluate(&cond)?;
        if !test.bool_is_truthy() {
            break;
        }
        last = eval_body(ctx, &body)?;
    }
    Ok(last)
}

fn builtin_let(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let Expression::Sexp(bindings) = &ctx.args[0] else {
        return Err(ctx.error("let: first argument must be a list of bindings"));
    };
    let bindings = bindings.clone();
    let mut evaluated = Vec::with_capacity(bindings.len());
    for binding in &bindings {
        let Expression::Sexp(pair) = binding else {
            return Err(ctx.error("let: each binding must be (name value)"));
        };
        if pair.len() != 2 {
            return Err(ctx.error("let: each binding must be (name value)"));
        }
        let name = pair[0]
            .as_symbol()
            .ok_or_else(|| ctx.error("let: binding name must be a symbol"))?
            .to_string();
        let value = ctx.evaluate(&pair[1])?;
        evaluated.push((name, value));
    }

    let mut scope = Scope::new(ctx.interp.dynamic.clone());
    for (name, value) in evaluated {
        scope.put(name, value);
    }
    let result = ctx.evaluate(&ctx.args[1].clone());
    drop(scope);
    result
}

fn capture_closure(interp: &Interpreter) -> Rc<HashMap<String, Expression>> {
    let mut snapshot = HashMap::new();
    if let Some(frame) = interp.frames.borrow().last() {
        frame.locals().for_each(|name, value| {
            if let Some(value) = value {
                snapshot.insert(name.to_string(), value.clone());
            }
        });
    }
    Rc::new(snapshot)
}

fn params_from_sexp(ctx: &EvaluationContext, expr: &Expression) -> Result<Vec<String>, EvalError> {
    let Expression::Sexp(items) = expr else {
        return Err(ctx.error("expected a parameter list"));
    };
    items
        .iter()
        .map(|p| {
            p.as_symbol()
                .map(|s| s.to_string())
                .ok_or_else(|| ctx.error("parameter names must be symbols"))
        })
        .collect()
}

fn builtin_lambda(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let params = params_from_sexp(ctx, &ctx.args[0].clone())?;
    let body = ctx.args[1].clone();
    let def = FuncDef::fixed(vec![TypeTag::Any; params.len()], TypeTag::Any);
    Ok(Expression::InterpretedFunction {
        name: None,
        def: Rc::new(def),
        params,
        body: Rc::new(body),
        closure: capture_closure(ctx.interp),
    })
}

fn builtin_def(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    if ctx.args.len() != 2 && ctx.args.len() != 3 {
        return Err(ctx.arity_error("2 or 3"));
    }
    let name = ctx.args[0]
        .as_symbol()
        .ok_or_else(|| ctx.error("def: first argument must be a symbol"))?
        .to_string();

    let value = if ctx.args.len() == 2 {
        ctx.evaluate(&ctx.args[1].clone())?
    } else {
        let params = params_from_sexp(ctx, &ctx.args[1].clone())?;
        let body = ctx.args[2].clone();
        let def = FuncDef::fixed(vec![TypeTag::Any; params.len()], TypeTag::Any);
        Expression::InterpretedFunction {
            name: Some(name.clone()),
            def: Rc::new(def),
            params,
            body: Rc::new(body),
            closure: capture_closure(ctx.interp),
        }
    };

    ctx.interp.define_global(name, value.clone());
    Ok(value)
}

fn builtin_set(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let name = ctx.args[0]
        .as_symbol()
        .ok_or_else(|| ctx.error("set: first argument must be a symbol"))?
        .to_string();
    let value = ctx.evaluate(&ctx.args[1].clone())?;
    ctx.interp.dynamic.borrow_mut().put(name, value.clone());
    Ok(value)
}

fn builtin_unset(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let name = ctx.args[0]
        .as_symbol()
        .ok_or_else(|| ctx.error("unset: argument must be a symbol"))?;
    ctx.interp.dynamic.borrow_mut().delete(name);
    ctx.return_nil()
}

fn builtin_quote(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    Ok(Expression::Quote(Box::new(ctx.args[0].clone())))
}

fn builtin_unquote(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    ctx.evaluate(&ctx.args[0].clone())
}

fn builtin_apply(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let func = ctx.evaluate(&ctx.args[0].clone())?;
    if !func.is_function() {
        return Err(ctx.type_error(TypeTag::Function, &func, 0));
    }
    let list = ctx.get_list(&ctx.args[1].clone())?;
    crate::eval::call(ctx.interp, &func, list, "<apply>")
}

pub fn register(interp: &Interpreter) {
    interp.define_global(DEFAULT_FUNCTION, default_function_expr());
    interp.define_global(
        "if",
        compiled("if", FuncDef::varargs(TypeTag::Any, Arity::Any, TypeTag::Any), builtin_if),
    );
    interp.define_global(
        "cond",
        compiled("cond", FuncDef::varargs(TypeTag::Sexp, Arity::Any, TypeTag::Any), builtin_cond),
    );
    interp.define_global(
        "while",
        compiled("while", FuncDef::varargs(TypeTag::Any, Arity::Any, TypeTag::Any), builtin_while),
    );
    interp.define_global(
        "let",
        compiled("let", FuncDef::fixed(vec![TypeTag::Sexp, TypeTag::Any], TypeTag::Any), builtin_let),
    );
    interp.define_global(
        "def",
        compiled("def", FuncDef::varargs(TypeTag::Any, Arity::Any, TypeTag::Any), builtin_def),
    );
    interp.define_global(
        "lambda",
        compiled(
            "lambda",
            FuncDef::fixed(vec![TypeTag::Sexp, TypeTag::Any], TypeTag::Function),
            builtin_lambda,
        ),
    );
    interp.define_global(
        "quote",
        compiled("quote", FuncDef::fixed(vec![TypeTag::Any], TypeTag::Quote), builtin_quote),
    );
    interp.define_global(
        "'",
        compiled("'", FuncDef::fixed(vec![TypeTag::Any], TypeTag::Quote), builtin_quote),
    );
    interp.define_global(
        "unquote",
        compiled("unquote", FuncDef::fixed(vec![TypeTag::Any], TypeTag::Any), builtin_unquote),
    );
    interp.define_global(
        "begin",
        compiled("begin", FuncDef::varargs(TypeTag::Any, Arity::Any, TypeTag::Any), builtin_begin),
    );
    interp.define_global(
        "apply",
        compiled("apply", FuncDef::fixed(vec![TypeTag::Any, TypeTag::Any], TypeTag::Any), builtin_apply),
    );
    interp.define_global(
        "set",
        compiled("set", FuncDef::fixed(vec![TypeTag::Any, TypeTag::Any], TypeTag::Any), builtin_set),
    );
    interp.define_global(
        "unset",
        compiled("unset", FuncDef::fixed(vec![TypeTag::Any], TypeTag::Any), builtin_unset),
    );

    register_help();
}

fn register_help() {
    use crate::help::{register_help as reg, HelpEntry};
    reg(HelpEntry {
        name: "if".to_string(),
        category: "Control".to_string(),
        signature: "(if test then else?)".to_string(),
        description: "Evaluates test; evaluates and returns only the chosen branch.".to_string(),
        examples: vec!["(if (< 3 4) \"lt\" \"ge\") => \"lt\"".to_string()],
        related: vec!["cond".to_string(), "while".to_string()],
    });
    reg(HelpEntry {
        name: "let".to_string(),
        category: "Control".to_string(),
        signature: "(let ((name value) ...) body)".to_string(),
        description: "Binds names for the scope of body, restoring prior bindings afterward.".to_string(),
        examples: vec!["(let ((a 3) (b 2)) (+ a b)) => 5".to_string()],
        related: vec!["def".to_string(), "lambda".to_string()],
    });
    reg(HelpEntry {
        name: "def".to_string(),
        category: "Control".to_string(),
        signature: "(def name value) | (def name (params...) body)".to_string(),
        description: "Binds name globally to a value, or to a new function.".to_string(),
        examples: vec!["(def add (a b) (+ a b))".to_string()],
        related: vec!["lambda".to_string(), "set".to_string()],
    });
    reg(HelpEntry {
        name: "lambda".to_string(),
        category: "Control".to_string(),
        signature: "(lambda (params...) body)".to_string(),
        description: "Builds an anonymous function closing over the current locals.".to_string(),
        examples: vec!["((lambda (x) (* x x)) 5) => 25".to_string()],
        related: vec!["def".to_string()],
    });
    reg(HelpEntry {
        name: "quote".to_string(),
        category: "Control".to_string(),
        signature: "(quote expr) | 'expr".to_string(),
        description: "Returns expr unevaluated.".to_string(),
        examples: vec!["'(1 2 3) => (1 2 3)".to_string()],
        related: vec!["unquote".to_string()],
    });
    reg(HelpEntry {
        name: "unquote".to_string(),
        category: "Control".to_string(),
        signature: "(unquote expr)".to_string(),
        description: "Evaluates expr exactly once, undoing a surrounding quote.".to_string(),
        examples: vec!["(unquote '(+ 1 2)) => 3".to_string()],
        related: vec!["quote".to_string()],
    });
    reg(HelpEntry {
        name: "cond".to_string(),
        category: "Control".to_string(),
        signature: "(cond (test body...) ...)".to_string(),
        description: "Evaluates each test in order, running the body of the first truthy clause.".to_string(),
        examples: vec!["(cond (#f 1) (#t 2)) => 2".to_string()],
        related: vec!["if".to_string()],
    });
    reg(HelpEntry {
        name: "while".to_string(),
        category: "Control".to_string(),
        signature: "(while test body...)".to_string(),
        description: "Repeats body while test is truthy, returning the last body value.".to_string(),
        examples: vec!["(while (< i 10) (set i (+ i 1)))".to_string()],
        related: vec!["if".to_string()],
    });
    reg(HelpEntry {
        name: "begin".to_string(),
        category: "Control".to_string(),
        signature: "(begin expr...)".to_string(),
        description: "Evaluates each expression in order, returning the value of the last.".to_string(),
        examples: vec!["(begin 1 2 3) => 3".to_string()],
        related: vec!["let".to_string()],
    });
    reg(HelpEntry {
        name: "apply".to_string(),
        category: "Control".to_string(),
        signature: "(apply func arglist)".to_string(),
        description: "Calls func with the evaluated elements of arglist as its arguments.".to_string(),
        examples: vec!["(apply + (list 1 2 3)) => 6".to_string()],
        related: vec!["lambda".to_string()],
    });
    reg(HelpEntry {
        name: "set".to_string(),
        category: "Control".to_string(),
        signature: "(set name value)".to_string(),
        description: "Assigns value to name in the dynamic table, visible after the current frame pops.".to_string(),
        examples: vec!["(set x 5)".to_string()],
        related: vec!["unset".to_string(), "def".to_string()],
    });
    reg(HelpEntry {
        name: "unset".to_string(),
        category: "Control".to_string(),
        signature: "(unset name)".to_string(),
        description: "Removes a binding from the dynamic table.".to_string(),
        examples: vec!["(unset x)".to_string()],
        related: vec!["set".to_string()],
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
        crate::builtins::comparison::register(&interp);
        crate::builtins::logic::register(&interp);
        interp
    }

    fn eval(interp: &Interpreter, src: &str) -> Expression {
        let program = crate::parser::parse_program(src, "default", &HashMap::new()).unwrap();
        crate::eval::evaluate(interp, &program).unwrap()
    }

    #[test]
    fn if_evaluates_only_the_chosen_branch() {
        let interp = interp();
        assert_eq!(eval(&interp, "(if (< 3 4) \"lt\" \"ge\")"), Expression::Str("lt".to_string()));
    }

    #[test]
    fn if_without_else_returns_nil_on_false_test() {
        let interp = interp();
        assert_eq!(eval(&interp, "(if (< 4 3) 1)"), Expression::nil());
    }

    #[test]
    fn cond_runs_first_truthy_clause() {
        let interp = interp();
        assert_eq!(eval(&interp, "(cond (#f 1) (#t 2))"), Expression::Int(2));
    }

    #[test]
    fn cond_with_no_truthy_clause_returns_nil() {
        let interp = interp();
        assert_eq!(eval(&interp, "(cond (#f 1) (#f 2))"), Expression::nil());
    }

    #[test]
    fn while_loop_accumulates_and_returns_last_body_value() {
        let interp = interp();
        eval(&interp, "(def i 0)");
        eval(&interp, "(def acc 0)");
        let result = eval(&interp, "(while (< i 5) (set acc (+ acc i)) (set i (+ i 1)))");
        assert_eq!(result, Expression::Int(5));
        assert_eq!(eval(&interp, "acc"), Expression::Int(10));
    }

    #[test]
    fn let_binds_for_body_only_and_restores_afterward() {
        let interp = interp();
        eval(&interp, "(def a 100)");
        assert_eq!(eval(&interp, "(let ((a 3) (b 2)) (+ a b))"), Expression::Int(5));
        assert_eq!(eval(&interp, "a"), Expression::Int(100));
        let err = crate::eval::evaluate(
            &interp,
            &crate::parser::parse_program("b", "default", &HashMap::new()).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err.kind, LispError::UnknownSymbol(_)));
    }

    #[test]
    fn def_with_value_form_binds_global() {
        let interp = interp();
        eval(&interp, "(def x 5)");
        assert_eq!(eval(&interp, "x"), Expression::Int(5));
    }

    #[test]
    fn def_with_params_form_defines_a_callable_function() {
        let interp = interp();
        eval(&interp, "(def add (a b) (+ a b))");
        assert_eq!(eval(&interp, "(add 2 3)"), Expression::Int(5));
    }

    #[test]
    fn lambda_closes_over_enclosing_locals() {
        let interp = interp();
        let result = eval(&interp, "(let ((n 10)) ((lambda (x) (+ x n)) 5))");
        assert_eq!(result, Expression::Int(15));
    }

    #[test]
    fn quote_suppresses_evaluation_and_unquote_reduces_it() {
        let interp = interp();
        assert_eq!(
            eval(&interp, "(quote (+ 1 2))"),
            Expression::Quote(Box::new(Expression::Sexp(vec![
                Expression::Symbol("+".to_string()),
                Expression::Int(1),
                Expression::Int(2),
            ])))
        );
        assert_eq!(eval(&interp, "(unquote (quote (+ 1 2)))"), Expression::Int(3));
    }

    #[test]
    fn begin_evaluates_in_order_and_returns_the_last() {
        let interp = interp();
        assert_eq!(eval(&interp, "(begin 1 2 3)"), Expression::Int(3));
    }

    #[test]
    fn apply_calls_a_function_with_an_argument_list() {
        let interp = interp();
        crate::builtins::lists::register(&interp);
        assert_eq!(eval(&interp, "(apply + (list 1 2 3))"), Expression::Int(6));
    }

    #[test]
    fn set_writes_to_the_dynamic_table_and_unset_removes_it() {
        let interp = interp();
        eval(&interp, "(def x 1)");
        eval(&interp, "(set x 2)");
        assert_eq!(eval(&interp, "x"), Expression::Int(2));
        eval(&interp, "(unset x)");
        let err = crate::eval::evaluate(
            &interp,
            &crate::parser::parse_program("x", "default", &HashMap::new()).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err.kind, LispError::UnknownSymbol(_)));
    }
}
