//! Int-specific operations: incr, decr, ++, --, +=, -=, mod, hex, bin, dec,
//! even?, odd?, zero?
//!
//! `incr`/`decr` are pure: they return n+1/n-1 without touching any binding.
//! `++`/`--`/`+=`/`-=` take the symbol itself (unevaluated, like `set`) and
//! rebind it in the dynamic table to the updated value.

use crate::funcdef::{FuncDef, TypeTag};
use crate::interpreter::{EvaluationContext, Interpreter};
use crate::value::{BuiltinHandle, Expression};
use crate::error::EvalError;
use std::rc::Rc;

fn compiled(name: &str, arity: usize, out: TypeTag, handle: BuiltinHandle) -> Expression {
    Expression::CompiledFunction {
        name: name.to_string(),
        def: Rc::new(FuncDef::fixed(vec![TypeTag::Int; arity], out)),
        handle,
    }
}

fn builtin_incr(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let n = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    Ok(Expression::Int(n.wrapping_add(1)))
}

fn builtin_decr(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let n = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    Ok(Expression::Int(n.wrapping_sub(1)))
}

fn mutated_symbol_name(ctx: &EvaluationContext, position: usize) -> Result<String, EvalError> {
    ctx.args[position]
        .as_symbol()
        .map(|s| s.to_string())
        .ok_or_else(|| ctx.error(format!("{}: argument {} must be a symbol", ctx.function_name, position)))
}

fn current_int_binding(ctx: &EvaluationContext, name: &str) -> Result<i64, EvalError> {
    let value = ctx.get_symbol(name).ok_or_else(|| ctx.unknown_symbol_error(name))?;
    value
        .as_int()
        .ok_or_else(|| ctx.type_error(TypeTag::Int, &value, 0))
}

fn rebind_int(ctx: &EvaluationContext, name: String, value: i64) -> Expression {
    let updated = Expression::Int(value);
    ctx.interp.dynamic.borrow_mut().put(name, updated.clone());
    updated
}

fn builtin_mut_incr(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let name = mutated_symbol_name(ctx, 0)?;
    let n = current_int_binding(ctx, &name)?;
    Ok(rebind_int(ctx, name, n.wrapping_add(1)))
}

fn builtin_mut_decr(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let name = mutated_symbol_name(ctx, 0)?;
    let n = current_int_binding(ctx, &name)?;
    Ok(rebind_int(ctx, name, n.wrapping_sub(1)))
}

fn builtin_add_assign(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let name = mutated_symbol_name(ctx, 0)?;
    let n = current_int_binding(ctx, &name)?;
    let delta = ctx.get_required_int(&ctx.args[1].clone(), 1)?;
    Ok(rebind_int(ctx, name, n.wrapping_add(delta)))
}

fn builtin_sub_assign(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let name = mutated_symbol_name(ctx, 0)?;
    let n = current_int_binding(ctx, &name)?;
    let delta = ctx.get_required_int(&ctx.args[1].clone(), 1)?;
    Ok(rebind_int(ctx, name, n.wrapping_sub(delta)))
}

fn builtin_mod(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let a = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    let b = ctx.get_required_int(&ctx.args[1].clone(), 1)?;
    if b == 0 {
        return Err(ctx.divide_by_zero_error());
    }
    Ok(Expression::Int(a.wrapping_rem(b)))
}

fn builtin_hex(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let n = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    Ok(Expression::Str(format!("0x{:x}", n)))
}

fn builtin_bin(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let n = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    Ok(Expression::Str(format!("0b{:b}", n)))
}

fn builtin_dec(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let n = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    Ok(Expression::Str(n.to_string()))
}

fn builtin_even(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let n = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    Ok(Expression::Bool(n % 2 == 0))
}

fn builtin_odd(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let n = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    Ok(Expression::Bool(n % 2 != 0))
}

fn builtin_zero(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let n = ctx.get_required_int(&ctx.args[0].clone(), 0)?;
    Ok(Expression::Bool(n == 0))
}

pub fn register(interp: &Interpreter) {
    interp.define_global("incr", compiled("incr", 1, TypeTag::Int, builtin_incr));
    interp.define_global("decr", compiled("decr", 1, TypeTag::Int, builtin_decr));
    interp.define_global(
        "++",
        Expression::CompiledFunction {
            name: "++".to_string(),
            def: Rc::new(FuncDef::fixed(vec![TypeTag::Any], TypeTag::Int)),
            handle: builtin_mut_incr,
        },
    );
    interp.define_global(
        "--",
        Expression::CompiledFunction {
            name: "--".to_string(),
            def: Rc::new(FuncDef::fixed(vec![TypeTag::Any], TypeTag::Int)),
            handle: builtin_mut_decr,
        },
    );
    interp.define_global(
        "+=",
        Expression::CompiledFunction {
            name: "+=".to_string(),
            def: Rc::new(FuncDef::fixed(vec![TypeTag::Any, TypeTag::Any], TypeTag::Int)),
            handle: builtin_add_assign,
        },
    );
    interp.define_global(
        "-=",
        Expression::CompiledFunction {
            name: "-=".to_string(),
            def: Rc::new(FuncDef::fixed(vec![TypeTag::Any, TypeTag::Any], TypeTag::Int)),
            handle: builtin_sub_assign,
        },
    );
    interp.define_global("mod", compiled("mod", 2, TypeTag::Int, builtin_mod));
    interp.define_global("hex", compiled("hex", 1, TypeTag::Str, builtin_hex));
    interp.define_global("bin", compiled("bin", 1, TypeTag::Str, builtin_bin));
    interp.define_global("dec", compiled("dec", 1, TypeTag::Str, builtin_dec));
    interp.define_global("even?", compiled("even?", 1, TypeTag::Bool, builtin_even));
    interp.define_global("odd?", compiled("odd?", 1, TypeTag::Bool, builtin_odd));
    interp.define_global("zero?", compiled("zero?", 1, TypeTag::Bool, builtin_zero));

    use crate::help::{register_help, HelpEntry};
    register_help(HelpEntry {
        name: "incr".to_string(),
        category: "Int".to_string(),
        signature: "(incr n)".to_string(),
        description: "Returns n + 1.".to_string(),
        examples: vec!["(incr 4) => 5".to_string()],
        related: vec!["decr".to_string()],
    });
    register_help(HelpEntry {
        name: "decr".to_string(),
        category: "Int".to_string(),
        signature: "(decr n)".to_string(),
        description: "Returns n - 1.".to_string(),
        examples: vec!["(decr 4) => 3".to_string()],
        related: vec!["incr".to_string()],
    });
    register_help(HelpEntry {
        name: "++".to_string(),
        category: "Int".to_string(),
        signature: "(++ name)".to_string(),
        description: "Rebinds name to its current value plus 1, returning the new value.".to_string(),
        examples: vec!["(def i 1) (++ i) => 2".to_string()],
        related: vec!["--".to_string(), "incr".to_string()],
    });
    register_help(HelpEntry {
        name: "--".to_string(),
        category: "Int".to_string(),
        signature: "(-- name)".to_string(),
        description: "Rebinds name to its current value minus 1, returning the new value.".to_string(),
        examples: vec!["(def i 1) (-- i) => 0".to_string()],
        related: vec!["++".to_string(), "decr".to_string()],
    });
    register_help(HelpEntry {
        name: "+=".to_string(),
        category: "Int".to_string(),
        signature: "(+= name delta)".to_string(),
        description: "Rebinds name to its current value plus delta, returning the new value.".to_string(),
        examples: vec!["(def i 1) (+= i 4) => 5".to_string()],
        related: vec!["-=".to_string(), "++".to_string()],
    });
    register_help(HelpEntry {
        name: "-=".to_string(),
        category: "Int".to_string(),
        signature: "(-= name delta)".to_string(),
        description: "Rebinds name to its current value minus delta, returning the new value.".to_string(),
        examples: vec!["(def i 5) (-= i 4) => 1".to_string()],
        related: vec!["+=".to_string(), "--".to_string()],
    });
    register_help(HelpEntry {
        name: "mod".to_string(),
        category: "Int".to_string(),
        signature: "(mod a b)".to_string(),
        description: "Remainder of a divided by b.".to_string(),
        examples: vec!["(mod 17 5) => 2".to_string()],
        related: vec!["/".to_string()],
    });
    register_help(HelpEntry {
        name: "hex".to_string(),
        category: "Int".to_string(),
        signature: "(hex n)".to_string(),
        description: "Formats n as a 0x-prefixed hexadecimal string.".to_string(),
        examples: vec!["(hex 255) => \"0xff\"".to_string()],
        related: vec!["bin".to_string(), "dec".to_string()],
    });
    register_help(HelpEntry {
        name: "bin".to_string(),
        category: "Int".to_string(),
        signature: "(bin n)".to_string(),
        description: "Formats n as a 0b-prefixed binary string.".to_string(),
        examples: vec!["(bin 5) => \"0b101\"".to_string()],
        related: vec!["hex".to_string(), "dec".to_string()],
    });
    register_help(HelpEntry {
        name: "dec".to_string(),
        category: "Int".to_string(),
        signature: "(dec n)".to_string(),
        description: "Formats n as a decimal string.".to_string(),
        examples: vec!["(dec 255) => \"255\"".to_string()],
        related: vec!["hex".to_string(), "bin".to_string()],
    });
    register_help(HelpEntry {
        name: "even?".to_string(),
        category: "Int".to_string(),
        signature: "(even? n)".to_string(),
        description: "Tests whether n is even.".to_string(),
        examples: vec!["(even? 4) => true".to_string()],
        related: vec!["odd?".to_string()],
    });
    register_help(HelpEntry {
        name: "odd?".to_string(),
        category: "Int".to_string(),
        signature: "(odd? n)".to_string(),
        description: "Tests whether n is odd.".to_string(),
        examples: vec!["(odd? 3) => true".to_string()],
        related: vec!["even?".to_string()],
    });
    register_help(HelpEntry {
        name: "zero?".to_string(),
        category: "Int".to_string(),
        signature: "(zero? n)".to_string(),
        description: "Tests whether n is zero.".to_string(),
        examples: vec!["(zero? 0) => true".to_string()],
        related: vec![],
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
    fn hex_and_bin_format_lowercase() {
        let interp = interp();
        assert_eq!(
            crate::eval::evaluate(&interp, &call("hex", vec![Expression::Int(255)])).unwrap(),
            Expression::Str("0xff".to_string())
        );
        assert_eq!(
            crate::eval::evaluate(&interp, &call("bin", vec![Expression::Int(5)])).unwrap(),
            Expression::Str("0b101".to_string())
        );
    }

    #[test]
    fn mod_by_zero_errors() {
        let interp = interp();
        let err = crate::eval::evaluate(&interp, &call("mod", vec![Expression::Int(1), Expression::Int(0)])).unwrap_err();
        assert!(matches!(err.kind, crate::error::LispError::DivideByZero(_)));
    }

    #[test]
    fn mutating_ops_rebind_the_named_symbol() {
        let interp = interp();
        interp.define_global("i", Expression::Int(1));
        assert_eq!(
            crate::eval::evaluate(&interp, &call("++", vec![Expression::Symbol("i".into())])).unwrap(),
            Expression::Int(2)
        );
        assert_eq!(interp.get_symbol("i"), Some(Expression::Int(2)));

        assert_eq!(
            crate::eval::evaluate(&interp, &call("--", vec![Expression::Symbol("i".into())])).unwrap(),
            Expression::Int(1)
        );
        assert_eq!(
            crate::eval::evaluate(
                &interp,
                &call("+=", vec![Expression::Symbol("i".into()), Expression::Int(4)])
            )
            .unwrap(),
            Expression::Int(5)
        );
        assert_eq!(
            crate::eval::evaluate(
                &interp,
                &call("-=", vec![Expression::Symbol("i".into()), Expression::Int(4)])
            )
            .unwrap(),
            Expression::Int(1)
        );
    }

    #[test]
    fn even_odd_zero_predicates() {
        let interp = interp();
        assert_eq!(crate::eval::evaluate(&interp, &call("even?", vec![Expression::Int(4)])).unwrap(), Expression::Bool(true));
        assert_eq!(crate::eval::evaluate(&interp, &call("odd?", vec![Expression::Int(3)])).unwrap(), Expression::Bool(true));
        assert_eq!(crate::eval::evaluate(&interp, &call("zero?", vec![Expression::Int(0)])).unwrap(), Expression::Bool(true));
    }
}
