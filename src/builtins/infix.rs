//! Infix table: infix-register, infix-unregister
//!
//! Mutates the interpreter-wide precedence table the parser consults when
//! folding infix call forms (§4.2); changes take effect starting with the
//! next form read, since a form already parsed has already been folded.

use crate::funcdef::FuncDef;
use crate::interpreter::{EvaluationContext, Interpreter};
use crate::funcdef::TypeTag;
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

fn builtin_infix_register(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let symbol = ctx.get_required_str(&ctx.args[0].clone(), 0)?;
    let precedence = ctx.get_required_int(&ctx.args[1].clone(), 1)?;
    ctx.interp.settings.borrow_mut().register_infix(symbol, precedence as i32);
    Ok(Expression::nil())
}

fn builtin_infix_unregister(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let symbol = ctx.get_required_str(&ctx.args[0].clone(), 0)?;
    ctx.interp.settings.borrow_mut().unregister_infix(&symbol);
    Ok(Expression::nil())
}

pub fn register(interp: &Interpreter) {
    interp.define_global(
        "infix-register",
        compiled(
            "infix-register",
            FuncDef::fixed(vec![TypeTag::Str, TypeTag::Int], TypeTag::Any),
            builtin_infix_register,
        ),
    );
    interp.define_global(
        "infix-unregister",
        compiled(
            "infix-unregister",
            FuncDef::fixed(vec![TypeTag::Str], TypeTag::Any),
            builtin_infix_unregister,
        ),
    );

    use crate::help::{register_help, HelpEntry};
    register_help(HelpEntry {
        name: "infix-register".to_string(),
        category: "Infix table".to_string(),
        signature: "(infix-register symbol precedence)".to_string(),
        description: "Registers symbol as a left-associative infix operator at the given precedence, effective for forms parsed afterward.".to_string(),
        examples: vec!["(infix-register \"+\" 10) => nil".to_string()],
        related: vec!["infix-unregister".to_string()],
    });
    register_help(HelpEntry {
        name: "infix-unregister".to_string(),
        category: "Infix table".to_string(),
        signature: "(infix-unregister symbol)".to_string(),
        description: "Removes symbol from the infix table.".to_string(),
        examples: vec!["(infix-unregister \"+\") => nil".to_string()],
        related: vec!["infix-register".to_string()],
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
    fn register_then_unregister_round_trips() {
        let interp = interp();
        crate::eval::evaluate(&interp, &call("infix-register", vec![Expression::Str("+".into()), Expression::Int(10)])).unwrap();
        assert_eq!(interp.settings.borrow().infix_precedence("+"), Some(10));
        crate::eval::evaluate(&interp, &call("infix-unregister", vec![Expression::Str("+".into())])).unwrap();
        assert_eq!(interp.settings.borrow().infix_precedence("+"), None);
    }
}
