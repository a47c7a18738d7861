//! Host interaction: display, print, prompt, quit, help
//!
//! `display` writes a value's natural (unquoted) form with no trailing
//! newline; `print` writes each argument's natural form separated by a
//! space followed by a newline. `prompt` reads one line from stdin.
//! `quit` requests interpreter shutdown with an optional exit code.
//! `help` prints either the full quick reference or a single entry.

use crate::funcdef::{Arity, FuncDef, TypeTag};
use crate::interpreter::{EvaluationContext, Interpreter};
use crate::value::{BuiltinHandle, Expression};
use crate::error::EvalError;
use crate::builtins::types::natural_string;
use std::io::Write;
use std::rc::Rc;

fn compiled(name: &str, def: FuncDef, handle: BuiltinHandle) -> Expression {
    Expression::CompiledFunction {
        name: name.to_string(),
        def: Rc::new(def),
        handle,
    }
}

fn builtin_display(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let value = ctx.evaluate(&ctx.args[0].clone())?;
    print!("{}", natural_string(&value));
    std::io::stdout().flush().ok();
    Ok(Expression::nil())
}

fn builtin_print(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let mut parts = Vec::with_capacity(ctx.args.len());
    for arg in ctx.args.to_vec() {
        parts.push(natural_string(&ctx.evaluate(&arg)?));
    }
    println!("{}", parts.join(" "));
    Ok(Expression::nil())
}

fn builtin_prompt(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    if !ctx.args.is_empty() {
        let label = ctx.get_required_str(&ctx.args[0].clone(), 0)?;
        print!("{}", label);
        std::io::stdout().flush().ok();
    }
    let mut line = String::new();
    match std::io::stdin().read_line(&mut line) {
        Ok(0) => Ok(Expression::nil()),
        Ok(_) => Ok(Expression::Str(line.trim_end_matches(['\n', '\r']).to_string())),
        Err(e) => Err(ctx.error(format!("prompt: {}", e))),
    }
}

fn builtin_quit(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    let code = if ctx.args.is_empty() {
        0
    } else {
        ctx.get_required_int(&ctx.args[0].clone(), 0)?
    };
    ctx.interp.request_stop(code as i32);
    Ok(Expression::nil())
}

fn builtin_help(ctx: &mut EvaluationContext) -> Result<Expression, EvalError> {
    if ctx.args.is_empty() {
        println!("{}", crate::help::format_quick_reference());
        return Ok(Expression::nil());
    }
    let name = ctx.get_required_str(&ctx.args[0].clone(), 0)?;
    match crate::help::get_help(&name) {
        Some(entry) => println!("{}", crate::help::format_help_entry(&entry)),
        None => println!("No help found for '{}'.", name),
    }
    Ok(Expression::nil())
}

pub fn register(interp: &Interpreter) {
    interp.define_global(
        "display",
        compiled("display", FuncDef::fixed(vec![TypeTag::Any], TypeTag::Any), builtin_display),
    );
    interp.define_global(
        "print",
        compiled("print", FuncDef::varargs(TypeTag::Any, Arity::Any, TypeTag::Any), builtin_print),
    );
    interp.define_global(
        "prompt",
        compiled("prompt", FuncDef::varargs(TypeTag::Str, Arity::Any, TypeTag::Str), builtin_prompt),
    );
    interp.define_global(
        "quit",
        compiled("quit", FuncDef::varargs(TypeTag::Int, Arity::Any, TypeTag::Any), builtin_quit),
    );
    interp.define_global(
        "help",
        compiled("help", FuncDef::varargs(TypeTag::Str, Arity::Any, TypeTag::Any), builtin_help),
    );

    use crate::help::{register_help, HelpEntry};
    register_help(HelpEntry {
        name: "display".to_string(),
        category: "Host interaction".to_string(),
        signature: "(display val)".to_string(),
        description: "Writes val's natural (unquoted) form to stdout with no trailing newline.".to_string(),
        examples: vec!["(display \"hi\") => outputs: hi".to_string()],
        related: vec!["print".to_string()],
    });
    register_help(HelpEntry {
        name: "print".to_string(),
        category: "Host interaction".to_string(),
        signature: "(print val...)".to_string(),
        description: "Writes each val's natural form separated by a space, then a newline.".to_string(),
        examples: vec!["(print 1 2 3) => outputs: 1 2 3\\n".to_string()],
        related: vec!["display".to_string()],
    });
    register_help(HelpEntry {
        name: "prompt".to_string(),
        category: "Host interaction".to_string(),
        signature: "(prompt [label])".to_string(),
        description: "Writes an optional label then reads and returns one line from stdin.".to_string(),
        examples: vec!["(prompt \"name: \") => reads a line, e.g. \"ada\"".to_string()],
        related: vec![],
    });
    register_help(HelpEntry {
        name: "quit".to_string(),
        category: "Host interaction".to_string(),
        signature: "(quit [code])".to_string(),
        description: "Requests the interpreter stop after the current top-level form, with an optional exit code.".to_string(),
        examples: vec!["(quit) => stops with exit code 0".to_string(), "(quit 2) => stops with exit code 2".to_string()],
        related: vec![],
    });
    register_help(HelpEntry {
        name: "help".to_string(),
        category: "Help".to_string(),
        signature: "(help [name])".to_string(),
        description: "Prints the quick reference, or detailed help for a single function name.".to_string(),
        examples: vec!["(help) => lists every builtin by category".to_string(), "(help \"map\") => detailed help for map".to_string()],
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
    fn print_returns_nil() {
        let interp = interp();
        assert_eq!(
            crate::eval::evaluate(&interp, &call("print", vec![Expression::Int(1)])).unwrap(),
            Expression::nil()
        );
    }

    #[test]
    fn quit_requests_stop_with_code() {
        let interp = interp();
        crate::eval::evaluate(&interp, &call("quit", vec![Expression::Int(3)])).unwrap();
        assert!(interp.stop_requested.get());
        assert_eq!(interp.exit_code.get(), 3);
    }
}
