//! Built-in function catalog, organized by category (§4.8):
//!
//! - **[control]**: default, if, cond, while, let, def, lambda, quote,
//!   unquote, begin, apply, set, unset.
//! - **[logic]**: and, or, not.
//! - **[comparison]**: =, !=, <, >, <=, >=.
//! - **[arithmetic]**: +, -, *, /, pow, abs, max, min.
//! - **[int_ops]**: incr, decr, ++, --, +=, -=, mod, hex, bin, dec, even?,
//!   odd?, zero?.
//! - **[float_ops]**: sqrt, exp, log, ceil, floor, round, and the
//!   trigonometric/hyperbolic functions.
//! - **[bitwise]**: bit-and, bit-or, bit-xor, bit-not, left-shift,
//!   right-shift.
//! - **[strings]**: str+, trim, upper, lower, substr, contains?, compare,
//!   starts-with?, ends-with?, find, rfind, replace, split, join, length.
//! - **[lists]**: list, cons, head/car, tail/cdr, last, at/nth, length,
//!   empty?, reverse, map, filter, reduce, zip, any, all, foreach, range.
//! - **[types]**: type, type?, bool, int, float, str.
//! - **[errors]**: error, error?, error-msg.
//! - **[console]**: display, print, prompt, quit, help (host interaction).
//! - **[infix]**: infix-register, infix-unregister.
//! - **[filesystem]**: open, read-line, write-line, reset, close.
//!
//! Each category is a sub-module with its own `register(interp)` that wires
//! bindings into the interpreter's global table and registers the matching
//! help entries.

use crate::interpreter::Interpreter;
use crate::value::Expression;

pub mod arithmetic;
pub mod bitwise;
pub mod comparison;
pub mod console;
pub mod control;
pub mod errors;
pub mod filesystem;
pub mod float_ops;
pub mod infix;
pub mod int_ops;
pub mod lists;
pub mod logic;
pub mod strings;
pub mod types;

/// Registers every builtin category plus the read-only `sys.*` globals
/// (§6) drawn from the interpreter's `HostEnvironment`.
pub fn register_builtins(interp: &Interpreter) {
    control::register(interp);
    logic::register(interp);
    comparison::register(interp);
    arithmetic::register(interp);
    int_ops::register(interp);
    float_ops::register(interp);
    bitwise::register(interp);
    strings::register(interp);
    lists::register(interp);
    types::register(interp);
    errors::register(interp);
    console::register(interp);
    infix::register(interp);
    filesystem::register(interp);

    register_sys_globals(interp);
}

fn register_sys_globals(interp: &Interpreter) {
    let host = interp.host_env.borrow();
    interp.define_global(
        "sys.args",
        Expression::Sexp(host.args.iter().map(|a| Expression::Str(a.clone())).collect()),
    );
    interp.define_global("sys.version", Expression::Str(host.version.to_string()));
    interp.define_global("sys.program", Expression::Str(host.program.clone()));
    interp.define_global(
        "sys.script",
        host.script.clone().map(Expression::Str).unwrap_or_else(Expression::nil),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::HostEnvironment;

    #[test]
    fn register_builtins_populates_sys_globals() {
        let host = HostEnvironment {
            program: "slisp".to_string(),
            script: Some("demo.slisp".to_string()),
            args: vec!["a".to_string(), "b".to_string()],
            version: Default::default(),
        };
        let interp = Interpreter::new(host);
        register_builtins(&interp);
        assert_eq!(interp.get_symbol("sys.program"), Some(Expression::Str("slisp".to_string())));
        assert_eq!(interp.get_symbol("sys.script"), Some(Expression::Str("demo.slisp".to_string())));
        assert_eq!(
            interp.get_symbol("sys.args"),
            Some(Expression::Sexp(vec![Expression::Str("a".to_string()), Expression::Str("b".to_string())]))
        );
    }

    #[test]
    fn register_builtins_wires_every_category() {
        let interp = Interpreter::new(HostEnvironment::default());
        register_builtins(&interp);
        for name in ["+", "if", "and", "=", "incr", "sqrt", "bit-and", "str+", "cons", "type", "error", "print", "infix-register", "open"] {
            assert!(interp.get_symbol(name).is_some(), "{name} should be registered");
        }
    }
}
