// ABOUTME: Comprehensive integration tests verifying the parser, evaluator, and stdlib together

use slisp::builtins;
use slisp::interpreter::{HostEnvironment, Interpreter};
use slisp::value::Expression;
use std::collections::HashMap;

fn setup() -> Interpreter {
    let interp = Interpreter::new(HostEnvironment::default());
    builtins::register_builtins(&interp);
    interp
}

fn run(interp: &Interpreter, src: &str) -> Expression {
    let default_function = interp.settings.borrow().default_function.clone();
    let program = slisp::parser::parse_program(src, &default_function, &HashMap::new())
        .unwrap_or_else(|e| panic!("parse error for `{src}`: {e}"));
    slisp::eval::evaluate(interp, &program).unwrap_or_else(|e| panic!("eval error for `{src}`: {}", e.what()))
}

fn int(n: i64) -> Expression {
    Expression::Int(n)
}

fn str_val(s: &str) -> Expression {
    Expression::Str(s.to_string())
}

#[test]
fn test_factorial_program() {
    let interp = setup();
    run(
        &interp,
        "(def fact (n) (if (= n 0) 1 (* n (fact (- n 1)))))",
    );
    assert_eq!(run(&interp, "(fact 5)"), int(120));
    assert_eq!(run(&interp, "(fact 0)"), int(1));
}

#[test]
fn test_fibonacci_program() {
    let interp = setup();
    run(
        &interp,
        "(def fib (n) (if (< n 2) n (+ (fib (- n 1)) (fib (- n 2)))))",
    );
    assert_eq!(run(&interp, "(fib 10)"), int(55));
}

#[test]
fn test_higher_order_functions() {
    let interp = setup();
    assert_eq!(
        run(&interp, "(map incr (list 1 2 3))"),
        Expression::Sexp(vec![int(2), int(3), int(4)])
    );
    assert_eq!(
        run(&interp, "(filter even? (list 1 2 3 4 5 6))"),
        Expression::Sexp(vec![int(2), int(4), int(6)])
    );
    assert_eq!(run(&interp, "(reduce + (list 1 2 3 4) 0)"), int(10));
}

#[test]
fn test_literal_list_self_evaluates() {
    let interp = setup();
    assert_eq!(
        run(&interp, "(map incr (1 2 3))"),
        Expression::Sexp(vec![int(2), int(3), int(4)])
    );
    assert_eq!(
        run(&interp, "(1 \"foo\" false)"),
        Expression::Sexp(vec![int(1), str_val("foo"), Expression::Bool(false)])
    );
}

#[test]
fn test_closures() {
    let interp = setup();
    run(&interp, "(def make-adder (n) (lambda (x) (+ x n)))");
    run(&interp, "(def add5 (make-adder 5))");
    assert_eq!(run(&interp, "(add5 10)"), int(15));
    // a second closure over a different n does not share state with the first
    run(&interp, "(def add10 (make-adder 10))");
    assert_eq!(run(&interp, "(add10 1)"), int(11));
    assert_eq!(run(&interp, "(add5 1)"), int(6));
}

#[test]
fn test_list_operations() {
    let interp = setup();
    assert_eq!(run(&interp, "(cons 1 (list 2 3))"), Expression::Sexp(vec![int(1), int(2), int(3)]));
    assert_eq!(run(&interp, "(head (list 1 2 3))"), int(1));
    assert_eq!(run(&interp, "(tail (list 1 2 3))"), Expression::Sexp(vec![int(2), int(3)]));
    assert_eq!(run(&interp, "(length (list 1 2 3))"), int(3));
    assert_eq!(run(&interp, "(reverse (list 1 2 3))"), Expression::Sexp(vec![int(3), int(2), int(1)]));
}

#[test]
fn test_quoting() {
    let interp = setup();
    assert_eq!(
        run(&interp, "'(1 2 3)"),
        Expression::Quote(Box::new(Expression::Sexp(vec![int(1), int(2), int(3)])))
    );
    assert_eq!(run(&interp, "(unquote '(+ 1 2))"), int(3));
}

#[test]
fn test_let_bindings() {
    let interp = setup();
    assert_eq!(run(&interp, "(let ((a 3) (b 2)) (+ a b))"), int(5));
    // bindings don't leak past the let
    let err = slisp::eval::evaluate(
        &interp,
        &slisp::parser::parse_program("a", "default", &HashMap::new()).unwrap(),
    )
    .unwrap_err();
    assert!(matches!(err.kind, slisp::error::LispError::UnknownSymbol(_)));
}

#[test]
fn test_complex_nested_expressions() {
    let interp = setup();
    assert_eq!(
        run(&interp, "(if (> (+ 1 2) (* 1 2)) (str+ \"yes\") (str+ \"no\"))"),
        str_val("yes")
    );
}

#[test]
fn test_predicates_and_logic() {
    let interp = setup();
    assert_eq!(run(&interp, "(and true true 1)"), int(1));
    assert_eq!(run(&interp, "(and true false (error \"never\"))"), Expression::Bool(false));
    assert_eq!(run(&interp, "(and false thisisnotdefined)"), Expression::Bool(false));
    assert_eq!(run(&interp, "(or false false 3)"), int(3));
    assert_eq!(run(&interp, "(not false)"), Expression::Bool(true));
}

#[test]
fn test_error_as_value_and_thrown_error_both_report() {
    let interp = setup();
    let tagged = run(&interp, "(error \"boom\")");
    assert_eq!(run(&interp, "(error? (error \"boom\"))"), Expression::Bool(true));
    assert_eq!(run(&interp, "(error-msg (error \"boom\"))"), str_val("boom"));
    let _ = tagged;

    let err = slisp::eval::evaluate(
        &interp,
        &slisp::parser::parse_program("(+ 1 \"nope\")", "default", &HashMap::new()).unwrap(),
    )
    .unwrap_err();
    assert!(matches!(err.kind, slisp::error::LispError::Type { .. }));
}

#[test]
fn test_infix_registration_affects_later_forms_only() {
    let interp = setup();
    run(&interp, "(infix-register \"+\" 10)");
    let default_function = interp.settings.borrow().default_function.clone();
    let infix = {
        let mut map = HashMap::new();
        map.insert("+".to_string(), 10);
        map
    };
    let program = slisp::parser::parse_program("1 + 2", &default_function, &infix).unwrap();
    assert_eq!(slisp::eval::evaluate(&interp, &program).unwrap(), int(3));
}

#[test]
fn test_while_loop_and_mutation() {
    let interp = setup();
    run(&interp, "(def i 0)");
    run(&interp, "(def sum 0)");
    run(&interp, "(while (< i 5) (set sum (+ sum i)) (set i (+ i 1)))");
    assert_eq!(run(&interp, "sum"), int(10));
}

#[test]
fn test_while_loop_with_mutating_increment() {
    let interp = setup();
    run(&interp, "(def i 1)");
    run(&interp, "(while (< i 10) (++ i))");
    assert_eq!(run(&interp, "i"), int(10));
}

#[test]
fn test_string_library() {
    let interp = setup();
    assert_eq!(run(&interp, "(str+ \"foo\" \"bar\")"), str_val("foobar"));
    assert_eq!(run(&interp, "(upper \"abc\")"), str_val("ABC"));
    assert_eq!(
        run(&interp, "(split \"a,b,c\" \",\")"),
        Expression::Sexp(vec![str_val("a"), str_val("b"), str_val("c")])
    );
}

#[test]
fn test_type_conversions() {
    let interp = setup();
    assert_eq!(run(&interp, "(type 5)"), str_val("int"));
    assert_eq!(run(&interp, "(int \"42\")"), int(42));
    assert_eq!(run(&interp, "(float 3)"), Expression::Float(3.0));
}
