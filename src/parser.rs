// ABOUTME: Turns a token stream into an Expression tree, applying infix-to-prefix rewriting (§4.2)

use crate::error::LispError;
use crate::tokenizer::{Token, TokenTag, Tokenizer};
use crate::value::Expression;
use std::collections::HashMap;

struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token {
            tag: TokenTag::None,
            text: String::new(),
        })
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos).cloned().unwrap_or(Token {
            tag: TokenTag::None,
            text: String::new(),
        });
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }
}

fn tokenize_all(source: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(source);
    let mut out = Vec::new();
    loop {
        let tok = tokenizer.next();
        if tok.tag == TokenTag::None {
            break;
        }
        out.push(tok);
    }
    out
}

fn parse_number(lexeme: &str) -> Result<Expression, LispError> {
    if lexeme.contains('.') || lexeme.to_ascii_lowercase().contains('e') {
        return lexeme
            .parse::<f64>()
            .map(Expression::Float)
            .map_err(|_| LispError::Parse(format!("malformed float literal: {}", lexeme)));
    }

    let (negative, body) = match lexeme.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, lexeme),
    };

    let value = if let Some(hex) = body.strip_prefix("0x") {
        i64::from_str_radix(hex, 16)
    } else if let Some(bin) = body.strip_prefix("0b") {
        i64::from_str_radix(bin, 2)
    } else {
        body.parse::<i64>()
    }
    .map_err(|_| LispError::Parse(format!("integer literal out of range: {}", lexeme)))?;

    Ok(Expression::Int(if negative { -value } else { value }))
}

fn parse_one(cursor: &mut Cursor) -> Result<Expression, LispError> {
    let tok = cursor.advance();
    match tok.tag {
        TokenTag::Number => parse_number(&tok.text),
        TokenTag::String => Ok(Expression::Str(tok.text)),
        TokenTag::Symbol => Ok(match tok.text.as_str() {
            "#t" | "true" => Expression::Bool(true),
            "#f" | "false" => Expression::Bool(false),
            _ => Expression::Symbol(tok.text),
        }),
        TokenTag::Quote => {
            let child = parse_one(cursor)?;
            Ok(Expression::Sexp(vec![Expression::Symbol("'".to_string()), child]))
        }
        TokenTag::ParenOpen => {
            let children = parse_sequence(cursor, true)?;
            Ok(Expression::Sexp(children))
        }
        TokenTag::ParenClose => Err(LispError::Parse("unexpected ')'".to_string())),
        TokenTag::Unknown => Err(LispError::Tokenize(format!("malformed token: {}", tok.text))),
        TokenTag::None => Err(LispError::Parse("unexpected end of input".to_string())),
    }
}

fn parse_sequence(cursor: &mut Cursor, inside_parens: bool) -> Result<Vec<Expression>, LispError> {
    let mut forms = Vec::new();
    loop {
        match cursor.peek().tag {
            TokenTag::None => {
                if inside_parens {
                    return Err(LispError::Parse("missing closing ')'".to_string()));
                }
                break;
            }
            TokenTag::ParenClose if inside_parens => {
                cursor.advance();
                break;
            }
            _ => forms.push(parse_one(cursor)?),
        }
    }
    Ok(forms)
}

fn infix_precedence(symbol: &str, infix: &HashMap<String, i32>) -> Option<i32> {
    infix.get(symbol).copied()
}

/// Detects the `operand op operand op operand ...` shape and, if present,
/// folds it via shunting-yard into a single nested-call expression. Plain
/// sibling sequences with no registered infix symbol pass through unchanged.
fn fold_children(forms: Vec<Expression>, infix: &HashMap<String, i32>) -> Expression {
    if forms.len() < 3 || forms.len() % 2 == 0 {
        return Expression::Sexp(forms);
    }
    let is_infix_shape = forms.iter().enumerate().all(|(i, f)| {
        if i % 2 == 1 {
            matches!(f.as_symbol(), Some(s) if infix_precedence(s, infix).is_some())
        } else {
            true
        }
    });
    if !is_infix_shape {
        return Expression::Sexp(forms);
    }
    fold_infix(&forms, infix)
}

fn fold_infix(forms: &[Expression], infix: &HashMap<String, i32>) -> Expression {
    let mut output: Vec<Expression> = vec![forms[0].clone()];
    let mut ops: Vec<String> = Vec::new();

    let apply_top = |output: &mut Vec<Expression>, ops: &mut Vec<String>| {
        let op = ops.pop().expect("apply_top called with empty operator stack");
        let rhs = output.pop().expect("apply_top missing rhs operand");
        let lhs = output.pop().expect("apply_top missing lhs operand");
        output.push(Expression::Sexp(vec![Expression::Symbol(op), lhs, rhs]));
    };

    let mut i = 1;
    while i < forms.len() {
        let op = forms[i].as_symbol().expect("fold shape pre-verified").to_string();
        let op_prec = infix_precedence(&op, infix).unwrap_or(0);
        while let Some(top) = ops.last() {
            if infix_precedence(top, infix).unwrap_or(0) >= op_prec {
                apply_top(&mut output, &mut ops);
            } else {
                break;
            }
        }
        ops.push(op);
        output.push(forms[i + 1].clone());
        i += 2;
    }
    while !ops.is_empty() {
        apply_top(&mut output, &mut ops);
    }
    output.pop().expect("fold produces exactly one result")
}

/// Re-walks a freshly-parsed tree applying the live infix table to every
/// list's children. Lists are parsed with no knowledge of the table (it can
/// change at runtime via `infix-register`/`infix-unregister`), so folding
/// happens in this separate pass over the already-built tree instead.
fn apply_infix(expr: Expression, infix: &HashMap<String, i32>) -> Expression {
    match expr {
        Expression::Sexp(children) if !children.is_empty() => {
            let rebuilt: Vec<Expression> = children.into_iter().map(|c| apply_infix(c, infix)).collect();
            fold_children(rebuilt, infix)
        }
        Expression::Quote(child) => Expression::Quote(Box::new(apply_infix(*child, infix))),
        other => other,
    }
}

/// Parses a complete top-level input, wrapping the resulting forms in a Sexp
/// headed by `default_function` (§4.2). `infix` is consulted once per call,
/// matching the resolved Open Question that a rebind takes effect on the
/// next parse/eval cycle rather than retroactively.
pub fn parse_program(
    source: &str,
    default_function: &str,
    infix: &HashMap<String, i32>,
) -> Result<Expression, LispError> {
    let tokens = tokenize_all(source);
    let mut cursor = Cursor { tokens, pos: 0 };
    let raw_forms = parse_sequence(&mut cursor, false)?;
    let forms: Vec<Expression> = raw_forms.into_iter().map(|f| apply_infix(f, infix)).collect();

    let folded = if forms.len() >= 3 && forms.len() % 2 == 1 {
        vec![fold_children(forms, infix)]
    } else {
        forms
    };

    let mut children = vec![Expression::Symbol(default_function.to_string())];
    children.extend(folded);
    Ok(Expression::Sexp(children))
}

/// Tests whether `source` tokenizes to balanced parens with no unterminated
/// string, i.e. whether it is ready to parse. Shared by the REPL's
/// continuation prompt and the script driver's top-level form splitter
/// (§6): both accumulate lines until this returns true.
pub fn input_is_complete(source: &str) -> bool {
    let mut depth = 0i32;
    for tok in tokenize_all(source) {
        match tok.tag {
            TokenTag::ParenOpen => depth += 1,
            TokenTag::ParenClose => depth -= 1,
            TokenTag::Unknown => return false,
            _ => {}
        }
    }
    depth <= 0
}

#[cfg(test)]
mod input_is_complete_tests {
    use super::input_is_complete;

    #[test]
    fn balanced_form_is_complete() {
        assert!(input_is_complete("(+ 1 2)"));
    }

    #[test]
    fn unbalanced_form_is_incomplete() {
        assert!(!input_is_complete("(+ 1 (* 2 3)"));
    }

    #[test]
    fn unterminated_string_is_incomplete() {
        assert!(!input_is_complete("(print \"hi"));
    }

    #[test]
    fn bare_infix_expression_is_complete() {
        assert!(input_is_complete("2 + 3"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infix_table(pairs: &[(&str, i32)]) -> HashMap<String, i32> {
        pairs.iter().map(|(s, p)| (s.to_string(), *p)).collect()
    }

    #[test]
    fn wraps_top_level_under_default_function() {
        let program = parse_program("(+ 2 3)", "default", &HashMap::new()).unwrap();
        assert_eq!(
            program,
            Expression::Sexp(vec![
                Expression::Symbol("default".into()),
                Expression::Sexp(vec![
                    Expression::Symbol("+".into()),
                    Expression::Int(2),
                    Expression::Int(3),
                ]),
            ])
        );
    }

    #[test]
    fn multiple_top_level_forms_become_siblings() {
        let program = parse_program("(def x 1) (def y 2)", "default", &HashMap::new()).unwrap();
        let Expression::Sexp(children) = program else { panic!("expected sexp") };
        assert_eq!(children.len(), 3);
    }

    #[test]
    fn quote_sugar_builds_apostrophe_sexp() {
        let program = parse_program("'x", "default", &HashMap::new()).unwrap();
        let Expression::Sexp(children) = program else { panic!("expected sexp") };
        assert_eq!(
            children[1],
            Expression::Sexp(vec![Expression::Symbol("'".into()), Expression::Symbol("x".into())])
        );
    }

    #[test]
    fn bool_literals_parse_from_hash_symbols() {
        let program = parse_program("#t #f", "default", &HashMap::new()).unwrap();
        let Expression::Sexp(children) = program else { panic!() };
        assert_eq!(children[1], Expression::Bool(true));
        assert_eq!(children[2], Expression::Bool(false));
    }

    #[test]
    fn bool_literals_parse_from_true_false() {
        let program = parse_program("true false", "default", &HashMap::new()).unwrap();
        let Expression::Sexp(children) = program else { panic!() };
        assert_eq!(children[1], Expression::Bool(true));
        assert_eq!(children[2], Expression::Bool(false));
    }

    #[test]
    fn hex_and_binary_literals() {
        assert_eq!(parse_number("0xFF").unwrap(), Expression::Int(255));
        assert_eq!(parse_number("0b101").unwrap(), Expression::Int(5));
    }

    #[test]
    fn integer_overflow_fails_parse() {
        assert!(parse_number("99999999999999999999").is_err());
    }

    #[test]
    fn infix_same_precedence_folds_left() {
        let infix = infix_table(&[("+", 10)]);
        let program = parse_program("(a + b + c)", "default", &infix).unwrap();
        let Expression::Sexp(children) = program else { panic!() };
        assert_eq!(
            children[1],
            Expression::Sexp(vec![
                Expression::Symbol("+".into()),
                Expression::Sexp(vec![
                    Expression::Symbol("+".into()),
                    Expression::Symbol("a".into()),
                    Expression::Symbol("b".into()),
                ]),
                Expression::Symbol("c".into()),
            ])
        );
    }

    #[test]
    fn infix_precedence_nests_higher_binding_operator() {
        let infix = infix_table(&[("+", 10), ("*", 20)]);
        let program = parse_program("(3 + 4 * 5)", "default", &infix).unwrap();
        let Expression::Sexp(children) = program else { panic!() };
        assert_eq!(
            children[1],
            Expression::Sexp(vec![
                Expression::Symbol("+".into()),
                Expression::Int(3),
                Expression::Sexp(vec![Expression::Symbol("*".into()), Expression::Int(4), Expression::Int(5)]),
            ])
        );
    }

    #[test]
    fn missing_close_paren_is_an_error() {
        assert!(parse_program("(+ 1 2", "default", &HashMap::new()).is_err());
    }

    #[test]
    fn plain_call_form_is_unaffected_by_infix_table() {
        let infix = infix_table(&[("+", 10)]);
        let program = parse_program("(def add (a b) (+ a b))", "default", &infix).unwrap();
        let Expression::Sexp(children) = program else { panic!() };
        let Expression::Sexp(def_call) = &children[1] else { panic!() };
        assert_eq!(def_call[0], Expression::Symbol("def".into()));
    }
}
