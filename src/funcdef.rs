// ABOUTME: Declarative argument/return shapes used to validate calls before dispatch

use crate::value::Expression;
use std::fmt;

/// A type tag an argument position may require. `Literal` and `Function` are
/// meta-tags matching several concrete variants; the rest match exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Bool,
    Int,
    Float,
    Str,
    Symbol,
    Quote,
    Sexp,
    /// Matches Bool, Int, Float, Str, or Quote.
    Literal,
    /// Matches CompiledFunction or InterpretedFunction.
    Function,
    /// Matches anything; used for arguments whose shape is only known at
    /// evaluation time (e.g. a lazily-evaluated control-form branch).
    Any,
}

impl TypeTag {
    pub fn matches(&self, expr: &Expression) -> bool {
        match self {
            TypeTag::Bool => matches!(expr, Expression::Bool(_)),
            TypeTag::Int => matches!(expr, Expression::Int(_)),
            TypeTag::Float => matches!(expr, Expression::Float(_)),
            TypeTag::Str => matches!(expr, Expression::Str(_)),
            TypeTag::Symbol => matches!(expr, Expression::Symbol(_)),
            TypeTag::Quote => matches!(expr, Expression::Quote(_)),
            TypeTag::Sexp => matches!(expr, Expression::Sexp(_)),
            TypeTag::Literal => matches!(
                expr,
                Expression::Bool(_)
                    | Expression::Int(_)
                    | Expression::Float(_)
                    | Expression::Str(_)
                    | Expression::Quote(_)
            ),
            TypeTag::Function => expr.is_function(),
            TypeTag::Any => true,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Str => "string",
            TypeTag::Symbol => "symbol",
            TypeTag::Quote => "quote",
            TypeTag::Sexp => "sexp",
            TypeTag::Literal => "literal",
            TypeTag::Function => "function",
            TypeTag::Any => "any",
        };
        write!(f, "{}", name)
    }
}

/// How many arguments a `Varargs` shape accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    Any,
    Exact(usize),
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::None => write!(f, "0"),
            Arity::Any => write!(f, "any"),
            Arity::Exact(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ArgShape {
    FixedList(Vec<TypeTag>),
    Varargs(TypeTag, Arity),
}

impl ArgShape {
    pub fn arity_matches(&self, actual: usize) -> bool {
        match self {
            ArgShape::FixedList(tags) => tags.len() == actual,
            ArgShape::Varargs(_, Arity::None) => actual == 0,
            ArgShape::Varargs(_, Arity::Any) => true,
            ArgShape::Varargs(_, Arity::Exact(n)) => actual == *n,
        }
    }

    pub fn expected_description(&self) -> String {
        match self {
            ArgShape::FixedList(tags) => tags.len().to_string(),
            ArgShape::Varargs(_, Arity::None) => "0".to_string(),
            ArgShape::Varargs(_, Arity::Any) => "any".to_string(),
            ArgShape::Varargs(_, Arity::Exact(n)) => n.to_string(),
        }
    }

    pub fn tag_at(&self, position: usize) -> TypeTag {
        match self {
            ArgShape::FixedList(tags) => tags.get(position).copied().unwrap_or(TypeTag::Any),
            ArgShape::Varargs(tag, _) => *tag,
        }
    }
}

/// Declarative in-shape/out-shape attached to every `CompiledFunction` and
/// `InterpretedFunction`. `validate` only checks arity and the statically
/// decidable part of argument typing (literal-shaped forms and symbols that
/// resolve without forcing evaluation of a compound form); a handle's own
/// runtime accessors (`EvaluationContext::get_required_value` et al.) catch
/// anything validate could not decide ahead of dispatch.
#[derive(Debug, Clone)]
pub struct FuncDef {
    pub in_shape: ArgShape,
    pub out_shape: TypeTag,
}

#[derive(Debug, Clone)]
pub enum ValidationError {
    Arity { expected: String, actual: usize },
    Type { expected: TypeTag, actual: String, position: usize },
}

impl FuncDef {
    pub fn fixed(tags: Vec<TypeTag>, out_shape: TypeTag) -> Self {
        FuncDef {
            in_shape: ArgShape::FixedList(tags),
            out_shape,
        }
    }

    pub fn varargs(tag: TypeTag, arity: Arity, out_shape: TypeTag) -> Self {
        FuncDef {
            in_shape: ArgShape::Varargs(tag, arity),
            out_shape,
        }
    }

    /// `peek` resolves a bare Symbol argument to its bound value without
    /// evaluating anything else; it returns `None` for unbound or
    /// not-yet-resolvable names, in which case the position is skipped
    /// rather than failed (the runtime will raise unknown-symbol later).
    pub fn validate(
        &self,
        args: &[Expression],
        peek: impl Fn(&str) -> Option<Expression>,
    ) -> Result<(), ValidationError> {
        if !self.in_shape.arity_matches(args.len()) {
            return Err(ValidationError::Arity {
                expected: self.in_shape.expected_description(),
                actual: args.len(),
            });
        }

        for (position, arg) in args.iter().enumerate() {
            let tag = self.in_shape.tag_at(position);
            if tag == TypeTag::Any {
                continue;
            }
            let resolved = match arg {
                Expression::Symbol(name) => peek(name),
                Expression::Sexp(items) if !items.is_empty() => None,
                other => Some(other.clone()),
            };
            if let Some(value) = resolved {
                if !tag.matches(&value) {
                    return Err(ValidationError::Type {
                        expected: tag,
                        actual: value.type_name().to_string(),
                        position,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_arity_rejects_wrong_count() {
        let def = FuncDef::fixed(vec![TypeTag::Int, TypeTag::Int], TypeTag::Int);
        let args = vec![Expression::Int(1)];
        assert!(matches!(
            def.validate(&args, |_| None),
            Err(ValidationError::Arity { .. })
        ));
    }

    #[test]
    fn varargs_any_accepts_every_count() {
        let def = FuncDef::varargs(TypeTag::Int, Arity::Any, TypeTag::Int);
        assert!(def.validate(&[], |_| None).is_ok());
        assert!(def
            .validate(&[Expression::Int(1), Expression::Int(2)], |_| None)
            .is_ok());
    }

    #[test]
    fn type_check_catches_literal_mismatch() {
        let def = FuncDef::fixed(vec![TypeTag::Int], TypeTag::Int);
        let args = vec![Expression::Str("x".into())];
        assert!(matches!(
            def.validate(&args, |_| None),
            Err(ValidationError::Type { .. })
        ));
    }

    #[test]
    fn symbol_argument_resolves_through_peek() {
        let def = FuncDef::fixed(vec![TypeTag::Int], TypeTag::Int);
        let args = vec![Expression::Symbol("x".into())];
        assert!(def
            .validate(&args, |name| if name == "x" {
                Some(Expression::Int(4))
            } else {
                None
            })
            .is_ok());
    }

    #[test]
    fn compound_sexp_argument_is_deferred_to_runtime() {
        let def = FuncDef::fixed(vec![TypeTag::Bool], TypeTag::Bool);
        let args = vec![Expression::Sexp(vec![
            Expression::Symbol("<".into()),
            Expression::Int(1),
            Expression::Int(2),
        ])];
        assert!(def.validate(&args, |_| None).is_ok());
    }
}
