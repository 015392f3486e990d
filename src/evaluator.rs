use std::{cmp::Ordering, error::Error as StdError};

use log::trace;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    ast::{BinOp, Comparison, Expr, Operand, Pattern, Placeholder, PredicateExpr, UnaryOp},
    types::{self, TypeHandle},
    value::{Value, parse_decimal},
};

/// Host-supplied resolution of placeholders.
///
/// A placeholder written as a call, `${name(args)}`, goes to
/// [`invoke_function`](Self::invoke_function) with its evaluated arguments.
/// A `bean:` reference goes there as well, with no arguments. Every other
/// placeholder is a property path handed to
/// [`resolve_property`](Self::resolve_property).
///
/// Implementations must be safe to share between threads when the same
/// parsed tree is evaluated concurrently.
pub trait EvaluationContext {
    fn resolve_property(&self, path: &str) -> Result<Value, EvaluationError>;

    fn invoke_function(&self, name: &str, args: &[Value]) -> Result<Value, EvaluationError>;

    /// Resolves a class name at evaluation time, e.g. for `bodyAs(Type)`.
    fn resolve_type(&self, name: &str) -> Option<TypeHandle> {
        types::resolve_builtin(name)
    }
}

/// Errors that can occur while evaluating a parsed expression or predicate.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The context has no value for a property path
    #[error("property not found: {0}")]
    PropertyNotFound(String),

    /// The context does not know a function
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// A function was called with the wrong number or kind of arguments
    #[error("invalid arguments for {function}: {message}")]
    InvalidArguments { function: String, message: String },

    /// A value could not take part in an operation
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// A pattern computed at evaluation time failed to compile
    #[error("invalid regular expression {pattern}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A function or bean failed
    #[error("invocation of {name} failed: {source}")]
    Invocation {
        name: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

/// Walks parsed trees against a context. Holds no state of its own, so one
/// tree can be evaluated any number of times.
pub struct Evaluator<'c> {
    context: &'c dyn EvaluationContext,
}

impl<'c> Evaluator<'c> {
    pub fn new(context: &'c dyn EvaluationContext) -> Self {
        Evaluator { context }
    }

    pub fn eval_expr(&self, expr: &Expr) -> Result<Value, EvaluationError> {
        match expr {
            Expr::Literal(text) => Ok(Value::String(text.clone())),
            Expr::Integer(n) => Ok(Value::Integer(*n)),
            Expr::Float(n) => Ok(Value::Float(*n)),
            Expr::Boolean(b) => Ok(Value::Boolean(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Placeholder(placeholder) => self.eval_placeholder(placeholder),
            Expr::Concat(parts) => {
                let mut text = String::new();
                for part in parts {
                    text.push_str(&self.eval_expr(part)?.as_string());
                }
                Ok(Value::String(text))
            }
            Expr::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                step(*op, &value)
            }
        }
    }

    fn eval_placeholder(&self, placeholder: &Placeholder) -> Result<Value, EvaluationError> {
        let name = self.eval_expr(&placeholder.function)?.as_string();
        let name = name.trim();

        let value = match &placeholder.args {
            Some(args) => {
                let args = args
                    .iter()
                    .map(|arg| self.eval_expr(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.context.invoke_function(name, &args)?
            }
            None if name.starts_with("bean:") => self.context.invoke_function(name, &[])?,
            None => self.context.resolve_property(name)?,
        };

        trace!("resolved ${{{}}} to {:?}", name, value);
        Ok(value)
    }

    pub fn eval_predicate(&self, predicate: &PredicateExpr) -> Result<bool, EvaluationError> {
        match predicate {
            PredicateExpr::Constant(b) => Ok(*b),
            PredicateExpr::Truthy(expr) => Ok(self.eval_expr(expr)?.is_truthy()),
            PredicateExpr::Comparison(comparison) => self.eval_comparison(comparison),
            // Short-circuit: later conditions are not evaluated once decided
            PredicateExpr::And(conditions) => {
                for condition in conditions {
                    if !self.eval_predicate(condition)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            PredicateExpr::Or(groups) => {
                for group in groups {
                    if self.eval_predicate(group)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    fn eval_comparison(&self, comparison: &Comparison) -> Result<bool, EvaluationError> {
        let left = self.eval_expr(&comparison.left)?;
        let op = comparison.operator.op;

        let outcome = match &comparison.right {
            Operand::Type(handle) => handle.matches(&left),
            Operand::Pattern(pattern) => !left.is_null() && pattern.is_match(&left.as_string()),
            Operand::Range { low, high } => {
                let low = self.eval_expr(low)?;
                let high = self.eval_expr(high)?;
                in_range(&left, &low, &high)?
            }
            Operand::Value(expr) => {
                let right = self.eval_expr(expr)?;
                apply(op, &left, &right)?
            }
        };

        let result = outcome != comparison.operator.negated;
        trace!(
            "{:?} {} {:?} is {}",
            left, comparison.operator, comparison.right, result
        );
        Ok(result)
    }
}

/// Applies an operator whose right side was computed as a plain value.
fn apply(op: BinOp, left: &Value, right: &Value) -> Result<bool, EvaluationError> {
    let result = match op {
        BinOp::Equal => equals(left, right),
        BinOp::EqualIgnoreCase => match (left, right) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            _ => left.as_string().to_lowercase() == right.as_string().to_lowercase(),
        },
        BinOp::GreaterThan => compare(left, right).is_some_and(Ordering::is_gt),
        BinOp::GreaterEqual => compare(left, right).is_some_and(Ordering::is_ge),
        BinOp::LessThan => compare(left, right).is_some_and(Ordering::is_lt),
        BinOp::LessEqual => compare(left, right).is_some_and(Ordering::is_le),
        BinOp::Contains => contains(left, right, false),
        BinOp::ContainsIgnoreCase => contains(left, right, true),
        BinOp::In => member_of(left, right),
        BinOp::Regex => {
            if left.is_null() || right.is_null() {
                false
            } else {
                let source = right.as_string();
                let pattern = Pattern::compile(&source).map_err(|source_err| {
                    EvaluationError::InvalidRegex {
                        pattern: source,
                        source: source_err,
                    }
                })?;
                pattern.is_match(&left.as_string())
            }
        }
        BinOp::Is => {
            return Err(EvaluationError::TypeMismatch(format!(
                "'{}' is not a class name",
                right.as_string()
            )));
        }
        BinOp::Range => {
            let text = right.as_string();
            let Some((low, high)) = text.split_once("..") else {
                return Err(EvaluationError::TypeMismatch(format!(
                    "range '{}' is not of the form from..to",
                    text
                )));
            };
            in_range(left, &Value::from(low.trim()), &Value::from(high.trim()))?
        }
        BinOp::StartsWith => {
            !left.is_null() && !right.is_null() && left.as_string().starts_with(&right.as_string())
        }
        BinOp::EndsWith => {
            !left.is_null() && !right.is_null() && left.as_string().ends_with(&right.as_string())
        }
    };
    Ok(result)
}

/// Null equals only null; numbers compare numerically when both sides are
/// numeric, everything else by text.
pub fn equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        _ => match numeric_cmp(left, right) {
            Some(ordering) => ordering == Ordering::Equal,
            None => left.as_string() == right.as_string(),
        },
    }
}

/// Ordering for `<`, `<=`, `>`, `>=`. `None` when either side is null.
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    if left.is_null() || right.is_null() {
        return None;
    }
    numeric_cmp(left, right).or_else(|| Some(left.as_string().cmp(&right.as_string())))
}

/// Exact decimal ordering, or floating point once a side is out of
/// `Decimal` range. `None` unless both sides are numbers.
fn numeric_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left.as_decimal(), right.as_decimal()) {
        (Some(a), Some(b)) => Some(a.cmp(&b)),
        _ => left.as_float()?.partial_cmp(&right.as_float()?),
    }
}

fn contains(left: &Value, right: &Value, ignore_case: bool) -> bool {
    if left.is_null() || right.is_null() {
        return false;
    }
    let fold = |text: String| if ignore_case { text.to_lowercase() } else { text };
    match left {
        Value::Array(items) => {
            let needle = fold(right.as_string());
            items
                .iter()
                .any(|item| equals(item, right) || fold(item.as_string()) == needle)
        }
        _ => fold(left.as_string()).contains(&fold(right.as_string())),
    }
}

/// Membership in a list, or in the comma separated tokens of a text.
fn member_of(left: &Value, right: &Value) -> bool {
    if left.is_null() {
        return false;
    }
    let needle = left.as_string();
    match right {
        Value::Null => false,
        Value::Array(items) => items.iter().any(|item| item.as_string() == needle),
        other => other.as_string().split(',').any(|token| token.trim() == needle),
    }
}

fn in_range(value: &Value, low: &Value, high: &Value) -> Result<bool, EvaluationError> {
    if low.as_float().is_none() || high.as_float().is_none() {
        return Err(EvaluationError::TypeMismatch(format!(
            "range bounds '{}..{}' are not numbers",
            low.as_string(),
            high.as_string()
        )));
    }
    let above = numeric_cmp(value, low).is_some_and(|o| o != Ordering::Less);
    let below = numeric_cmp(value, high).is_some_and(|o| o != Ordering::Greater);
    Ok(above && below)
}

/// `++` / `--` on the value of a placeholder, keeping its representation:
/// numbers stay numbers and numerals stay text.
fn step(op: UnaryOp, value: &Value) -> Result<Value, EvaluationError> {
    let delta: i64 = match op {
        UnaryOp::Increment => 1,
        UnaryOp::Decrement => -1,
    };

    let stepped = match value {
        Value::Integer(n) => n.checked_add(delta).map(Value::Integer),
        Value::Float(n) => Some(Value::Float(n + delta as f64)),
        Value::String(s) => {
            let text = s.trim();
            match text.parse::<i64>() {
                Ok(n) => n.checked_add(delta).map(|n| Value::String(n.to_string())),
                Err(_) => parse_decimal(text).map(|n| Value::String((n + Decimal::from(delta)).to_string())),
            }
        }
        _ => None,
    };

    stepped.ok_or_else(|| {
        EvaluationError::TypeMismatch(format!(
            "cannot {} {} value '{}'",
            match op {
                UnaryOp::Increment => "increment",
                UnaryOp::Decrement => "decrement",
            },
            value.type_name(),
            value.as_string()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_first_equality() {
        assert!(equals(&Value::from("0.02"), &Value::Float(0.02)));
        assert!(equals(&Value::from("123"), &Value::Integer(123)));
        assert!(!equals(&Value::from(""), &Value::Null));
        assert!(equals(&Value::Null, &Value::Null));
    }

    #[test]
    fn test_ordering_is_numeric_for_numerals() {
        assert_eq!(compare(&Value::from("70"), &Value::Integer(8)), Some(Ordering::Greater));
        assert_eq!(compare(&Value::from("b"), &Value::from("abc")), Some(Ordering::Greater));
        assert_eq!(compare(&Value::Null, &Value::Integer(1)), None);
        assert_eq!(compare(&Value::Float(1e30), &Value::Integer(5)), Some(Ordering::Greater));
    }

    #[test]
    fn test_step_keeps_representation() {
        assert_eq!(step(UnaryOp::Increment, &Value::from("123")).unwrap(), Value::from("124"));
        assert_eq!(step(UnaryOp::Decrement, &Value::Integer(5)).unwrap(), Value::Integer(4));
        assert!(step(UnaryOp::Increment, &Value::from("abc")).is_err());
    }
}
