use std::fmt;

use regex::Regex;

use crate::{
    ast::{Expr, Operator},
    types::TypeHandle,
};

/// Predicate node of the syntax tree.
///
/// The language has no grouping, so an `Or` only ever holds `And` groups or
/// single conditions, and an `And` only holds conditions.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateExpr {
    /// `left operator right`
    Comparison(Comparison),

    /// A bare value used as a condition, e.g. `${header.enabled}`
    Truthy(Expr),

    /// Constant outcome; an empty predicate is `Constant(false)`
    Constant(bool),

    /// Conditions joined by `&&` / `and`
    And(Vec<PredicateExpr>),

    /// AND-groups joined by `||` / `or`
    Or(Vec<PredicateExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub left: Expr,
    pub operator: Operator,
    pub right: Operand,
}

/// Right-hand side of a comparison, shaped by its operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Any value expression, possibly dynamic
    Value(Expr),

    /// Class resolved at parse time for `is`
    Type(TypeHandle),

    /// Bounds of `range`; literal bounds were validated as numbers
    Range { low: Expr, high: Expr },

    /// Literal `regex` pattern, compiled at parse time
    Pattern(Pattern),
}

/// A compiled regular expression anchored for full-match semantics.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles `source` so that it must match the whole input.
    pub fn compile(source: &str) -> Result<Pattern, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Pattern {
            source: source.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}
