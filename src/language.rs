//! Entry points tying the parser, the type registry and the evaluator
//! together.

use std::fmt;

use crate::{
    ast::{Expr, PredicateExpr},
    error::SyntaxError,
    evaluator::{EvaluationContext, EvaluationError, Evaluator},
    parser::Parser,
    types::{TypeHandle, TypeRegistry},
    value::Value,
};

/// A configured instance of the language.
///
/// Owns the registry consulted when a predicate names a class with `is`.
/// Parsed trees are independent of the instance that produced them.
///
/// # Examples
///
/// ```
/// use simple_lang::{SimpleLanguage, TypeHandle};
///
/// let mut language = SimpleLanguage::new();
/// language.register_type("com.example.Order", TypeHandle::Map);
///
/// let predicate = language.parse_predicate("${body} is com.example.Order").unwrap();
/// assert_eq!(predicate.text(), "${body} is com.example.Order");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimpleLanguage {
    types: TypeRegistry,
}

impl SimpleLanguage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types(types: TypeRegistry) -> Self {
        SimpleLanguage { types }
    }

    /// Registers a class name for `is`/`not is`. Names resolve when a
    /// predicate is parsed; conversions such as `bodyAs` go through the
    /// context's own registry, see `MessageContext::with_types`.
    pub fn register_type(&mut self, name: impl Into<String>, handle: TypeHandle) {
        self.types.register(name, handle);
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn parse_expression(&self, text: &str) -> Result<Expression, SyntaxError> {
        let root = Parser::new(text, &self.types).parse_expression()?;
        Ok(Expression {
            text: text.to_string(),
            root,
        })
    }

    pub fn parse_predicate(&self, text: &str) -> Result<Predicate, SyntaxError> {
        let root = Parser::new(text, &self.types).parse_predicate()?;
        Ok(Predicate {
            text: text.to_string(),
            root,
        })
    }
}

/// A parsed expression, ready to be evaluated any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    text: String,
    root: Expr,
}

impl Expression {
    pub fn evaluate(&self, context: &dyn EvaluationContext) -> Result<Value, EvaluationError> {
        Evaluator::new(context).eval_expr(&self.root)
    }

    /// Evaluates and converts the result, failing when no conversion exists.
    pub fn evaluate_as(
        &self,
        context: &dyn EvaluationContext,
        target: &TypeHandle,
    ) -> Result<Value, EvaluationError> {
        let value = self.evaluate(context)?;
        target.convert(&value).ok_or_else(|| {
            EvaluationError::TypeMismatch(format!(
                "cannot convert {} value '{}' to {}",
                value.type_name(),
                value.as_string(),
                target.name()
            ))
        })
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A parsed predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    text: String,
    root: PredicateExpr,
}

impl Predicate {
    pub fn matches(&self, context: &dyn EvaluationContext) -> Result<bool, EvaluationError> {
        Evaluator::new(context).eval_predicate(&self.root)
    }

    pub fn root(&self) -> &PredicateExpr {
        &self.root
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
