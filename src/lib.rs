//! An embeddable expression and predicate language for message routing.
//!
//! Expressions interpolate placeholders into text:
//!
//! ```text
//! Hello ${header.name}, your order ${body.id} is ready
//! ```
//!
//! Predicates compare values and combine the results:
//!
//! ```text
//! ${header.priority} > 5 && ${body} contains 'urgent'
//! ```
//!
//! Text is parsed once into an immutable tree and evaluated against any
//! number of [`EvaluationContext`]s.
//!
//! # Examples
//!
//! ```
//! use simple_lang::{Message, MessageContext, parse_predicate};
//!
//! let predicate = parse_predicate("${header.foo} == 'abc' || ${header.bar} > 100").unwrap();
//!
//! let context = MessageContext::new(Message::new("").with_header("bar", 123i64));
//! assert!(predicate.matches(&context).unwrap());
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod language;
pub mod lexer;
pub mod message;
pub mod parser;
pub mod types;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{BinOp, Expr, Operand, Operator, PredicateExpr, Token};
pub use error::SyntaxError;
pub use evaluator::{EvaluationContext, EvaluationError, Evaluator};
pub use language::{Expression, Predicate, SimpleLanguage};
pub use lexer::{LexMode, Lexer};
pub use message::{BeanError, Message, MessageContext};
pub use parser::Parser;
pub use types::{TypeHandle, TypeRegistry};
pub use value::Value;

/// Parses an expression with the default configuration.
pub fn parse_expression(text: &str) -> Result<Expression, SyntaxError> {
    SimpleLanguage::default().parse_expression(text)
}

/// Parses a predicate with the default configuration.
pub fn parse_predicate(text: &str) -> Result<Predicate, SyntaxError> {
    SimpleLanguage::default().parse_predicate(text)
}
