//! # Simple Language - Abstract Syntax Tree
//!
//! The syntax tree for the simple expression and predicate language used to
//! compute dynamic values from a message and to evaluate routing conditions.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Value nodes (literal text, placeholders, concatenation, `++`/`--`)
//! - **[operators]** - Comparison, logical and unary operators
//! - **[predicates]** - Comparisons and their AND/OR grouping
//!
//! ## Quick Start
//!
//! ```text
//! Hello ${header.name}, you ordered ${body.count} items
//! ${header.priority} >= 5 && ${body} contains 'urgent' || ${header.vip} == true
//! ```
//!
//! ## Core Concepts
//!
//! ### Placeholders
//!
//! `${...}` (or the alternate `$simple{...}`) marks a value resolved against
//! the evaluation context. Placeholders nest: `${header.${body}}` first
//! resolves `${body}` and then looks up the header named by the result.
//! Written as a call, `${bodyAs(Integer)}`, a placeholder invokes a function.
//!
//! ### Predicates
//!
//! A predicate is a flat chain of comparisons. `&&` binds tighter than `||`
//! and there are no parentheses, so the tree is always an OR of AND groups:
//!
//! ```text
//! a && b && c || d      =>   Or[And[a, b, c], d]
//! ```
//!
//! ### Type Coercion
//!
//! Equality, ordering and `range` compare numerically when both sides read as
//! numbers (`${header.bar} == '123'` holds for an integer header `123`) and
//! lexically otherwise.
pub mod expressions;
pub mod operators;
pub mod predicates;
pub mod tokens;

pub use expressions::{Expr, Placeholder};
pub use operators::{BinOp, LogicalOp, Operator, UnaryOp};
pub use predicates::{Comparison, Operand, Pattern, PredicateExpr};
pub use tokens::{Token, TokenKind};
