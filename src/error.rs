//! Located syntax errors raised by the scanner and both parsers.

use thiserror::Error;

/// A parse failure pinned to a 0-based character offset in the source text.
///
/// # Examples
///
/// ```
/// use simple_lang::parse_predicate;
///
/// let err = parse_predicate("${body} == == 'foo'").unwrap_err();
/// assert_eq!(err.offset, 13);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at location {offset}\n{}", caret(.expression, .offset))]
pub struct SyntaxError {
    /// Character offset of the token responsible for the failure.
    pub offset: usize,
    pub message: String,
    /// The full text that was being parsed.
    pub expression: String,
}

impl SyntaxError {
    pub fn new(offset: usize, message: impl Into<String>, expression: &str) -> Self {
        SyntaxError {
            offset,
            message: message.into(),
            expression: expression.to_string(),
        }
    }
}

fn caret(expression: &str, offset: &usize) -> String {
    format!("{}\n{}^", expression, " ".repeat(*offset))
}
