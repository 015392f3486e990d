//! Parse and run expressions and predicates against a JSON message

use std::io::Read;

use super::CliError;
use crate::{Message, MessageContext, SimpleLanguage};

/// How the text of a command is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Evaluate an expression to a value
    #[default]
    Expression,
    /// Evaluate a predicate to true or false
    Predicate,
}

/// Options for the eval, test and check commands
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The expression or predicate text
    pub text: String,
    pub mode: Mode,
    /// JSON message; an empty message when absent
    pub input: Option<String>,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Expression evaluated to this JSON value
    Value(serde_json::Value),
    /// Predicate outcome
    Matches(bool),
}

/// The `--input` text when given, otherwise everything `reader` yields.
/// A failed or non UTF-8 read is an error rather than an empty message.
pub fn read_input<R: Read>(input: Option<String>, reader: Option<R>) -> Result<Option<String>, CliError> {
    match (input, reader) {
        (Some(text), _) => Ok(Some(text)),
        (None, Some(mut reader)) => {
            let mut buffer = String::new();
            reader.read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        (None, None) => Ok(None),
    }
}

/// Parses `options.text` and, unless only the syntax is checked, evaluates
/// it against the input message.
///
/// # Examples
///
/// ```
/// use simple_lang::cli::{CheckOptions, CheckResult, Mode, execute_check};
///
/// let options = CheckOptions {
///     text: "${header.count} > 2".to_string(),
///     mode: Mode::Predicate,
///     input: Some(r#"{"headers": {"count": 3}}"#.to_string()),
///     syntax_only: false,
/// };
/// assert_eq!(execute_check(&options).unwrap(), CheckResult::Matches(true));
/// ```
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let language = SimpleLanguage::default();

    match options.mode {
        Mode::Expression => {
            let expression = language.parse_expression(&options.text)?;
            if options.syntax_only {
                return Ok(CheckResult::SyntaxValid);
            }
            let value = expression.evaluate(&context(options)?)?;
            Ok(CheckResult::Value(value.into()))
        }
        Mode::Predicate => {
            let predicate = language.parse_predicate(&options.text)?;
            if options.syntax_only {
                return Ok(CheckResult::SyntaxValid);
            }
            Ok(CheckResult::Matches(predicate.matches(&context(options)?)?))
        }
    }
}

fn context(options: &CheckOptions) -> Result<MessageContext, CliError> {
    let message = match &options.input {
        Some(json) if !json.trim().is_empty() => Message::from_json(serde_json::from_str(json)?),
        _ => Message::default(),
    };
    Ok(MessageContext::new(message))
}
