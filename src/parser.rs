//! Recursive-descent parsers for expressions and predicates.
//!
//! Both parsers share one [`Parser`], which owns the character vector of the
//! source. Nested regions (placeholder bodies, call arguments, quoted
//! strings) are parsed by handing a bounded [`Lexer`] over the same vector
//! back into the same routines, so every error offset is absolute.

mod predicate;

pub use predicate::PredicateParser;

use log::debug;

use crate::{
    ast::{Expr, Placeholder, PredicateExpr, Token, TokenKind},
    error::SyntaxError,
    lexer::{LexMode, Lexer},
    types::TypeRegistry,
};

pub struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    types: &'a TypeRegistry,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, types: &'a TypeRegistry) -> Self {
        Parser {
            source,
            chars: source.chars().collect(),
            types,
        }
    }

    /// Parses the whole source as an expression: literal text interleaved
    /// with placeholders.
    pub fn parse_expression(&self) -> Result<Expr, SyntaxError> {
        let expr = self.template(0, self.chars.len())?;
        debug!("parsed expression {:?} into {:?}", self.source, expr);
        Ok(expr)
    }

    /// Parses the whole source as a predicate.
    pub fn parse_predicate(&self) -> Result<PredicateExpr, SyntaxError> {
        let predicate = PredicateParser::new(self)?.parse()?;
        debug!("parsed predicate {:?} into {:?}", self.source, predicate);
        Ok(predicate)
    }

    pub(crate) fn types(&self) -> &TypeRegistry {
        self.types
    }

    pub(crate) fn lexer(&self, start: usize, end: usize, mode: LexMode) -> Lexer<'_> {
        Lexer::slice(self.source, &self.chars, start, end, mode)
    }

    pub(crate) fn error(&self, offset: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(offset, message, self.source)
    }

    /// The source characters a token was scanned from, delimiters included.
    fn raw(&self, token: &Token) -> String {
        self.chars[token.start..token.end()].iter().collect()
    }

    /// Literal runs and placeholders in `[start, end)`, joined into one node.
    pub(crate) fn template(&self, start: usize, end: usize) -> Result<Expr, SyntaxError> {
        let mut lexer = self.lexer(start, end, LexMode::Template);
        let mut parts = Vec::new();

        loop {
            let token = lexer.next_token()?;
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Placeholder { .. } => {
                    let node = self.placeholder(&token)?;
                    let node = self.unary_suffix(&mut lexer, node)?;
                    parts.push(node);
                }
                _ => push_text(&mut parts, &self.raw(&token)),
            }
        }

        Ok(Expr::concat(parts))
    }

    /// Wraps `node` when a `++` / `--` directly follows the placeholder.
    pub(crate) fn unary_suffix(&self, lexer: &mut Lexer<'_>, node: Expr) -> Result<Expr, SyntaxError> {
        if let TokenKind::UnarySuffix(op) = lexer.peek_token()?.kind {
            lexer.next_token()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(node),
            });
        }
        Ok(node)
    }

    /// Parses the body of a placeholder token into a property path or a call.
    pub(crate) fn placeholder(&self, token: &Token) -> Result<Expr, SyntaxError> {
        let TokenKind::Placeholder { body } = token.kind else {
            return Err(self.error(token.error_index(), format!("expected a placeholder, got {:?}", token.text)));
        };
        let close = token.end() - 1;

        if token.text.trim().is_empty() {
            return Err(self.error(close, "placeholder has no function or property name"));
        }

        let tokens = self.tokens(body, close, LexMode::Function)?;
        Ok(Expr::Placeholder(self.function(&tokens)?))
    }

    fn tokens(&self, start: usize, end: usize, mode: LexMode) -> Result<Vec<Token>, SyntaxError> {
        let mut lexer = self.lexer(start, end, mode);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            if token.kind == TokenKind::Eof {
                return Ok(tokens);
            }
            tokens.push(token);
        }
    }

    /// `name(args)` when the first top-level parenthesis closes at the very
    /// end of the body, otherwise a plain path.
    fn function(&self, tokens: &[Token]) -> Result<Placeholder, SyntaxError> {
        if let Some(open) = tokens.iter().position(|t| t.kind == TokenKind::LParen)
            && let Some(close) = matching_paren(tokens, open)
            && tokens[close + 1..].iter().all(|t| t.kind == TokenKind::Whitespace)
        {
            let name = self.segment(&tokens[..open])?;
            let args = self.arguments(&tokens[open + 1..close])?;
            return Ok(Placeholder {
                function: Box::new(name),
                args: Some(args),
            });
        }

        Ok(Placeholder {
            function: Box::new(self.segment(tokens)?),
            args: None,
        })
    }

    /// A function name, path or unquoted argument: text and nested
    /// placeholders with surrounding whitespace trimmed.
    fn segment(&self, tokens: &[Token]) -> Result<Expr, SyntaxError> {
        let mut parts = Vec::new();
        for token in trim_whitespace(tokens) {
            match token.kind {
                TokenKind::Placeholder { .. } => parts.push(self.placeholder(token)?),
                _ => push_text(&mut parts, &self.raw(token)),
            }
        }
        Ok(Expr::concat(parts))
    }

    /// Splits call arguments on top-level commas.
    fn arguments(&self, tokens: &[Token]) -> Result<Vec<Expr>, SyntaxError> {
        if trim_whitespace(tokens).is_empty() {
            return Ok(Vec::new());
        }

        let mut args = Vec::new();
        let mut depth = 0usize;
        let mut from = 0;
        for (i, token) in tokens.iter().enumerate() {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth = depth.saturating_sub(1),
                TokenKind::Comma if depth == 0 => {
                    args.push(self.argument(&tokens[from..i])?);
                    from = i + 1;
                }
                _ => {}
            }
        }
        args.push(self.argument(&tokens[from..])?);
        Ok(args)
    }

    fn argument(&self, tokens: &[Token]) -> Result<Expr, SyntaxError> {
        match trim_whitespace(tokens) {
            [quoted] if matches!(quoted.kind, TokenKind::Quoted { .. }) => {
                self.template(quoted.start + 1, quoted.end() - 1)
            }
            _ => self.segment(tokens),
        }
    }
}

/// Appends literal text, merging with a preceding literal.
fn push_text(parts: &mut Vec<Expr>, text: &str) {
    if let Some(Expr::Literal(last)) = parts.last_mut() {
        last.push_str(text);
    } else {
        parts.push(Expr::Literal(text.to_string()));
    }
}

fn trim_whitespace(tokens: &[Token]) -> &[Token] {
    let start = tokens
        .iter()
        .position(|t| t.kind != TokenKind::Whitespace)
        .unwrap_or(tokens.len());
    let end = tokens
        .iter()
        .rposition(|t| t.kind != TokenKind::Whitespace)
        .map_or(start, |i| i + 1);
    &tokens[start..end]
}

fn matching_paren(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
