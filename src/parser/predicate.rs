use crate::{
    ast::{BinOp, Comparison, Expr, LogicalOp, Operand, Operator, Pattern, PredicateExpr, Token, TokenKind},
    error::SyntaxError,
    lexer::{LexMode, Lexer},
    parser::Parser,
    value::is_numeral,
};

/// Parses predicate text: conditions joined by `&&`, and the resulting groups
/// joined by `||`. There is no grouping syntax, so `&&` always binds tighter.
pub struct PredicateParser<'p, 'a> {
    parser: &'p Parser<'a>,
    lexer: Lexer<'p>,
    current: Token,
}

impl<'p, 'a> PredicateParser<'p, 'a> {
    pub fn new(parser: &'p Parser<'a>) -> Result<Self, SyntaxError> {
        let mut lexer = parser.lexer(0, usize::MAX, LexMode::Predicate);
        let current = lexer.next_token()?;
        Ok(PredicateParser {
            parser,
            lexer,
            current,
        })
    }

    fn advance(&mut self) -> Result<Token, SyntaxError> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn skip_whitespace(&mut self) -> Result<(), SyntaxError> {
        while self.current.kind == TokenKind::Whitespace {
            self.advance()?;
        }
        Ok(())
    }

    fn unexpected(&self, token: &Token) -> SyntaxError {
        self.parser
            .error(token.error_index(), format!("Unexpected token {}", token.text))
    }

    pub fn parse(mut self) -> Result<PredicateExpr, SyntaxError> {
        self.skip_whitespace()?;
        if self.current.kind == TokenKind::Eof {
            return Ok(PredicateExpr::Constant(false));
        }

        let mut groups = vec![self.parse_and()?];
        loop {
            match self.current.kind {
                TokenKind::Eof => break,
                TokenKind::Logical(LogicalOp::Or) => {
                    let connective = self.advance()?;
                    self.skip_whitespace()?;
                    self.expect_right_side(&connective)?;
                    groups.push(self.parse_and()?);
                }
                _ => return Err(self.unexpected(&self.current)),
            }
        }

        Ok(collapse(groups, PredicateExpr::Or))
    }

    fn parse_and(&mut self) -> Result<PredicateExpr, SyntaxError> {
        let mut conditions = vec![self.parse_condition()?];
        loop {
            self.skip_whitespace()?;
            if self.current.kind != TokenKind::Logical(LogicalOp::And) {
                break;
            }
            let connective = self.advance()?;
            self.skip_whitespace()?;
            self.expect_right_side(&connective)?;
            conditions.push(self.parse_condition()?);
        }
        Ok(collapse(conditions, PredicateExpr::And))
    }

    fn expect_right_side(&self, connective: &Token) -> Result<(), SyntaxError> {
        match self.current.kind {
            TokenKind::Eof => Err(self.parser.error(
                connective.error_index(),
                format!("Logical operator {} has no right hand side token", connective.text),
            )),
            TokenKind::Logical(_) | TokenKind::Operator(_) => Err(self.parser.error(
                self.current.error_index(),
                format!(
                    "Logical operator {} does not support token {}",
                    connective.text, self.current.text
                ),
            )),
            _ => Ok(()),
        }
    }

    /// `left [operator right]`; a lone value is a truthiness test.
    fn parse_condition(&mut self) -> Result<PredicateExpr, SyntaxError> {
        match self.current.kind {
            TokenKind::Operator(_) => {
                return Err(self.parser.error(
                    self.current.error_index(),
                    format!("Binary operator {} has no left hand side token", self.current.text),
                ));
            }
            TokenKind::Logical(_) => {
                return Err(self.parser.error(
                    self.current.error_index(),
                    format!("Logical operator {} has no left hand side token", self.current.text),
                ));
            }
            _ => {}
        }

        let left = self.parse_value()?;
        self.skip_whitespace()?;

        let TokenKind::Operator(operator) = self.current.kind else {
            return Ok(match left {
                Expr::Boolean(value) => PredicateExpr::Constant(value),
                other => PredicateExpr::Truthy(other),
            });
        };

        let symbol = self.advance()?;
        self.skip_whitespace()?;
        let right = self.parse_right(operator, &symbol)?;

        Ok(PredicateExpr::Comparison(Comparison {
            left,
            operator,
            right,
        }))
    }

    fn parse_right(&mut self, operator: Operator, symbol: &Token) -> Result<Operand, SyntaxError> {
        match self.current.kind {
            TokenKind::Eof | TokenKind::Logical(_) => {
                return Err(self.parser.error(
                    symbol.error_index(),
                    format!("Binary operator {} has no right hand side token", symbol.text),
                ));
            }
            TokenKind::Operator(_) => {
                return Err(self.parser.error(
                    self.current.error_index(),
                    format!(
                        "Binary operator {} does not support token {}",
                        symbol.text, self.current.text
                    ),
                ));
            }
            _ => {}
        }

        let is_text = matches!(self.current.kind, TokenKind::Literal | TokenKind::Quoted { .. });
        let is_static_text =
            is_text && !self.current.text.contains("${") && !self.current.text.contains("$simple{");

        match operator.op {
            BinOp::Is => self.parse_type(symbol),
            BinOp::Range if is_text => self.parse_range(),
            BinOp::Regex if is_static_text => self.parse_pattern(),
            _ => Ok(Operand::Value(self.parse_value()?)),
        }
    }

    fn parse_type(&mut self, symbol: &Token) -> Result<Operand, SyntaxError> {
        if !matches!(self.current.kind, TokenKind::Literal | TokenKind::Quoted { .. }) {
            return Err(self.parser.error(
                self.current.start,
                format!("Binary operator {} does not support token {}", symbol.text, self.current.text),
            ));
        }

        let token = self.advance()?;
        match self.parser.types().resolve(&token.text) {
            Some(handle) => Ok(Operand::Type(handle)),
            None => Err(self
                .parser
                .error(token.start, format!("Class {} not found", token.text))),
        }
    }

    /// `from..to` with both bounds numeric or placeholders.
    fn parse_range(&mut self) -> Result<Operand, SyntaxError> {
        let token = self.advance()?;
        let content_start = content_start(&token);
        let content = token.text.as_str();

        let Some(split) = content.find("..") else {
            let end = content_start + content.chars().count();
            return Err(self.parser.error(
                end,
                format!("Range operator requires a from..to value, got {}", content),
            ));
        };

        let low_text = &content[..split];
        let high_text = &content[split + 2..];
        let high_start = content_start + low_text.chars().count() + 2;

        Ok(Operand::Range {
            low: self.range_bound(low_text, content_start)?,
            high: self.range_bound(high_text, high_start)?,
        })
    }

    fn range_bound(&self, text: &str, start: usize) -> Result<Expr, SyntaxError> {
        if text.contains("${") || text.contains("$simple{") {
            return self.parser.template(start, start + text.chars().count());
        }
        let text = text.trim();
        if text.starts_with('.') || text.ends_with('.') {
            return Err(self
                .parser
                .error(start, format!("Range bound {} has a malformed separator", text)));
        }
        numeric_literal(text).ok_or_else(|| {
            self.parser
                .error(start, format!("Range bound {} is not a number", text))
        })
    }

    fn parse_pattern(&mut self) -> Result<Operand, SyntaxError> {
        let token = self.advance()?;
        Pattern::compile(&token.text)
            .map(Operand::Pattern)
            .map_err(|err| {
                self.parser.error(
                    content_start(&token),
                    format!("Invalid regular expression {}: {}", token.text, err),
                )
            })
    }

    /// A value operand: placeholders and quoted strings, concatenated while
    /// adjacent, or a single bare word.
    fn parse_value(&mut self) -> Result<Expr, SyntaxError> {
        match self.current.kind {
            TokenKind::Literal => {
                let word = self.advance()?;
                return literal_word(&word.text).ok_or_else(|| self.unexpected(&word));
            }
            TokenKind::Placeholder { .. } | TokenKind::Quoted { .. } => {}
            TokenKind::Eof => {
                return Err(self
                    .parser
                    .error(self.current.start, "Expected a value but reached the end"));
            }
            _ => return Err(self.unexpected(&self.current)),
        }

        let mut parts = Vec::new();
        loop {
            match self.current.kind {
                TokenKind::Placeholder { .. } => {
                    let token = self.advance()?;
                    let mut node = self.parser.placeholder(&token)?;
                    if let TokenKind::UnarySuffix(op) = self.current.kind {
                        self.advance()?;
                        node = Expr::Unary {
                            op,
                            operand: Box::new(node),
                        };
                    }
                    parts.push(node);
                }
                TokenKind::Quoted { .. } => {
                    let token = self.advance()?;
                    parts.push(self.parser.template(token.start + 1, token.end() - 1)?);
                }
                _ => break,
            }
        }

        Ok(Expr::concat(parts))
    }
}

fn collapse(mut nodes: Vec<PredicateExpr>, wrap: fn(Vec<PredicateExpr>) -> PredicateExpr) -> PredicateExpr {
    if nodes.len() == 1 {
        nodes.remove(0)
    } else {
        wrap(nodes)
    }
}

/// Offset of the first content character of a bare or quoted token.
fn content_start(token: &Token) -> usize {
    match token.kind {
        TokenKind::Quoted { .. } => token.start + 1,
        _ => token.start,
    }
}

fn numeric_literal(text: &str) -> Option<Expr> {
    if let Ok(n) = text.parse::<i64>() {
        return Some(Expr::Integer(n));
    }
    if !is_numeral(text) {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite()).map(Expr::Float)
}

/// Numbers, booleans and `null`; any other bare word is rejected.
fn literal_word(word: &str) -> Option<Expr> {
    match word {
        "true" => Some(Expr::Boolean(true)),
        "false" => Some(Expr::Boolean(false)),
        "null" => Some(Expr::Null),
        other => numeric_literal(other),
    }
}
