use crate::{
    ast::{BinOp, LogicalOp, Operator, Token, TokenKind, UnaryOp},
    error::SyntaxError,
};

/// Opening markers of a placeholder block.
const MARKERS: [&str; 2] = ["${", "$simple{"];

/// Symbolic operators, longest first so that `!=~` wins over `!=`.
const SYMBOLS: [&str; 12] = [
    "!=~", "!~~", "==", "!=", "=~", ">=", "<=", "~~", "&&", "||", ">", "<",
];

/// What the lexer recognizes besides placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexMode {
    /// Expression text: everything outside placeholders is literal
    Template,
    /// Placeholder body: call parentheses, commas and quoted arguments
    Function,
    /// Predicate text: operators, keywords, quotes and bare words
    Predicate,
}

/// Lazily turns a region of the source into tokens.
///
/// The lexer works on the character vector of the whole source and is
/// bounded to `[position, end)`, so nested regions (placeholder bodies,
/// quoted strings) report absolute offsets.
pub struct Lexer<'a> {
    source: &'a str,
    input: &'a [char],
    position: usize,
    end: usize,
    mode: LexMode,
    paren_depth: usize,
    after_placeholder: bool,
    peeked: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, input: &'a [char], mode: LexMode) -> Self {
        Self::slice(source, input, 0, input.len(), mode)
    }

    /// A lexer over `input[start..end]`.
    pub fn slice(source: &'a str, input: &'a [char], start: usize, end: usize, mode: LexMode) -> Self {
        Lexer {
            source,
            input,
            position: start,
            end: end.min(input.len()),
            mode,
            paren_depth: 0,
            after_placeholder: false,
            peeked: None,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.char_at(self.position)
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        if pos < self.end {
            self.input.get(pos).copied()
        } else {
            None
        }
    }

    fn matches_at(&self, pos: usize, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.char_at(pos + i) == Some(c))
    }

    /// Length of the placeholder marker starting at `pos`, if any.
    fn marker_at(&self, pos: usize) -> Option<usize> {
        MARKERS
            .iter()
            .find(|marker| self.matches_at(pos, marker))
            .map(|marker| marker.chars().count())
    }

    fn collect(&self, from: usize, to: usize) -> String {
        self.input[from..to].iter().collect()
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            text: self.collect(start, self.position),
            start,
            len: self.position - start,
        }
    }

    /// Offset reported when the region ends while something is still open.
    fn last_index(&self) -> usize {
        self.end.saturating_sub(1)
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(offset, message, self.source)
    }

    /// Looks at the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<&Token, SyntaxError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.scan()?,
        };
        Ok(&*self.peeked.insert(token))
    }

    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.scan(),
        }
    }

    fn scan(&mut self) -> Result<Token, SyntaxError> {
        let after_placeholder = std::mem::replace(&mut self.after_placeholder, false);
        let start = self.position;

        let Some(ch) = self.current_char() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                start,
                len: 0,
            });
        };

        if after_placeholder && self.mode != LexMode::Function {
            let suffix = self.collect(start, (start + 2).min(self.end));
            if let Some(op) = UnaryOp::from_symbol(&suffix) {
                self.position += 2;
                return Ok(self.token(TokenKind::UnarySuffix(op), start));
            }
        }

        if let Some(marker) = self.marker_at(start) {
            let token = self.read_placeholder(marker)?;
            self.after_placeholder = true;
            return Ok(token);
        }

        match self.mode {
            LexMode::Template => Ok(self.read_literal(start)),
            LexMode::Function => self.scan_function(ch, start),
            LexMode::Predicate => self.scan_predicate(ch, start),
        }
    }

    /// Balanced-delimiter scan of a placeholder block: nested markers raise
    /// the depth, `}` lowers it, and the block ends when it returns to zero.
    fn read_placeholder(&mut self, marker: usize) -> Result<Token, SyntaxError> {
        let start = self.position;
        let body = start + marker;
        let mut depth = 1;
        let mut pos = body;

        while pos < self.end {
            if let Some(nested) = self.marker_at(pos) {
                depth += 1;
                pos += nested;
                continue;
            }
            if self.input[pos] == '}' {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            pos += 1;
        }

        if depth > 0 {
            return Err(self.error(
                self.last_index(),
                "expected symbol '}' to close the placeholder but reached the end",
            ));
        }

        self.position = pos + 1;
        Ok(Token {
            kind: TokenKind::Placeholder { body },
            text: self.collect(body, pos),
            start,
            len: self.position - start,
        })
    }

    /// Quoted text ends at the next matching quote; it does not balance
    /// placeholder delimiters.
    fn read_quoted(&mut self, quote: char) -> Result<Token, SyntaxError> {
        let start = self.position;
        let mut pos = start + 1;

        while let Some(ch) = self.char_at(pos) {
            if ch == quote {
                self.position = pos + 1;
                return Ok(Token {
                    kind: TokenKind::Quoted { quote },
                    text: self.collect(start + 1, pos),
                    start,
                    len: self.position - start,
                });
            }
            pos += 1;
        }

        let which = if quote == '\'' { "single" } else { "double" };
        Err(self.error(
            self.last_index(),
            format!("{} quote has no ending quote", which),
        ))
    }

    fn read_whitespace(&mut self, start: usize) -> Token {
        while self.current_char().is_some_and(char::is_whitespace) {
            self.position += 1;
        }
        self.token(TokenKind::Whitespace, start)
    }

    fn read_literal(&mut self, start: usize) -> Token {
        while self.current_char().is_some() && self.marker_at(self.position).is_none() {
            self.position += 1;
        }
        self.token(TokenKind::Literal, start)
    }

    fn scan_function(&mut self, ch: char, start: usize) -> Result<Token, SyntaxError> {
        match ch {
            c if c.is_whitespace() => Ok(self.read_whitespace(start)),
            '(' => {
                self.position += 1;
                self.paren_depth += 1;
                Ok(self.token(TokenKind::LParen, start))
            }
            ')' => {
                self.position += 1;
                self.paren_depth = self.paren_depth.saturating_sub(1);
                Ok(self.token(TokenKind::RParen, start))
            }
            ',' => {
                self.position += 1;
                Ok(self.token(TokenKind::Comma, start))
            }
            '\'' | '"' if self.paren_depth > 0 => self.read_quoted(ch),
            _ => {
                while let Some(c) = self.current_char() {
                    let quote = (c == '\'' || c == '"') && self.paren_depth > 0;
                    if c.is_whitespace()
                        || matches!(c, '(' | ')' | ',')
                        || quote
                        || self.marker_at(self.position).is_some()
                    {
                        break;
                    }
                    self.position += 1;
                }
                Ok(self.token(TokenKind::Literal, start))
            }
        }
    }

    fn scan_predicate(&mut self, ch: char, start: usize) -> Result<Token, SyntaxError> {
        match ch {
            c if c.is_whitespace() => return Ok(self.read_whitespace(start)),
            '\'' | '"' => return self.read_quoted(ch),
            '}' => {
                self.position += 1;
                return Ok(self.token(TokenKind::PlaceholderClose, start));
            }
            _ => {}
        }

        if let Some(symbol) = SYMBOLS.iter().find(|s| self.matches_at(start, s)) {
            self.position += symbol.len();
            let kind = match *symbol {
                "&&" => TokenKind::Logical(LogicalOp::And),
                "||" => TokenKind::Logical(LogicalOp::Or),
                other => match Operator::from_symbol(other) {
                    Some(operator) => TokenKind::Operator(operator),
                    None => TokenKind::Literal,
                },
            };
            return Ok(self.token(kind, start));
        }

        let word_end = self.word_end(start);
        let word = self.collect(start, word_end);
        self.position = word_end;

        let kind = match word.as_str() {
            "and" => TokenKind::Logical(LogicalOp::And),
            "or" => TokenKind::Logical(LogicalOp::Or),
            "not" => match self.keyword_after(word_end) {
                Some((op, end)) => {
                    self.position = end;
                    TokenKind::Operator(Operator::negated(op))
                }
                None => TokenKind::Literal,
            },
            "starts" | "ends" => match self.with_after(word_end) {
                Some(end) => {
                    self.position = end;
                    TokenKind::Operator(Operator::new(edge_operator(&word)))
                }
                None => TokenKind::Literal,
            },
            other => match other.strip_prefix('!') {
                Some(rest) => BinOp::from_keyword(rest)
                    .map(|op| TokenKind::Operator(Operator::negated(op)))
                    .unwrap_or(TokenKind::Literal),
                None => BinOp::from_keyword(other)
                    .map(|op| TokenKind::Operator(Operator::new(op)))
                    .unwrap_or(TokenKind::Literal),
            },
        };
        Ok(self.token(kind, start))
    }

    /// End of the bare word starting at `pos`.
    fn word_end(&self, pos: usize) -> usize {
        let mut end = pos;
        while let Some(c) = self.char_at(end) {
            if c.is_whitespace() || c == '\'' || c == '"' || self.marker_at(end).is_some() {
                break;
            }
            end += 1;
        }
        end
    }

    fn skip_spaces(&self, mut pos: usize) -> Option<usize> {
        let from = pos;
        while self.char_at(pos).is_some_and(char::is_whitespace) {
            pos += 1;
        }
        (pos > from).then_some(pos)
    }

    /// The keyword operator following `not`, with the offset it ends at.
    fn keyword_after(&self, pos: usize) -> Option<(BinOp, usize)> {
        let word_start = self.skip_spaces(pos)?;
        let word_end = self.word_end(word_start);
        let word = self.collect(word_start, word_end);
        match word.as_str() {
            "starts" | "ends" => self
                .with_after(word_end)
                .map(|end| (edge_operator(&word), end)),
            other => BinOp::from_keyword(other).map(|op| (op, word_end)),
        }
    }

    /// The end of a ` with` following `starts` / `ends`.
    fn with_after(&self, pos: usize) -> Option<usize> {
        let word_start = self.skip_spaces(pos)?;
        let word_end = self.word_end(word_start);
        (self.collect(word_start, word_end) == "with").then_some(word_end)
    }
}

fn edge_operator(word: &str) -> BinOp {
    if word == "starts" {
        BinOp::StartsWith
    } else {
        BinOp::EndsWith
    }
}

/// Tokenizes `text` completely, ending with an `Eof` token.
///
/// # Examples
///
/// ```
/// use simple_lang::ast::TokenKind;
/// use simple_lang::lexer::{tokenize, LexMode};
///
/// let tokens = tokenize("${header.foo} == 'abc'", LexMode::Predicate).unwrap();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert!(matches!(kinds[0], TokenKind::Placeholder { body: 2 }));
/// assert!(matches!(kinds[2], TokenKind::Operator(_)));
/// assert!(matches!(kinds[4], TokenKind::Quoted { quote: '\'' }));
/// assert_eq!(kinds[5], TokenKind::Eof);
/// ```
pub fn tokenize(text: &str, mode: LexMode) -> Result<Vec<Token>, SyntaxError> {
    let chars: Vec<char> = text.chars().collect();
    let mut lexer = Lexer::new(text, &chars, mode);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

#[test]
fn test_keywords() {
    let tokens = tokenize("and or contains in is range", LexMode::Predicate).unwrap();
    let kinds: Vec<TokenKind> = tokens
        .into_iter()
        .map(|t| t.kind)
        .filter(|k| *k != TokenKind::Whitespace)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Logical(LogicalOp::And),
            TokenKind::Logical(LogicalOp::Or),
            TokenKind::Operator(Operator::new(BinOp::Contains)),
            TokenKind::Operator(Operator::new(BinOp::In)),
            TokenKind::Operator(Operator::new(BinOp::Is)),
            TokenKind::Operator(Operator::new(BinOp::Range)),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_placeholder_suffix() {
    let tokens = tokenize("${body}++", LexMode::Template).unwrap();
    assert_eq!(tokens[0].text, "body");
    assert_eq!(tokens[1].kind, TokenKind::UnarySuffix(UnaryOp::Increment));
    assert_eq!(tokens[2].kind, TokenKind::Eof);
}
