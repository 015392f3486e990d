use crate::ast::{LogicalOp, Operator, UnaryOp};

/// A lexical token with its absolute character offset.
///
/// `text` holds the token's meaningful text: the raw characters for most
/// kinds, the body between the delimiters for a placeholder and the content
/// between the quotes for a quoted string.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Character offset of the first character of the token.
    pub start: usize,
    /// Number of source characters the token spans.
    pub len: usize,
}

impl Token {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Where a parse failure caused by this token is reported: just past an
    /// operator symbol, just past the first character of bare literal text.
    pub fn error_index(&self) -> usize {
        match self.kind {
            TokenKind::Literal if self.len > 0 => self.start + 1,
            _ => self.end(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    /// A run of literal text, or a bare word in a predicate
    ///
    /// # Examples
    /// ```text
    /// Hello World
    /// 123
    /// -0.5
    /// true
    /// ```
    Literal,

    /// A whole placeholder block, found by balanced-delimiter scanning
    ///
    /// `body` is the offset of the first character after the opening marker.
    ///
    /// # Examples
    /// ```text
    /// ${body}
    /// ${header.${body}}
    /// $simple{bodyAs(String)}
    /// ```
    Placeholder { body: usize },

    /// A `}` without a matching opening marker
    PlaceholderClose,

    /// Single or double quoted string
    ///
    /// # Examples
    /// ```text
    /// 'Hello World'
    /// "${header.foo} suffix"
    /// ```
    Quoted { quote: char },

    /// Comparison operator, symbolic or keyword
    ///
    /// # Examples
    /// ```text
    /// ==  !=~  ~~  contains  not in  !range  starts with
    /// ```
    Operator(Operator),

    /// Logical connective
    ///
    /// # Examples
    /// ```text
    /// &&  ||  and  or
    /// ```
    Logical(LogicalOp),

    /// `++` or `--` directly after a placeholder
    UnarySuffix(UnaryOp),

    /// A run of whitespace
    Whitespace,

    // Call syntax inside a placeholder
    /// Left parenthesis opening function arguments
    LParen,

    /// Right parenthesis
    RParen,

    /// Comma separating function arguments
    Comma,

    /// End of input
    Eof,
}
