use std::fmt;

/// Comparison operators, before negation.
///
/// `!=`, `!=~`, `!~~` and every `not`/`!` prefixed keyword are represented
/// as the positive operator wrapped in an [`Operator`] with `negated` set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Equality
    /// Equal (`==`)
    Equal,
    /// Case-insensitive equal (`=~`)
    EqualIgnoreCase,

    // Ordering
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,

    // Containment
    /// Substring or list membership (`contains`)
    Contains,
    /// Case-insensitive substring (`~~`)
    ContainsIgnoreCase,
    /// Membership in a comma separated list (`in`)
    In,

    /// Full match against a regular expression (`regex`)
    Regex,
    /// Runtime type check (`is`)
    Is,
    /// Inclusive numeric range (`range`)
    Range,

    /// Prefix test (`starts with`, `startsWith`)
    StartsWith,
    /// Suffix test (`ends with`, `endsWith`)
    EndsWith,
}

impl BinOp {
    /// Maps a keyword operator (without any `not`/`!` prefix) to its operator.
    pub fn from_keyword(word: &str) -> Option<BinOp> {
        match word {
            "contains" => Some(BinOp::Contains),
            "in" => Some(BinOp::In),
            "regex" => Some(BinOp::Regex),
            "is" => Some(BinOp::Is),
            "range" => Some(BinOp::Range),
            "startsWith" => Some(BinOp::StartsWith),
            "endsWith" => Some(BinOp::EndsWith),
            _ => None,
        }
    }

    fn is_keyword(self) -> bool {
        !matches!(
            self,
            BinOp::Equal
                | BinOp::EqualIgnoreCase
                | BinOp::GreaterThan
                | BinOp::GreaterEqual
                | BinOp::LessThan
                | BinOp::LessEqual
                | BinOp::ContainsIgnoreCase
        )
    }

    fn symbol(self) -> &'static str {
        match self {
            BinOp::Equal => "==",
            BinOp::EqualIgnoreCase => "=~",
            BinOp::GreaterThan => ">",
            BinOp::GreaterEqual => ">=",
            BinOp::LessThan => "<",
            BinOp::LessEqual => "<=",
            BinOp::Contains => "contains",
            BinOp::ContainsIgnoreCase => "~~",
            BinOp::In => "in",
            BinOp::Regex => "regex",
            BinOp::Is => "is",
            BinOp::Range => "range",
            BinOp::StartsWith => "starts with",
            BinOp::EndsWith => "ends with",
        }
    }
}

/// A comparison operator as written in a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operator {
    pub op: BinOp,
    /// Set by `not`, a `!` prefix, `!=`, `!=~` and `!~~`.
    pub negated: bool,
}

impl Operator {
    pub fn new(op: BinOp) -> Self {
        Operator { op, negated: false }
    }

    pub fn negated(op: BinOp) -> Self {
        Operator { op, negated: true }
    }

    /// Recognizes the symbolic operators.
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        let operator = match symbol {
            "==" => Operator::new(BinOp::Equal),
            "!=" => Operator::negated(BinOp::Equal),
            "=~" => Operator::new(BinOp::EqualIgnoreCase),
            "!=~" => Operator::negated(BinOp::EqualIgnoreCase),
            ">" => Operator::new(BinOp::GreaterThan),
            ">=" => Operator::new(BinOp::GreaterEqual),
            "<" => Operator::new(BinOp::LessThan),
            "<=" => Operator::new(BinOp::LessEqual),
            "~~" => Operator::new(BinOp::ContainsIgnoreCase),
            "!~~" => Operator::negated(BinOp::ContainsIgnoreCase),
            _ => return None,
        };
        Some(operator)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.negated, self.op) {
            (false, op) => write!(f, "{}", op.symbol()),
            (true, BinOp::Equal) => write!(f, "!="),
            (true, op) if op.is_keyword() => write!(f, "not {}", op.symbol()),
            (true, op) => write!(f, "!{}", op.symbol()),
        }
    }
}

/// Logical connectives between comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// `&&` or `and`
    And,
    /// `||` or `or`
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => write!(f, "&&"),
            LogicalOp::Or => write!(f, "||"),
        }
    }
}

/// Suffix operators applied to a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `++`
    Increment,
    /// `--`
    Decrement,
}

impl UnaryOp {
    pub fn from_symbol(symbol: &str) -> Option<UnaryOp> {
        match symbol {
            "++" => Some(UnaryOp::Increment),
            "--" => Some(UnaryOp::Decrement),
            _ => None,
        }
    }
}
