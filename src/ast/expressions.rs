use crate::ast::UnaryOp;

/// Value node of the syntax tree.
///
/// Nodes are immutable once parsed and can be evaluated any number of times
/// against different contexts.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal text, kept exactly as written
    ///
    /// # Example
    /// ```text
    /// Hello World
    /// +++++++++++++
    /// ```
    Literal(String),

    /// Literal integer operand of a predicate
    Integer(i64),

    /// Literal floating point operand of a predicate
    Float(f64),

    /// `true` / `false` operand of a predicate
    Boolean(bool),

    /// The reserved `null` operand: the absent value
    Null,

    /// A placeholder resolved against the evaluation context
    ///
    /// # Examples
    /// ```text
    /// ${header.foo}
    /// ${header.${body}}
    /// ${bodyAs(Integer)}
    /// ```
    Placeholder(Placeholder),

    /// Adjacent literal runs and placeholders, joined as text
    ///
    /// # Example
    /// ```text
    /// Hello ${header.name}!
    /// ```
    Concat(Vec<Expr>),

    /// Increment or decrement of the value of a placeholder
    ///
    /// # Examples
    /// ```text
    /// ${header.counter}++
    /// ${body}--
    /// ```
    Unary { op: UnaryOp, operand: Box<Expr> },
}

impl Expr {
    /// Wraps parts in a `Concat`, collapsing the trivial cases.
    pub fn concat(mut parts: Vec<Expr>) -> Expr {
        match parts.len() {
            0 => Expr::Literal(String::new()),
            1 => parts.remove(0),
            _ => Expr::Concat(parts),
        }
    }

    /// True when the node contains no placeholder.
    pub fn is_static(&self) -> bool {
        match self {
            Expr::Placeholder(_) | Expr::Unary { .. } => false,
            Expr::Concat(parts) => parts.iter().all(Expr::is_static),
            _ => true,
        }
    }
}

/// A `${...}` block.
///
/// `function` is the function name or dotted property path, itself possibly
/// built from nested placeholders. `args` is present when the block is
/// written as a call, `${name(arg, ...)}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub function: Box<Expr>,
    pub args: Option<Vec<Expr>>,
}

impl Placeholder {
    pub fn property(path: &str) -> Self {
        Placeholder {
            function: Box::new(Expr::Literal(path.to_string())),
            args: None,
        }
    }

    pub fn call(name: &str, args: Vec<Expr>) -> Self {
        Placeholder {
            function: Box::new(Expr::Literal(name.to_string())),
            args: Some(args),
        }
    }
}
