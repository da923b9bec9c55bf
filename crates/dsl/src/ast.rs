//! Expression tree
//!
//! Every parse produces a [`Expr::Compound`] root holding the `;`-separated
//! statements of the source. Trees are immutable once built; evaluation
//! never rewrites them.

use std::fmt;

/// Name of the print wrapper applied to interactive commands.
pub const PRINT: &str = "Print";

/// A parsed expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal: 3, 2.5, 1e-3
    Number(f64),

    /// String literal: "text"
    String(String),

    /// Symbol reference: Iterations, x
    Symbol(String),

    /// List literal: {a, b, c}
    List(Vec<Expr>),

    /// Function application: Head[arg, ...]
    Call { head: String, args: Vec<Expr> },

    /// Prefix operation: -a, !a
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Infix operation: a + b, a == b
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Assignment: name = value, or name := value when delayed
    Assign {
        name: String,
        value: Box<Expr>,
        delayed: bool,
    },

    /// Statement sequence: a; b; c
    Compound(Vec<Expr>),
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Infix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl Expr {
    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    pub fn call(head: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            head: head.into(),
            args,
        }
    }

    /// Top-level statements; a non-compound expression is its own single statement.
    pub fn statements(&self) -> &[Expr] {
        match self {
            Expr::Compound(items) => items,
            other => std::slice::from_ref(other),
        }
    }

    /// First top-level statement, if any.
    pub fn first(&self) -> Option<&Expr> {
        self.statements().first()
    }

    /// Wrap the first statement in `Print[...]`, dropping the rest.
    ///
    /// An empty compound becomes `Print[]`.
    pub fn into_print_first(self) -> Expr {
        let first = match self {
            Expr::Compound(items) => items.into_iter().next(),
            other => Some(other),
        };
        Expr::call(PRINT, first.into_iter().collect())
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", crate::value::format_number(*n)),
            Expr::String(s) => write!(f, "{:?}", s),
            Expr::Symbol(name) => write!(f, "{}", name),
            Expr::List(items) => {
                write!(f, "{{")?;
                write_list(f, items)?;
                write!(f, "}}")
            }
            Expr::Call { head, args } => {
                write!(f, "{}[", head)?;
                write_list(f, args)?;
                write!(f, "]")
            }
            Expr::Unary { op, operand } => write!(f, "{}({})", op.symbol(), operand),
            Expr::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::Assign {
                name,
                value,
                delayed,
            } => {
                let op = if *delayed { ":=" } else { "=" };
                write!(f, "{} {} {}", name, op, value)
            }
            Expr::Compound(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}
