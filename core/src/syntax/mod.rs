//! The plain syntax tree handed over by the front end.
//!
//! Nothing here is executable; [`crate::nodes::lower`] turns it into the
//! self-rewriting node tree once.

use crate::{Box, Vec};
use core::ops::Range;

use crate::values::{Logical, Scalar, Value};

/// Interned-ish symbol name. Cheap to clone.
pub type Symbol = ecow::EcoString;

/// Byte range in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Span(pub Range<usize>);

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self(start..end)
    }
    pub fn combine(a: &Span, b: &Span) -> Span {
        Span::new(a.0.start, b.0.end)
    }
    pub fn str_of<'a>(&self, source: &'a str) -> &'a str {
        &source[self.0.start..self.0.end]
    }
}

impl From<pest::Span<'_>> for Span {
    fn from(s: pest::Span<'_>) -> Self {
        Self(s.start()..s.end())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Syntax {
    pub kind: SyntaxKind,
    pub span: Span,
}

impl Syntax {
    pub fn new(kind: SyntaxKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The callee and arguments if this is a call to `name`.
    pub fn as_call_to(&self, name: &str) -> Option<&[Syntax]> {
        match &self.kind {
            SyntaxKind::Call { callee, args } if callee == name => Some(args),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxKind {
    Literal(Literal),
    Ident(Symbol),
    Unary {
        op: UnaryOp,
        operand: Box<Syntax>,
    },
    Compare {
        op: CompareOp,
        left: Box<Syntax>,
        right: Box<Syntax>,
    },
    Call {
        callee: Symbol,
        args: Vec<Syntax>,
    },
    Assign {
        name: Symbol,
        value: Box<Syntax>,
    },
    If {
        cond: Box<Syntax>,
        then_branch: Box<Syntax>,
        else_branch: Option<Box<Syntax>>,
    },
    Block(Vec<Syntax>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Null,
    Logical(Logical),
    Int(i32),
    Double(f64),
}

impl Literal {
    pub fn to_value(self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Logical(l) => Value::Logical(l),
            Literal::Int(i) => Value::Int(i),
            Literal::Double(d) => Value::Double(d),
        }
    }

    /// `None` for `NULL`.
    pub fn to_scalar(self) -> Option<Scalar> {
        match self {
            Literal::Null => None,
            Literal::Logical(l) => Some(Scalar::Logical(l)),
            Literal::Int(i) => Some(Scalar::Int(i)),
            Literal::Double(d) => Some(Scalar::Double(d)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn holds(self, ordering: core::cmp::Ordering) -> bool {
        use core::cmp::Ordering::*;
        match self {
            CompareOp::Eq => ordering == Equal,
            CompareOp::Neq => ordering != Equal,
            CompareOp::Lt => ordering == Less,
            CompareOp::Le => ordering != Greater,
            CompareOp::Gt => ordering == Greater,
            CompareOp::Ge => ordering != Less,
        }
    }
}
