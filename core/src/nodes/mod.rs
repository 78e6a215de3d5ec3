//! Executable node kinds.
//!
//! Every variant a node can take is listed here so transitions can be matched
//! exhaustively. Child slots hold [`NodeId`]s into the owning [`Tree`].
//!
//! [`Tree`]: crate::tree::Tree

pub mod builtins;
pub mod compare;
pub mod conditional;
pub mod convert;
pub mod lower;
pub mod operators;

pub use compare::Comparator;

use smallvec::{SmallVec, smallvec};

use crate::syntax::{CompareOp, Symbol, UnaryOp};
use crate::tree::NodeId;
use crate::values::{Rank, Scalar, Value};

pub type Children = SmallVec<[NodeId; 4]>;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Constant(Value),
    Read(Symbol),
    Assign {
        name: Symbol,
        value: NodeId,
    },
    Sequence(Children),
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Compare {
        op: CompareOp,
        left: NodeId,
        right: NodeId,
    },
    Call {
        callee: Symbol,
        args: Children,
    },
    /// Condition conversion step installed above a condition that produced
    /// something other than a clean scalar logical.
    Convert {
        input: NodeId,
        mode: ConvertMode,
    },
    If(Conditional),
}

/// What a [`NodeKind::Convert`] expects its input to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvertMode {
    Logical,
    Integer,
    Double,
    /// Anything; used once a typed mode has seen a mismatch.
    Generic,
}

impl ConvertMode {
    /// The typed mode matching `value`, or `Generic` when there is none.
    pub fn for_value(value: &Value) -> ConvertMode {
        match value.rank() {
            Some(Rank::Logical) => ConvertMode::Logical,
            Some(Rank::Integer) => ConvertMode::Integer,
            Some(Rank::Double) => ConvertMode::Double,
            None => ConvertMode::Generic,
        }
    }

    pub fn accepts(self, value: &Value) -> bool {
        match self {
            ConvertMode::Generic => true,
            mode => ConvertMode::for_value(value) == mode,
        }
    }
}

/// The conditional family.
#[derive(Debug, Clone, PartialEq)]
pub enum Conditional {
    /// Condition read through the scalar-logical fast path; `NA` is fatal.
    Generic {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: NodeId,
    },
    /// No else branch; condition read through the non-`NA` fast path.
    NoElse { cond: NodeId, then_branch: NodeId },
    /// Both branches; condition read through the non-`NA` fast path.
    TwoBranch {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: NodeId,
    },
    /// `if (cond) { body; return(arg) }; rest` while `return` is the builtin.
    ReturnBuiltin {
        cond: NodeId,
        body: Option<NodeId>,
        return_arg: NodeId,
        rest: NodeId,
    },
    /// Same shape once `return` has been rebound: the call is ordinary and
    /// `rest` always runs.
    ReturnOverridden {
        cond: NodeId,
        body: Option<NodeId>,
        return_call: NodeId,
        rest: NodeId,
    },
    /// `if (expr == constant)` before the first value of `expr` is seen.
    /// `cond` is the comparison node; its left child is `expr`.
    Const {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: NodeId,
        constant: Scalar,
    },
    Specialized {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: NodeId,
        comparator: Comparator,
    },
}

impl Conditional {
    pub fn cond(&self) -> NodeId {
        match self {
            Conditional::Generic { cond, .. }
            | Conditional::NoElse { cond, .. }
            | Conditional::TwoBranch { cond, .. }
            | Conditional::ReturnBuiltin { cond, .. }
            | Conditional::ReturnOverridden { cond, .. }
            | Conditional::Const { cond, .. }
            | Conditional::Specialized { cond, .. } => *cond,
        }
    }
}

impl NodeKind {
    /// Current children, in evaluation order.
    pub fn children(&self) -> Children {
        match self {
            NodeKind::Constant(_) | NodeKind::Read(_) => Children::new(),
            NodeKind::Assign { value, .. } => smallvec![*value],
            NodeKind::Sequence(items) => items.clone(),
            NodeKind::Unary { operand, .. } => smallvec![*operand],
            NodeKind::Compare { left, right, .. } => smallvec![*left, *right],
            NodeKind::Call { args, .. } => args.clone(),
            NodeKind::Convert { input, .. } => smallvec![*input],
            NodeKind::If(conditional) => match conditional {
                Conditional::Generic {
                    cond,
                    then_branch,
                    else_branch,
                }
                | Conditional::TwoBranch {
                    cond,
                    then_branch,
                    else_branch,
                }
                | Conditional::Const {
                    cond,
                    then_branch,
                    else_branch,
                    ..
                }
                | Conditional::Specialized {
                    cond,
                    then_branch,
                    else_branch,
                    ..
                } => smallvec![*cond, *then_branch, *else_branch],
                Conditional::NoElse { cond, then_branch } => smallvec![*cond, *then_branch],
                Conditional::ReturnBuiltin {
                    cond,
                    body,
                    return_arg: tail,
                    rest,
                }
                | Conditional::ReturnOverridden {
                    cond,
                    body,
                    return_call: tail,
                    rest,
                } => {
                    let mut children = smallvec![*cond];
                    children.extend(*body);
                    children.push(*tail);
                    children.push(*rest);
                    children
                }
            },
        }
    }

    /// Mutable references to every child slot.
    pub fn child_slots_mut(&mut self) -> SmallVec<[&mut NodeId; 4]> {
        match self {
            NodeKind::Constant(_) | NodeKind::Read(_) => SmallVec::new(),
            NodeKind::Assign { value, .. } => smallvec![value],
            NodeKind::Sequence(items) => items.iter_mut().collect(),
            NodeKind::Unary { operand, .. } => smallvec![operand],
            NodeKind::Compare { left, right, .. } => smallvec![left, right],
            NodeKind::Call { args, .. } => args.iter_mut().collect(),
            NodeKind::Convert { input, .. } => smallvec![input],
            NodeKind::If(conditional) => match conditional {
                Conditional::Generic {
                    cond,
                    then_branch,
                    else_branch,
                }
                | Conditional::TwoBranch {
                    cond,
                    then_branch,
                    else_branch,
                }
                | Conditional::Const {
                    cond,
                    then_branch,
                    else_branch,
                    ..
                }
                | Conditional::Specialized {
                    cond,
                    then_branch,
                    else_branch,
                    ..
                } => smallvec![cond, then_branch, else_branch],
                Conditional::NoElse { cond, then_branch } => smallvec![cond, then_branch],
                Conditional::ReturnBuiltin {
                    cond,
                    body,
                    return_arg: tail,
                    rest,
                }
                | Conditional::ReturnOverridden {
                    cond,
                    body,
                    return_call: tail,
                    rest,
                } => {
                    let mut slots: SmallVec<[&mut NodeId; 4]> = smallvec![cond];
                    if let Some(body) = body {
                        slots.push(body);
                    }
                    slots.push(tail);
                    slots.push(rest);
                    slots
                }
            },
        }
    }

    /// Variant name, for logs and the rewrite log.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Constant(_) => "Constant",
            NodeKind::Read(_) => "Read",
            NodeKind::Assign { .. } => "Assign",
            NodeKind::Sequence(_) => "Sequence",
            NodeKind::Unary { .. } => "Unary",
            NodeKind::Compare { .. } => "Compare",
            NodeKind::Call { .. } => "Call",
            NodeKind::Convert { mode, .. } => match mode {
                ConvertMode::Logical => "ConvertToLogical.Logical",
                ConvertMode::Integer => "ConvertToLogical.Integer",
                ConvertMode::Double => "ConvertToLogical.Double",
                ConvertMode::Generic => "ConvertToLogical.Generic",
            },
            NodeKind::If(conditional) => match conditional {
                Conditional::Generic { .. } => "If",
                Conditional::NoElse { .. } => "IfNoElse",
                Conditional::TwoBranch { .. } => "IfElse",
                Conditional::ReturnBuiltin { .. } => "IfReturnRest.Builtin",
                Conditional::ReturnOverridden { .. } => "IfReturnRest.Overridden",
                Conditional::Const { .. } => "IfConst",
                Conditional::Specialized { .. } => "IfConst.Specialized",
            },
        }
    }
}
