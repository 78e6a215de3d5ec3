//! Node transitions.
//!
//! [`plan`] decides, from a node and the value that defeated its fast path,
//! which replacement to install. It is a pure function so the transition
//! table can be tested without running anything. The `install_*` functions
//! perform the splice; [`resume`] installs the planned node and finishes the
//! evaluation with the value already in hand.

use tracing::debug;

use crate::evaluator::{Evaluator, Exec, RuntimeError, SpecializationSignal};
use crate::nodes::{Comparator, Conditional, ConvertMode, NodeKind, conditional, convert};
use crate::syntax::Span;
use crate::tree::{NodeId, Tree, TreeError};
use crate::values::Value;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Install a conversion step of the given mode above the condition.
    WrapCondition(ConvertMode),
    /// The condition already goes through a conversion step; only convert
    /// the observed value.
    ReuseConversion,
    /// Replace a restricted conditional with the generic one.
    Generalize,
    /// Install the typed comparator for the first operand's shape.
    Specialize(Comparator),
    /// Fall back from the constant comparison family to the generic one.
    Demote,
    /// Replace a typed conversion step with the generic conversion.
    WidenConversion,
}

/// The transition for `node` after it observed `observed`. `cond` is the
/// node's current condition, when it has one.
pub fn plan(node: &NodeKind, cond: Option<&NodeKind>, observed: &Value) -> Option<Transition> {
    let wrap_or_reuse = || match cond {
        Some(NodeKind::Convert { .. }) => Transition::ReuseConversion,
        _ => Transition::WrapCondition(ConvertMode::for_value(observed)),
    };
    match node {
        NodeKind::If(conditional) => Some(match conditional {
            Conditional::Generic { .. }
            | Conditional::ReturnBuiltin { .. }
            | Conditional::ReturnOverridden { .. } => wrap_or_reuse(),
            Conditional::NoElse { .. } | Conditional::TwoBranch { .. } => Transition::Generalize,
            Conditional::Const { constant, .. } => Comparator::for_shapes(observed, *constant)
                .map_or(Transition::Demote, Transition::Specialize),
            Conditional::Specialized { .. } => Transition::Demote,
        }),
        NodeKind::Convert { mode, .. } if !mode.accepts(observed) => {
            Some(Transition::WidenConversion)
        }
        _ => None,
    }
}

/// Installs the planned replacement for the conditional `node` and finishes
/// its evaluation with `signal.observed`, so the condition is not evaluated
/// again.
pub(crate) fn resume(
    ev: &mut Evaluator<'_>,
    node: NodeId,
    signal: SpecializationSignal,
) -> Exec<Value> {
    let node = ev.tree.resolve(node)?;
    let kind = ev.tree.kind(node)?.clone();
    let NodeKind::If(current) = &kind else {
        return Err(ev.fail(node, unexpected(&kind)));
    };
    let cond = current.cond();
    let cond_kind = ev.tree.kind(cond)?.clone();
    let observed = signal.observed;
    let Some(transition) = plan(&kind, Some(&cond_kind), &observed) else {
        return Err(ev.fail(node, unexpected(&kind)));
    };
    debug!(node = %node, kind = kind.name(), ?transition, observed = %observed, "speculation missed");

    match transition {
        Transition::WrapCondition(mode) => {
            let convert = install_conversion(ev.tree, node, cond, mode)?;
            let truth = convert::convert_observed(ev, convert, &observed)?;
            conditional::take_branch(ev, node, truth)
        }
        Transition::ReuseConversion => {
            let truth = convert::convert_observed(ev, cond, &observed)?;
            conditional::take_branch(ev, node, truth)
        }
        Transition::Generalize => {
            let convert = match cond_kind {
                NodeKind::Convert { .. } => cond,
                _ => install_conversion(ev.tree, node, cond, ConvertMode::for_value(&observed))?,
            };
            let generic = install_generic(ev.tree, node)?;
            let truth = convert::convert_observed(ev, convert, &observed)?;
            conditional::take_branch(ev, generic, truth)
        }
        Transition::Specialize(comparator) => {
            let specialized = install_specialized(ev.tree, node, comparator)?;
            conditional::compare_specialized(ev, specialized, comparator, observed)
        }
        Transition::Demote => {
            let generic = install_generic(ev.tree, node)?;
            conditional::finish_comparison(ev, generic, observed)
        }
        Transition::WidenConversion => Err(ev.fail(node, unexpected(&kind))),
    }
}

pub(crate) fn unexpected(kind: &NodeKind) -> RuntimeError {
    RuntimeError::UnexpectedNode { found: kind.name() }
}

fn install_conversion(
    tree: &mut Tree,
    node: NodeId,
    cond: NodeId,
    mode: ConvertMode,
) -> Result<NodeId, TreeError> {
    tree.insert_above(
        node,
        cond,
        |input| NodeKind::Convert { input, mode },
        "condition is not a scalar logical",
    )
}

/// Replaces any conditional with the generic one over the same condition and
/// branches. A missing else branch becomes `NULL`.
fn install_generic(tree: &mut Tree, node: NodeId) -> Result<NodeId, TreeError> {
    let span = tree.span(node)?.clone();
    let (cond, then_branch, else_branch, reason) = match tree.kind(node)?.clone() {
        NodeKind::If(Conditional::NoElse { cond, then_branch }) => {
            let null = tree.alloc(NodeKind::Constant(Value::Null), span.clone());
            (cond, then_branch, null, "condition is not a non-NA logical")
        }
        NodeKind::If(Conditional::TwoBranch {
            cond,
            then_branch,
            else_branch,
        }) => (cond, then_branch, else_branch, "condition is not a non-NA logical"),
        NodeKind::If(
            Conditional::Const {
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
            },
        ) => (cond, then_branch, else_branch, "operand shape not supported"),
        _ => return Err(TreeError::Retired(node)),
    };
    let generic = tree.alloc(
        NodeKind::If(Conditional::Generic {
            cond,
            then_branch,
            else_branch,
        }),
        span,
    );
    tree.replace_self(node, generic, reason)
}

fn install_specialized(
    tree: &mut Tree,
    node: NodeId,
    comparator: Comparator,
) -> Result<NodeId, TreeError> {
    let NodeKind::If(Conditional::Const {
        cond,
        then_branch,
        else_branch,
        ..
    }) = tree.kind(node)?.clone()
    else {
        return Err(TreeError::Retired(node));
    };
    let span = tree.span(node)?.clone();
    let specialized = tree.alloc(
        NodeKind::If(Conditional::Specialized {
            cond,
            then_branch,
            else_branch,
            comparator,
        }),
        span,
    );
    tree.replace_self(node, specialized, "first operand observed")
}

/// Replaces a typed conversion step with the generic one.
pub(crate) fn widen_conversion(tree: &mut Tree, node: NodeId) -> Result<NodeId, TreeError> {
    let NodeKind::Convert { input, .. } = tree.kind(node)?.clone() else {
        return Err(TreeError::Retired(node));
    };
    let span = tree.span(node)?.clone();
    let generic = tree.alloc(
        NodeKind::Convert {
            input,
            mode: ConvertMode::Generic,
        },
        span,
    );
    tree.replace_self(node, generic, "condition changed type")
}

/// Rebind handler for a `return`-tail conditional: replaces it with the
/// version that calls `return` like any other function. Does nothing if the
/// node is gone or has already been replaced.
pub(crate) fn override_return(
    tree: &mut Tree,
    owner: NodeId,
    call_span: &Span,
) -> Result<(), TreeError> {
    let node = match tree.resolve(owner) {
        Ok(node) => node,
        Err(TreeError::Retired(_)) => return Ok(()),
        Err(err) => return Err(err),
    };
    let NodeKind::If(Conditional::ReturnBuiltin {
        cond,
        body,
        return_arg,
        rest,
    }) = tree.kind(node)?.clone()
    else {
        return Ok(());
    };
    let span = tree.span(node)?.clone();
    let return_call = tree.alloc(
        NodeKind::Call {
            callee: "return".into(),
            args: smallvec::smallvec![return_arg],
        },
        call_span.clone(),
    );
    let overridden = tree.alloc(
        NodeKind::If(Conditional::ReturnOverridden {
            cond,
            body,
            return_call,
            rest,
        }),
        span,
    );
    tree.replace_self(node, overridden, "return rebound")?;
    Ok(())
}
