//! Execution of the conditional family.
//!
//! Each variant reads its condition through the narrowest fast path it can
//! rely on. Misses go to [`rewrite::resume`], which replaces the node and
//! finishes the evaluation with the value that was observed.

use crate::evaluator::rewrite::{self, unexpected};
use crate::evaluator::{Evaluator, Exec, RuntimeError, SpecializationSignal, Speculation};
use crate::nodes::operators::compare_values;
use crate::nodes::{Comparator, Conditional, NodeKind};
use crate::syntax::CompareOp;
use crate::tree::NodeId;
use crate::values::{Logical, Value};

pub(crate) fn execute(ev: &mut Evaluator<'_>, node: NodeId) -> Exec<Value> {
    let conditional = match ev.tree.kind(node)? {
        NodeKind::If(conditional) => conditional.clone(),
        other => return Err(ev.fail(node, unexpected(other))),
    };

    match conditional {
        Conditional::Generic { cond, .. } => match ev.execute_scalar_logical(cond)? {
            Speculation::Hit(truth) => take_branch(ev, node, truth),
            Speculation::Miss(signal) => rewrite::resume(ev, node, signal),
        },
        Conditional::NoElse { cond, .. }
        | Conditional::TwoBranch { cond, .. }
        | Conditional::ReturnBuiltin { cond, .. }
        | Conditional::ReturnOverridden { cond, .. } => {
            match ev.execute_scalar_non_na_logical(cond)? {
                Speculation::Hit(truth) => take_branch(ev, node, Logical::from(truth)),
                Speculation::Miss(signal) => rewrite::resume(ev, node, signal),
            }
        }
        Conditional::Const { cond, .. } => {
            // Nothing to compare against until the first value is seen.
            let (_, operand, _) = comparison(ev, cond)?;
            let observed = ev.execute(operand)?;
            rewrite::resume(ev, node, SpecializationSignal { observed })
        }
        Conditional::Specialized {
            cond, comparator, ..
        } => {
            let (_, operand, _) = comparison(ev, cond)?;
            let observed = ev.execute(operand)?;
            compare_specialized(ev, node, comparator, observed)
        }
    }
}

/// Runs the branch selected by `truth`. `NA` is an error for every variant.
/// The condition may have rebound `return` and replaced `node`; the live
/// variant decides.
pub(crate) fn take_branch(ev: &mut Evaluator<'_>, node: NodeId, truth: Logical) -> Exec<Value> {
    let node = ev.tree.resolve(node)?;
    let Some(truth) = truth.to_bool() else {
        return Err(ev.fail(node, RuntimeError::UnexpectedNa));
    };
    let conditional = match ev.tree.kind(node)? {
        NodeKind::If(conditional) => conditional.clone(),
        other => return Err(ev.fail(node, unexpected(other))),
    };

    match conditional {
        Conditional::Generic {
            then_branch,
            else_branch,
            ..
        }
        | Conditional::TwoBranch {
            then_branch,
            else_branch,
            ..
        }
        | Conditional::Const {
            then_branch,
            else_branch,
            ..
        }
        | Conditional::Specialized {
            then_branch,
            else_branch,
            ..
        } => ev.execute(if truth { then_branch } else { else_branch }),
        Conditional::NoElse { then_branch, .. } => {
            if truth {
                ev.execute(then_branch)
            } else {
                Ok(Value::Null)
            }
        }
        Conditional::ReturnBuiltin { body, rest, .. } => {
            if !truth {
                return ev.execute(rest);
            }
            if let Some(body) = body {
                ev.execute(body)?;
            }
            // The body may have rebound `return`.
            let current = ev.tree.resolve(node)?;
            match ev.tree.kind(current)?.clone() {
                NodeKind::If(Conditional::ReturnBuiltin { return_arg, .. }) => {
                    ev.execute(return_arg)
                }
                NodeKind::If(Conditional::ReturnOverridden {
                    return_call, rest, ..
                }) => {
                    ev.execute(return_call)?;
                    ev.execute(rest)
                }
                other => Err(ev.fail(node, unexpected(&other))),
            }
        }
        Conditional::ReturnOverridden {
            body,
            return_call,
            rest,
            ..
        } => {
            if truth {
                if let Some(body) = body {
                    ev.execute(body)?;
                }
                ev.execute(return_call)?;
            }
            ev.execute(rest)
        }
    }
}

/// Compares the first operand through the installed comparator. A shape
/// the comparator does not accept demotes the node.
pub(crate) fn compare_specialized(
    ev: &mut Evaluator<'_>,
    node: NodeId,
    comparator: Comparator,
    observed: Value,
) -> Exec<Value> {
    match comparator.compare(&observed).map_err(|e| ev.fail(node, e))? {
        Speculation::Hit(equal) => take_branch(ev, node, Logical::from(equal)),
        Speculation::Miss(signal) => rewrite::resume(ev, node, signal),
    }
}

/// Completes a comparison whose first operand was already evaluated, then
/// branches on it as the generic conditional `node` would.
pub(crate) fn finish_comparison(
    ev: &mut Evaluator<'_>,
    node: NodeId,
    operand: Value,
) -> Exec<Value> {
    let cond = match ev.tree.kind(node)? {
        NodeKind::If(conditional) => conditional.cond(),
        other => return Err(ev.fail(node, unexpected(other))),
    };
    let (op, _, constant) = comparison(ev, cond)?;
    let constant = ev.execute(constant)?;
    match compare_values(op, &operand, &constant) {
        Value::Logical(truth) => take_branch(ev, node, truth),
        observed => rewrite::resume(ev, node, SpecializationSignal { observed }),
    }
}

/// Operator and operands of the comparison node `cond`.
fn comparison(ev: &Evaluator<'_>, cond: NodeId) -> Exec<(CompareOp, NodeId, NodeId)> {
    let cond = ev.tree.resolve(cond)?;
    match ev.tree.kind(cond)? {
        NodeKind::Compare { op, left, right } => Ok((*op, *left, *right)),
        other => Err(ev.fail(cond, unexpected(other))),
    }
}
