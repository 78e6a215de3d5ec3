//! The condition conversion step.
//!
//! Reduces whatever a condition produced to one logical element: a single
//! element is taken as is, a longer value is truncated to its first element
//! with a warning, and an empty value is an error. A typed step that sees
//! another type replaces itself with the generic step.

use tracing::debug;

use crate::ToString;
use crate::evaluator::rewrite::{self, Transition, unexpected};
use crate::evaluator::{Evaluator, Exec, RuntimeError, Speculation};
use crate::nodes::NodeKind;
use crate::tree::NodeId;
use crate::values::{Extent, Logical, Value};

pub(crate) const LENGTH_GT_1: &str =
    "the condition has length > 1 and only the first element will be used";

pub(crate) const LENGTH_GT_1_CODE: &str = "W001";

pub(crate) fn execute_scalar_logical(ev: &mut Evaluator<'_>, node: NodeId) -> Exec<Logical> {
    let kind = ev.tree.kind(node)?.clone();
    let NodeKind::Convert { input, .. } = &kind else {
        return Err(ev.fail(node, unexpected(&kind)));
    };
    let input = *input;
    let value = ev.execute(input)?;
    let node = match rewrite::plan(&kind, None, &value) {
        Some(Transition::WidenConversion) => rewrite::widen_conversion(ev.tree, node)?,
        _ => node,
    };
    convert_observed(ev, node, &value)
}

/// As [`execute_scalar_logical`], with `NA` reported as a miss.
pub(crate) fn execute_scalar_non_na_logical(
    ev: &mut Evaluator<'_>,
    node: NodeId,
) -> Exec<Speculation<bool>> {
    Ok(match execute_scalar_logical(ev, node)? {
        Logical::True => Speculation::Hit(true),
        Logical::False => Speculation::Hit(false),
        Logical::Na => Speculation::miss(Value::na()),
    })
}

/// Converts a value the condition already produced, on behalf of the
/// conversion step `node`.
pub(crate) fn convert_observed(
    ev: &mut Evaluator<'_>,
    node: NodeId,
    value: &Value,
) -> Exec<Logical> {
    let (truth, extent) = value
        .single_logical()
        .map_err(|e| ev.fail(node, RuntimeError::from(e)))?;
    if let Extent::Truncated { len } = extent {
        debug!(node = %node, len, "condition truncated to its first element");
        ev.warn(node, LENGTH_GT_1_CODE, LENGTH_GT_1.to_string());
    }
    Ok(truth)
}
