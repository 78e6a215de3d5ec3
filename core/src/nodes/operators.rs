//! Generic (unspecialized) operator semantics.

use crate::syntax::{CompareOp, UnaryOp};
use crate::values::coerce::{common_rank, logical_to_int};
use crate::values::{Logical, NA_INTEGER, Scalar, Value};

/// Element-wise comparison at the common rank of both operands.
///
/// The shorter operand is recycled. A missing element on either side gives
/// `NA` in that position. The result is a scalar only when both operands
/// are scalars; an empty or `NULL` operand gives `logical(0)`.
pub fn compare_values(op: CompareOp, left: &Value, right: &Value) -> Value {
    let Some(rank) = common_rank(left.rank(), right.rank()) else {
        return Value::logical_vec([]);
    };
    let (left, right) = (left.coerce_to(rank), right.coerce_to(rank));
    let (llen, rlen) = (left.len(), right.len());
    if llen == 0 || rlen == 0 {
        return Value::logical_vec([]);
    }

    let mut results = (0..llen.max(rlen)).map(|i| {
        match (left.element_at(i % llen), right.element_at(i % rlen)) {
            (Some(l), Some(r)) => compare_scalars(op, l, r),
            _ => Logical::Na,
        }
    });

    if left.is_scalar() && right.is_scalar() {
        Value::Logical(results.next().unwrap_or(Logical::Na))
    } else {
        Value::logical_vec(results)
    }
}

/// Compares two elements of the same rank.
pub fn compare_scalars(op: CompareOp, left: Scalar, right: Scalar) -> Logical {
    if left.is_missing() || right.is_missing() {
        return Logical::Na;
    }
    let ordering = match (left, right) {
        (Scalar::Logical(l), Scalar::Logical(r)) => logical_to_int(l).cmp(&logical_to_int(r)),
        (Scalar::Int(l), Scalar::Int(r)) => l.cmp(&r),
        (l, r) => match l.to_double().partial_cmp(&r.to_double()) {
            Some(ordering) => ordering,
            None => return Logical::Na,
        },
    };
    Logical::from(op.holds(ordering))
}

pub fn apply_unary(op: UnaryOp, operand: &Value) -> Value {
    match op {
        UnaryOp::Not => map_logical(&operand.as_logical(), Logical::not),
        UnaryOp::Neg => negate(operand),
    }
}

fn map_logical(value: &Value, f: impl Fn(Logical) -> Logical) -> Value {
    match value {
        Value::Logical(l) => Value::Logical(f(*l)),
        Value::LogicalVec(v) => Value::LogicalVec(v.iter().copied().map(f).collect()),
        other => other.clone(),
    }
}

fn negate_int(value: i32) -> i32 {
    if value == NA_INTEGER { NA_INTEGER } else { -value }
}

/// Arithmetic negation. Logicals are negated as integers; `NULL` stays `NULL`.
fn negate(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Logical(_) | Value::LogicalVec(_) => negate(&value.as_integer()),
        Value::Int(i) => Value::Int(negate_int(*i)),
        Value::IntVec(v) => Value::IntVec(v.iter().copied().map(negate_int).collect()),
        Value::Double(d) => Value::Double(-d),
        Value::DoubleVec(v) => Value::DoubleVec(v.iter().map(|d| -d).collect()),
    }
}
