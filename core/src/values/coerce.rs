//! Conversions between logical, integer and double.
//!
//! Up-rank conversions (logical → integer → double) are lossless and keep
//! missingness. Down-rank conversions exist only as the explicit `as_*`
//! operations; nothing in the evaluator applies them implicitly except the
//! condition conversion step, which asks for them by name.

use super::{Logical, NA_INTEGER, NA_REAL, Rank, Scalar, Value};
use ecow::EcoVec;

pub fn logical_to_int(value: Logical) -> i32 {
    match value {
        Logical::False => 0,
        Logical::True => 1,
        Logical::Na => NA_INTEGER,
    }
}

pub fn logical_to_double(value: Logical) -> f64 {
    match value {
        Logical::False => 0.0,
        Logical::True => 1.0,
        Logical::Na => NA_REAL,
    }
}

pub fn int_to_double(value: i32) -> f64 {
    if value == NA_INTEGER {
        NA_REAL
    } else {
        f64::from(value)
    }
}

pub fn int_to_logical(value: i32) -> Logical {
    match value {
        NA_INTEGER => Logical::Na,
        0 => Logical::False,
        _ => Logical::True,
    }
}

pub fn double_to_logical(value: f64) -> Logical {
    if value.is_nan() {
        Logical::Na
    } else {
        Logical::from(value != 0.0)
    }
}

/// Truncates toward zero; out-of-range and NaN become `NA`.
pub fn double_to_int(value: f64) -> i32 {
    if value.is_nan() {
        return NA_INTEGER;
    }
    let truncated = value.trunc();
    // i32::MIN is the NA marker, so it is not a valid target either.
    if truncated <= f64::from(i32::MIN) || truncated > f64::from(i32::MAX) {
        NA_INTEGER
    } else {
        truncated as i32
    }
}

impl Value {
    /// Logical copy. `NULL` becomes an empty logical vector.
    pub fn as_logical(&self) -> Value {
        match self {
            Value::Null => Value::LogicalVec(EcoVec::new()),
            Value::Logical(_) | Value::LogicalVec(_) => self.clone(),
            Value::Int(i) => Value::Logical(int_to_logical(*i)),
            Value::Double(d) => Value::Logical(double_to_logical(*d)),
            Value::IntVec(v) => Value::LogicalVec(v.iter().copied().map(int_to_logical).collect()),
            Value::DoubleVec(v) => {
                Value::LogicalVec(v.iter().copied().map(double_to_logical).collect())
            }
        }
    }

    /// Integer copy. `NULL` becomes an empty integer vector.
    pub fn as_integer(&self) -> Value {
        match self {
            Value::Null => Value::IntVec(EcoVec::new()),
            Value::Int(_) | Value::IntVec(_) => self.clone(),
            Value::Logical(l) => Value::Int(logical_to_int(*l)),
            Value::Double(d) => Value::Int(double_to_int(*d)),
            Value::LogicalVec(v) => Value::IntVec(v.iter().copied().map(logical_to_int).collect()),
            Value::DoubleVec(v) => Value::IntVec(v.iter().copied().map(double_to_int).collect()),
        }
    }

    /// Double copy. `NULL` becomes an empty double vector.
    pub fn as_double(&self) -> Value {
        match self {
            Value::Null => Value::DoubleVec(EcoVec::new()),
            Value::Double(_) | Value::DoubleVec(_) => self.clone(),
            Value::Logical(l) => Value::Double(logical_to_double(*l)),
            Value::Int(i) => Value::Double(int_to_double(*i)),
            Value::LogicalVec(v) => {
                Value::DoubleVec(v.iter().copied().map(logical_to_double).collect())
            }
            Value::IntVec(v) => Value::DoubleVec(v.iter().copied().map(int_to_double).collect()),
        }
    }

    pub fn coerce_to(&self, rank: Rank) -> Value {
        match rank {
            Rank::Logical => self.as_logical(),
            Rank::Integer => self.as_integer(),
            Rank::Double => self.as_double(),
        }
    }
}

/// The rank both operands are brought to before they are compared or combined.
pub fn common_rank(left: Option<Rank>, right: Option<Rank>) -> Option<Rank> {
    match (left, right) {
        (Some(l), Some(r)) => Some(l.max(r)),
        (Some(rank), None) | (None, Some(rank)) => Some(rank),
        (None, None) => None,
    }
}

/// Highest rank among `values`, ignoring `NULL`s.
pub fn highest_rank<'a>(values: impl IntoIterator<Item = &'a Value>) -> Option<Rank> {
    values
        .into_iter()
        .fold(None, |acc, value| common_rank(acc, value.rank()))
}

impl Scalar {
    /// Both operands at their common rank.
    pub fn unify(self, other: Scalar) -> (Scalar, Scalar) {
        let rank = self.rank().max(other.rank());
        (self.coerce_to(rank), other.coerce_to(rank))
    }
}
