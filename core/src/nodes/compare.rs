//! Typed comparators for `if (expr == constant)`.
//!
//! A comparator is chosen from the first value `expr` produced and the shape
//! of the constant. It only accepts that exact scalar shape afterwards; any
//! other shape is a miss and the conditional falls back to the generic form.

use crate::evaluator::{RuntimeError, Speculation};
use crate::values::coerce::logical_to_int;
use crate::values::{Logical, NA_INTEGER, Scalar, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Comparator {
    /// Scalar double against a constant of any rank, as double.
    DoubleDouble(f64),
    /// Scalar integer against a double constant.
    IntDouble(f64),
    /// Scalar integer against an integer or logical constant, as integer.
    IntInt(i32),
    LogicalLogical(Logical),
    /// Scalar logical against an integer constant; the logical goes up to
    /// integer, never the other way.
    LogicalInt(i32),
}

impl Comparator {
    /// The comparator for `observed == constant`, if one exists for these
    /// shapes. Vectors never get one.
    pub fn for_shapes(observed: &Value, constant: Scalar) -> Option<Comparator> {
        match (observed, constant) {
            (Value::Double(_), constant) => Some(Comparator::DoubleDouble(constant.to_double())),
            (Value::Int(_), Scalar::Double(c)) => Some(Comparator::IntDouble(c)),
            (Value::Int(_), Scalar::Int(c)) => Some(Comparator::IntInt(c)),
            (Value::Int(_), Scalar::Logical(c)) => Some(Comparator::IntInt(logical_to_int(c))),
            (Value::Logical(_), Scalar::Logical(c)) => Some(Comparator::LogicalLogical(c)),
            (Value::Logical(_), Scalar::Int(c)) => Some(Comparator::LogicalInt(c)),
            _ => None,
        }
    }

    /// `Hit(observed == constant)`, a miss when `value` has another shape, or
    /// `UnexpectedNa` when either side is missing.
    pub fn compare(&self, value: &Value) -> Result<Speculation<bool>, RuntimeError> {
        let equal = match (*self, value) {
            (Comparator::DoubleDouble(c), Value::Double(v)) => {
                if c.is_nan() || v.is_nan() {
                    return Err(RuntimeError::UnexpectedNa);
                }
                *v == c
            }
            (Comparator::IntDouble(c), Value::Int(v)) => {
                if c.is_nan() || *v == NA_INTEGER {
                    return Err(RuntimeError::UnexpectedNa);
                }
                f64::from(*v) == c
            }
            (Comparator::IntInt(c), Value::Int(v)) => {
                if c == NA_INTEGER || *v == NA_INTEGER {
                    return Err(RuntimeError::UnexpectedNa);
                }
                *v == c
            }
            (Comparator::LogicalLogical(c), Value::Logical(v)) => {
                if c.is_na() || v.is_na() {
                    return Err(RuntimeError::UnexpectedNa);
                }
                *v == c
            }
            (Comparator::LogicalInt(c), Value::Logical(v)) => {
                if c == NA_INTEGER || v.is_na() {
                    return Err(RuntimeError::UnexpectedNa);
                }
                logical_to_int(*v) == c
            }
            _ => return Ok(Speculation::miss(value.clone())),
        };
        Ok(Speculation::Hit(equal))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Comparator::DoubleDouble(_) => "double-double",
            Comparator::IntDouble(_) => "int-double",
            Comparator::IntInt(_) => "int-int",
            Comparator::LogicalLogical(_) => "logical-logical",
            Comparator::LogicalInt(_) => "logical-int",
        }
    }
}
