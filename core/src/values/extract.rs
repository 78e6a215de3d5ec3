//! The single-value extraction rule used by control constructs.
//!
//! - length 1: that element;
//! - length > 1: the first element, reported as [`Extent::Truncated`] so the
//!   caller can emit a warning;
//! - length 0: [`EmptyExtent`].

use super::{Logical, Scalar, Value};
use thiserror::Error;

/// A zero-length value reached a context that needs exactly one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("argument is of length zero")]
pub struct EmptyExtent;

/// How the extracted element relates to the value it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
    /// The value had exactly one element.
    Single,
    /// The value had `len` > 1 elements; all but the first were dropped.
    Truncated { len: usize },
}

impl Extent {
    pub fn is_truncated(self) -> bool {
        matches!(self, Extent::Truncated { .. })
    }
}

impl Value {
    /// Reduces the value to its one element.
    pub fn single_element(&self) -> Result<(Scalar, Extent), EmptyExtent> {
        let len = self.len();
        let first = self.element_at(0).ok_or(EmptyExtent)?;
        let extent = if len == 1 {
            Extent::Single
        } else {
            Extent::Truncated { len }
        };
        Ok((first, extent))
    }

    /// Converts to logical and reduces to one element.
    pub fn single_logical(&self) -> Result<(Logical, Extent), EmptyExtent> {
        let (scalar, extent) = self.single_element()?;
        Ok((scalar.to_logical(), extent))
    }
}
