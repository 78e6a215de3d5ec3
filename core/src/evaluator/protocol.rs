//! Results of the fast-path execution entry points.
//!
//! A fast path either produces the narrow result it promises or hands back
//! the value it actually saw. The miss is plain data: the caller uses it once
//! to pick a replacement node and then drops it.

use crate::values::Value;

/// The value that defeated a fast path's assumption.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecializationSignal {
    pub observed: Value,
}

#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Speculation<T> {
    Hit(T),
    Miss(SpecializationSignal),
}

impl<T> Speculation<T> {
    pub fn miss(observed: Value) -> Self {
        Speculation::Miss(SpecializationSignal { observed })
    }
}
