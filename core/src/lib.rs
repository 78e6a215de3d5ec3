#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

extern crate alloc;

// Re-export for convenience so other modules don't need alloc:: prefix
#[allow(unused_imports)]
pub(crate) use alloc::{boxed::Box, format, string::String, string::ToString, vec, vec::Vec};

pub mod api;
pub mod evaluator;
pub mod nodes;
pub mod parser;
pub mod syntax;
pub mod tree;
pub mod values;
pub mod watch;

pub use syntax::{Span, Symbol};
pub use values::Value;
