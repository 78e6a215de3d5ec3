//! Self-rewriting tree evaluator.
//!
//! Nodes are evaluated directly from the [`Tree`](crate::tree::Tree). A
//! conditional first tries a fast path that assumes the shape it expects; on
//! a miss it receives the value that was actually produced, rewrites itself
//! into a more general node and continues with that value. Nothing is
//! evaluated twice because of a rewrite.
//!
//! ## Design Principles
//!
//! - **Never panic**: splice failures surface as internal runtime errors
//! - **Stack-safe**: depth tracking reports deep nesting as a resource error
//! - **Transparent**: a rewritten tree gives the same results as the generic one
//!
//! ## Example
//!
//! ```
//! use molt_core::api::{Engine, EngineOptions};
//! use molt_core::Value;
//!
//! let mut engine = Engine::new(EngineOptions::default());
//! let program = engine.compile("x <- 2.0; if (x == 3.0) 1L else 2L").unwrap();
//! assert_eq!(engine.run(&program).unwrap(), Value::int(2));
//! ```

mod error;
mod eval;
mod frame;
mod protocol;
pub mod rewrite;

#[cfg(test)]
mod eval_test;

pub use error::{
    ExecutionError, ExecutionErrorKind, ResourceExceeded, RuntimeError, Unwind,
};
pub use eval::{Evaluator, Exec};
pub use frame::{Binding, Frame, NativeFn, NativeFunction};
pub use protocol::{SpecializationSignal, Speculation};
