//! Molt - an adaptive, self-rewriting tree interpreter
//!
//! # Overview
//!
//! Programs are lowered once into a tree of nodes. Conditionals start out in
//! their most optimistic form (a typed constant comparison, a condition that
//! is already a clean logical, a `return` that is still the builtin) and
//! rewrite themselves into more general forms the first time an assumption
//! fails, without re-evaluating anything and without changing any result.
//!
//! # Quick Start
//!
//! ```
//! use molt::{Engine, EngineOptions, Value};
//!
//! let mut engine = Engine::new(EngineOptions::default());
//! let program = engine.compile("if (x == 3.0) 1L else 2L").unwrap();
//!
//! engine.set("x", Value::double(2.0)).unwrap();
//! assert_eq!(engine.run(&program).unwrap(), Value::int(2));
//!
//! // A different shape demotes the node; the answer is still right.
//! engine.set("x", Value::int(3)).unwrap();
//! assert_eq!(engine.run(&program).unwrap(), Value::int(1));
//! ```
//!
//! # Host functions
//!
//! ```
//! use molt::{Engine, EngineOptions, NativeFunction, Value};
//!
//! let mut engine = Engine::new(EngineOptions::default());
//! engine
//!     .define_function(NativeFunction::new("answer", |_| Ok(Value::int(42))))
//!     .unwrap();
//! let program = engine.compile("answer()").unwrap();
//! assert_eq!(engine.run(&program).unwrap(), Value::int(42));
//! ```

pub mod error_renderer;

// Re-export public API from molt_core
pub use molt_core::api::{
    CompilationOptions, Diagnostic, Engine, EngineOptions, Error, ExecutionOptions, Program,
    Severity,
};

// Re-export commonly used types and values
pub use molt_core::evaluator::{NativeFn, NativeFunction, RuntimeError};
pub use molt_core::values::{self, Logical, Value};

pub use error_renderer::{
    render_diagnostics_to_string_no_color, render_error, render_error_to, render_error_to_string,
    render_error_to_string_no_color,
};
