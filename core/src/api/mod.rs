//! Public API for compiling and running programs.
//!
//! # Example
//!
//! ```
//! use molt_core::api::{Engine, EngineOptions};
//! use molt_core::evaluator::NativeFunction;
//! use molt_core::Value;
//!
//! let mut engine = Engine::new(EngineOptions::default());
//! engine
//!     .define_function(NativeFunction::new("first", |args| {
//!         Ok(args.first().cloned().unwrap_or(Value::Null))
//!     }))
//!     .unwrap();
//!
//! let program = engine.compile("y <- first(2L)\nif (y == 2L) TRUE else FALSE").unwrap();
//! assert_eq!(engine.run(&program).unwrap(), Value::logical(true));
//! ```

pub mod engine;
pub mod error;
pub mod options;

pub use engine::{Engine, Program};
pub use error::{Diagnostic, Error, Severity};
pub use options::{CompilationOptions, EngineOptions, ExecutionOptions};
