//! Configuration options for the engine.

/// Configuration options for lowering a program into nodes.
///
/// Both flags only choose which optimistic variants lowering starts from.
/// Turning them off gives the generic conditionals, which compute the same
/// results.
///
/// # Example
///
/// ```
/// use molt_core::api::CompilationOptions;
///
/// let options = CompilationOptions {
///     specialize_constant_comparisons: false,
///     ..CompilationOptions::default()
/// };
/// assert!(options.recognize_return_tail);
/// ```
#[derive(Debug, Clone)]
pub struct CompilationOptions {
    /// Lower `if (expr == constant)` to the constant-comparison conditional.
    ///
    /// Default: true
    pub specialize_constant_comparisons: bool,

    /// Lower `if (cond) { ...; return(e) }` in the program block to the
    /// `return`-tail conditional.
    ///
    /// Default: true
    pub recognize_return_tail: bool,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            specialize_constant_comparisons: true,
            recognize_return_tail: true,
        }
    }
}

/// Configuration options for program execution.
///
/// # Example
///
/// ```
/// use molt_core::api::ExecutionOptions;
///
/// let options = ExecutionOptions { max_depth: 500 };
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Maximum evaluation depth (for recursion protection).
    ///
    /// Default: 1000
    pub max_depth: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self { max_depth: 1000 }
    }
}

/// Configuration options for the engine.
///
/// These set the defaults for compilation and execution, which can be
/// overridden on a per-call basis.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Default options for compilation.
    ///
    /// These can be overridden when calling `Engine::compile_with()`.
    pub default_compilation_options: CompilationOptions,

    /// Default options for execution.
    ///
    /// These can be overridden when calling `Engine::run_with()`.
    pub default_execution_options: ExecutionOptions,
}
