//! The compilation and execution engine.

use tracing::debug;

use super::{CompilationOptions, Diagnostic, EngineOptions, Error, ExecutionOptions};
use crate::evaluator::{Binding, Evaluator, Frame, NativeFunction};
use crate::nodes::lower::Lowerer;
use crate::syntax::{Symbol, Syntax};
use crate::tree::{NodeId, RewriteEvent, Tree};
use crate::values::Value;
use crate::watch::RebindWatch;
use crate::{String, ToString, Vec, parser};

/// Owns everything programs share: the node tree, the rebinding watch and
/// the global frame.
///
/// Programs compiled by one engine run against its frame. Binding a builtin
/// name through [`Engine::set`], [`Engine::define_function`] or an
/// assignment in a program notifies every node that assumed the builtin,
/// before the binding call returns.
///
/// # Example
///
/// ```
/// use molt_core::api::{Engine, EngineOptions};
/// use molt_core::Value;
///
/// let mut engine = Engine::new(EngineOptions::default());
/// engine.set("x", Value::double(3.0)).unwrap();
///
/// let program = engine.compile("if (x == 3.0) 1L else 2L").unwrap();
/// assert_eq!(engine.run(&program).unwrap(), Value::int(1));
/// ```
#[derive(Debug, Default)]
pub struct Engine {
    options: EngineOptions,
    tree: Tree,
    watch: RebindWatch,
    globals: Frame,
    warnings: Vec<Diagnostic>,
}

/// A lowered program: a root in its engine's tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    root: NodeId,
    source: String,
}

impl Program {
    /// The root as it was lowered. Resolve it through the tree to find the
    /// current root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            tree: Tree::new(),
            watch: RebindWatch::default(),
            globals: Frame::new(),
            warnings: Vec::new(),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Parses and lowers `source` with the default compilation options.
    pub fn compile(&mut self, source: &str) -> Result<Program, Error> {
        let options = self.options.default_compilation_options.clone();
        self.compile_with(source, &options)
    }

    pub fn compile_with(
        &mut self,
        source: &str,
        options: &CompilationOptions,
    ) -> Result<Program, Error> {
        let syntax = parser::parse(source)?;
        let mut program = self.lower_with(&syntax, options);
        program.source = source.to_string();
        Ok(program)
    }

    /// Lowers an already parsed program with the default options.
    pub fn lower(&mut self, syntax: &Syntax) -> Program {
        let options = self.options.default_compilation_options.clone();
        self.lower_with(syntax, &options)
    }

    fn lower_with(&mut self, syntax: &Syntax, options: &CompilationOptions) -> Program {
        let root = Lowerer::new(&mut self.tree, &mut self.watch, &self.globals, options)
            .lower_program(syntax);
        debug!(root = %root, live = self.tree.live_count(), "program lowered");
        Program {
            root,
            source: String::new(),
        }
    }

    /// Runs `program` with the default execution options.
    pub fn run(&mut self, program: &Program) -> Result<Value, Error> {
        let options = self.options.default_execution_options.clone();
        self.run_with(program, &options)
    }

    pub fn run_with(
        &mut self,
        program: &Program,
        options: &ExecutionOptions,
    ) -> Result<Value, Error> {
        let root = self.tree.resolve(program.root)?;
        let mut evaluator = Evaluator::new(
            options,
            &mut self.tree,
            &mut self.watch,
            &mut self.globals,
            &mut self.warnings,
        );
        Ok(evaluator.run(root)?)
    }

    /// Binds a global value.
    ///
    /// An `Err` means a node could not be rewritten for the rebound name.
    /// The binding has been made regardless.
    pub fn set(&mut self, name: impl Into<Symbol>, value: Value) -> Result<(), Error> {
        self.bind(name.into(), Binding::Value(value))
    }

    /// Binds a host function under its own name.
    pub fn define_function(&mut self, function: NativeFunction) -> Result<(), Error> {
        let name = Symbol::from(function.name());
        self.bind(name, Binding::Function(function))
    }

    fn bind(&mut self, name: Symbol, binding: Binding) -> Result<(), Error> {
        self.globals
            .bind(name, binding, &mut self.tree, &mut self.watch)?;
        Ok(())
    }

    /// Removes a global binding. Returns whether one existed.
    pub fn unset(&mut self, name: &str) -> bool {
        self.globals.unbind(name).is_some()
    }

    /// The current value of a global, if it is bound to a value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.globals.get(name) {
            Some(Binding::Value(value)) => Some(value),
            Some(Binding::Function(_)) | None => None,
        }
    }

    /// Warnings emitted by every run so far, oldest first.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Diagnostic> {
        core::mem::take(&mut self.warnings)
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn watch(&self) -> &RebindWatch {
        &self.watch
    }

    /// Drains the tree's rewrite log, oldest first.
    pub fn take_rewrites(&mut self) -> Vec<RewriteEvent> {
        self.tree.take_rewrites()
    }

    /// Discards `program`'s nodes and the rebinding subscriptions they held.
    pub fn release(&mut self, program: Program) {
        if let Ok(root) = self.tree.resolve(program.root) {
            self.tree.discard(root);
        }
        self.watch.prune(&self.tree);
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.watch.clear();
    }
}
