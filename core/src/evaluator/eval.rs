//! Core evaluation logic.

use tracing::warn;

use crate::api::{Diagnostic, ExecutionOptions, Severity};
use crate::evaluator::{
    Binding, ExecutionError, ExecutionErrorKind, Frame, NativeFunction, ResourceExceeded,
    RuntimeError, Speculation, Unwind,
};
use crate::nodes::builtins::{self, Builtin};
use crate::nodes::operators::{apply_unary, compare_values};
use crate::nodes::{Children, NodeKind, conditional, convert};
use crate::syntax::{Span, Symbol};
use crate::tree::{NodeId, Tree, TreeError};
use crate::values::{Logical, Value};
use crate::watch::RebindWatch;
use crate::{String, ToString, Vec};

pub type Exec<T> = Result<T, Unwind>;

impl From<TreeError> for Unwind {
    fn from(error: TreeError) -> Self {
        Unwind::Error(ExecutionError::new(
            RuntimeError::Internal(error),
            Span::default(),
        ))
    }
}

/// Walks the node tree of one program, rewriting nodes as it goes.
pub struct Evaluator<'a> {
    pub(crate) options: &'a ExecutionOptions,
    pub(crate) tree: &'a mut Tree,
    pub(crate) watch: &'a mut RebindWatch,
    pub(crate) frame: &'a mut Frame,
    pub(crate) warnings: &'a mut Vec<Diagnostic>,
    depth: usize,
}

enum Callee {
    Native(NativeFunction),
    Builtin(Builtin),
}

impl<'a> Evaluator<'a> {
    pub fn new(
        options: &'a ExecutionOptions,
        tree: &'a mut Tree,
        watch: &'a mut RebindWatch,
        frame: &'a mut Frame,
        warnings: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            options,
            tree,
            watch,
            frame,
            warnings,
            depth: 0,
        }
    }

    /// Evaluates `root` as a whole program. A `return` reaching this
    /// boundary becomes the program's value.
    pub fn run(&mut self, root: NodeId) -> Result<Value, ExecutionError> {
        match self.execute(root) {
            Ok(value) | Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Error(error)) => Err(error),
        }
    }

    /// Error for `node`, positioned at the span it was built with.
    pub(crate) fn fail(&self, node: NodeId, kind: impl Into<ExecutionErrorKind>) -> Unwind {
        Unwind::Error(ExecutionError::new(kind, self.span_of(node)))
    }

    pub(crate) fn span_of(&self, node: NodeId) -> Span {
        self.tree
            .resolve(node)
            .and_then(|id| self.tree.span(id).cloned())
            .unwrap_or_default()
    }

    /// Records a non-fatal warning at `node` and carries on.
    pub(crate) fn warn(&mut self, node: NodeId, code: &str, message: String) {
        let span = self.span_of(node);
        warn!(node = %node, start = span.0.start, end = span.0.end, "{}", message);
        self.warnings.push(Diagnostic {
            severity: Severity::Warning,
            message,
            span,
            help: None,
            code: Some(code.to_string()),
        });
    }

    /// Evaluates a node generically.
    pub fn execute(&mut self, node: NodeId) -> Exec<Value> {
        // Check depth before recursing
        if self.depth >= self.options.max_depth {
            return Err(self.fail(
                node,
                ResourceExceeded::StackOverflow {
                    depth: self.depth,
                    max_depth: self.options.max_depth,
                },
            ));
        }

        self.depth += 1;
        let result = self.execute_inner(node);
        self.depth -= 1;

        result
    }

    fn execute_inner(&mut self, node: NodeId) -> Exec<Value> {
        let id = self.tree.resolve(node)?;
        match self.tree.kind(id)?.clone() {
            NodeKind::Constant(value) => Ok(value),
            NodeKind::Read(name) => self.read(id, &name),
            NodeKind::Assign { name, value } => {
                let value = self.execute(value)?;
                self.assign(name, value.clone())?;
                Ok(value)
            }
            NodeKind::Sequence(items) => {
                let mut last = Value::Null;
                for item in items {
                    last = self.execute(item)?;
                }
                Ok(last)
            }
            NodeKind::Unary { op, operand } => {
                let operand = self.execute(operand)?;
                Ok(apply_unary(op, &operand))
            }
            NodeKind::Compare { op, left, right } => {
                let left = self.execute(left)?;
                let right = self.execute(right)?;
                Ok(compare_values(op, &left, &right))
            }
            NodeKind::Call { callee, args } => self.call(id, &callee, &args),
            NodeKind::Convert { .. } => {
                let truth = convert::execute_scalar_logical(self, id)?;
                Ok(Value::Logical(truth))
            }
            NodeKind::If(_) => conditional::execute(self, id),
        }
    }

    // ============================================================================
    // Fast paths
    // ============================================================================

    /// Evaluates `node` expecting a scalar logical (which may be `NA`).
    pub fn execute_scalar_logical(&mut self, node: NodeId) -> Exec<Speculation<Logical>> {
        let id = self.tree.resolve(node)?;
        if let NodeKind::Convert { .. } = self.tree.kind(id)? {
            return convert::execute_scalar_logical(self, id).map(Speculation::Hit);
        }
        Ok(match self.execute(id)? {
            Value::Logical(truth) => Speculation::Hit(truth),
            other => Speculation::miss(other),
        })
    }

    /// Evaluates `node` expecting a scalar `TRUE` or `FALSE`. `NA` misses.
    pub fn execute_scalar_non_na_logical(&mut self, node: NodeId) -> Exec<Speculation<bool>> {
        let id = self.tree.resolve(node)?;
        if let NodeKind::Convert { .. } = self.tree.kind(id)? {
            return convert::execute_scalar_non_na_logical(self, id);
        }
        Ok(match self.execute(id)? {
            Value::Logical(Logical::True) => Speculation::Hit(true),
            Value::Logical(Logical::False) => Speculation::Hit(false),
            other => Speculation::miss(other),
        })
    }

    // ============================================================================
    // Bindings and calls
    // ============================================================================

    fn read(&self, node: NodeId, name: &Symbol) -> Exec<Value> {
        match self.frame.get(name) {
            Some(Binding::Value(value)) => Ok(value.clone()),
            Some(Binding::Function(_)) | None => Err(self.fail(
                node,
                RuntimeError::UndefinedVariable { name: name.clone() },
            )),
        }
    }

    fn assign(&mut self, name: Symbol, value: Value) -> Exec<()> {
        self.frame
            .bind(name, Binding::Value(value), self.tree, self.watch)?;
        Ok(())
    }

    fn call(&mut self, node: NodeId, name: &Symbol, args: &Children) -> Exec<Value> {
        let callee = match self.frame.get(name) {
            Some(Binding::Function(function)) => Callee::Native(function.clone()),
            Some(Binding::Value(_)) => {
                return Err(self.fail(node, RuntimeError::NotAFunction { name: name.clone() }));
            }
            None => match Builtin::lookup(name) {
                Some(builtin) => Callee::Builtin(builtin),
                None => {
                    return Err(self.fail(
                        node,
                        RuntimeError::UndefinedFunction { name: name.clone() },
                    ));
                }
            },
        };

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.execute(*arg)?);
        }

        let result = match callee {
            Callee::Native(function) => function.call(&values),
            Callee::Builtin(Builtin::Return) => {
                let value = builtins::return_value(values).map_err(|e| self.fail(node, e))?;
                return Err(Unwind::Return(value));
            }
            Callee::Builtin(Builtin::Combine) => Ok(builtins::combine(&values)),
            Callee::Builtin(Builtin::Length) => builtins::length(&values),
            Callee::Builtin(Builtin::IsNa) => builtins::is_na(&values),
        };
        result.map_err(|e| self.fail(node, e))
    }
}
