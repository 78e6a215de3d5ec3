//! Unit tests for the evaluator.

use super::*;
use crate::api::{CompilationOptions, Diagnostic, ExecutionOptions};
use crate::nodes::lower::Lowerer;
use crate::nodes::{Conditional, NodeKind};
use crate::parser;
use crate::tree::{NodeId, Tree};
use crate::values::{Logical, Value};
use crate::watch::RebindWatch;
use crate::{String, Vec};
use pretty_assertions::assert_eq;

struct Runner {
    tree: Tree,
    watch: RebindWatch,
    frame: Frame,
    warnings: Vec<Diagnostic>,
    options: ExecutionOptions,
    compilation: CompilationOptions,
    source: String,
}

impl Runner {
    fn new() -> Self {
        Self {
            tree: Tree::new(),
            watch: RebindWatch::new(),
            frame: Frame::new(),
            warnings: Vec::new(),
            options: ExecutionOptions::default(),
            compilation: CompilationOptions::default(),
            source: String::new(),
        }
    }

    fn compile(&mut self, input: &str) -> NodeId {
        self.source = input.into();
        let parsed = parser::parse(input).expect("parsing failed");
        Lowerer::new(&mut self.tree, &mut self.watch, &self.frame, &self.compilation)
            .lower_program(&parsed)
    }

    fn run(&mut self, root: NodeId) -> Result<Value, ExecutionError> {
        Evaluator::new(
            &self.options,
            &mut self.tree,
            &mut self.watch,
            &mut self.frame,
            &mut self.warnings,
        )
        .run(root)
    }

    fn eval(&mut self, input: &str) -> Result<Value, ExecutionError> {
        let root = self.compile(input);
        self.run(root)
    }

    fn set(&mut self, name: &str, value: Value) {
        self.frame
            .bind(name.into(), Binding::Value(value), &mut self.tree, &mut self.watch)
            .unwrap();
    }

    fn set_function(&mut self, function: NativeFunction) {
        let name = function.name().into();
        self.frame
            .bind(name, Binding::Function(function), &mut self.tree, &mut self.watch)
            .unwrap();
    }

    /// The current node of top-level statement `index`.
    fn statement(&self, root: NodeId, index: usize) -> NodeId {
        match self.tree.kind(root).unwrap() {
            NodeKind::Sequence(items) => items[index],
            other => panic!("root is {}", other.name()),
        }
    }

    fn kind_name(&self, id: NodeId) -> &'static str {
        self.tree.kind(id).unwrap().name()
    }

    fn cond_of(&self, id: NodeId) -> NodeId {
        match self.tree.kind(id).unwrap() {
            NodeKind::If(conditional) => conditional.cond(),
            other => panic!("{} is not a conditional", other.name()),
        }
    }

    fn runtime_error(&mut self, input: &str) -> (RuntimeError, String) {
        let err = self.eval(input).expect_err("evaluation should fail");
        let text = err.span.str_of(&self.source).into();
        match err.kind {
            ExecutionErrorKind::Runtime(runtime) => (runtime, text),
            other => panic!("expected a runtime error, got {other}"),
        }
    }
}

// ============================================================================
// Plain nodes
// ============================================================================

#[test]
fn test_sequence_and_assignment() {
    let mut runner = Runner::new();
    assert_eq!(runner.eval("x <- 2L; y <- x; y").unwrap(), Value::int(2));
    assert_eq!(runner.eval("").unwrap(), Value::Null);
    assert_eq!(runner.eval("{ }").unwrap(), Value::Null);
}

#[test]
fn test_comparisons_and_unary() {
    let mut runner = Runner::new();
    assert_eq!(runner.eval("1L < 2.5").unwrap(), Value::logical(true));
    assert_eq!(runner.eval("!(1L == 1L)").unwrap(), Value::logical(false));
    assert_eq!(runner.eval("-TRUE").unwrap(), Value::int(-1));
    assert_eq!(
        runner.eval("c(1L, 2L) == 2L").unwrap(),
        Value::logical_vec([Logical::False, Logical::True])
    );
}

#[test]
fn test_builtins() {
    let mut runner = Runner::new();
    assert_eq!(runner.eval("length(c(1, 2, 3))").unwrap(), Value::int(3));
    assert_eq!(runner.eval("is.na(NA)").unwrap(), Value::logical(true));
    assert_eq!(runner.eval("c(TRUE, 2L)").unwrap(), Value::int_vec([1, 2]));
}

#[test]
fn test_undefined_names() {
    let mut runner = Runner::new();
    assert_eq!(
        runner.runtime_error("1L; missing"),
        (
            RuntimeError::UndefinedVariable {
                name: "missing".into()
            },
            "missing".into()
        )
    );
    assert_eq!(
        runner.runtime_error("nope(1)").0,
        RuntimeError::UndefinedFunction {
            name: "nope".into()
        }
    );
    runner.set("f", Value::int(1));
    assert_eq!(
        runner.runtime_error("f(1)").0,
        RuntimeError::NotAFunction { name: "f".into() }
    );
}

#[test]
fn test_native_functions_shadow_builtins() {
    let mut runner = Runner::new();
    runner.set_function(NativeFunction::new("length", |_| Ok(Value::int(99))));
    assert_eq!(runner.eval("length(1)").unwrap(), Value::int(99));

    runner.set_function(NativeFunction::new("fail", |_| {
        Err(RuntimeError::NativeCall {
            function: "fail".into(),
            message: "boom".into(),
        })
    }));
    let (err, text) = runner.runtime_error("fail()");
    assert!(matches!(err, RuntimeError::NativeCall { .. }));
    assert_eq!(text, "fail()");
}

#[test]
fn test_return_outside_a_conditional_stops_the_program() {
    let mut runner = Runner::new();
    assert_eq!(runner.eval("return(5L); 6L").unwrap(), Value::int(5));
    assert_eq!(runner.eval("x <- { return(1L); 2L }; 3L").unwrap(), Value::int(1));
    assert!(matches!(
        runner.runtime_error("return(1, 2)").0,
        RuntimeError::InvalidArgument { .. }
    ));
}

#[test]
fn test_stack_overflow() {
    let mut runner = Runner::new();
    runner.options.max_depth = 4;
    let err = runner.eval("{{{{{ 1 }}}}}").unwrap_err();
    assert!(matches!(
        err.kind,
        ExecutionErrorKind::ResourceExceeded(ResourceExceeded::StackOverflow { max_depth: 4, .. })
    ));
    runner.options.max_depth = 100;
    assert_eq!(runner.eval("{{{{{ 1 }}}}}").unwrap(), Value::double(1.0));
}

// ============================================================================
// Conditionals
// ============================================================================

#[test]
fn test_constant_comparison_specializes_then_demotes() {
    crate::test_utils::init_test_logging();
    let mut runner = Runner::new();
    let root = runner.compile("if (x == 3.0) 1L else 2L");
    let node = runner.statement(root, 0);
    assert_eq!(runner.kind_name(node), "IfConst");

    runner.set("x", Value::double(2.0));
    assert_eq!(runner.run(root).unwrap(), Value::int(2));
    let node = runner.statement(root, 0);
    assert_eq!(runner.kind_name(node), "IfConst.Specialized");

    runner.set("x", Value::double(3.0));
    assert_eq!(runner.run(root).unwrap(), Value::int(1));
    assert_eq!(runner.tree.generation(), 1);

    runner.set("x", Value::int(3));
    assert_eq!(runner.run(root).unwrap(), Value::int(1));
    let node = runner.statement(root, 0);
    assert_eq!(runner.kind_name(node), "If");
    assert_eq!(runner.kind_name(runner.cond_of(node)), "Compare");

    runner.set("x", Value::int(4));
    assert_eq!(runner.run(root).unwrap(), Value::int(2));
    assert!(runner.tree.dangling_links().is_empty());
}

#[test]
fn test_constant_comparison_with_unsupported_first_shape() {
    let mut runner = Runner::new();
    let root = runner.compile("if (x == 1L) 1L else 2L");
    runner.set("x", Value::double_vec([1.0]));
    assert_eq!(runner.run(root).unwrap(), Value::int(1));
    assert_eq!(runner.warnings.len(), 0);
    let node = runner.statement(root, 0);
    assert_eq!(runner.kind_name(node), "If");
    // The vector comparison result goes through a conversion step.
    assert_eq!(runner.kind_name(runner.cond_of(node)), "ConvertToLogical.Logical");
}

#[test]
fn test_constant_comparison_missing_values_fail() {
    let mut runner = Runner::new();
    runner.set("x", Value::na());
    let (err, text) = runner.runtime_error("if (x == TRUE) 1L else 2L");
    assert_eq!(err, RuntimeError::UnexpectedNa);
    assert_eq!(text, "if (x == TRUE) 1L else 2L");

    runner.set("x", Value::int(1));
    assert_eq!(
        runner.runtime_error("if (x == NA) 1L else 2L").0,
        RuntimeError::UnexpectedNa
    );
}

#[test]
fn test_generalize_no_else() {
    let mut runner = Runner::new();
    let root = runner.compile("if (x) 1L");

    runner.set("x", Value::logical(false));
    assert_eq!(runner.run(root).unwrap(), Value::Null);
    let node = runner.statement(root, 0);
    assert_eq!(runner.kind_name(node), "IfNoElse");

    runner.set("x", Value::int(2));
    assert_eq!(runner.run(root).unwrap(), Value::int(1));
    let node = runner.statement(root, 0);
    assert_eq!(runner.kind_name(node), "If");
    assert_eq!(runner.kind_name(runner.cond_of(node)), "ConvertToLogical.Integer");

    runner.set("x", Value::int(0));
    assert_eq!(runner.run(root).unwrap(), Value::Null);
    assert!(runner.tree.dangling_links().is_empty());
}

#[test]
fn test_two_branch_na_fails_after_generalizing() {
    let mut runner = Runner::new();
    let root = runner.compile("if (x) 1L else 2L");
    runner.set("x", Value::na());
    let err = runner.run(root).unwrap_err();
    assert_eq!(err.kind, ExecutionErrorKind::Runtime(RuntimeError::UnexpectedNa));
    assert_eq!(runner.kind_name(runner.statement(root, 0)), "If");

    runner.set("x", Value::logical(true));
    assert_eq!(runner.run(root).unwrap(), Value::int(1));
}

#[test]
fn test_conversion_widens_on_type_change() {
    let mut runner = Runner::new();
    let root = runner.compile("if (x) 1L else 2L");
    runner.set("x", Value::int(1));
    assert_eq!(runner.run(root).unwrap(), Value::int(1));

    runner.set("x", Value::double(0.0));
    assert_eq!(runner.run(root).unwrap(), Value::int(2));
    let node = runner.statement(root, 0);
    assert_eq!(runner.kind_name(runner.cond_of(node)), "ConvertToLogical.Generic");

    let reasons: Vec<_> = runner.tree.rewrites().iter().map(|e| e.to_kind).collect();
    assert_eq!(
        reasons,
        ["ConvertToLogical.Integer", "If", "ConvertToLogical.Generic"]
    );
}

#[test]
fn test_long_condition_warns_each_time() {
    let mut runner = Runner::new();
    let root = runner.compile("if (c(TRUE, FALSE)) 1L else 2L");
    assert_eq!(runner.run(root).unwrap(), Value::int(1));
    assert_eq!(runner.run(root).unwrap(), Value::int(1));
    assert_eq!(runner.warnings.len(), 2);
    let warning = &runner.warnings[0];
    assert_eq!(warning.code.as_deref(), Some("W001"));
    assert_eq!(warning.span.str_of(&runner.source), "c(TRUE, FALSE)");
}

#[test]
fn test_empty_condition_fails() {
    let mut runner = Runner::new();
    let (err, text) = runner.runtime_error("if (c()) 1L");
    assert_eq!(err, RuntimeError::EmptyExtent);
    assert_eq!(text, "c()");

    runner.set("x", Value::int_vec([]));
    assert_eq!(
        runner.runtime_error("if (x) 1L else 2L").0,
        RuntimeError::EmptyExtent
    );
    assert!(runner.warnings.is_empty());
}

#[test]
fn test_condition_is_evaluated_once_per_run() {
    let mut runner = Runner::new();
    let calls = alloc::rc::Rc::new(core::cell::Cell::new(0));
    let counter = calls.clone();
    runner.set_function(NativeFunction::new("tick", move |_| {
        counter.set(counter.get() + 1);
        Ok(Value::double(3.0))
    }));

    // Every run below triggers a rewrite on first use.
    runner.eval("if (tick()) 1L").unwrap();
    runner.eval("if (tick() == 3L) 1L").unwrap();
    runner.eval("if (tick() == TRUE) 1L").unwrap();
    assert_eq!(calls.get(), 3);
}

// ============================================================================
// Return-tail conditionals
// ============================================================================

#[test]
fn test_return_tail_short_circuits_rest() {
    let mut runner = Runner::new();
    let root = runner.compile("y <- 0L\nif (x) { y <- 1L; return(y) }\ny <- 2L\ny");

    runner.set("x", Value::logical(true));
    assert_eq!(runner.run(root).unwrap(), Value::int(1));
    runner.set("x", Value::logical(false));
    assert_eq!(runner.run(root).unwrap(), Value::int(2));

    runner.set("x", Value::na());
    assert_eq!(
        runner.run(root).unwrap_err().kind,
        ExecutionErrorKind::Runtime(RuntimeError::UnexpectedNa)
    );
    let node = runner.statement(root, 1);
    assert_eq!(runner.kind_name(node), "IfReturnRest.Builtin");
    assert_eq!(runner.kind_name(runner.cond_of(node)), "ConvertToLogical.Logical");
}

#[test]
fn test_rebinding_return_demotes() {
    crate::test_utils::init_test_logging();
    let mut runner = Runner::new();
    let root = runner.compile("if (x) return(1L)\n2L");
    runner.set("x", Value::logical(true));
    assert_eq!(runner.run(root).unwrap(), Value::int(1));
    assert_eq!(runner.watch.subscriber_count("return"), 1);

    let seen = alloc::rc::Rc::new(core::cell::RefCell::new(Vec::new()));
    let log = seen.clone();
    runner.set_function(NativeFunction::new("return", move |args| {
        log.borrow_mut().push(args[0].clone());
        Ok(Value::Null)
    }));
    assert_eq!(runner.watch.subscriber_count("return"), 0);
    let node = runner.statement(root, 0);
    assert_eq!(runner.kind_name(node), "IfReturnRest.Overridden");

    // The body runs, then `rest` is always reached.
    assert_eq!(runner.run(root).unwrap(), Value::int(2));
    assert_eq!(*seen.borrow(), [Value::int(1)]);
    assert!(runner.tree.dangling_links().is_empty());
}

#[test]
fn test_rebinding_return_inside_the_body() {
    let mut runner = Runner::new();
    let root = runner.compile("if (TRUE) { return <- 5L; return(1L) }\n2L");
    let err = runner.run(root).unwrap_err();
    assert_eq!(
        err.kind,
        ExecutionErrorKind::Runtime(RuntimeError::NotAFunction {
            name: "return".into()
        })
    );
    assert_eq!(err.span.str_of(&runner.source), "return(1L)");
}

#[test]
fn test_rebinding_return_inside_the_condition() {
    // Logical condition: the fast path hits, then the branch is taken on the
    // replacement node.
    let mut runner = Runner::new();
    let root = runner.compile("if ({ return <- 5L; FALSE }) { return(1L) }\n2L");
    assert_eq!(runner.run(root).unwrap(), Value::int(2));
    let node = runner.statement(root, 0);
    assert_eq!(runner.kind_name(node), "IfReturnRest.Overridden");

    // Integer condition: the fast path misses and the conversion is
    // installed on the replacement node.
    let mut runner = Runner::new();
    let root = runner.compile("if ({ return <- 5L; 0L }) { return(1L) }\n2L");
    assert_eq!(runner.run(root).unwrap(), Value::int(2));
    let node = runner.statement(root, 0);
    assert_eq!(runner.kind_name(node), "IfReturnRest.Overridden");
    assert_eq!(
        runner.kind_name(runner.cond_of(node)),
        "ConvertToLogical.Integer"
    );
    assert!(runner.tree.dangling_links().is_empty());

    // A true condition now calls the rebound name.
    let mut runner = Runner::new();
    let (err, text) = runner.runtime_error("if ({ return <- 5L; TRUE }) { return(1L) }\n2L");
    assert_eq!(
        err,
        RuntimeError::NotAFunction {
            name: "return".into()
        }
    );
    assert_eq!(text, "return(1L)");
}

#[test]
fn test_unbinding_return_restores_builtin_behavior() {
    let mut runner = Runner::new();
    let root = runner.compile("if (TRUE) return(1L)\n2L");
    runner.set_function(NativeFunction::new("return", |_| Ok(Value::Null)));
    assert_eq!(runner.run(root).unwrap(), Value::int(2));

    runner.frame.unbind("return");
    // The node stays overridden; the ordinary call reaches the builtin.
    assert_eq!(runner.run(root).unwrap(), Value::int(1));
    assert_eq!(
        runner.kind_name(runner.statement(root, 0)),
        "IfReturnRest.Overridden"
    );
}

#[test]
fn test_nested_conditionals_rewrite_independently() {
    let mut runner = Runner::new();
    let root = runner.compile("if (a) { if (b == 1L) 1L else 2L } else 3L");
    runner.set("a", Value::int(1));
    runner.set("b", Value::int(1));
    assert_eq!(runner.run(root).unwrap(), Value::int(1));
    runner.set("b", Value::double(2.0));
    assert_eq!(runner.run(root).unwrap(), Value::int(2));

    let NodeKind::If(Conditional::Generic { then_branch, .. }) =
        runner.tree.kind(runner.statement(root, 0)).unwrap().clone()
    else {
        panic!("outer conditional was not generalized");
    };
    let NodeKind::Sequence(inner) = runner.tree.kind(then_branch).unwrap() else {
        panic!("then branch is not a block");
    };
    assert_eq!(runner.kind_name(inner[0]), "If");
}
