//! Lowering from [`Syntax`] to executable nodes.
//!
//! Lowering picks the initial, most optimistic variant for every `if`:
//!
//! - `if (expr == constant)` becomes the constant-comparison conditional;
//! - `if (cond) { ...; return(e) }` followed by more statements in the
//!   program's own block becomes the `return`-tail conditional, which
//!   subscribes to rebinding of `return`;
//! - anything else becomes the one- or two-branch conditional.

use smallvec::smallvec;

use crate::api::CompilationOptions;
use crate::evaluator::Frame;
use crate::evaluator::rewrite::override_return;
use crate::nodes::operators::apply_unary;
use crate::nodes::{Children, Conditional, NodeKind};
use crate::syntax::{CompareOp, Span, Syntax, SyntaxKind, UnaryOp};
use crate::tree::{NodeId, Tree};
use crate::values::{Scalar, Value};
use crate::watch::RebindWatch;

pub struct Lowerer<'a> {
    tree: &'a mut Tree,
    watch: &'a mut RebindWatch,
    frame: &'a Frame,
    options: &'a CompilationOptions,
}

/// The pieces of `if (cond) { body; return(arg) }`.
struct ReturnTail<'s> {
    cond: &'s Syntax,
    body: &'s [Syntax],
    arg: &'s Syntax,
    call_span: Span,
}

impl<'s> ReturnTail<'s> {
    fn match_syntax(syntax: &'s Syntax) -> Option<Self> {
        let SyntaxKind::If {
            cond,
            then_branch,
            else_branch: None,
        } = &syntax.kind
        else {
            return None;
        };
        let (call, body) = match &then_branch.kind {
            SyntaxKind::Block(items) => items.split_last()?,
            _ => (then_branch.as_ref(), &[][..]),
        };
        let [arg] = call.as_call_to("return")? else {
            return None;
        };
        Some(ReturnTail {
            cond: cond.as_ref(),
            body,
            arg,
            call_span: call.span.clone(),
        })
    }
}

impl<'a> Lowerer<'a> {
    pub fn new(
        tree: &'a mut Tree,
        watch: &'a mut RebindWatch,
        frame: &'a Frame,
        options: &'a CompilationOptions,
    ) -> Self {
        Self {
            tree,
            watch,
            frame,
            options,
        }
    }

    /// Lowers a whole program and returns its root.
    pub fn lower_program(&mut self, program: &Syntax) -> NodeId {
        match &program.kind {
            SyntaxKind::Block(items) => self.lower_statements(items, &program.span, true),
            _ => self.lower(program),
        }
    }

    fn lower(&mut self, syntax: &Syntax) -> NodeId {
        let span = syntax.span.clone();
        let kind = match &syntax.kind {
            SyntaxKind::Literal(literal) => NodeKind::Constant(literal.to_value()),
            SyntaxKind::Ident(name) => NodeKind::Read(name.clone()),
            SyntaxKind::Unary { op, operand } => NodeKind::Unary {
                op: *op,
                operand: self.lower(operand),
            },
            SyntaxKind::Compare { op, left, right } => NodeKind::Compare {
                op: *op,
                left: self.lower(left),
                right: self.lower(right),
            },
            SyntaxKind::Call { callee, args } => NodeKind::Call {
                callee: callee.clone(),
                args: args.iter().map(|arg| self.lower(arg)).collect(),
            },
            SyntaxKind::Assign { name, value } => NodeKind::Assign {
                name: name.clone(),
                value: self.lower(value),
            },
            SyntaxKind::If {
                cond,
                then_branch,
                else_branch,
            } => return self.lower_if(cond, then_branch, else_branch.as_deref(), span),
            SyntaxKind::Block(items) => return self.lower_statements(items, &span, false),
        };
        self.tree.alloc(kind, span)
    }

    /// Lowers a statement list. In the program's block (`tail`), an
    /// `if` ending in `return(...)` takes the remaining statements as its
    /// `rest`.
    fn lower_statements(&mut self, items: &[Syntax], span: &Span, tail: bool) -> NodeId {
        let mut lowered = Children::new();
        for (index, item) in items.iter().enumerate() {
            if tail && self.options.recognize_return_tail {
                if let Some(shape) = ReturnTail::match_syntax(item) {
                    let rest = &items[index + 1..];
                    let rest_span = match (rest.first(), rest.last()) {
                        (Some(first), Some(last)) => Span::combine(&first.span, &last.span),
                        _ => Span::new(item.span.0.end, item.span.0.end),
                    };
                    let rest = self.lower_statements(rest, &rest_span, true);
                    lowered.push(self.lower_return_tail(item, shape, rest));
                    break;
                }
            }
            lowered.push(self.lower(item));
        }
        self.tree.alloc(NodeKind::Sequence(lowered), span.clone())
    }

    fn lower_return_tail(&mut self, item: &Syntax, shape: ReturnTail<'_>, rest: NodeId) -> NodeId {
        let cond = self.lower(shape.cond);
        let body = match (shape.body.first(), shape.body.last()) {
            (Some(first), Some(last)) => {
                let span = Span::combine(&first.span, &last.span);
                Some(self.lower_statements(shape.body, &span, false))
            }
            _ => None,
        };
        let return_arg = self.lower(shape.arg);

        if self.frame.contains("return") {
            let return_call = self.tree.alloc(
                NodeKind::Call {
                    callee: "return".into(),
                    args: smallvec![return_arg],
                },
                shape.call_span,
            );
            return self.tree.alloc(
                NodeKind::If(Conditional::ReturnOverridden {
                    cond,
                    body,
                    return_call,
                    rest,
                }),
                item.span.clone(),
            );
        }

        let node = self.tree.alloc(
            NodeKind::If(Conditional::ReturnBuiltin {
                cond,
                body,
                return_arg,
                rest,
            }),
            item.span.clone(),
        );
        let call_span = shape.call_span;
        self.watch.subscribe("return", node, move |tree, _| {
            override_return(tree, node, &call_span)
        });
        node
    }

    fn lower_if(
        &mut self,
        cond: &Syntax,
        then_branch: &Syntax,
        else_branch: Option<&Syntax>,
        span: Span,
    ) -> NodeId {
        let constant = if self.options.specialize_constant_comparisons {
            constant_comparison(cond)
        } else {
            None
        };

        let cond = self.lower(cond);
        let then_branch = self.lower(then_branch);
        let else_branch = else_branch.map(|syntax| self.lower(syntax));

        let conditional = match (constant, else_branch) {
            (Some(constant), else_branch) => {
                let else_branch = else_branch.unwrap_or_else(|| {
                    self.tree.alloc(NodeKind::Constant(Value::Null), span.clone())
                });
                Conditional::Const {
                    cond,
                    then_branch,
                    else_branch,
                    constant,
                }
            }
            (None, Some(else_branch)) => Conditional::TwoBranch {
                cond,
                then_branch,
                else_branch,
            },
            (None, None) => Conditional::NoElse { cond, then_branch },
        };
        self.tree.alloc(NodeKind::If(conditional), span)
    }
}

/// The constant of `expr == constant`, when the right operand is a
/// non-`NULL` literal, possibly negated.
fn constant_comparison(cond: &Syntax) -> Option<Scalar> {
    let SyntaxKind::Compare {
        op: CompareOp::Eq,
        right,
        ..
    } = &cond.kind
    else {
        return None;
    };
    match &right.kind {
        SyntaxKind::Literal(literal) => literal.to_scalar(),
        SyntaxKind::Unary {
            op: UnaryOp::Neg,
            operand,
        } => match &operand.kind {
            SyntaxKind::Literal(literal) => {
                let negated = apply_unary(UnaryOp::Neg, &literal.to_value());
                if negated.is_scalar() {
                    negated.element_at(0)
                } else {
                    None
                }
            }
            _ => None,
        },
        _ => None,
    }
}
