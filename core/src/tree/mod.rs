//! The executable tree: an arena of nodes addressed by [`NodeId`].
//!
//! Nodes are never mutated into a different variant. A rewrite allocates a
//! new node, writes its id into the parent's child slot and leaves a
//! [`Forward`] behind in the old slot, so anyone still holding the old id can
//! resolve it to the node that replaced it. A retired slot is never revived.
//!
//! Slots are not reused either, discarded ones included: a stale id must keep
//! failing to resolve instead of landing on an unrelated node. The rewrite
//! log, by contrast, is only diagnostics and can be drained with
//! [`Tree::take_rewrites`].

use core::fmt;

use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::Vec;
use crate::nodes::NodeKind;
use crate::syntax::Span;

/// Index of a node in its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

static_assertions::assert_eq_size!(NodeId, u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    /// Position of the construct this node was lowered from. Rewrites copy it
    /// unchanged into the replacement.
    pub span: Span,
    /// `None` only for roots. Used for splicing, never for evaluation.
    pub parent: Option<NodeId>,
}

/// Where a retired node went, and at which generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Forward {
    pub to: NodeId,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Live(Node),
    Retired(Forward),
    Discarded,
}

/// One splice, kept for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteEvent {
    pub generation: u64,
    pub from: NodeId,
    pub to: NodeId,
    pub from_kind: &'static str,
    pub to_kind: &'static str,
    pub reason: &'static str,
}

/// Splice failures. These are programming errors in a rewrite; the
/// evaluator reports them as internal runtime errors instead of panicking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("node {0} has been replaced or discarded")]
    Retired(NodeId),
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
}

#[derive(Debug, Default)]
pub struct Tree {
    slots: Vec<Slot>,
    generation: u64,
    rewrites: Vec<RewriteEvent>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a node and adopts its children.
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.slots.len() as u32);
        let children = kind.children();
        self.slots.push(Slot::Live(Node {
            kind,
            span,
            parent: None,
        }));
        for child in children {
            if let Some(Slot::Live(node)) = self.slots.get_mut(child.index()) {
                node.parent = Some(id);
            }
        }
        id
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        match self.slots.get(id.index()) {
            Some(Slot::Live(node)) => Ok(node),
            Some(Slot::Retired(_) | Slot::Discarded) => Err(TreeError::Retired(id)),
            None => Err(TreeError::UnknownNode(id)),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        match self.slots.get_mut(id.index()) {
            Some(Slot::Live(node)) => Ok(node),
            Some(Slot::Retired(_) | Slot::Discarded) => Err(TreeError::Retired(id)),
            None => Err(TreeError::UnknownNode(id)),
        }
    }

    pub fn kind(&self, id: NodeId) -> Result<&NodeKind, TreeError> {
        self.node(id).map(|node| &node.kind)
    }

    pub fn span(&self, id: NodeId) -> Result<&Span, TreeError> {
        self.node(id).map(|node| &node.span)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, TreeError> {
        self.node(id).map(|node| node.parent)
    }

    pub fn is_live(&self, id: NodeId) -> bool {
        matches!(self.slots.get(id.index()), Some(Slot::Live(_)))
    }

    /// The single-hop forwarding link, if `id` was replaced.
    pub fn forwarded(&self, id: NodeId) -> Option<Forward> {
        match self.slots.get(id.index()) {
            Some(Slot::Retired(forward)) => Some(*forward),
            _ => None,
        }
    }

    /// Follows forwarding links until a live node is reached.
    pub fn resolve(&self, mut id: NodeId) -> Result<NodeId, TreeError> {
        loop {
            match self.slots.get(id.index()) {
                Some(Slot::Live(_)) => return Ok(id),
                Some(Slot::Retired(forward)) => id = forward.to,
                Some(Slot::Discarded) => return Err(TreeError::Retired(id)),
                None => return Err(TreeError::UnknownNode(id)),
            }
        }
    }

    /// Bumped once per splice.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn rewrites(&self) -> &[RewriteEvent] {
        &self.rewrites
    }

    /// Empties the rewrite log. [`Tree::generation`] keeps counting.
    pub fn take_rewrites(&mut self) -> Vec<RewriteEvent> {
        core::mem::take(&mut self.rewrites)
    }

    pub fn live_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Live(_)))
            .count()
    }

    /// `(parent, child)` pairs where a live node still names a child that is
    /// not live. Empty for a well-formed tree.
    pub fn dangling_links(&self) -> Vec<(NodeId, NodeId)> {
        let mut dangling = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            let Slot::Live(node) = slot else { continue };
            for child in node.kind.children() {
                if !self.is_live(child) {
                    dangling.push((NodeId(index as u32), child));
                }
            }
        }
        dangling
    }

    /// Installs `new` in the slot of `parent` that holds `old`, and retires
    /// `old` with a forwarding link to `new`.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        old: NodeId,
        new: NodeId,
        reason: &'static str,
    ) -> Result<NodeId, TreeError> {
        self.node(new)?;
        self.node(old)?;
        self.write_child_slot(parent, old, new)?;
        self.node_mut(new)?.parent = Some(parent);
        self.retire(old, new, reason)?;
        Ok(new)
    }

    /// Asks `node`'s parent to replace it with `new`. A root has no parent
    /// slot to rewrite; it is only forwarded.
    pub fn replace_self(
        &mut self,
        node: NodeId,
        new: NodeId,
        reason: &'static str,
    ) -> Result<NodeId, TreeError> {
        match self.parent(node)? {
            Some(parent) => self.replace_child(parent, node, new, reason),
            None => {
                self.node(new)?;
                self.retire(node, new, reason)?;
                Ok(new)
            }
        }
    }

    /// Wraps the live child `child` of `parent` in a node built by
    /// `make_wrapper`. The child stays live, now owned by the wrapper.
    pub fn insert_above(
        &mut self,
        parent: NodeId,
        child: NodeId,
        make_wrapper: impl FnOnce(NodeId) -> NodeKind,
        reason: &'static str,
    ) -> Result<NodeId, TreeError> {
        let span = self.span(child)?.clone();
        if !self.kind(parent)?.children().contains(&child) {
            return Err(TreeError::NotAChild { parent, child });
        }
        let wrapper = self.alloc(make_wrapper(child), span);
        self.write_child_slot(parent, child, wrapper)?;
        self.node_mut(wrapper)?.parent = Some(parent);
        self.record(child, wrapper, reason)?;
        Ok(wrapper)
    }

    /// Tombstones `node` and everything below it.
    pub fn discard(&mut self, node: NodeId) {
        let mut pending: SmallVec<[NodeId; 8]> = SmallVec::new();
        pending.push(node);
        while let Some(id) = pending.pop() {
            let Some(slot) = self.slots.get_mut(id.index()) else {
                continue;
            };
            // Retired slots keep their forwarding link.
            if !matches!(slot, Slot::Live(_)) {
                continue;
            }
            if let Slot::Live(node) = core::mem::replace(slot, Slot::Discarded) {
                pending.extend(node.kind.children());
            }
        }
    }

    fn write_child_slot(
        &mut self,
        parent: NodeId,
        old: NodeId,
        new: NodeId,
    ) -> Result<(), TreeError> {
        let node = self.node_mut(parent)?;
        let mut slots = node.kind.child_slots_mut();
        let slot = slots
            .iter_mut()
            .find(|slot| ***slot == old)
            .ok_or(TreeError::NotAChild { parent, child: old })?;
        **slot = new;
        Ok(())
    }

    fn retire(&mut self, old: NodeId, new: NodeId, reason: &'static str) -> Result<(), TreeError> {
        let event = self.record(old, new, reason)?;
        let slot = &mut self.slots[old.index()];
        let Slot::Live(retired) = core::mem::replace(
            slot,
            Slot::Retired(Forward {
                to: new,
                generation: event,
            }),
        ) else {
            return Err(TreeError::Retired(old));
        };
        // Children the replacement did not adopt are unreachable now.
        for orphan in retired.kind.children() {
            if self.parent_is(orphan, old) {
                self.discard(orphan);
            }
        }
        Ok(())
    }

    fn parent_is(&self, child: NodeId, parent: NodeId) -> bool {
        self.parent(child).ok().flatten() == Some(parent)
    }

    fn record(&mut self, from: NodeId, to: NodeId, reason: &'static str) -> Result<u64, TreeError> {
        let from_kind = self.kind(from)?.name();
        let to_kind = self.kind(to)?.name();
        self.generation += 1;
        debug!(
            generation = self.generation,
            from = %from,
            to = %to,
            from_kind,
            to_kind,
            reason,
            "node rewritten"
        );
        self.rewrites.push(RewriteEvent {
            generation: self.generation,
            from,
            to,
            from_kind,
            to_kind,
            reason,
        });
        Ok(self.generation)
    }
}
