//! Registry of nodes that speculate on a builtin keeping its meaning.
//!
//! A node that assumed `return` (or any builtin) is the builtin subscribes a
//! callback under that name. When the name is rebound the callbacks run once,
//! in registration order, and the name's list is cleared. A callback gets
//! the tree and the symbol; it finds its node again by resolving the id it
//! closed over and replaces it with a version that makes no assumption.
//!
//! One registry belongs to one engine. Nothing here is global.

use hashbrown::HashMap;
use tracing::debug;

use crate::syntax::Symbol;
use crate::tree::{NodeId, Tree, TreeError};
use crate::{Box, Vec};

pub type RebindCallback = Box<dyn FnMut(&mut Tree, &str) -> Result<(), TreeError>>;

struct Subscription {
    owner: NodeId,
    callback: RebindCallback,
}

#[derive(Default)]
pub struct RebindWatch {
    subscribers: HashMap<Symbol, Vec<Subscription>>,
}

impl core::fmt::Debug for RebindWatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map()
            .entries(
                self.subscribers
                    .iter()
                    .map(|(name, subs)| (name, subs.iter().map(|s| s.owner).collect::<Vec<_>>())),
            )
            .finish()
    }
}

impl RebindWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for rebinding of `name` on behalf of `owner`.
    pub fn subscribe(
        &mut self,
        name: impl Into<Symbol>,
        owner: NodeId,
        callback: impl FnMut(&mut Tree, &str) -> Result<(), TreeError> + 'static,
    ) {
        self.subscribers
            .entry(name.into())
            .or_default()
            .push(Subscription {
                owner,
                callback: Box::new(callback),
            });
    }

    pub fn subscriber_count(&self, name: &str) -> usize {
        self.subscribers.get(name).map_or(0, Vec::len)
    }

    /// Runs and drops every callback subscribed to `name`.
    ///
    /// All callbacks run even if one fails; the first failure is returned.
    pub fn notify_rebound(&mut self, name: &str, tree: &mut Tree) -> Result<(), TreeError> {
        let Some(subscriptions) = self.subscribers.get_mut(name) else {
            return Ok(());
        };
        let subscriptions = core::mem::take(subscriptions);
        debug!(name, subscribers = subscriptions.len(), "notifying rebind");

        let mut first_error = None;
        for mut subscription in subscriptions {
            if let Err(err) = (subscription.callback)(tree, name) {
                debug!(name, owner = %subscription.owner, error = %err, "rebind callback failed");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Drops the subscriptions whose owner no longer resolves to a live node.
    pub fn prune(&mut self, tree: &Tree) {
        for subscriptions in self.subscribers.values_mut() {
            subscriptions.retain(|s| tree.resolve(s.owner).is_ok());
        }
        self.subscribers.retain(|_, subscriptions| !subscriptions.is_empty());
    }

    /// Drops every subscription.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}
