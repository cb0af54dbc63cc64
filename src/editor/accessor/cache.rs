//! Shared context and the identity-preserving accessor cache.
//!
//! Every accessor of one tree points (weakly) at the same [`TreeContext`],
//! which owns the model, the view state, the clipboard and the cache. The
//! cache holds one `Rc<NodeAccessor>` per live node id, so looking up the
//! same id twice yields the same instance until the node leaves the tree.
//! Child lists are never cached; they are re-derived from the model on
//! every call.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use log::debug;

use super::NodeAccessor;
use crate::document::model::{Mutation, NodeId, TreeModel};
use crate::editor::clipboard::Clipboard;
use crate::editor::tree_state::TreeState;
use crate::error::Result;

/// Behavior switches shared by every accessor of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeSettings {
    /// Collapse-all on the root leaves the root expanded.
    pub keep_root_expanded: bool,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            keep_root_expanded: true,
        }
    }
}

/// Memoized accessors keyed by node id.
pub struct AccessorCache<M: TreeModel> {
    entries: RefCell<HashMap<NodeId, Rc<NodeAccessor<M>>>>,
}

impl<M: TreeModel> Default for AccessorCache<M> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }
}

impl<M: TreeModel> AccessorCache<M> {
    /// Returns the cached accessor for `id`, building it with `create` on a
    /// miss.
    pub fn get_or_create(
        &self,
        id: &NodeId,
        create: impl FnOnce() -> NodeAccessor<M>,
    ) -> Rc<NodeAccessor<M>> {
        if let Some(existing) = self.entries.borrow().get(id) {
            return Rc::clone(existing);
        }
        let accessor = Rc::new(create());
        self.entries
            .borrow_mut()
            .insert(id.clone(), Rc::clone(&accessor));
        accessor
    }

    pub fn get(&self, id: &NodeId) -> Option<Rc<NodeAccessor<M>>> {
        self.entries.borrow().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Drops every entry whose id fails `keep`. Returns the dropped ids.
    pub fn retain(&self, keep: impl Fn(&NodeId) -> bool) -> Vec<NodeId> {
        let mut entries = self.entries.borrow_mut();
        let stale: Vec<NodeId> = entries.keys().filter(|id| !keep(id)).cloned().collect();
        for id in &stale {
            entries.remove(id);
        }
        stale
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

/// Everything accessors of one tree share.
pub struct TreeContext<M: TreeModel> {
    pub(crate) model: RefCell<M>,
    pub(crate) state: Rc<TreeState>,
    pub(crate) clipboard: Rc<dyn Clipboard>,
    pub(crate) settings: TreeSettings,
    pub(crate) cache: AccessorCache<M>,
    weak_self: Weak<TreeContext<M>>,
}

impl<M: TreeModel> TreeContext<M> {
    pub(crate) fn new(
        model: M,
        state: Rc<TreeState>,
        clipboard: Rc<dyn Clipboard>,
        settings: TreeSettings,
    ) -> Rc<Self> {
        Rc::new_cyclic(|weak| Self {
            model: RefCell::new(model),
            state,
            clipboard,
            settings,
            cache: AccessorCache::default(),
            weak_self: weak.clone(),
        })
    }

    /// The accessor for `id`, or `None` if the node is not in the tree.
    pub(crate) fn accessor(&self, id: &NodeId) -> Option<Rc<NodeAccessor<M>>> {
        if !self.model.borrow().contains(id) {
            return None;
        }
        Some(self.cache.get_or_create(id, || {
            NodeAccessor::new(id.clone(), self.weak_self.clone())
        }))
    }

    /// Applies a mutation to the model, then forgets accessors and view
    /// state of nodes that left the tree.
    pub(crate) fn mutate(&self, mutation: Mutation) -> Result<Option<NodeId>> {
        debug!("Applying {:?}", mutation);
        let created = self.model.borrow_mut().apply(mutation)?;
        self.prune();
        Ok(created)
    }

    pub(crate) fn prune(&self) {
        let (stale_accessors, stale_state, stale_active) = {
            let model = self.model.borrow();
            let accessors = self.cache.retain(|id| model.contains(id));
            let state: Vec<NodeId> = self
                .state
                .node_ids()
                .into_iter()
                .filter(|id| !model.contains(id))
                .collect();
            let active = self
                .state
                .active_node_id()
                .map(|id| !model.contains(&id))
                .unwrap_or(false);
            (accessors, state, active)
        };
        if !stale_accessors.is_empty() {
            debug!("Pruned {} stale accessors", stale_accessors.len());
        }
        for id in &stale_state {
            self.state.clear_node(id);
        }
        if stale_active {
            self.state.set_active_node_id(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::value_tree::ValueTree;
    use crate::editor::clipboard::MemoryClipboard;
    use serde_json::json;

    fn context() -> Rc<TreeContext<ValueTree>> {
        TreeContext::new(
            ValueTree::from_json(&json!({"list": [1, 2, 3]})),
            Rc::new(TreeState::new()),
            Rc::new(MemoryClipboard::new()),
            TreeSettings::default(),
        )
    }

    #[test]
    fn test_unknown_id_has_no_accessor() {
        let ctx = context();
        assert!(ctx.accessor(&NodeId::from("nope")).is_none());
        assert!(ctx.cache.is_empty());
    }

    #[test]
    fn test_prune_forgets_removed_nodes() {
        let ctx = context();
        let list = ctx.model.borrow().resolve_path("list").unwrap();
        let first = ctx.model.borrow().resolve_path("list[0]").unwrap();
        ctx.accessor(&first).unwrap();
        ctx.state.set_expanded(&first, false);
        ctx.state.set_active_node_id(Some(first.clone()));

        ctx.mutate(Mutation::RemoveAt {
            array: list,
            index: 0,
        })
        .unwrap();

        assert!(ctx.cache.get(&first).is_none());
        assert!(ctx.state.node_ids().is_empty());
        assert_eq!(ctx.state.active_node_id(), None);
    }
}
