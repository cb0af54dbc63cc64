//! Read-only traversal over a tree model and its view state.
//!
//! Lookups of ids that are not in the tree return `None`, an empty list or
//! `false`. Callers treat that as "stay put".

use crate::document::model::{NodeId, TreeModel};
use crate::input::pointer::FocusHost;

use super::tree_state::TreeState;

pub struct TreeNavigator<'a, M: TreeModel> {
    model: &'a M,
    state: &'a TreeState,
}

impl<'a, M: TreeModel> TreeNavigator<'a, M> {
    pub fn new(model: &'a M, state: &'a TreeState) -> Self {
        Self { model, state }
    }

    /// Pre-order ids of every node reachable from the root without entering
    /// a collapsed node. The root's own children are always listed.
    pub fn visible_node_ids(&self) -> Vec<NodeId> {
        let root = self.model.root_id();
        let mut out = Vec::new();
        let mut stack = vec![root.clone()];
        while let Some(id) = stack.pop() {
            let descend = id == root || self.state.is_expanded(&id);
            if descend {
                let mut children = self.model.child_ids(&id);
                children.reverse();
                stack.extend(children);
            }
            out.push(id);
        }
        out
    }

    /// Depth-first search for the parent of `id`. `None` for the root and
    /// for unknown ids.
    pub fn find_parent_id(&self, id: &NodeId) -> Option<NodeId> {
        let mut stack = vec![self.model.root_id()];
        while let Some(current) = stack.pop() {
            let children = self.model.child_ids(&current);
            if children.iter().any(|c| c == id) {
                return Some(current);
            }
            stack.extend(children);
        }
        None
    }

    pub fn node_has_children(&self, id: &NodeId) -> bool {
        self.model.child_count(id) > 0
    }

    pub fn first_child_id(&self, id: &NodeId) -> Option<NodeId> {
        self.model.child_ids(id).into_iter().next()
    }

    /// The visible node after `id`, clamped at the end.
    pub fn next_visible(&self, id: &NodeId) -> Option<NodeId> {
        let ids = self.visible_node_ids();
        let index = ids.iter().position(|v| v == id)?;
        ids.get((index + 1).min(ids.len() - 1)).cloned()
    }

    /// The visible node before `id`, clamped at the start.
    pub fn previous_visible(&self, id: &NodeId) -> Option<NodeId> {
        let ids = self.visible_node_ids();
        let index = ids.iter().position(|v| v == id)?;
        ids.get(index.saturating_sub(1)).cloned()
    }

    /// Asks the host to scroll `id` into view if it is currently visible.
    pub fn scroll_to_node(&self, host: &dyn FocusHost, id: &NodeId) {
        if self.visible_node_ids().contains(id) {
            host.scroll_into_view(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::value_tree::ValueTree;
    use serde_json::json;

    #[test]
    fn test_collapsed_root_still_lists_children() {
        let tree = ValueTree::from_json(&json!({"a": 1, "b": 2}));
        let state = TreeState::new();
        state.set_expanded(&tree.root_id(), false);
        let nav = TreeNavigator::new(&tree, &state);
        assert_eq!(nav.visible_node_ids().len(), 3);
    }

    #[test]
    fn test_unknown_ids_stay_put() {
        let tree = ValueTree::from_json(&json!({"a": 1}));
        let state = TreeState::new();
        let nav = TreeNavigator::new(&tree, &state);
        let ghost = NodeId::from("ghost");
        assert_eq!(nav.find_parent_id(&ghost), None);
        assert_eq!(nav.first_child_id(&ghost), None);
        assert_eq!(nav.next_visible(&ghost), None);
        assert!(!nav.node_has_children(&ghost));
    }

    #[test]
    fn test_next_and_previous_clamp() {
        let tree = ValueTree::from_json(&json!({"a": 1}));
        let state = TreeState::new();
        let nav = TreeNavigator::new(&tree, &state);
        let root = tree.root_id();
        let a = tree.resolve_path("a").unwrap();
        assert_eq!(nav.previous_visible(&root), Some(root.clone()));
        assert_eq!(nav.next_visible(&a), Some(a.clone()));
        assert_eq!(nav.find_parent_id(&a), Some(root.clone()));
        assert_eq!(nav.find_parent_id(&root), None);
    }
}
