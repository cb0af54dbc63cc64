//! Per-node proxy over [`TreeState`](crate::editor::tree_state::TreeState).

use super::NodeAccessor;
use crate::document::model::TreeModel;

pub struct StateView<'a, M: TreeModel> {
    node: &'a NodeAccessor<M>,
}

impl<'a, M: TreeModel> StateView<'a, M> {
    pub(crate) fn new(node: &'a NodeAccessor<M>) -> Self {
        Self { node }
    }

    pub fn is_expanded(&self) -> bool {
        self.node
            .tree_state()
            .map(|s| s.is_expanded(self.node.id()))
            .unwrap_or(true)
    }

    pub fn expand(&self) {
        if let Some(state) = self.node.tree_state() {
            state.set_expanded(self.node.id(), true);
        }
    }

    pub fn collapse(&self) {
        if let Some(state) = self.node.tree_state() {
            state.set_expanded(self.node.id(), false);
        }
    }

    pub fn toggle_expanded(&self) {
        if let Some(state) = self.node.tree_state() {
            state.toggle_expanded(self.node.id());
        }
    }

    pub fn is_focused(&self) -> bool {
        self.node
            .tree_state()
            .map(|s| s.is_focused(self.node.id()))
            .unwrap_or(false)
    }

    pub fn set_focused(&self, focused: bool) {
        if let Some(state) = self.node.tree_state() {
            state.set_focused(self.node.id(), focused);
        }
    }

    pub fn is_active(&self) -> bool {
        self.node
            .tree_state()
            .map(|s| s.is_active(self.node.id()))
            .unwrap_or(false)
    }

    pub fn activate(&self) {
        if let Some(state) = self.node.tree_state() {
            state.set_active_node_id(Some(self.node.id().clone()));
        }
    }

    pub fn is_menu_open(&self) -> bool {
        self.node
            .tree_state()
            .map(|s| s.is_menu_open(self.node.id()))
            .unwrap_or(false)
    }

    pub fn set_menu_open(&self, open: bool) {
        if let Some(state) = self.node.tree_state() {
            state.set_menu_open(self.node.id(), open);
        }
    }

    pub fn request_focus(&self) {
        if let Some(state) = self.node.tree_state() {
            state.request_focus(self.node.id());
        }
    }
}
