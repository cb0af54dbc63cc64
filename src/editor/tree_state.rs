//! Ephemeral per-node view state.
//!
//! `TreeState` knows nothing about tree structure. It maps node ids to UI
//! flags (expanded, focused, menu open, drag feedback) and tracks the single
//! active node. Because it is keyed by id, the state of a node survives
//! every mutation that keeps the node's id: renames, value edits and array
//! moves.
//!
//! Reads of unknown ids return defaults: expanded, not focused, no menu.
//!
//! # Example
//!
//! ```
//! use treeaccess::document::model::NodeId;
//! use treeaccess::editor::tree_state::TreeState;
//!
//! let state = TreeState::new();
//! let id = NodeId::from("n7");
//! assert!(state.is_expanded(&id));
//! assert!(!state.is_focused(&id));
//!
//! state.toggle_expanded(&id);
//! assert!(!state.is_expanded(&id));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use crate::document::model::NodeId;
use crate::reactive::{Emitter, Signal, Subscription};

/// Flags of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeViewState {
    pub expanded: bool,
    pub focused: bool,
    pub menu_open: bool,
    pub settings_open: bool,
    pub drop: bool,
    pub disabled_drop: bool,
    pub dragged_over: bool,
    pub focus_request_count: u64,
}

impl Default for NodeViewState {
    fn default() -> Self {
        Self {
            expanded: true,
            focused: false,
            menu_open: false,
            settings_open: false,
            drop: false,
            disabled_drop: false,
            dragged_over: false,
            focus_request_count: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFlag {
    Expanded,
    Focused,
    MenuOpen,
    SettingsOpen,
    Drop,
    DisabledDrop,
    DraggedOver,
}

impl StateFlag {
    fn get(&self, state: &NodeViewState) -> bool {
        match self {
            StateFlag::Expanded => state.expanded,
            StateFlag::Focused => state.focused,
            StateFlag::MenuOpen => state.menu_open,
            StateFlag::SettingsOpen => state.settings_open,
            StateFlag::Drop => state.drop,
            StateFlag::DisabledDrop => state.disabled_drop,
            StateFlag::DraggedOver => state.dragged_over,
        }
    }

    fn slot<'a>(&self, state: &'a mut NodeViewState) -> &'a mut bool {
        match self {
            StateFlag::Expanded => &mut state.expanded,
            StateFlag::Focused => &mut state.focused,
            StateFlag::MenuOpen => &mut state.menu_open,
            StateFlag::SettingsOpen => &mut state.settings_open,
            StateFlag::Drop => &mut state.drop,
            StateFlag::DisabledDrop => &mut state.disabled_drop,
            StateFlag::DraggedOver => &mut state.dragged_over,
        }
    }
}

/// Published whenever a flag actually changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub id: NodeId,
    pub flag: StateFlag,
    pub value: bool,
}

/// Id-keyed store of UI flags plus the active node.
#[derive(Default)]
pub struct TreeState {
    nodes: RefCell<HashMap<NodeId, NodeViewState>>,
    active: Signal<Option<NodeId>>,
    changes: Emitter<StateChange>,
    focus_requests: Emitter<NodeId>,
}

impl TreeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a node's flags (defaults for unknown ids).
    pub fn get(&self, id: &NodeId) -> NodeViewState {
        self.nodes.borrow().get(id).copied().unwrap_or_default()
    }

    pub fn flag(&self, id: &NodeId, flag: StateFlag) -> bool {
        self.nodes
            .borrow()
            .get(id)
            .map(|s| flag.get(s))
            .unwrap_or_else(|| flag.get(&NodeViewState::default()))
    }

    /// Sets a flag, creating the entry on first write. Subscribers are only
    /// notified when the value changes.
    pub fn set_flag(&self, id: &NodeId, flag: StateFlag, value: bool) {
        {
            let mut nodes = self.nodes.borrow_mut();
            let entry = nodes.entry(id.clone()).or_default();
            let slot = flag.slot(entry);
            if *slot == value {
                return;
            }
            *slot = value;
        }
        self.changes.emit(&StateChange {
            id: id.clone(),
            flag,
            value,
        });
    }

    pub fn is_expanded(&self, id: &NodeId) -> bool {
        self.flag(id, StateFlag::Expanded)
    }

    pub fn set_expanded(&self, id: &NodeId, expanded: bool) {
        self.set_flag(id, StateFlag::Expanded, expanded);
    }

    pub fn toggle_expanded(&self, id: &NodeId) {
        self.set_expanded(id, !self.is_expanded(id));
    }

    pub fn is_focused(&self, id: &NodeId) -> bool {
        self.flag(id, StateFlag::Focused)
    }

    pub fn set_focused(&self, id: &NodeId, focused: bool) {
        self.set_flag(id, StateFlag::Focused, focused);
    }

    pub fn is_menu_open(&self, id: &NodeId) -> bool {
        self.flag(id, StateFlag::MenuOpen)
    }

    pub fn set_menu_open(&self, id: &NodeId, open: bool) {
        self.set_flag(id, StateFlag::MenuOpen, open);
    }

    pub fn is_settings_open(&self, id: &NodeId) -> bool {
        self.flag(id, StateFlag::SettingsOpen)
    }

    pub fn set_settings_open(&self, id: &NodeId, open: bool) {
        self.set_flag(id, StateFlag::SettingsOpen, open);
    }

    pub fn is_drop(&self, id: &NodeId) -> bool {
        self.flag(id, StateFlag::Drop)
    }

    pub fn set_drop(&self, id: &NodeId, value: bool) {
        self.set_flag(id, StateFlag::Drop, value);
    }

    pub fn is_disabled_drop(&self, id: &NodeId) -> bool {
        self.flag(id, StateFlag::DisabledDrop)
    }

    pub fn set_disabled_drop(&self, id: &NodeId, value: bool) {
        self.set_flag(id, StateFlag::DisabledDrop, value);
    }

    pub fn is_dragged_over(&self, id: &NodeId) -> bool {
        self.flag(id, StateFlag::DraggedOver)
    }

    pub fn set_dragged_over(&self, id: &NodeId, value: bool) {
        self.set_flag(id, StateFlag::DraggedOver, value);
    }

    /// Bumps the node's focus request counter and notifies focus-request
    /// subscribers. The UI layer reacts by opening the node's inline editor.
    pub fn request_focus(&self, id: &NodeId) {
        {
            let mut nodes = self.nodes.borrow_mut();
            nodes.entry(id.clone()).or_default().focus_request_count += 1;
        }
        self.focus_requests.emit(id);
    }

    pub fn focus_request_count(&self, id: &NodeId) -> u64 {
        self.nodes
            .borrow()
            .get(id)
            .map(|s| s.focus_request_count)
            .unwrap_or(0)
    }

    pub fn active_node_id(&self) -> Option<NodeId> {
        self.active.get()
    }

    pub fn set_active_node_id(&self, id: Option<NodeId>) {
        self.active.set(id);
    }

    pub fn is_active(&self, id: &NodeId) -> bool {
        self.active.with(|active| active.as_ref() == Some(id))
    }

    pub fn expand_all(&self, ids: &[NodeId]) {
        for id in ids {
            self.set_expanded(id, true);
        }
    }

    /// Collapses every id. With `keep_root_expanded`, the first id is
    /// treated as the root and left expanded.
    pub fn collapse_all(&self, ids: &[NodeId], keep_root_expanded: bool) {
        for (index, id) in ids.iter().enumerate() {
            let expanded = keep_root_expanded && index == 0;
            self.set_expanded(id, expanded);
        }
    }

    /// Forgets everything about one node.
    pub fn clear_node(&self, id: &NodeId) {
        self.nodes.borrow_mut().remove(id);
        if self.is_active(id) {
            self.active.set(None);
        }
    }

    /// Forgets every node and clears the active node.
    pub fn reset(&self) {
        self.nodes.borrow_mut().clear();
        self.active.set(None);
    }

    /// Ids that currently have stored state.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.borrow().keys().cloned().collect()
    }

    /// Number of nodes with stored state.
    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    #[must_use = "dropping the subscription detaches the listener"]
    pub fn subscribe(&self, listener: impl Fn(&StateChange) + 'static) -> Subscription {
        self.changes.subscribe(listener)
    }

    #[must_use = "dropping the subscription detaches the listener"]
    pub fn subscribe_active(&self, listener: impl Fn(&Option<NodeId>) + 'static) -> Subscription {
        self.active.subscribe(listener)
    }

    #[must_use = "dropping the subscription detaches the listener"]
    pub fn on_focus_request(&self, listener: impl Fn(&NodeId) + 'static) -> Subscription {
        self.focus_requests.subscribe(listener)
    }
}

impl std::fmt::Debug for TreeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeState")
            .field("nodes", &self.nodes.borrow().len())
            .field("active", &self.active.get())
            .finish()
    }
}
