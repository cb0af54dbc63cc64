//! Context menu assembly and dispatch.
//!
//! The menu is rebuilt from the node's current position on every call and
//! never stored. Entries appear in a fixed order:
//!
//! 1. expand all / collapse all, when anything below can collapse
//! 2. add item to start / end, on list nodes
//! 3. on list items: a `move` submenu (only the moves that change
//!    something), an `item` submenu (add before / after) and `delete`
//! 4. a `copy` submenu: JSON, plus the path when the node has one

use std::rc::Rc;

use log::{debug, warn};

use super::NodeAccessor;
use crate::document::model::{NodeId, TreeModel};
use crate::error::{Result, TreeError};

/// Everything a menu entry can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ExpandAll,
    CollapseAll,
    AddItemToStart,
    AddItemToEnd,
    MoveToStart,
    MoveUp,
    MoveDown,
    MoveToEnd,
    AddBefore,
    AddAfter,
    Delete,
    CopyJson,
    CopyPath,
}

/// A menu entry, possibly with a submenu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub value: &'static str,
    pub label: &'static str,
    pub action: Option<MenuAction>,
    pub children: Vec<MenuItem>,
    pub before_separator: bool,
    pub after_separator: bool,
}

impl MenuItem {
    fn action(value: &'static str, label: &'static str, action: MenuAction) -> Self {
        Self {
            value,
            label,
            action: Some(action),
            children: Vec::new(),
            before_separator: false,
            after_separator: false,
        }
    }

    fn submenu(value: &'static str, label: &'static str, children: Vec<MenuItem>) -> Self {
        Self {
            value,
            label,
            action: None,
            children,
            before_separator: false,
            after_separator: false,
        }
    }

    fn separated_before(mut self) -> Self {
        self.before_separator = true;
        self
    }

    /// Finds an entry by value anywhere in this item's subtree.
    pub fn find(&self, value: &str) -> Option<&MenuItem> {
        if self.value == value {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(value))
    }
}

/// Looks an entry up by value in a menu.
pub fn find_item<'a>(items: &'a [MenuItem], value: &str) -> Option<&'a MenuItem> {
    items.iter().find_map(|i| i.find(value))
}

/// Which moves make sense for item `index` of a list of `len` items.
pub fn move_entries(index: usize, len: usize) -> Vec<MenuItem> {
    let mut out = Vec::new();
    if index > 1 && len > 2 {
        out.push(MenuItem::action("move-to-start", "To start", MenuAction::MoveToStart));
    }
    if index > 0 {
        out.push(MenuItem::action("move-up", "Up", MenuAction::MoveUp));
    }
    if index + 1 < len {
        out.push(MenuItem::action("move-down", "Down", MenuAction::MoveDown));
    }
    if index + 2 < len && len > 2 {
        out.push(MenuItem::action("move-to-end", "To end", MenuAction::MoveToEnd));
    }
    out
}

pub struct MenuView<'a, M: TreeModel> {
    node: &'a NodeAccessor<M>,
}

impl<'a, M: TreeModel> MenuView<'a, M> {
    pub(crate) fn new(node: &'a NodeAccessor<M>) -> Self {
        Self { node }
    }

    pub fn items(&self) -> Vec<MenuItem> {
        let mut items = Vec::new();

        if self.node.layout().is_collapsible_tree() {
            items.push(MenuItem::action("expand-all", "Expand all", MenuAction::ExpandAll));
            items.push(MenuItem::action(
                "collapse-all",
                "Collapse all",
                MenuAction::CollapseAll,
            ));
        }

        if self.node.is_item_list() {
            items.push(
                MenuItem::action("add-to-start", "Add item to start", MenuAction::AddItemToStart)
                    .separated_before(),
            );
            items.push(MenuItem::action(
                "add-to-end",
                "Add item to end",
                MenuAction::AddItemToEnd,
            ));
        }

        if self.node.is_list_item() {
            if let (Some(index), Some(parent)) = (self.node.index(), self.node.parent()) {
                let moves = move_entries(index, parent.child_count());
                if !moves.is_empty() {
                    items.push(MenuItem::submenu("move", "Move", moves).separated_before());
                }
                items.push(MenuItem::submenu(
                    "item",
                    "Item",
                    vec![
                        MenuItem::action("add-before", "Add before", MenuAction::AddBefore),
                        MenuItem::action("add-after", "Add after", MenuAction::AddAfter),
                    ],
                ));
                items.push(MenuItem::action("delete", "Delete", MenuAction::Delete));
            }
        }

        let mut copy = vec![MenuItem::action("copy-json", "JSON", MenuAction::CopyJson)];
        if !self.node.path().is_empty() {
            copy.push(MenuItem::action("copy-path", "Path", MenuAction::CopyPath));
        }
        items.push(MenuItem::submenu("copy", "Copy", copy).separated_before());

        items
    }

    /// Runs a menu action. Returns the id of a node the action created.
    pub fn perform(&self, action: MenuAction) -> Result<Option<NodeId>> {
        debug!("Menu action {:?} on {}", action, self.node.id());
        match action {
            MenuAction::ExpandAll => {
                self.node.layout().expand_all();
                Ok(None)
            }
            MenuAction::CollapseAll => {
                self.node.layout().collapse_all();
                Ok(None)
            }
            MenuAction::AddItemToStart => Ok(Some(self.node.insert_at(0)?.id().clone())),
            MenuAction::AddItemToEnd => {
                let end = self.node.child_count();
                Ok(Some(self.node.insert_at(end)?.id().clone()))
            }
            MenuAction::MoveToStart => self.move_to(|_, _| 0),
            MenuAction::MoveUp => self.move_to(|index, _| index.saturating_sub(1)),
            MenuAction::MoveDown => self.move_to(|index, len| (index + 1).min(len - 1)),
            MenuAction::MoveToEnd => self.move_to(|_, len| len - 1),
            MenuAction::AddBefore => {
                let (parent, index) = self.list_position()?;
                Ok(Some(parent.insert_at(index)?.id().clone()))
            }
            MenuAction::AddAfter => {
                let (parent, index) = self.list_position()?;
                Ok(Some(parent.insert_at(index + 1)?.id().clone()))
            }
            MenuAction::Delete => {
                self.node.remove()?;
                Ok(None)
            }
            MenuAction::CopyJson => {
                let value = self.node.plain_value().unwrap_or(serde_json::Value::Null);
                let text = serde_json::to_string_pretty(&value)
                    .unwrap_or_else(|_| value.to_string());
                self.copy(&text);
                Ok(None)
            }
            MenuAction::CopyPath => {
                self.copy(&self.node.path());
                Ok(None)
            }
        }
    }

    fn list_position(&self) -> Result<(Rc<NodeAccessor<M>>, usize)> {
        if !self.node.is_list_item() {
            return Err(TreeError::Unsupported("node is not a list item"));
        }
        let parent = self.node.parent().ok_or(TreeError::Detached)?;
        let index = self
            .node
            .index()
            .ok_or_else(|| TreeError::UnknownNode(self.node.id().clone()))?;
        Ok((parent, index))
    }

    fn move_to(&self, target: impl FnOnce(usize, usize) -> usize) -> Result<Option<NodeId>> {
        let (parent, index) = self.list_position()?;
        let to = target(index, parent.child_count());
        parent.move_item(index, to)?;
        Ok(None)
    }

    fn copy(&self, text: &str) {
        let Some(ctx) = self.node.context() else {
            return;
        };
        if let Err(e) = ctx.clipboard.set_text(text) {
            warn!("Copy failed: {:#}", e);
        }
    }
}
