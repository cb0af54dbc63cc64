//! Identity-stable accessors over tree nodes.
//!
//! A [`NodeAccessor`] is the facade the UI talks to for one node. It never
//! copies data out of the model: every getter reads the current model, and
//! every mutation goes through the shared [`TreeContext`](cache::TreeContext).
//! Concerns are split into borrowed views:
//!
//! - [`state`](NodeAccessor::state): expand/focus flags
//! - [`layout`](NodeAccessor::layout): depth, guides, renderer, summaries
//! - [`menu`](NodeAccessor::menu): context menu entries and actions
//! - `label`, `formula`, `validation`: schema trees only (see [`schema`])
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use serde_json::json;
//! use treeaccess::document::value_tree::ValueTree;
//! use treeaccess::editor::tree::EditorTree;
//!
//! let tree = EditorTree::with_defaults(ValueTree::from_json(&json!({"list": ["a", "b", "c"]})));
//! let list = tree.root().children()[0].clone();
//! let before: Vec<_> = list.children();
//!
//! let inserted = list.insert_at(1).unwrap();
//! let after = list.children();
//!
//! assert_eq!(after.len(), 4);
//! assert!(Rc::ptr_eq(&after[1], &inserted));
//! assert!(Rc::ptr_eq(&after[0], &before[0]));
//! assert!(Rc::ptr_eq(&after[2], &before[1]));
//! assert_eq!(after[3].name(), "3");
//! ```

pub mod cache;
pub mod layout;
pub mod menu;
pub mod schema;
pub mod state;

use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::document::model::{Mutation, NodeId, NodeKind, Scalar, TreeModel};
use crate::error::{Result, TreeError};

use self::cache::TreeContext;
use self::layout::LayoutView;
use self::menu::MenuView;
use self::state::StateView;
use super::tree_state::TreeState;

/// View-object for one node id.
pub struct NodeAccessor<M: TreeModel> {
    id: NodeId,
    context: Weak<TreeContext<M>>,
    extension: M::Extension,
}

impl<M: TreeModel> NodeAccessor<M> {
    pub(crate) fn new(id: NodeId, context: Weak<TreeContext<M>>) -> Self {
        Self {
            id,
            context,
            extension: M::Extension::default(),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Stable test hook derived from the node's position: `root` for the
    /// root, `root-list-0-name` for `list[0].name`.
    pub fn test_id(&self) -> String {
        let path = self.path();
        if path.is_empty() {
            return "root".to_string();
        }
        let mut out = String::from("root");
        for part in path.split(['.', '[', ']']).filter(|p| !p.is_empty()) {
            out.push('-');
            out.push_str(part);
        }
        out
    }

    pub(crate) fn extension(&self) -> &M::Extension {
        &self.extension
    }

    pub(crate) fn context(&self) -> Option<Rc<TreeContext<M>>> {
        self.context.upgrade()
    }

    pub(crate) fn tree_state(&self) -> Option<Rc<TreeState>> {
        self.context().map(|ctx| Rc::clone(&ctx.state))
    }

    /// Runs `f` against the current model. `None` once the tree is gone.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&M) -> R) -> Option<R> {
        let ctx = self.context()?;
        let result = f(&ctx.model.borrow());
        Some(result)
    }

    /// Whether the node is still part of a live tree.
    pub fn is_alive(&self) -> bool {
        self.read(|m| m.contains(&self.id)).unwrap_or(false)
    }

    pub fn name(&self) -> String {
        self.read(|m| m.name(&self.id)).flatten().unwrap_or_default()
    }

    pub fn kind(&self) -> Option<NodeKind> {
        self.read(|m| m.kind(&self.id)).flatten()
    }

    pub fn is_object(&self) -> bool {
        self.kind() == Some(NodeKind::Object)
    }

    pub fn is_array(&self) -> bool {
        self.kind() == Some(NodeKind::Array)
    }

    pub fn is_primitive(&self) -> bool {
        self.kind() == Some(NodeKind::Primitive)
    }

    pub fn is_foreign_key(&self) -> bool {
        self.kind() == Some(NodeKind::ForeignKey)
    }

    pub fn is_ref(&self) -> bool {
        self.kind() == Some(NodeKind::Ref)
    }

    pub fn is_root(&self) -> bool {
        self.read(|m| m.root_id() == self.id).unwrap_or(false)
    }

    pub fn parent_id(&self) -> Option<NodeId> {
        self.read(|m| m.parent_id(&self.id)).flatten()
    }

    pub fn parent(&self) -> Option<Rc<NodeAccessor<M>>> {
        let parent = self.parent_id()?;
        self.context()?.accessor(&parent)
    }

    /// Current children, re-derived from the model. Each child accessor is
    /// cached, the list itself is not.
    pub fn children(&self) -> Vec<Rc<NodeAccessor<M>>> {
        let Some(ctx) = self.context() else {
            return Vec::new();
        };
        let ids = ctx.model.borrow().child_ids(&self.id);
        ids.iter().filter_map(|id| ctx.accessor(id)).collect()
    }

    pub fn child_count(&self) -> usize {
        self.read(|m| m.child_count(&self.id)).unwrap_or(0)
    }

    pub fn child_at(&self, index: usize) -> Option<Rc<NodeAccessor<M>>> {
        let id = self.read(|m| m.child_ids(&self.id).get(index).cloned()).flatten()?;
        self.context()?.accessor(&id)
    }

    /// Position among the parent's children.
    pub fn index(&self) -> Option<usize> {
        self.read(|m| m.index_in_parent(&self.id)).flatten()
    }

    pub fn path(&self) -> String {
        self.read(|m| m.path_of(&self.id)).unwrap_or_default()
    }

    pub fn plain_value(&self) -> Option<Value> {
        self.read(|m| m.plain_value(&self.id)).flatten()
    }

    pub fn value(&self) -> Option<Scalar> {
        self.read(|m| m.scalar(&self.id)).flatten()
    }

    pub fn is_dirty(&self) -> bool {
        self.read(|m| m.is_dirty(&self.id)).unwrap_or(false)
    }

    pub fn can_remove(&self) -> bool {
        self.read(|m| m.can_remove(&self.id)).unwrap_or(false)
    }

    /// Whether this node is an editable list of items.
    pub fn is_item_list(&self) -> bool {
        self.read(|m| m.is_item_list(&self.id)).unwrap_or(false)
    }

    /// Whether this node is an item of an editable list.
    pub fn is_list_item(&self) -> bool {
        self.read(|m| {
            m.parent_id(&self.id)
                .map(|p| m.is_item_list(&p))
                .unwrap_or(false)
        })
        .unwrap_or(false)
    }

    pub fn state(&self) -> StateView<'_, M> {
        StateView::new(self)
    }

    pub fn layout(&self) -> LayoutView<'_, M> {
        LayoutView::new(self)
    }

    pub fn menu(&self) -> MenuView<'_, M> {
        MenuView::new(self)
    }

    fn mutate(&self, mutation: Mutation) -> Result<Option<NodeId>> {
        self.context().ok_or(TreeError::Detached)?.mutate(mutation)
    }

    fn created(&self, id: Option<NodeId>) -> Result<Rc<NodeAccessor<M>>> {
        let ctx = self.context().ok_or(TreeError::Detached)?;
        let id = id.ok_or(TreeError::Unsupported("mutation did not create a node"))?;
        ctx.accessor(&id).ok_or(TreeError::UnknownNode(id))
    }

    /// Appends an item built from `value` to this array.
    pub fn push_value(&self, value: Value) -> Result<Rc<NodeAccessor<M>>> {
        let id = self.mutate(Mutation::PushItem {
            array: self.id.clone(),
            value,
        })?;
        self.created(id)
    }

    /// Inserts a null item at `index`: appends it, then moves it into
    /// place. Existing items keep their ids.
    pub fn insert_at(&self, index: usize) -> Result<Rc<NodeAccessor<M>>> {
        if !self.is_array() {
            return Err(TreeError::NotAnArray(self.id.clone()));
        }
        let len = self.child_count();
        if index > len {
            return Err(TreeError::out_of_bounds(index, len));
        }
        let item = self.push_value(Value::Null)?;
        let last = len;
        if index < last {
            self.move_item(last, index)?;
        }
        Ok(item)
    }

    pub fn remove_at(&self, index: usize) -> Result<()> {
        self.mutate(Mutation::RemoveAt {
            array: self.id.clone(),
            index,
        })?;
        Ok(())
    }

    /// Moves the item at `from` to `to`. The moved item keeps its id.
    pub fn move_item(&self, from: usize, to: usize) -> Result<()> {
        if from == to {
            return Ok(());
        }
        self.mutate(Mutation::Move {
            array: self.id.clone(),
            from,
            to,
        })?;
        Ok(())
    }

    /// Adds a field named `name` at `index` of this object.
    pub fn insert_field(&self, index: usize, name: &str) -> Result<Rc<NodeAccessor<M>>> {
        let id = self.mutate(Mutation::InsertField {
            object: self.id.clone(),
            index,
            name: name.to_string(),
        })?;
        self.created(id)
    }

    /// Removes this node from its parent.
    pub fn remove(&self) -> Result<()> {
        self.mutate(Mutation::Remove {
            id: self.id.clone(),
        })?;
        Ok(())
    }

    pub fn rename(&self, name: &str) -> Result<()> {
        self.mutate(Mutation::Rename {
            id: self.id.clone(),
            name: name.to_string(),
        })?;
        Ok(())
    }

    pub fn set_value(&self, value: Scalar) -> Result<()> {
        self.mutate(Mutation::SetValue {
            id: self.id.clone(),
            value,
        })?;
        Ok(())
    }

    /// Replaces the node with an empty node of `kind`. The replacement has a
    /// new id, this accessor is dead afterwards.
    pub fn change_kind(&self, kind: NodeKind) -> Result<Rc<NodeAccessor<M>>> {
        let id = self.mutate(Mutation::ChangeKind {
            id: self.id.clone(),
            kind,
        })?;
        self.created(id)
    }
}

impl<M: TreeModel> fmt::Debug for NodeAccessor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeAccessor")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}
