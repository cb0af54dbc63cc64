//! The owner handle of an editable tree.
//!
//! `EditorTree` keeps the shared context alive. Accessors only hold a weak
//! reference to it, so dropping the last `EditorTree` handle releases the
//! model, and accessors that are still around report themselves detached.

use std::rc::Rc;

use super::accessor::cache::{TreeContext, TreeSettings};
use super::accessor::NodeAccessor;
use super::clipboard::{Clipboard, MemoryClipboard};
use super::navigator::TreeNavigator;
use super::tree_state::TreeState;
use crate::document::model::{Mutation, NodeId, TreeModel};
use crate::error::Result;

pub struct EditorTree<M: TreeModel> {
    context: Rc<TreeContext<M>>,
}

impl<M: TreeModel> Clone for EditorTree<M> {
    fn clone(&self) -> Self {
        Self {
            context: Rc::clone(&self.context),
        }
    }
}

impl<M: TreeModel> EditorTree<M> {
    pub fn new(
        model: M,
        state: Rc<TreeState>,
        clipboard: Rc<dyn Clipboard>,
        settings: TreeSettings,
    ) -> Self {
        Self {
            context: TreeContext::new(model, state, clipboard, settings),
        }
    }

    /// A tree with fresh view state, an in-memory clipboard and default
    /// settings.
    pub fn with_defaults(model: M) -> Self {
        Self::new(
            model,
            Rc::new(TreeState::new()),
            Rc::new(MemoryClipboard::new()),
            TreeSettings::default(),
        )
    }

    pub fn root(&self) -> Rc<NodeAccessor<M>> {
        let root = self.context.model.borrow().root_id();
        self.context
            .cache
            .get_or_create(&root, || NodeAccessor::new(root.clone(), Rc::downgrade(&self.context)))
    }

    /// The accessor of a live node.
    pub fn get(&self, id: &NodeId) -> Option<Rc<NodeAccessor<M>>> {
        self.context.accessor(id)
    }

    pub fn state(&self) -> Rc<TreeState> {
        Rc::clone(&self.context.state)
    }

    pub fn settings(&self) -> TreeSettings {
        self.context.settings
    }

    /// Reads the model.
    pub fn with_model<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        f(&self.context.model.borrow())
    }

    /// Mutates the model directly (for operations outside [`Mutation`]).
    /// Stale accessors and view state are pruned afterwards.
    pub fn update_model<R>(&self, f: impl FnOnce(&mut M) -> R) -> R {
        let result = f(&mut self.context.model.borrow_mut());
        self.context.prune();
        result
    }

    pub fn apply(&self, mutation: Mutation) -> Result<Option<NodeId>> {
        self.context.mutate(mutation)
    }

    /// Runs `f` with a navigator over the current model and view state.
    pub fn navigate<R>(&self, f: impl FnOnce(&TreeNavigator<'_, M>) -> R) -> R {
        let model = self.context.model.borrow();
        let navigator = TreeNavigator::new(&*model, &self.context.state);
        f(&navigator)
    }

    pub fn visible_node_ids(&self) -> Vec<NodeId> {
        self.navigate(|nav| nav.visible_node_ids())
    }

    /// Number of cached accessors.
    pub fn cached_accessors(&self) -> usize {
        self.context.cache.len()
    }
}
