//! Keyboard navigation over the visible tree.
//!
//! `KeyboardNavigation` is a two-state machine. In [`NavMode::TreeNav`] it
//! turns keys into active-node movement, expand/collapse, insertion and
//! deletion. In [`NavMode::EditName`] an inline editor owns the keyboard and
//! every key is ignored.
//!
//! The mode is never switched by a key. It follows the `focused` flag of the
//! active node: when that flag turns on the machine enters `EditName`, when
//! it turns off the machine returns to `TreeNav` and hands focus back to the
//! tree container on the next tick. The hand-back is skipped when the focus
//! loss came from a pointer press inside the tree or inside an overlay.
//!
//! | Key | Effect |
//! |---|---|
//! | Down, Tab | next visible node (clamped) |
//! | Up, Shift+Tab | previous visible node (clamped) |
//! | Right | expand a collapsed container, else go to its first child |
//! | Left | collapse an expanded container, else go to its parent |
//! | Space | toggle expansion |
//! | Enter, F2, `i` | request focus (start editing) |
//! | Insert | add an unnamed field inside an object or after the active field, or reselect a pending one |
//! | Delete, Backspace | remove the active node, select its neighbour |
//! | Escape | drop an abandoned unnamed field, else clear the selection |

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use log::{debug, warn};

use super::mode::NavMode;
use super::tree::EditorTree;
use super::tree_state::StateFlag;
use crate::document::model::{NodeId, TreeModel};
use crate::editor::accessor::NodeAccessor;
use crate::error::TreeError;
use crate::input::keys::{Key, KeyInput};
use crate::input::pointer::{FocusHost, PointerDown, PointerSource};
use crate::reactive::Subscription;
use crate::scheduler::{Scheduler, TimerId};

pub struct KeyboardNavigation<M: TreeModel + 'static> {
    inner: Rc<NavInner<M>>,
}

struct NavInner<M: TreeModel + 'static> {
    tree: EditorTree<M>,
    scheduler: Rc<dyn Scheduler>,
    pointer: Rc<dyn PointerSource>,
    mode: Cell<NavMode>,
    skip_next_escape: Cell<bool>,
    skip_refocus: Cell<bool>,
    flag_reset: Cell<Option<TimerId>>,
    refocus: Cell<Option<TimerId>>,
    last_active: RefCell<Option<NodeId>>,
    container: RefCell<Option<Rc<dyn FocusHost>>>,
    pointer_subscription: RefCell<Option<Subscription>>,
    subscriptions: RefCell<Vec<Subscription>>,
    disposed: Cell<bool>,
}

#[derive(Clone, Copy)]
enum Step {
    Next,
    Previous,
}

/// Non-root containers expand and collapse from the keyboard, empty or not.
fn is_branch<M: TreeModel>(node: &NodeAccessor<M>) -> bool {
    !node.is_root() && node.kind().map(|k| k.is_container()).unwrap_or(false)
}

impl<M: TreeModel + 'static> KeyboardNavigation<M> {
    pub fn new(
        tree: EditorTree<M>,
        scheduler: Rc<dyn Scheduler>,
        pointer: Rc<dyn PointerSource>,
    ) -> Self {
        let inner = Rc::new(NavInner {
            tree,
            scheduler,
            pointer,
            mode: Cell::new(NavMode::TreeNav),
            skip_next_escape: Cell::new(false),
            skip_refocus: Cell::new(false),
            flag_reset: Cell::new(None),
            refocus: Cell::new(None),
            last_active: RefCell::new(None),
            container: RefCell::new(None),
            pointer_subscription: RefCell::new(None),
            subscriptions: RefCell::new(Vec::new()),
            disposed: Cell::new(false),
        });

        let state = inner.tree.state();
        *inner.last_active.borrow_mut() = state.active_node_id();

        let weak = Rc::downgrade(&inner);
        let on_active = state.subscribe_active(move |active| {
            if let Some(inner) = weak.upgrade() {
                if active.is_some() {
                    *inner.last_active.borrow_mut() = active.clone();
                }
                inner.sync_mode();
            }
        });
        let weak = Rc::downgrade(&inner);
        let on_focus = state.subscribe(move |change| {
            if change.flag != StateFlag::Focused {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                inner.sync_mode();
            }
        });
        inner.subscriptions.borrow_mut().extend([on_active, on_focus]);
        inner.sync_mode();

        Self { inner }
    }

    pub fn mode(&self) -> NavMode {
        self.inner.mode.get()
    }

    pub fn tree(&self) -> &EditorTree<M> {
        &self.inner.tree
    }

    /// Attaches (or with `None` detaches) the tree container. While a
    /// container is attached the navigation listens to pointer presses.
    pub fn set_container(&self, host: Option<Rc<dyn FocusHost>>) {
        let inner = &self.inner;
        if inner.disposed.get() {
            return;
        }
        match host {
            Some(host) => {
                *inner.container.borrow_mut() = Some(host);
                if inner.pointer_subscription.borrow().is_none() {
                    let weak = Rc::downgrade(inner);
                    let subscription = inner.pointer.on_pointer_down(Box::new(move |event| {
                        if let Some(inner) = weak.upgrade() {
                            inner.on_pointer_down(event);
                        }
                    }));
                    *inner.pointer_subscription.borrow_mut() = Some(subscription);
                }
            }
            None => {
                *inner.container.borrow_mut() = None;
                inner.pointer_subscription.borrow_mut().take();
                inner.cancel_timer(&inner.refocus);
            }
        }
    }

    /// Handles a key. Returns `true` when the key belongs to the tree
    /// navigation (even if it changed nothing), `false` in edit mode or for
    /// unrelated keys.
    pub fn handle_key(&self, input: KeyInput) -> bool {
        if self.inner.disposed.get() || self.inner.mode.get() != NavMode::TreeNav {
            return false;
        }
        self.inner.handle_key(input)
    }

    /// Makes a freshly inserted node active.
    pub fn handle_node_added(&self, id: &NodeId) {
        self.inner.select(id.clone());
    }

    /// Follows a node whose id changed (e.g. after a kind change).
    pub fn handle_node_replaced(&self, old: &NodeId, new: &NodeId) {
        let inner = &self.inner;
        let state = inner.tree.state();
        let active = state.active_node_id();
        let tracked = active.as_ref() == Some(old)
            || (active.is_none() && inner.last_active.borrow().as_ref() == Some(old));
        if tracked {
            state.set_active_node_id(Some(new.clone()));
        }
        if inner.mode.get() == NavMode::EditName {
            inner.set_mode(NavMode::TreeNav);
            inner.schedule_refocus();
        }
    }

    /// Detaches every listener and cancels pending timers. Safe to call
    /// more than once.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }
}

impl<M: TreeModel + 'static> Drop for KeyboardNavigation<M> {
    fn drop(&mut self) {
        self.inner.dispose();
    }
}

impl<M: TreeModel + 'static> NavInner<M> {
    fn set_mode(&self, mode: NavMode) {
        if self.mode.get() != mode {
            debug!("Navigation mode {} -> {}", self.mode.get(), mode);
            self.mode.set(mode);
        }
    }

    fn sync_mode(self: &Rc<Self>) {
        if self.disposed.get() {
            return;
        }
        let state = self.tree.state();
        let editing = state
            .active_node_id()
            .map(|id| state.is_focused(&id))
            .unwrap_or(false);
        match (self.mode.get(), editing) {
            (NavMode::TreeNav, true) => self.set_mode(NavMode::EditName),
            (NavMode::EditName, false) => {
                self.set_mode(NavMode::TreeNav);
                self.schedule_refocus();
            }
            _ => {}
        }
    }

    fn cancel_timer(&self, slot: &Cell<Option<TimerId>>) {
        if let Some(id) = slot.take() {
            self.scheduler.cancel(id);
        }
    }

    fn schedule_refocus(self: &Rc<Self>) {
        if self.skip_refocus.get() {
            debug!("Refocus suppressed by pointer press");
            return;
        }
        self.cancel_timer(&self.refocus);
        let weak = Rc::downgrade(self);
        let id = self.scheduler.schedule(
            Duration::ZERO,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.refocus.set(None);
                    let host = inner.container.borrow().clone();
                    if let Some(host) = host {
                        host.focus_container();
                    }
                }
            }),
        );
        self.refocus.set(Some(id));
    }

    fn on_pointer_down(self: &Rc<Self>, event: &PointerDown) {
        if event.inside_container {
            self.skip_next_escape.set(true);
        }
        if event.inside_container || event.in_overlay {
            self.skip_refocus.set(true);
            self.cancel_timer(&self.flag_reset);
            let weak = Rc::downgrade(self);
            let id = self.scheduler.schedule(
                Duration::ZERO,
                Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.flag_reset.set(None);
                        inner.skip_next_escape.set(false);
                        inner.skip_refocus.set(false);
                    }
                }),
            );
            self.flag_reset.set(Some(id));
        }
        if event.inside_container && event.node_id.is_none() && !event.in_overlay {
            self.tree.state().set_active_node_id(None);
        }
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.subscriptions.borrow_mut().clear();
        self.pointer_subscription.borrow_mut().take();
        self.cancel_timer(&self.refocus);
        self.cancel_timer(&self.flag_reset);
        *self.container.borrow_mut() = None;
    }

    fn select(&self, id: NodeId) {
        self.tree.state().set_active_node_id(Some(id.clone()));
        let host = self.container.borrow().clone();
        if let Some(host) = host {
            self.tree.navigate(|nav| nav.scroll_to_node(&*host, &id));
        }
    }

    /// The active node, if it is still in the tree.
    fn active(&self) -> Option<NodeId> {
        self.tree
            .state()
            .active_node_id()
            .filter(|id| self.tree.get(id).is_some())
    }

    fn select_first(&self) -> bool {
        if let Some(first) = self.tree.visible_node_ids().into_iter().next() {
            self.select(first);
        }
        true
    }

    fn handle_key(self: &Rc<Self>, input: KeyInput) -> bool {
        match (input.key, input.shift) {
            (Key::Down, _) | (Key::Tab, false) => self.step(Step::Next),
            (Key::Up, _) | (Key::Tab, true) => self.step(Step::Previous),
            (Key::Right, _) => self.arrow_right(),
            (Key::Left, _) => self.arrow_left(),
            (Key::Space, _) => self.toggle(),
            (Key::Enter, _) | (Key::F2, _) | (Key::Char('i'), _) => self.edit(),
            (Key::Insert, _) => self.insert(),
            (Key::Delete, _) | (Key::Backspace, _) => self.delete(),
            (Key::Escape, _) => self.escape(),
            _ => false,
        }
    }

    fn step(&self, step: Step) -> bool {
        let Some(active) = self.active() else {
            return self.select_first();
        };
        let target = self.tree.navigate(|nav| match step {
            Step::Next => nav.next_visible(&active),
            Step::Previous => nav.previous_visible(&active),
        });
        match target {
            Some(target) if target != active => self.select(target),
            Some(_) => {}
            None => {
                self.select_first();
            }
        }
        true
    }

    fn arrow_right(&self) -> bool {
        let Some(active) = self.active() else {
            return self.select_first();
        };
        let Some(node) = self.tree.get(&active) else {
            return true;
        };
        if is_branch(&node) && !node.state().is_expanded() {
            node.state().expand();
        } else if let Some(child) = self.tree.navigate(|nav| nav.first_child_id(&active)) {
            self.select(child);
        }
        true
    }

    fn arrow_left(&self) -> bool {
        let Some(active) = self.active() else {
            return self.select_first();
        };
        let Some(node) = self.tree.get(&active) else {
            return true;
        };
        if is_branch(&node) && node.state().is_expanded() {
            node.state().collapse();
        } else if let Some(parent) = self.tree.navigate(|nav| nav.find_parent_id(&active)) {
            self.select(parent);
        }
        true
    }

    fn toggle(&self) -> bool {
        if let Some(node) = self.active().and_then(|id| self.tree.get(&id)) {
            if is_branch(&node) {
                node.state().toggle_expanded();
            }
        }
        true
    }

    fn edit(&self) -> bool {
        if let Some(active) = self.active() {
            self.tree.state().request_focus(&active);
        }
        true
    }

    fn insert(&self) -> bool {
        let Some(node) = self.active().and_then(|id| self.tree.get(&id)) else {
            return true;
        };
        let (object, index) = if node.is_object() {
            node.state().expand();
            (node, 0)
        } else {
            match (node.parent(), node.index()) {
                (Some(parent), Some(index)) if parent.is_object() => (parent, index + 1),
                _ => return true,
            }
        };
        let target = match object.insert_field(index, "") {
            Ok(field) => Some(field.id().clone()),
            // An unnamed field is already waiting for a name.
            Err(TreeError::DuplicateName(_)) => object
                .children()
                .into_iter()
                .find(|child| child.name().is_empty())
                .map(|child| child.id().clone()),
            Err(e) => {
                warn!("Insert failed: {}", e);
                None
            }
        };
        if let Some(id) = target {
            self.select(id.clone());
            self.tree.state().request_focus(&id);
        }
        true
    }

    fn delete(&self) -> bool {
        let Some(node) = self.active().and_then(|id| self.tree.get(&id)) else {
            return true;
        };
        if !node.can_remove() {
            return true;
        }
        let index = self
            .tree
            .visible_node_ids()
            .iter()
            .position(|id| id == node.id())
            .unwrap_or(0);
        if let Err(e) = node.remove() {
            warn!("Delete failed: {}", e);
            return true;
        }
        let visible = self.tree.visible_node_ids();
        match visible.len() {
            0 => self.tree.state().set_active_node_id(None),
            len => self.select(visible[index.min(len - 1)].clone()),
        }
        true
    }

    fn escape(&self) -> bool {
        if self.skip_next_escape.replace(false) {
            debug!("Escape swallowed after pointer press");
            return true;
        }
        if let Some(node) = self.active().and_then(|id| self.tree.get(&id)) {
            if !node.is_root() && node.name().is_empty() && node.can_remove() {
                match node.remove() {
                    Ok(()) => return true,
                    Err(e) => warn!("Could not drop unnamed field: {}", e),
                }
            }
        }
        self.tree.state().set_active_node_id(None);
        true
    }
}
