//! Pointer input and the tree container host.
//!
//! The navigation state machine needs to know about mouse presses anywhere
//! in the application: clicking empty space in the tree clears the
//! selection, and clicking inside the tree or an overlay must not pull focus
//! back to the tree container. Instead of a global listener, presses arrive
//! through a [`PointerSource`] that the navigation subscribes to while a
//! container is attached.

use crate::document::model::NodeId;
use crate::reactive::{Emitter, Subscription};

/// A mouse press, already hit-tested by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PointerDown {
    /// The press landed inside the tree container.
    pub inside_container: bool,
    /// The node row under the pointer, if any.
    pub node_id: Option<NodeId>,
    /// The press landed in a menu, listbox or dialog.
    pub in_overlay: bool,
}

impl PointerDown {
    pub fn on_node(id: NodeId) -> Self {
        Self {
            inside_container: true,
            node_id: Some(id),
            in_overlay: false,
        }
    }

    pub fn on_empty_space() -> Self {
        Self {
            inside_container: true,
            node_id: None,
            in_overlay: false,
        }
    }

    pub fn outside() -> Self {
        Self::default()
    }

    pub fn in_overlay() -> Self {
        Self {
            inside_container: false,
            node_id: None,
            in_overlay: true,
        }
    }
}

/// Something that reports pointer presses.
pub trait PointerSource {
    #[must_use = "dropping the subscription detaches the listener"]
    fn on_pointer_down(&self, listener: Box<dyn Fn(&PointerDown)>) -> Subscription;
}

/// In-process pointer source. Front ends call [`PointerEvents::dispatch`]
/// for every press.
#[derive(Clone, Default)]
pub struct PointerEvents {
    emitter: Emitter<PointerDown>,
}

impl PointerEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self, event: PointerDown) {
        self.emitter.emit(&event);
    }

    pub fn listener_count(&self) -> usize {
        self.emitter.listener_count()
    }
}

impl PointerSource for PointerEvents {
    fn on_pointer_down(&self, listener: Box<dyn Fn(&PointerDown)>) -> Subscription {
        self.emitter.subscribe(move |event| listener(event))
    }
}

/// The element that hosts the tree.
pub trait FocusHost {
    /// Gives keyboard focus back to the tree container.
    fn focus_container(&self);

    /// Scrolls the row of `id` into view. Rows that are not rendered are
    /// ignored.
    fn scroll_into_view(&self, id: &NodeId);
}
