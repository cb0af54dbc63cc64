//! Minimal reactive cells.
//!
//! The editor core only needs two things from a reactive runtime: a value
//! holder that tells its observers when it changes, and a way to stop
//! observing. [`Emitter`] is the listener list, [`Signal`] pairs it with a
//! value, and [`Subscription`] detaches a listener when disposed or dropped.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`), matching the
//! cooperative event loop the editor runs in.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use treeaccess::reactive::Signal;
//!
//! let signal = Signal::new(1);
//! let seen = Rc::new(Cell::new(0));
//! let seen_in_listener = seen.clone();
//! let _sub = signal.subscribe(move |v| seen_in_listener.set(*v));
//!
//! signal.set(5);
//! assert_eq!(seen.get(), 5);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Listener<E> = Rc<dyn Fn(&E)>;

trait Detach {
    fn detach(&self, id: u64);
}

struct EmitterInner<E> {
    listeners: RefCell<Vec<(u64, Listener<E>)>>,
    next_id: Cell<u64>,
}

impl<E> Detach for EmitterInner<E> {
    fn detach(&self, id: u64) {
        self.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
    }
}

/// A list of listeners for events of type `E`.
///
/// Cloning an emitter yields another handle to the same listener list.
pub struct Emitter<E: 'static> {
    inner: Rc<EmitterInner<E>>,
}

impl<E: 'static> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: 'static> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Emitter<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(EmitterInner {
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
            }),
        }
    }

    /// Registers a listener. It stays registered until the returned
    /// subscription is disposed or dropped.
    #[must_use = "dropping the subscription detaches the listener"]
    pub fn subscribe(&self, listener: impl Fn(&E) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));

        let weak: Weak<EmitterInner<E>> = Rc::downgrade(&self.inner);
        let source: Weak<dyn Detach> = weak;
        Subscription {
            source: Some(source),
            id,
        }
    }

    /// Calls every listener registered at the time of the call.
    ///
    /// Listeners run against a snapshot, so they may subscribe, unsubscribe or
    /// emit again without invalidating the iteration.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

/// Handle returned by [`Emitter::subscribe`].
pub struct Subscription {
    source: Option<Weak<dyn Detach>>,
    id: u64,
}

impl Subscription {
    /// Detaches the listener. Calling it twice is a no-op.
    pub fn dispose(&mut self) {
        if let Some(source) = self.source.take().and_then(|w| w.upgrade()) {
            source.detach(self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.source
            .as_ref()
            .map(|w| w.strong_count() > 0)
            .unwrap_or(false)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// A value holder that notifies subscribers when the value changes.
pub struct Signal<T: Clone + PartialEq + 'static> {
    value: Rc<RefCell<T>>,
    changed: Emitter<T>,
}

impl<T: Clone + PartialEq + 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
            changed: self.changed.clone(),
        }
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            changed: Emitter::new(),
        }
    }

    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Stores `value` and notifies subscribers. Returns `false` without
    /// notifying when the value is unchanged.
    pub fn set(&self, value: T) -> bool {
        {
            let mut current = self.value.borrow_mut();
            if *current == value {
                return false;
            }
            *current = value.clone();
        }
        self.changed.emit(&value);
        true
    }

    #[must_use = "dropping the subscription detaches the listener"]
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        self.changed.subscribe(listener)
    }
}

impl<T: Clone + PartialEq + std::fmt::Debug + 'static> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("value", &*self.value.borrow())
            .finish()
    }
}
