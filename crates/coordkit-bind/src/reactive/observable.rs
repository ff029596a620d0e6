#![forbid(unsafe_code)]

//! Version-tracked attribute channel with change notification.
//!
//! # Design
//!
//! Every widget attribute is backed by an [`Observable<T>`]: shared,
//! reference-counted storage (`Rc<RefCell<..>>`) holding the current value.
//! Links register listeners on one channel that write into another, so a
//! change on any endpoint fans out through the link graph.
//!
//! The channel owns its listeners. A listener stays registered until
//! [`Observable::unsubscribe`] is called with the [`ListenerId`] returned by
//! [`Observable::subscribe`]; losing the id does not remove it.
//!
//! # Performance
//!
//! | Operation       | Complexity               |
//! |-----------------|--------------------------|
//! | `get()`         | O(1) + clone of `T`      |
//! | `set()`         | O(L) where L = listeners |
//! | `subscribe()`   | O(1) amortized           |
//! | `unsubscribe()` | O(L)                     |
//!
//! # Failure Modes
//!
//! - **Cyclic links**: a write that travels around a link cycle comes back
//!   with an equal value and stops there, because equal writes are no-ops.
//!   Listeners that transform values are not supported for that reason.
//! - **Retained channels**: a listener that captures another channel keeps
//!   that channel alive until it is unsubscribed.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Listener<T> = Rc<dyn Fn(&T)>;

/// Removal token for a listener registered with [`Observable::subscribe`].
///
/// Tokens are unique per channel and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

struct Slot<T> {
    value: T,
    version: u64,
    listeners: Vec<(ListenerId, Listener<T>)>,
    next_listener: u64,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning an `Observable` yields another handle to the **same** channel.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each value-changing write.
/// 2. `set(v)` where `v == current` is a no-op.
/// 3. Listeners run in registration order.
/// 4. A listener runs on every change until it is unsubscribed.
pub struct Observable<T> {
    slot: Rc<RefCell<Slot<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("Observable")
            .field("value", &slot.value)
            .field("version", &slot.version)
            .field("listeners", &slot.listeners.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create a channel holding `value` at version 0.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot {
                value,
                version: 0,
                listeners: Vec::new(),
                next_listener: 0,
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.slot.borrow().value.clone()
    }

    /// Write a value. Unequal values bump the version and run every listener.
    pub fn set(&self, value: T) {
        let listeners: Vec<Listener<T>> = {
            let mut slot = self.slot.borrow_mut();
            if slot.value == value {
                return;
            }
            slot.value = value;
            slot.version += 1;
            slot.listeners.iter().map(|(_, l)| Rc::clone(l)).collect()
        };
        // No borrow is held here: a listener may write back into this
        // channel through a link.
        let current = self.get();
        for listener in &listeners {
            listener(&current);
        }
    }

    /// Register a change listener and return its removal token.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> ListenerId {
        let mut slot = self.slot.borrow_mut();
        let id = ListenerId(slot.next_listener);
        slot.next_listener += 1;
        slot.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` when `id` is not registered.
    ///
    /// A listener removed while a write is being delivered still sees that
    /// write.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut slot = self.slot.borrow_mut();
        let before = slot.listeners.len();
        slot.listeners.retain(|(lid, _)| *lid != id);
        slot.listeners.len() != before
    }

    /// Number of value-changing writes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.slot.borrow().version
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.slot.borrow().listeners.len()
    }

    /// `true` when both handles point at the same channel.
    #[must_use]
    pub fn same_channel(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}
