#![forbid(unsafe_code)]

//! Widget collaborator interface.
//!
//! The coordination engine never looks inside a widget. It needs a stable
//! identity to key ownership tables and a channel per named attribute to read,
//! write and link. [`AttrWidget`] is the in-process implementation used by
//! tests and headless hosts.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use crate::reactive::Observable;

static NEXT_WIDGET_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique widget identity.
///
/// Identities are never reused, so a stale key in an ownership table can
/// never alias a newer widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

impl WidgetId {
    /// Allocate a fresh identity.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_WIDGET_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "widget#{}", self.0)
    }
}

/// An addressable object exposing named attributes.
pub trait Widget {
    /// Stable identity, used as a mapping key instead of value equality.
    fn id(&self) -> WidgetId;

    /// The channel behind `name`, created with `null` if it does not exist.
    fn attribute(&self, name: &str) -> Observable<Value>;

    /// Whether `name` has been created on this widget.
    fn has_attribute(&self, name: &str) -> bool;

    fn get_attribute(&self, name: &str) -> Option<Value> {
        self.has_attribute(name)
            .then(|| self.attribute(name).get())
    }

    fn set_attribute(&self, name: &str, value: Value) {
        self.attribute(name).set(value);
    }
}

impl fmt::Debug for dyn Widget + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Shared widget handle.
pub type WidgetRef = Rc<dyn Widget>;

/// Non-owning widget handle.
pub type WeakWidgetRef = Weak<dyn Widget>;

/// Widget whose attributes are plain observable values.
pub struct AttrWidget {
    id: WidgetId,
    attributes: RefCell<HashMap<String, Observable<Value>>>,
}

impl AttrWidget {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: WidgetId::next(),
            attributes: RefCell::new(HashMap::new()),
        }
    }

    /// Seed an attribute value.
    #[must_use]
    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes
            .borrow_mut()
            .insert(name.into(), Observable::new(value.into()));
        self
    }

    /// Wrap into a shared handle.
    #[must_use]
    pub fn into_ref(self) -> WidgetRef {
        Rc::new(self)
    }

    /// Attribute names, sorted.
    #[must_use]
    pub fn attribute_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.attributes.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for AttrWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AttrWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttrWidget")
            .field("id", &self.id)
            .field("attributes", &self.attribute_names())
            .finish()
    }
}

impl Widget for AttrWidget {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn attribute(&self, name: &str) -> Observable<Value> {
        self.attributes
            .borrow_mut()
            .entry(name.to_string())
            .or_insert_with(|| Observable::new(Value::Null))
            .clone()
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attributes.borrow().contains_key(name)
    }
}
