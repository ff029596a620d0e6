#![forbid(unsafe_code)]

//! Binding primitive for coordkit.
//!
//! # Role in coordkit
//! `coordkit-bind` is the layer the coordination engine treats as an external
//! collaborator: addressable widgets with named attributes, and disposable
//! links that keep two attributes in sync.
//!
//! # Primary responsibilities
//! - **Observable**: version-tracked attribute channel with listeners.
//! - **Widget**: identity plus named attribute channels ([`AttrWidget`] is the
//!   in-process implementation).
//! - **Link / Binder**: two-way and one-way bindings in a default or a
//!   client-side variant, disposed explicitly with `unlink()`.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`).

pub mod link;
pub mod reactive;
pub mod widget;

pub use link::{Binder, Endpoint, Link, LinkDirection, LinkError, LinkVariant, ObservableBinder};
pub use reactive::{ListenerId, Observable};
pub use serde_json::Value;
pub use widget::{AttrWidget, WeakWidgetRef, Widget, WidgetId, WidgetRef};
