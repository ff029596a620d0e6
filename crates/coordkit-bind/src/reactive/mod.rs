#![forbid(unsafe_code)]

//! Change-tracking channels backing widget attributes.
//!
//! - [`Observable`]: shared, version-tracked value with subscriber callbacks.
//! - [`ListenerId`]: token that removes a listener from its channel.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership. The channel holds its listeners strongly; they are removed only
//! through [`Observable::unsubscribe`].
//!
//! # Invariants
//!
//! 1. Version increments exactly once per write that changes the value.
//! 2. Listeners run in registration order.
//! 3. Writing a value equal to the current one is a no-op.

pub mod observable;

pub use observable::{ListenerId, Observable};
