#![forbid(unsafe_code)]

//! Declarative coordination of widget attributes.
//!
//! # Role in coordkit
//! `coordkit-core` decides which widget attributes share state and keeps the
//! links between them consistent across re-coordination. Widgets, attribute
//! channels and links come from `coordkit-bind`.
//!
//! # Primary responsibilities
//! - **CoordinationConfig**: `coordinationSpace` + `viewCoordination`, in the
//!   use-coordination JSON format.
//! - **ViewRegistry**: view ids → widgets, aliases, jslink flags.
//! - **resolver**: per-scope view matching, value assignment and star linking.
//! - **CoordinationContext**: link sessions and widget ownership; one session
//!   per widget, superseded sessions fully disposed.
//! - **Coordination** + builders: the API an application builds against.
//!
//! # Example
//!
//! ```
//! use coordkit_bind::{AttrWidget, Widget};
//! use coordkit_core::{Coordination, CoordinationContext};
//! use serde_json::json;
//! use std::rc::Rc;
//!
//! let a = AttrWidget::new().into_ref();
//! let b = AttrWidget::new().into_ref();
//!
//! let mut c = Coordination::from_json(
//!     r#"{"coordinationSpace":{"zoom":{"z":2}},
//!         "viewCoordination":{"a":{"coordinationScopes":{"zoom":"z"}},
//!                             "b":{"coordinationScopes":{"zoom":"z"}}}}"#,
//! )?;
//! c.register_view("a", Some(Rc::clone(&a)), &[], &[]);
//! c.register_view("b", Some(Rc::clone(&b)), &[], &[]);
//!
//! let mut ctx = CoordinationContext::new();
//! c.commit(&mut ctx);
//! a.set_attribute("zoom", json!(3));
//! assert_eq!(b.get_attribute("zoom"), Some(json!(3)));
//! # Ok::<(), coordkit_core::CoordinationError>(())
//! ```

pub mod builder;
pub mod coordination;
pub mod error;
pub mod model;
pub mod options;
pub mod registry;
pub mod resolver;
pub mod session;

pub use builder::{ScopeBuilder, TypeBuilder, ViewSpec};
pub use coordination::{CommitReport, Coordination};
pub use error::CoordinationError;
pub use model::{CoordinationConfig, CoordinationScope, ViewCoordination};
pub use options::{EngineOptions, EngineOptionsParse, OptionsError};
pub use registry::{View, ViewRegistry};
pub use session::{CoordinationContext, SessionId, Teardown};
