#![forbid(unsafe_code)]

//! Nested builder over a [`Coordination`].
//!
//! ```
//! use coordkit_bind::{AttrWidget, Widget};
//! use coordkit_core::{Coordination, CoordinationContext, ViewSpec};
//! use serde_json::json;
//!
//! let slider1 = AttrWidget::new().into_ref();
//! let slider2 = AttrWidget::new().into_ref();
//!
//! let mut ctx = CoordinationContext::new();
//! let mut c = Coordination::new();
//! {
//!     let mut t = c.coordination_type("sliderValue");
//!     let mut s = t.scope("A", 10);
//!     s.view(ViewSpec::widget(&slider1).alias("value")).unwrap();
//!     s.view(ViewSpec::widget(&slider2).alias("value")).unwrap();
//! }
//! c.commit(&mut ctx);
//!
//! slider1.set_attribute("value", json!(20));
//! assert_eq!(slider2.get_attribute("value"), Some(json!(20)));
//! ```
//!
//! The builders only call [`Coordination::set_scope_value`] and
//! [`Coordination::add_view`]; anything they do can be done without them.

use coordkit_bind::{Value, WidgetRef};
use std::rc::Rc;

use crate::coordination::Coordination;
use crate::error::CoordinationError;

/// How a view joins a scope: by widget, by id, or both.
#[derive(Debug, Clone, Default)]
pub struct ViewSpec {
    pub(crate) widget: Option<WidgetRef>,
    pub(crate) id: Option<String>,
    pub(crate) alias: Option<String>,
    pub(crate) jslink: bool,
}

impl ViewSpec {
    /// Empty spec; needs a widget or an id before use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn widget(widget: &WidgetRef) -> Self {
        Self::new().with_widget(widget)
    }

    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::new().with_id(id)
    }

    #[must_use]
    pub fn with_widget(mut self, widget: &WidgetRef) -> Self {
        self.widget = Some(Rc::clone(widget));
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Widget attribute that carries the scope's type.
    #[must_use]
    pub fn alias(mut self, attribute: impl Into<String>) -> Self {
        self.alias = Some(attribute.into());
        self
    }

    /// Prefer client-side links for this view's attribute.
    #[must_use]
    pub fn jslink(mut self, enabled: bool) -> Self {
        self.jslink = enabled;
        self
    }
}

impl Coordination {
    /// Enter a coordination type.
    pub fn coordination_type(&mut self, coordination_type: impl Into<String>) -> TypeBuilder<'_> {
        TypeBuilder {
            coordination: self,
            coordination_type: coordination_type.into(),
            jslink: false,
        }
    }
}

/// Builder for the scopes of one coordination type.
#[derive(Debug)]
pub struct TypeBuilder<'c> {
    coordination: &'c mut Coordination,
    coordination_type: String,
    jslink: bool,
}

impl TypeBuilder<'_> {
    /// Flag every view of every scope of this type for client-side links.
    #[must_use]
    pub fn jslink(mut self, enabled: bool) -> Self {
        self.jslink = enabled;
        self
    }

    /// Set a scope value and enter the scope.
    pub fn scope(&mut self, name: impl Into<String>, value: impl Into<Value>) -> ScopeBuilder<'_> {
        let name = name.into();
        self.coordination
            .set_scope_value(self.coordination_type.as_str(), name.as_str(), value);
        ScopeBuilder {
            coordination: self.coordination,
            coordination_type: &self.coordination_type,
            name,
            jslink: self.jslink,
        }
    }
}

/// Builder for the views of one scope.
#[derive(Debug)]
pub struct ScopeBuilder<'t> {
    coordination: &'t mut Coordination,
    coordination_type: &'t str,
    name: String,
    jslink: bool,
}

impl ScopeBuilder<'_> {
    /// Flag every view of this scope for client-side links.
    #[must_use]
    pub fn jslink(mut self, enabled: bool) -> Self {
        self.jslink = self.jslink || enabled;
        self
    }

    /// Subscribe a view to this scope. Returns its view id.
    pub fn view(&mut self, spec: ViewSpec) -> Result<String, CoordinationError> {
        let jslink = spec.jslink || self.jslink;
        self.coordination
            .add_view(self.coordination_type, &self.name, spec.jslink(jslink))
    }
}
