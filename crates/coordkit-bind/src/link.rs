#![forbid(unsafe_code)]

//! Links between widget attributes.
//!
//! A [`Link`] records the listeners that keep two attribute endpoints in
//! sync. The listeners live on the attribute channels, not in the handle: a
//! binding stays active until [`Link::unlink`] removes them, whether or not
//! the handle is still around. Neither widget is owned by a link, so a widget
//! can be dropped while still bound; its channels stay resident until the
//! link is unlinked.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Double unlink | `unlink()` on a disposed link | `Err(LinkError::AlreadyUnlinked)` |
//! | Self link | both endpoints name the same channel | link is created, writes are no-ops |
//! | Handle dropped while live | caller discarded the `Link` | binding stays active and can no longer be unlinked |

use std::fmt;

use serde_json::Value;

use crate::reactive::{ListenerId, Observable};
use crate::widget::{WidgetId, WidgetRef};

/// Errors from link disposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The link was already disposed.
    AlreadyUnlinked { source: Endpoint, target: Endpoint },
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyUnlinked { source, target } => {
                write!(f, "link {source} <-> {target} already unlinked")
            }
        }
    }
}

impl std::error::Error for LinkError {}

/// Transport used to keep the two endpoints in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LinkVariant {
    /// Synchronized by the host process.
    #[default]
    Sync,
    /// Synchronized on the client side of a process boundary. Hosts without
    /// a client propagate it in-process like [`LinkVariant::Sync`].
    ClientSide,
}

impl fmt::Display for LinkVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => f.write_str("sync"),
            Self::ClientSide => f.write_str("client-side"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDirection {
    TwoWay,
    OneWay,
}

/// A `(widget, attribute)` address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub widget: WidgetId,
    pub attribute: String,
}

impl Endpoint {
    #[must_use]
    pub fn new(widget: WidgetId, attribute: impl Into<String>) -> Self {
        Self {
            widget,
            attribute: attribute.into(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.widget, self.attribute)
    }
}

/// Disposable handle for a live binding between two endpoints.
///
/// Dropping the handle does not dispose the binding; only [`Link::unlink`]
/// does.
#[derive(Debug)]
pub struct Link {
    source: Endpoint,
    target: Endpoint,
    variant: LinkVariant,
    direction: LinkDirection,
    listeners: Vec<(Observable<Value>, ListenerId)>,
    live: bool,
}

impl Link {
    /// Two-way binding. `target` takes the current value of `source`.
    #[must_use]
    pub fn two_way(
        source: (&WidgetRef, &str),
        target: (&WidgetRef, &str),
        variant: LinkVariant,
    ) -> Self {
        let (src, dst) = (source.0.attribute(source.1), target.0.attribute(target.1));
        dst.set(src.get());
        let listeners = vec![forward(&src, &dst), forward(&dst, &src)];
        Self::assemble(source, target, variant, LinkDirection::TwoWay, listeners)
    }

    /// One-way binding from `source` into `target`.
    #[must_use]
    pub fn one_way(
        source: (&WidgetRef, &str),
        target: (&WidgetRef, &str),
        variant: LinkVariant,
    ) -> Self {
        let (src, dst) = (source.0.attribute(source.1), target.0.attribute(target.1));
        dst.set(src.get());
        let listeners = vec![forward(&src, &dst)];
        Self::assemble(source, target, variant, LinkDirection::OneWay, listeners)
    }

    fn assemble(
        source: (&WidgetRef, &str),
        target: (&WidgetRef, &str),
        variant: LinkVariant,
        direction: LinkDirection,
        listeners: Vec<(Observable<Value>, ListenerId)>,
    ) -> Self {
        let link = Self {
            source: Endpoint::new(source.0.id(), source.1),
            target: Endpoint::new(target.0.id(), target.1),
            variant,
            direction,
            listeners,
            live: true,
        };
        tracing::trace!(
            source = %link.source,
            target = %link.target,
            variant = %variant,
            "link created"
        );
        link
    }

    /// Break the binding by removing its listeners from both channels.
    pub fn unlink(&mut self) -> Result<(), LinkError> {
        if !self.live {
            return Err(LinkError::AlreadyUnlinked {
                source: self.source.clone(),
                target: self.target.clone(),
            });
        }
        for (channel, id) in self.listeners.drain(..) {
            channel.unsubscribe(id);
        }
        self.live = false;
        tracing::trace!(source = %self.source, target = %self.target, "link disposed");
        Ok(())
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live
    }

    #[must_use]
    pub fn variant(&self) -> LinkVariant {
        self.variant
    }

    #[must_use]
    pub fn direction(&self) -> LinkDirection {
        self.direction
    }

    #[must_use]
    pub fn source(&self) -> &Endpoint {
        &self.source
    }

    #[must_use]
    pub fn target(&self) -> &Endpoint {
        &self.target
    }

    /// Whether either endpoint sits on `widget`.
    #[must_use]
    pub fn touches(&self, widget: WidgetId) -> bool {
        self.source.widget == widget || self.target.widget == widget
    }
}

fn forward(from: &Observable<Value>, to: &Observable<Value>) -> (Observable<Value>, ListenerId) {
    let to = to.clone();
    let id = from.subscribe(move |value| to.set(value.clone()));
    (from.clone(), id)
}

/// Capability to create and dispose links.
///
/// The coordination engine only binds through this trait, so hosts can route
/// [`LinkVariant::ClientSide`] links to their own transport.
pub trait Binder {
    fn bind(&self, a: (&WidgetRef, &str), b: (&WidgetRef, &str), variant: LinkVariant) -> Link;

    fn bind_one_way(
        &self,
        source: (&WidgetRef, &str),
        target: (&WidgetRef, &str),
        variant: LinkVariant,
    ) -> Link;

    fn unlink(&self, link: &mut Link) -> Result<(), LinkError> {
        link.unlink()
    }
}

/// In-process binder over attribute channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservableBinder;

impl Binder for ObservableBinder {
    fn bind(&self, a: (&WidgetRef, &str), b: (&WidgetRef, &str), variant: LinkVariant) -> Link {
        Link::two_way(a, b, variant)
    }

    fn bind_one_way(
        &self,
        source: (&WidgetRef, &str),
        target: (&WidgetRef, &str),
        variant: LinkVariant,
    ) -> Link {
        Link::one_way(source, target, variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{AttrWidget, Widget};
    use serde_json::json;

    fn slider(value: f64) -> WidgetRef {
        AttrWidget::new().with_attribute("value", value).into_ref()
    }

    #[test]
    fn two_way_copies_source_then_syncs_both_directions() {
        let a = slider(1.0);
        let b = slider(9.0);
        let _link = ObservableBinder.bind((&a, "value"), (&b, "value"), LinkVariant::Sync);
        assert_eq!(b.get_attribute("value"), Some(json!(1.0)));

        a.set_attribute("value", json!(2.0));
        assert_eq!(b.get_attribute("value"), Some(json!(2.0)));

        b.set_attribute("value", json!(3.0));
        assert_eq!(a.get_attribute("value"), Some(json!(3.0)));
    }

    #[test]
    fn one_way_does_not_flow_back() {
        let a = slider(1.0);
        let b = slider(0.0);
        let _link = ObservableBinder.bind_one_way((&a, "value"), (&b, "value"), LinkVariant::Sync);

        a.set_attribute("value", json!(5.0));
        assert_eq!(b.get_attribute("value"), Some(json!(5.0)));

        b.set_attribute("value", json!(6.0));
        assert_eq!(a.get_attribute("value"), Some(json!(5.0)));
    }

    #[test]
    fn unlink_stops_sync_and_second_unlink_errors() {
        let a = slider(1.0);
        let b = slider(1.0);
        let mut link = ObservableBinder.bind((&a, "value"), (&b, "value"), LinkVariant::Sync);

        assert!(link.unlink().is_ok());
        assert!(!link.is_live());
        a.set_attribute("value", json!(4.0));
        assert_eq!(b.get_attribute("value"), Some(json!(1.0)));

        let err = ObservableBinder.unlink(&mut link).unwrap_err();
        assert!(err.to_string().contains("already unlinked"));
    }

    #[test]
    fn links_between_different_attribute_names() {
        let a = AttrWidget::new().with_attribute("index", 0).into_ref();
        let b = AttrWidget::new().with_attribute("selected", 0).into_ref();
        let link = Link::two_way((&a, "index"), (&b, "selected"), LinkVariant::ClientSide);
        assert_eq!(link.variant(), LinkVariant::ClientSide);
        assert_eq!(link.direction(), LinkDirection::TwoWay);
        assert_eq!(link.target().attribute, "selected");

        b.set_attribute("selected", json!(3));
        assert_eq!(a.get_attribute("index"), Some(json!(3)));
    }

    #[test]
    fn touches_reports_both_endpoints() {
        let a = slider(0.0);
        let b = slider(0.0);
        let c = slider(0.0);
        let link = Link::two_way((&a, "value"), (&b, "value"), LinkVariant::Sync);
        assert!(link.touches(a.id()));
        assert!(link.touches(b.id()));
        assert!(!link.touches(c.id()));
    }

    #[test]
    fn link_does_not_keep_widget_alive() {
        let a = slider(0.0);
        let b = slider(0.0);
        let weak = std::rc::Rc::downgrade(&b);
        let _link = Link::two_way((&a, "value"), (&b, "value"), LinkVariant::Sync);
        drop(b);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn dropped_handle_keeps_binding_active() {
        let a = slider(0.0);
        let b = slider(0.0);
        let link = ObservableBinder.bind((&a, "value"), (&b, "value"), LinkVariant::Sync);
        drop(link);

        a.set_attribute("value", json!(42));
        assert_eq!(b.get_attribute("value"), Some(json!(42)));
        b.set_attribute("value", json!(43));
        assert_eq!(a.get_attribute("value"), Some(json!(43)));
        assert_eq!(a.attribute("value").listener_count(), 1);
    }

    #[test]
    fn unlink_removes_listeners_from_both_channels() {
        let a = slider(0.0);
        let b = slider(0.0);
        let mut link = Link::two_way((&a, "value"), (&b, "value"), LinkVariant::Sync);
        assert_eq!(a.attribute("value").listener_count(), 1);
        assert_eq!(b.attribute("value").listener_count(), 1);

        link.unlink().unwrap();
        assert_eq!(a.attribute("value").listener_count(), 0);
        assert_eq!(b.attribute("value").listener_count(), 0);
    }
}
