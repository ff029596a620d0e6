#![forbid(unsafe_code)]

//! Scope resolution: which views share a scope, and how they are linked.
//!
//! # Linking policy
//!
//! The first matched view is the anchor. Every other matched view is linked
//! to the anchor alone, so a scope with `k` views produces exactly `k - 1`
//! links:
//!
//! ```text
//!          view_2
//!            │
//! view_3 ── anchor ── view_4
//! ```
//!
//! A pair uses [`LinkVariant::ClientSide`] only when both the anchor and the
//! other view flag their resolved attribute for jslinking.
//!
//! # Skips
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | view id not in the registry | skipped, `debug` event |
//! | view registered without widget | skipped, `debug` event |
//! | scope with no subscribers | no assignment, no link |
//! | scope with one subscriber | value assigned, no link |

use coordkit_bind::{Binder, Link, LinkVariant, Value, Widget, WidgetRef};

use crate::model::{CoordinationConfig, CoordinationScope};
use crate::registry::ViewRegistry;

/// A view matched to a scope, with its resolved attribute.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedView<'a> {
    pub view_id: &'a str,
    pub widget: &'a WidgetRef,
    pub attribute: &'a str,
    pub jslink: bool,
}

/// Views subscribed to `(coordination_type, name)` that have a widget, in
/// `viewCoordination` order.
pub fn resolve_views<'a>(
    config: &'a CoordinationConfig,
    registry: &'a ViewRegistry,
    coordination_type: &'a str,
    name: &'a str,
) -> Vec<ResolvedView<'a>> {
    config
        .subscribers(coordination_type, name)
        .filter_map(|view_id| {
            let Some(view) = registry.get(view_id) else {
                tracing::debug!(view_id, coordination_type, name, "view not registered; skipped");
                return None;
            };
            let Some(widget) = view.widget() else {
                tracing::debug!(view_id, coordination_type, name, "view has no widget; skipped");
                return None;
            };
            let attribute = view.field_for(coordination_type);
            Some(ResolvedView {
                view_id,
                widget,
                attribute,
                jslink: view.is_jslinked(attribute),
            })
        })
        .collect()
}

/// Assign the scope value to every matched view and link them to the anchor.
pub fn resolve_scope(
    config: &CoordinationConfig,
    registry: &ViewRegistry,
    scope: &CoordinationScope,
    binder: &dyn Binder,
) -> Vec<Link> {
    let resolved = resolve_views(config, registry, &scope.coordination_type, &scope.name);
    if resolved.is_empty() {
        tracing::trace!(
            coordination_type = %scope.coordination_type,
            name = %scope.name,
            "scope has no subscribers"
        );
        return Vec::new();
    }
    for view in &resolved {
        apply_value(view, &scope.value);
    }
    link_to_anchor(&resolved, binder)
}

/// Resolve every scope of `config`, in insertion order.
pub fn resolve_all(
    config: &CoordinationConfig,
    registry: &ViewRegistry,
    binder: &dyn Binder,
) -> Vec<Link> {
    config
        .scopes()
        .flat_map(|scope| resolve_scope(config, registry, &scope, binder))
        .collect()
}

fn apply_value(view: &ResolvedView<'_>, value: &Value) {
    view.widget.set_attribute(view.attribute, value.clone());
}

fn link_to_anchor(resolved: &[ResolvedView<'_>], binder: &dyn Binder) -> Vec<Link> {
    let Some((anchor, rest)) = resolved.split_first() else {
        return Vec::new();
    };
    rest.iter()
        .map(|view| {
            let variant = if anchor.jslink && view.jslink {
                LinkVariant::ClientSide
            } else {
                LinkVariant::Sync
            };
            binder.bind(
                (anchor.widget, anchor.attribute),
                (view.widget, view.attribute),
                variant,
            )
        })
        .collect()
}
