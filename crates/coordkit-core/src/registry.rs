#![forbid(unsafe_code)]

//! View registry: view id → widget handle, aliases and jslink flags.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use coordkit_bind::{Widget, WidgetId, WidgetRef};
use indexmap::IndexMap;

/// A registered view.
///
/// A view without a widget is known by id only (declared before its widget
/// exists) and is skipped during resolution.
#[derive(Clone, Default)]
pub struct View {
    widget: Option<WidgetRef>,
    /// coordination type → attribute name on the widget.
    aliases: IndexMap<String, String>,
    /// Attributes that prefer client-side links.
    jslinks: BTreeSet<String>,
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("widget", &self.widget.as_ref().map(|w| w.id()))
            .field("aliases", &self.aliases)
            .field("jslinks", &self.jslinks)
            .finish()
    }
}

impl View {
    #[must_use]
    pub fn new(widget: Option<WidgetRef>) -> Self {
        Self {
            widget,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn widget(&self) -> Option<&WidgetRef> {
        self.widget.as_ref()
    }

    /// Map `coordination_type` onto `attribute` of the widget.
    pub fn alias(
        &mut self,
        coordination_type: impl Into<String>,
        attribute: impl Into<String>,
    ) -> &mut Self {
        self.aliases
            .insert(coordination_type.into(), attribute.into());
        self
    }

    /// Mark `attribute` as eligible for client-side links.
    pub fn jslink(&mut self, attribute: impl Into<String>) -> &mut Self {
        self.jslinks.insert(attribute.into());
        self
    }

    /// Attribute that carries `coordination_type`; the type name itself when
    /// no alias is set.
    #[must_use]
    pub fn field_for<'a>(&'a self, coordination_type: &'a str) -> &'a str {
        self.aliases
            .get(coordination_type)
            .map_or(coordination_type, String::as_str)
    }

    #[must_use]
    pub fn is_jslinked(&self, attribute: &str) -> bool {
        self.jslinks.contains(attribute)
    }

    #[must_use]
    pub fn aliases(&self) -> &IndexMap<String, String> {
        &self.aliases
    }

    pub fn jslinks(&self) -> impl Iterator<Item = &str> {
        self.jslinks.iter().map(String::as_str)
    }
}

/// Views of one coordination, in registration order.
#[derive(Debug, Clone)]
pub struct ViewRegistry {
    views: IndexMap<String, View>,
    prefix: String,
    next_ordinal: u64,
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::with_prefix("view_")
    }
}

impl ViewRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry minting ids as `<prefix><n>`.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            views: IndexMap::new(),
            prefix: prefix.into(),
            next_ordinal: 0,
        }
    }

    /// Register or update a view.
    ///
    /// Aliases and jslink flags merge into an existing entry. A `None` widget
    /// keeps the widget already bound to `view_id`; a new widget replaces it.
    pub fn register_view(
        &mut self,
        view_id: impl Into<String>,
        widget: Option<WidgetRef>,
        aliases: &[(&str, &str)],
        jslinks: &[&str],
    ) -> &mut View {
        let view = self.views.entry(view_id.into()).or_default();
        if widget.is_some() {
            view.widget = widget;
        }
        for (coordination_type, attribute) in aliases {
            view.alias(*coordination_type, *attribute);
        }
        for attribute in jslinks {
            view.jslink(*attribute);
        }
        view
    }

    /// Id under which `widget` is registered, compared by identity.
    #[must_use]
    pub fn find_by_widget(&self, widget: WidgetId) -> Option<&str> {
        self.views
            .iter()
            .find(|(_, view)| view.widget.as_ref().is_some_and(|w| w.id() == widget))
            .map(|(view_id, _)| view_id.as_str())
    }

    /// Registered id of `widget`, or a fresh `<prefix><n>` id.
    ///
    /// Fresh ids skip anything already registered or reported by `is_taken`.
    /// Minting does not register the widget.
    pub fn resolve_or_create_view_id(
        &mut self,
        widget: &WidgetRef,
        is_taken: impl Fn(&str) -> bool,
    ) -> String {
        if let Some(view_id) = self.find_by_widget(widget.id()) {
            return view_id.to_string();
        }
        loop {
            let candidate = format!("{}{}", self.prefix, self.next_ordinal);
            self.next_ordinal += 1;
            if !self.views.contains_key(&candidate) && !is_taken(&candidate) {
                return candidate;
            }
        }
    }

    #[must_use]
    pub fn get(&self, view_id: &str) -> Option<&View> {
        self.views.get(view_id)
    }

    pub fn get_mut(&mut self, view_id: &str) -> Option<&mut View> {
        self.views.get_mut(view_id)
    }

    /// Views with a bound widget, in registration order.
    pub fn attached(&self) -> impl Iterator<Item = (&str, &WidgetRef)> {
        self.views
            .iter()
            .filter_map(|(view_id, view)| view.widget.as_ref().map(|w| (view_id.as_str(), w)))
    }

    /// Distinct attached widgets, in registration order.
    #[must_use]
    pub fn widgets(&self) -> Vec<WidgetRef> {
        let mut seen = BTreeSet::new();
        self.attached()
            .filter(|(_, w)| seen.insert(w.id()))
            .map(|(_, w)| Rc::clone(w))
            .collect()
    }

    /// Number of attached views.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attached().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attached().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coordkit_bind::AttrWidget;
    use serde_json::json;

    fn widget() -> WidgetRef {
        AttrWidget::new().into_ref()
    }

    #[test]
    fn field_defaults_to_type_name() {
        let mut view = View::new(None);
        assert_eq!(view.field_for("sliderValue"), "sliderValue");
        view.alias("sliderValue", "value");
        assert_eq!(view.field_for("sliderValue"), "value");
    }

    #[test]
    fn reregistration_merges_and_keeps_widget() {
        let mut registry = ViewRegistry::new();
        let w = widget();
        registry.register_view("v", Some(Rc::clone(&w)), &[("a", "x")], &[]);
        registry.register_view("v", None, &[("b", "y")], &["y"]);

        let view = registry.get("v").unwrap();
        assert_eq!(view.widget().map(|w| w.id()), Some(w.id()));
        assert_eq!(view.field_for("a"), "x");
        assert_eq!(view.field_for("b"), "y");
        assert!(view.is_jslinked("y"));
        assert!(!view.is_jslinked("x"));
    }

    #[test]
    fn get_mut_edits_view_in_place() {
        let mut registry = ViewRegistry::new();
        registry.register_view("v", Some(widget()), &[("zoom", "level")], &["level"]);
        registry
            .get_mut("v")
            .unwrap()
            .alias("pan", "offset")
            .jslink("offset");
        assert!(registry.get_mut("missing").is_none());

        let view = registry.get("v").unwrap();
        let aliases: Vec<(&str, &str)> = view
            .aliases()
            .iter()
            .map(|(t, a)| (t.as_str(), a.as_str()))
            .collect();
        assert_eq!(aliases, vec![("zoom", "level"), ("pan", "offset")]);
        assert_eq!(view.jslinks().collect::<Vec<_>>(), vec!["level", "offset"]);
    }

    #[test]
    fn new_widget_replaces_old() {
        let mut registry = ViewRegistry::new();
        let first = widget();
        let second = widget();
        registry.register_view("v", Some(first), &[], &[]);
        registry.register_view("v", Some(Rc::clone(&second)), &[], &[]);
        assert_eq!(registry.get("v").unwrap().widget().unwrap().id(), second.id());
    }

    #[test]
    fn minted_ids_increment() {
        let mut registry = ViewRegistry::new();
        let a = widget();
        let b = widget();
        let id_a = registry.resolve_or_create_view_id(&a, |_| false);
        registry.register_view(id_a.clone(), Some(a), &[], &[]);
        let id_b = registry.resolve_or_create_view_id(&b, |_| false);
        assert_eq!(id_a, "view_0");
        assert_eq!(id_b, "view_1");
    }

    #[test]
    fn lookup_is_by_identity_not_value() {
        let mut registry = ViewRegistry::new();
        let a = AttrWidget::new().with_attribute("value", 1).into_ref();
        let twin = AttrWidget::new().with_attribute("value", 1).into_ref();
        let id = registry.resolve_or_create_view_id(&a, |_| false);
        registry.register_view(id.clone(), Some(Rc::clone(&a)), &[], &[]);

        a.set_attribute("value", json!(99));
        assert_eq!(registry.resolve_or_create_view_id(&a, |_| false), id);
        assert_ne!(registry.resolve_or_create_view_id(&twin, |_| false), id);
    }

    #[test]
    fn minting_skips_taken_ids() {
        let mut registry = ViewRegistry::with_prefix("p");
        registry.register_view("p0", Some(widget()), &[], &[]);
        let id = registry.resolve_or_create_view_id(&widget(), |candidate| candidate == "p1");
        assert_eq!(id, "p2");
    }

    #[test]
    fn unattached_views_do_not_count() {
        let mut registry = ViewRegistry::new();
        registry.register_view("declared", None, &[("t", "x")], &[]);
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        registry.register_view("declared", Some(widget()), &[], &[]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn widgets_are_deduplicated() {
        let mut registry = ViewRegistry::new();
        let w = widget();
        registry.register_view("a", Some(Rc::clone(&w)), &[], &[]);
        registry.register_view("b", Some(Rc::clone(&w)), &[], &[]);
        registry.register_view("c", Some(widget()), &[], &[]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.widgets().len(), 2);
    }
}
