#![forbid(unsafe_code)]

//! A coordination instance: configuration plus views, committed as a unit.
//!
//! A [`Coordination`] is built incrementally (directly or through the
//! builder in [`crate::builder`]) and then committed against a
//! [`CoordinationContext`]. Commit order:
//!
//! 1. no attached views → no-op, the context is not touched;
//! 2. sweep dropped widgets when `reclaim_on_commit` is set;
//! 3. dispose every session owning one of this coordination's widgets;
//! 4. resolve every scope and create the links;
//! 5. record the links under a fresh session;
//! 6. tag every widget with that session.
//!
//! Steps 3–6 run without yielding, so no widget is ever bound by two
//! sessions.

use std::path::Path;

use coordkit_bind::{Value, WidgetRef};

use crate::builder::ViewSpec;
use crate::error::CoordinationError;
use crate::model::CoordinationConfig;
use crate::options::EngineOptions;
use crate::registry::{View, ViewRegistry};
use crate::resolver;
use crate::session::{CoordinationContext, SessionId};

/// What a commit did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// New session, `None` when the commit was a no-op.
    pub session: Option<SessionId>,
    pub links_created: usize,
    pub sessions_superseded: usize,
    pub links_disposed: usize,
    pub widgets_reclaimed: usize,
}

/// Configuration and views of one coordination activation.
#[derive(Debug, Clone, Default)]
pub struct Coordination {
    config: CoordinationConfig,
    views: ViewRegistry,
}

impl Coordination {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: &EngineOptions) -> Self {
        Self {
            config: CoordinationConfig::default(),
            views: ViewRegistry::with_prefix(options.view_id_prefix.clone()),
        }
    }

    #[must_use]
    pub fn from_config(config: CoordinationConfig) -> Self {
        Self::new().with_config(config)
    }

    /// Replace the configuration, keeping registered views.
    #[must_use]
    pub fn with_config(mut self, config: CoordinationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn from_json(text: &str) -> Result<Self, CoordinationError> {
        CoordinationConfig::from_json(text).map(Self::from_config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoordinationError> {
        CoordinationConfig::from_path(path).map(Self::from_config)
    }

    #[must_use]
    pub fn config(&self) -> &CoordinationConfig {
        &self.config
    }

    #[must_use]
    pub fn views(&self) -> &ViewRegistry {
        &self.views
    }

    pub fn set_scope_value(
        &mut self,
        coordination_type: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.config.set_scope_value(coordination_type, name, value);
    }

    pub fn set_view_scope(
        &mut self,
        view_id: impl Into<String>,
        coordination_type: impl Into<String>,
        name: impl Into<String>,
    ) {
        self.config.set_view_scope(view_id, coordination_type, name);
    }

    /// Attach a widget (or just aliases and jslink flags) to a view id.
    ///
    /// `aliases` map coordination types to widget attributes.
    pub fn register_view(
        &mut self,
        view_id: impl Into<String>,
        widget: Option<WidgetRef>,
        aliases: &[(&str, &str)],
        jslinks: &[&str],
    ) -> &mut View {
        self.views.register_view(view_id, widget, aliases, jslinks)
    }

    /// Id of `widget` in this coordination, minting `<prefix><n>` if it has
    /// none. Minted ids never collide with ids already in the configuration.
    pub fn resolve_or_create_view_id(&mut self, widget: &WidgetRef) -> String {
        let config = &self.config;
        self.views.resolve_or_create_view_id(widget, |candidate| {
            config.view_coordination.contains_key(candidate)
        })
    }

    /// Subscribe a view to `(coordination_type, scope)`.
    ///
    /// The view is addressed by `spec`'s id, or by its widget's id (minted if
    /// new). Fails before touching any state when `spec` has neither.
    pub fn add_view(
        &mut self,
        coordination_type: &str,
        scope: &str,
        spec: ViewSpec,
    ) -> Result<String, CoordinationError> {
        let ViewSpec {
            widget,
            id,
            alias,
            jslink,
        } = spec;
        let view_id = match (id, &widget) {
            (Some(id), _) => id,
            (None, Some(widget)) => self.resolve_or_create_view_id(widget),
            (None, None) => {
                return Err(CoordinationError::MissingViewTarget {
                    coordination_type: coordination_type.to_string(),
                    scope: scope.to_string(),
                });
            }
        };

        self.config
            .set_view_scope(view_id.as_str(), coordination_type, scope);

        if widget.is_some() || alias.is_some() || jslink {
            let field = alias.as_deref().unwrap_or(coordination_type);
            let aliases: Vec<(&str, &str)> = alias
                .as_deref()
                .map(|attribute| (coordination_type, attribute))
                .into_iter()
                .collect();
            let jslinks: Vec<&str> = if jslink { vec![field] } else { Vec::new() };
            self.views
                .register_view(view_id.as_str(), widget, &aliases, &jslinks);
        }
        Ok(view_id)
    }

    /// Configuration in the compact transport format.
    pub fn export_config(&self) -> Result<String, CoordinationError> {
        self.config.to_json()
    }

    /// Resolve and link all views, superseding their previous sessions.
    pub fn commit(&self, ctx: &mut CoordinationContext) -> CommitReport {
        if self.views.is_empty() {
            tracing::debug!("no attached views; commit skipped");
            return CommitReport::default();
        }

        let _span = tracing::debug_span!(
            "coordination_commit",
            views = self.views.len(),
            types = self.config.coordination_space.len()
        )
        .entered();

        let widgets_reclaimed = if ctx.options().reclaim_on_commit {
            ctx.sweep()
        } else {
            0
        };

        let widgets = self.views.widgets();
        let teardown = ctx.supersede(&widgets);
        let links = resolver::resolve_all(&self.config, &self.views, ctx.binder());
        let links_created = links.len();
        let session = ctx.install(links, &widgets);

        tracing::info!(
            %session,
            links = links_created,
            superseded = teardown.sessions,
            disposed = teardown.links,
            "coordination committed"
        );

        CommitReport {
            session: Some(session),
            links_created,
            sessions_superseded: teardown.sessions,
            links_disposed: teardown.links,
            widgets_reclaimed,
        }
    }
}
