#![forbid(unsafe_code)]

//! Link sessions and widget ownership.
//!
//! A [`CoordinationContext`] is the process-wide state of the engine, owned
//! by whoever composes it into an application and passed explicitly to every
//! commit. It keeps two tables:
//!
//! ```text
//! sessions: SessionId ──► [Link, Link, ...]     (owning)
//! owners:   WidgetId  ──► (Weak<widget>, SessionId)   (non-owning)
//! ```
//!
//! # Invariants
//!
//! 1. A widget is owned by at most one session at a time.
//! 2. Every owner entry points at a session present in `sessions`.
//! 3. A superseded session is fully disposed before the superseding commit
//!    creates its first link.
//! 4. Owner entries never keep a widget alive.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Link already disposed | unlinked outside the context | `warn` event, teardown continues |
//! | Widget dropped while owned | host released it without a commit | links stay resident until `release_widget` or `sweep` |
//! | Context dropped without `shutdown` | host discarded it | its links stay active; nothing can unlink them |

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use coordkit_bind::{Binder, Link, ObservableBinder, WeakWidgetRef, Widget, WidgetId, WidgetRef};
use indexmap::IndexMap;

use crate::coordination::Coordination;
use crate::options::EngineOptions;

/// Identity of one coordination activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

struct Ownership {
    widget: WeakWidgetRef,
    session: SessionId,
}

/// Outcome of tearing down one or more sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Teardown {
    pub sessions: usize,
    pub links: usize,
}

/// Registry of active link sessions and widget ownership.
pub struct CoordinationContext {
    options: EngineOptions,
    binder: Box<dyn Binder>,
    sessions: IndexMap<SessionId, Vec<Link>>,
    owners: HashMap<WidgetId, Ownership>,
    next_session: u64,
}

impl fmt::Debug for CoordinationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinationContext")
            .field("options", &self.options)
            .field("sessions", &self.sessions.len())
            .field("links", &self.link_count())
            .field("owners", &self.owners.len())
            .finish()
    }
}

impl Default for CoordinationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinationContext {
    /// Context with default options and the in-process binder.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    #[must_use]
    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            options,
            binder: Box::new(ObservableBinder),
            sessions: IndexMap::new(),
            owners: HashMap::new(),
            next_session: 1,
        }
    }

    /// Replace the binder used to create and dispose links.
    #[must_use]
    pub fn with_binder(mut self, binder: impl Binder + 'static) -> Self {
        self.binder = Box::new(binder);
        self
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    #[must_use]
    pub fn binder(&self) -> &dyn Binder {
        self.binder.as_ref()
    }

    /// Start a coordination that uses this context's options.
    #[must_use]
    pub fn coordination(&self) -> Coordination {
        Coordination::with_options(&self.options)
    }

    /// Session currently owning `widget`.
    #[must_use]
    pub fn session_of(&self, widget: WidgetId) -> Option<SessionId> {
        self.owners.get(&widget).map(|o| o.session)
    }

    #[must_use]
    pub fn session_links(&self, session: SessionId) -> Option<&[Link]> {
        self.sessions.get(&session).map(Vec::as_slice)
    }

    /// Active sessions, oldest first.
    pub fn sessions(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.sessions.keys().copied()
    }

    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Links held across all sessions.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.sessions.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn owned_widget_count(&self) -> usize {
        self.owners.len()
    }

    /// Dispose every session owning one of `widgets`.
    pub(crate) fn supersede(&mut self, widgets: &[WidgetRef]) -> Teardown {
        let mut prior: Vec<SessionId> = Vec::new();
        for widget in widgets {
            if let Some(session) = self.session_of(widget.id()) {
                if !prior.contains(&session) {
                    prior.push(session);
                }
            }
        }

        let mut teardown = Teardown::default();
        for session in prior {
            if let Some(links) = self.dispose_session(session) {
                tracing::debug!(%session, links, "session superseded");
                teardown.sessions += 1;
                teardown.links += links;
            }
        }
        teardown
    }

    /// Record `links` under a fresh session and re-tag `widgets` with it.
    pub(crate) fn install(&mut self, links: Vec<Link>, widgets: &[WidgetRef]) -> SessionId {
        let session = SessionId(self.next_session);
        self.next_session += 1;
        self.sessions.insert(session, links);
        for widget in widgets {
            self.owners.insert(
                widget.id(),
                Ownership {
                    widget: Rc::downgrade(widget),
                    session,
                },
            );
        }
        session
    }

    /// Dispose every link of `session` and forget it.
    ///
    /// Widgets it owned become unowned. Returns the number of links that were
    /// in the session, or `None` for an unknown session.
    pub fn dispose_session(&mut self, session: SessionId) -> Option<usize> {
        let mut links = self.sessions.shift_remove(&session)?;
        let count = links.len();
        self.unlink_all(&mut links);
        self.owners.retain(|_, o| o.session != session);
        Some(count)
    }

    /// Reclamation hook for a destroyed widget.
    ///
    /// Disposes every link with an endpoint on `widget`, drops its owner
    /// entry, and evicts sessions left with neither links nor owners. Returns
    /// the number of links disposed.
    pub fn release_widget(&mut self, widget: WidgetId) -> usize {
        let mut released = Vec::new();
        for links in self.sessions.values_mut() {
            let (touching, rest): (Vec<Link>, Vec<Link>) =
                links.drain(..).partition(|link| link.touches(widget));
            *links = rest;
            released.extend(touching);
        }
        let count = released.len();
        self.unlink_all(&mut released);

        let owner = self.owners.remove(&widget).map(|o| o.session);
        if let Some(session) = owner {
            let still_owned = self.owners.values().any(|o| o.session == session);
            let empty = self.sessions.get(&session).is_some_and(Vec::is_empty);
            if empty && !still_owned {
                self.sessions.shift_remove(&session);
            }
        }
        if count > 0 || owner.is_some() {
            tracing::debug!(%widget, links = count, "widget released");
        }
        count
    }

    /// Release every owned widget that has been dropped. Returns how many
    /// widgets were reclaimed.
    pub fn sweep(&mut self) -> usize {
        let dead: Vec<WidgetId> = self
            .owners
            .iter()
            .filter(|(_, o)| o.widget.strong_count() == 0)
            .map(|(id, _)| *id)
            .collect();
        for widget in &dead {
            self.release_widget(*widget);
        }
        if !dead.is_empty() {
            tracing::debug!(widgets = dead.len(), "swept dropped widgets");
        }
        dead.len()
    }

    /// Dispose every session and forget every owner.
    pub fn shutdown(&mut self) -> Teardown {
        let sessions: Vec<SessionId> = self.sessions.keys().copied().collect();
        let mut teardown = Teardown::default();
        for session in sessions {
            if let Some(links) = self.dispose_session(session) {
                teardown.sessions += 1;
                teardown.links += links;
            }
        }
        self.owners.clear();
        tracing::info!(
            sessions = teardown.sessions,
            links = teardown.links,
            "coordination context shut down"
        );
        teardown
    }

    fn unlink_all(&self, links: &mut [Link]) {
        for link in links {
            if let Err(err) = self.binder.unlink(link) {
                tracing::warn!(error = %err, "link disposal failed; continuing teardown");
            }
        }
    }
}
