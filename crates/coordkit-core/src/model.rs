#![forbid(unsafe_code)]

//! Coordination configuration: the serializable half of the engine.
//!
//! # Transport format
//!
//! ```json
//! {
//!   "coordinationSpace": { "sliderValue": { "A": 10, "B": 4.0 } },
//!   "viewCoordination": {
//!     "view_0": { "coordinationScopes": { "sliderValue": "A" } }
//!   }
//! }
//! ```
//!
//! # Invariants
//!
//! 1. Every mapping keeps insertion order; an upsert of an existing key keeps
//!    the key's position. Resolution order and export bytes depend on it.
//! 2. A view subscribes to at most one scope per coordination type.
//! 3. Integer and float values stay distinct (`10` vs `4.0`), so decoding an
//!    export and exporting again is byte-identical.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoordinationError;

/// Scope subscriptions of one view: coordination type → scope name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCoordination {
    #[serde(default)]
    pub coordination_scopes: IndexMap<String, String>,
}

/// The use-coordination configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinationConfig {
    /// Current value of every scope: type → scope name → value.
    #[serde(default)]
    pub coordination_space: IndexMap<String, IndexMap<String, Value>>,
    /// Per-view subscriptions.
    #[serde(default)]
    pub view_coordination: IndexMap<String, ViewCoordination>,
}

/// One named, typed slot of shared state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinationScope {
    #[serde(rename = "type")]
    pub coordination_type: String,
    pub name: String,
    pub value: Value,
}

impl CoordinationConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a scope value, creating the type bucket if absent.
    pub fn set_scope_value(
        &mut self,
        coordination_type: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.coordination_space
            .entry(coordination_type.into())
            .or_default()
            .insert(name.into(), value.into());
    }

    /// Upsert the scope a view subscribes to for one type.
    pub fn set_view_scope(
        &mut self,
        view_id: impl Into<String>,
        coordination_type: impl Into<String>,
        name: impl Into<String>,
    ) {
        self.view_coordination
            .entry(view_id.into())
            .or_default()
            .coordination_scopes
            .insert(coordination_type.into(), name.into());
    }

    #[must_use]
    pub fn scope_value(&self, coordination_type: &str, name: &str) -> Option<&Value> {
        self.coordination_space.get(coordination_type)?.get(name)
    }

    #[must_use]
    pub fn view_scope(&self, view_id: &str, coordination_type: &str) -> Option<&str> {
        self.view_coordination
            .get(view_id)?
            .coordination_scopes
            .get(coordination_type)
            .map(String::as_str)
    }

    /// All scopes, grouped by type, in insertion order.
    pub fn scopes(&self) -> impl Iterator<Item = CoordinationScope> + '_ {
        self.coordination_space
            .iter()
            .flat_map(|(coordination_type, scopes)| {
                scopes.iter().map(move |(name, value)| CoordinationScope {
                    coordination_type: coordination_type.clone(),
                    name: name.clone(),
                    value: value.clone(),
                })
            })
    }

    /// Ids of the views subscribed to `(coordination_type, name)`, in
    /// `viewCoordination` order.
    pub fn subscribers<'a>(
        &'a self,
        coordination_type: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.view_coordination
            .iter()
            .filter(move |(_, binding)| {
                binding
                    .coordination_scopes
                    .get(coordination_type)
                    .is_some_and(|scope| scope == name)
            })
            .map(|(view_id, _)| view_id.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coordination_space.is_empty() && self.view_coordination.is_empty()
    }

    /// Compact JSON in the transport format.
    pub fn to_json(&self) -> Result<String, CoordinationError> {
        serde_json::to_string(self).map_err(CoordinationError::Encode)
    }

    pub fn from_json(text: &str) -> Result<Self, CoordinationError> {
        serde_json::from_str(text).map_err(CoordinationError::Decode)
    }

    pub fn from_value(value: Value) -> Result<Self, CoordinationError> {
        serde_json::from_value(value).map_err(CoordinationError::Decode)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoordinationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CoordinationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}
