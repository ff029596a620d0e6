#![forbid(unsafe_code)]

//! Errors surfaced by the coordination engine.
//!
//! Only caller mistakes and transport failures are errors. Dangling view ids,
//! orphan scopes and failed link disposal are resolved by skipping and are
//! reported through `tracing` instead.

use std::fmt;
use std::path::PathBuf;

/// Errors from coordination operations.
#[derive(Debug)]
pub enum CoordinationError {
    /// A view was requested with neither a widget nor an explicit id.
    MissingViewTarget {
        coordination_type: String,
        scope: String,
    },
    /// A configuration file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A configuration document did not match the transport format.
    Decode(serde_json::Error),
    /// A configuration could not be encoded.
    Encode(serde_json::Error),
}

impl fmt::Display for CoordinationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingViewTarget {
                coordination_type,
                scope,
            } => write!(
                f,
                "view for scope '{coordination_type}.{scope}' needs a widget or an id"
            ),
            Self::Io { path, source } => {
                write!(f, "cannot read {}: {source}", path.display())
            }
            Self::Decode(err) => write!(f, "invalid coordination config: {err}"),
            Self::Encode(err) => write!(f, "cannot encode coordination config: {err}"),
        }
    }
}

impl std::error::Error for CoordinationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Decode(err) | Self::Encode(err) => Some(err),
            Self::MissingViewTarget { .. } => None,
        }
    }
}
