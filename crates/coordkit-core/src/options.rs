#![forbid(unsafe_code)]

//! Engine options (deterministic defaults, env-overridable).

use std::env;
use std::fmt;

const ENV_VIEW_ID_PREFIX: &str = "COORDKIT_VIEW_ID_PREFIX";
const ENV_RECLAIM_ON_COMMIT: &str = "COORDKIT_RECLAIM_ON_COMMIT";

/// Options shared by a [`CoordinationContext`](crate::CoordinationContext)
/// and the coordinations it starts.
///
/// # Environment Variables
/// - `COORDKIT_VIEW_ID_PREFIX` (string, non-empty)
/// - `COORDKIT_RECLAIM_ON_COMMIT` (bool)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Prefix of synthesized view ids (`view_0`, `view_1`, ...).
    pub view_id_prefix: String,
    /// Sweep links of dropped widgets before every commit.
    pub reclaim_on_commit: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            view_id_prefix: "view_".to_string(),
            reclaim_on_commit: true,
        }
    }
}

/// Result of parsing options from the environment.
#[derive(Debug, Clone)]
pub struct EngineOptionsParse {
    pub options: EngineOptions,
    pub errors: Vec<OptionsError>,
}

/// Option error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl OptionsError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for OptionsError {}

impl EngineOptions {
    #[must_use]
    pub fn with_view_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.view_id_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_reclaim_on_commit(mut self, enabled: bool) -> Self {
        self.reclaim_on_commit = enabled;
        self
    }

    /// Parse options from environment variables, dropping diagnostics.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with_diagnostics().options
    }

    /// Parse options from environment variables and return diagnostics.
    ///
    /// Invalid values keep their default and are reported in `errors`.
    #[must_use]
    pub fn from_env_with_diagnostics() -> EngineOptionsParse {
        from_env_with(|key| env::var(key).ok())
    }

    /// Check option constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<OptionsError>> {
        let mut errors = Vec::new();
        if self.view_id_prefix.is_empty() {
            errors.push(OptionsError::new(
                "view_id_prefix",
                "",
                "must not be empty",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn from_env_with<F>(get: F) -> EngineOptionsParse
where
    F: Fn(&str) -> Option<String>,
{
    let mut options = EngineOptions::default();
    let mut errors = Vec::new();

    if let Some(value) = get(ENV_VIEW_ID_PREFIX) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            errors.push(OptionsError::new(
                "view_id_prefix",
                value.clone(),
                "must not be empty",
            ));
        } else {
            options.view_id_prefix = trimmed.to_string();
        }
    }

    if let Some(value) = get(ENV_RECLAIM_ON_COMMIT) {
        match parse_bool(&value) {
            Some(parsed) => options.reclaim_on_commit = parsed,
            None => errors.push(OptionsError::new(
                "reclaim_on_commit",
                value,
                "expected bool (1/0/true/false)",
            )),
        }
    }

    if let Err(mut validation) = options.validate() {
        errors.append(&mut validation);
    }

    EngineOptionsParse { options, errors }
}

#[inline]
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(env: &HashMap<&str, &str>) -> EngineOptionsParse {
        from_env_with(|key| env.get(key).map(|value| value.to_string()))
    }

    #[test]
    fn defaults_are_valid() {
        let options = EngineOptions::default();
        assert_eq!(options.view_id_prefix, "view_");
        assert!(options.reclaim_on_commit);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn env_overrides() {
        let mut env = HashMap::new();
        env.insert(ENV_VIEW_ID_PREFIX, " panel_ ");
        env.insert(ENV_RECLAIM_ON_COMMIT, "off");

        let parsed = parse(&env);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.options.view_id_prefix, "panel_");
        assert!(!parsed.options.reclaim_on_commit);
    }

    #[test]
    fn invalid_values_reported_and_defaults_kept() {
        let mut env = HashMap::new();
        env.insert(ENV_VIEW_ID_PREFIX, "   ");
        env.insert(ENV_RECLAIM_ON_COMMIT, "maybe");

        let parsed = parse(&env);
        assert!(parsed.errors.iter().any(|e| e.field == "view_id_prefix"));
        assert!(parsed.errors.iter().any(|e| e.field == "reclaim_on_commit"));
        assert_eq!(parsed.options, EngineOptions::default());
    }

    #[test]
    fn validate_rejects_empty_prefix() {
        let errors = EngineOptions::default()
            .with_view_id_prefix("")
            .validate()
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "view_id_prefix=\"\" (must not be empty)");
    }
}
