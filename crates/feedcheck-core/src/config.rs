//! Harness configuration.
//!
//! Configuration is validated at load time, with defaults that match the
//! behaviour of a browser-hosted suite runner (five second async timeout,
//! one before-each hook per suite).

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{HarnessError, Result};

/// Harness configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Run name, used in logs and in the report.
    #[serde(default = "default_name")]
    pub name: String,

    /// Completion timeout applied to async hooks and bodies unless a suite
    /// overrides it.
    #[serde(default = "default_timeout")]
    #[serde(with = "humantime_serde")]
    pub default_timeout: Duration,

    /// How repeated before-each declarations on one suite are handled.
    #[serde(default)]
    pub hook_policy: HookPolicy,
}

fn default_name() -> String {
    "feedcheck".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_millis(5000)
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            default_timeout: default_timeout(),
            hook_policy: HookPolicy::default(),
        }
    }
}

impl HarnessConfig {
    /// Creates a configuration with the given run name and defaults elsewhere.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the default completion timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Sets the hook policy.
    #[must_use]
    pub const fn with_hook_policy(mut self, policy: HookPolicy) -> Self {
        self.hook_policy = policy;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(HarnessError::config("name cannot be empty"));
        }
        if self.default_timeout.is_zero() {
            return Err(HarnessError::config("default_timeout must be greater than 0"));
        }
        Ok(())
    }

    /// Parses and validates configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the string cannot be parsed or is invalid.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| HarnessError::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| HarnessError::config(format!("failed to read config: {e}")))?;
        Self::from_toml(&content)
    }
}

/// Policy for more than one before-each hook on a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum HookPolicy {
    /// A second declaration fails with `DuplicateHook`.
    #[default]
    Exclusive,
    /// Hooks run one after another in declaration order.
    Chain,
}

/// Serde helper for humantime durations.
pub(crate) mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Serializes a duration as a human-readable string.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    /// Deserializes a duration from a human-readable string.
    ///
    /// # Errors
    /// Returns an error if the string cannot be parsed.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
