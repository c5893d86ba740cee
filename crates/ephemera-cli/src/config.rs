//! Host configuration.
//!
//! Read from an optional YAML file named by `EPHEMERA_CONFIG`, then
//! overridden field by field from the environment.

use std::str::FromStr;
use std::time::Duration;

use ephemera_session::SessionConfig;
use serde::Deserialize;

use crate::error::AppError;

/// Names the YAML configuration file.
pub const CONFIG_PATH_VAR: &str = "EPHEMERA_CONFIG";

/// Everything the host needs to run a session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EphemeraConfig {
    /// Frame period for context aging, in milliseconds.
    pub frame_ms: u64,
    /// Session tuning.
    pub session: SessionConfig,
}

impl Default for EphemeraConfig {
    fn default() -> Self {
        Self {
            frame_ms: 16,
            session: SessionConfig::default(),
        }
    }
}

impl EphemeraConfig {
    /// Loads from the file named by `EPHEMERA_CONFIG` (if set) and the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file cannot be read, `AppError::Yaml`
    /// if it does not parse, and `AppError::Config` for malformed overrides.
    pub fn load() -> Result<Self, AppError> {
        let yaml = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Some(std::fs::read_to_string(path)?),
            Err(_) => None,
        };
        Self::from_sources(yaml.as_deref(), |name| std::env::var(name).ok())
    }

    /// Builds a configuration from YAML text and an environment lookup.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Yaml` if `yaml` does not parse and
    /// `AppError::Config` for malformed overrides or invalid values.
    pub fn from_sources(
        yaml: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let mut config: Self = match yaml {
            Some(text) => serde_yaml::from_str(text)?,
            None => Self::default(),
        };

        if let Some(pacing) = parse_var(&env, "EPHEMERA_PACING")? {
            config.session.moments.pacing = pacing;
        }
        if let Some(frame_ms) = parse_var(&env, "EPHEMERA_FRAME_MS")? {
            config.frame_ms = frame_ms;
        }
        if let Some(capacity) = parse_var(&env, "EPHEMERA_MAX_FRAGMENTS")? {
            config.session.context.capacity = capacity;
        }
        if let Some(delay) = parse_var(&env, "EPHEMERA_FADE_DELAY_MS")? {
            config.session.context.fade_delay_ms = delay;
        }
        if let Some(rate) = parse_var(&env, "EPHEMERA_FADE_RATE")? {
            config.session.context.fade_rate = rate;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.frame_ms == 0 {
            return Err(AppError::Config("frame_ms must be positive".to_owned()));
        }
        self.session
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// Frame period as a duration.
    #[must_use]
    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

fn parse_var<T>(env: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| AppError::Config(format!("{name} is invalid ({raw:?}): {e}")))
        })
        .transpose()
}
