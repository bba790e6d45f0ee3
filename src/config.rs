//! Sensor configuration: delay and distance thresholds.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_DELAY_MS, DEFAULT_DISTANCE_PX, ENV_DELAY_MS, ENV_DISTANCE_PX};

/// Error returned when sensor options cannot be built.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The distance threshold is negative, infinite or NaN.
    #[error("invalid drag distance: {0} (must be a finite, non-negative number of pixels)")]
    InvalidDistance(f64),
    /// An environment variable holds a value that doesn't parse.
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
    /// Options JSON is malformed.
    #[error("invalid options JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Gesture thresholds. A candidate press becomes a drag once both have been
/// met on the same move sample.
///
/// Setting both to zero makes a drag start on the first movement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorOptions {
    /// Minimum time in milliseconds between press and promotion.
    pub delay: u64,
    /// Minimum pointer travel in pixels between press and promotion.
    pub distance: f64,
}

impl Default for SensorOptions {
    fn default() -> Self {
        Self { delay: DEFAULT_DELAY_MS, distance: DEFAULT_DISTANCE_PX }
    }
}

impl SensorOptions {
    /// Build validated options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDistance`] if `distance` is negative or not finite.
    pub fn new(delay: u64, distance: f64) -> Result<Self, ConfigError> {
        let options = Self { delay, distance };
        options.validate()?;
        Ok(options)
    }

    /// Check the invariants `new` enforces, for options built field-by-field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDistance`] if `distance` is negative or not finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.distance.is_finite() || self.distance < 0.0 {
            return Err(ConfigError::InvalidDistance(self.distance));
        }
        Ok(())
    }

    /// Parse and validate options from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input and
    /// [`ConfigError::InvalidDistance`] for an out-of-range distance.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(raw)?;
        options.validate()?;
        Ok(options)
    }

    /// Build options from environment variables.
    ///
    /// Optional:
    /// - `DRAG_DELAY_MS`: default 0
    /// - `DRAG_DISTANCE_PX`: default 0
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is set but doesn't
    /// parse, and [`ConfigError::InvalidDistance`] for an out-of-range distance.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let delay = match lookup(ENV_DELAY_MS) {
            Some(raw) => parse_var(ENV_DELAY_MS, &raw)?,
            None => DEFAULT_DELAY_MS,
        };
        let distance = match lookup(ENV_DISTANCE_PX) {
            Some(raw) => parse_var(ENV_DISTANCE_PX, &raw)?,
            None => DEFAULT_DISTANCE_PX,
        };
        Self::new(delay, distance)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { var, value: raw.to_owned() })
}
