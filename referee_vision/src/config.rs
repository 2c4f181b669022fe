// THEORY:
// `RefereeConfig` gathers the tunable constants of the referee in one place.
// The defaults are the game as it is played on the camera: a 160x80 working
// frame, three rounds, 6 to 15 polls half a second apart, and a one-unit
// movement threshold. Tests shrink the poll interval; deployments may pin the
// random seed so a session can be replayed.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Configuration for the referee, allowing for tunable behavior.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RefereeConfig {
    /// Width of the downscaled frame all tracking happens on.
    pub working_width: u32,
    /// Height of the downscaled frame all tracking happens on.
    pub working_height: u32,
    /// Mask values at or below this cutoff are cleared before denoising.
    pub mask_cutoff: u8,
    /// Maximum number of phrase-then-poll rounds in a session.
    pub rounds: u32,
    /// Lower bound (inclusive) of the randomized poll count per round.
    pub min_polls: u32,
    /// Upper bound (inclusive) of the randomized poll count per round.
    pub max_polls: u32,
    /// Sleep between two polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// A marker whose centroid moved strictly further than this has moved.
    pub distance_threshold: f64,
    /// Seed for phrase and poll-count choices. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for RefereeConfig {
    fn default() -> Self {
        Self {
            working_width: 160,
            working_height: 80,
            mask_cutoff: 100,
            rounds: 3,
            min_polls: 6,
            max_polls: 15,
            poll_interval_ms: 500,
            distance_threshold: 1.0,
            seed: None,
        }
    }
}

impl RefereeConfig {
    /// Reads and validates a TOML config file. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.working_width == 0 || self.working_height == 0 {
            return Err(ConfigError::Invalid("working frame size must be non-zero".into()));
        }
        if self.rounds == 0 {
            return Err(ConfigError::Invalid("rounds must be at least 1".into()));
        }
        if self.min_polls == 0 || self.min_polls > self.max_polls {
            return Err(ConfigError::Invalid(format!(
                "poll range {}..={} is empty or starts at zero",
                self.min_polls, self.max_polls
            )));
        }
        if self.distance_threshold.is_nan() || self.distance_threshold < 0.0 {
            return Err(ConfigError::Invalid("distance_threshold must be non-negative".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
