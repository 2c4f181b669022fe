// THEORY:
// Every failure the referee can surface lives here. Absence of a marker is not
// one of them: an empty mask is an ordinary per-frame outcome and travels as
// `Position::NotFound` through the data path instead.

use crate::phrase::Phrase;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by a `PhrasePlayer`.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The audio resource could not be opened or prepared. Fatal to the session.
    #[error("failed to open {phrase}")]
    Open {
        phrase: Phrase,
        #[source]
        source: std::io::Error,
    },
    /// Playback was stopped before the phrase finished.
    #[error("playback of {0} was interrupted")]
    Interrupted(Phrase),
}

/// Why a refereeing session did not produce an outcome.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a session is already running")]
    AlreadyRunning,
    #[error(transparent)]
    Playback(#[from] PlaybackError),
    #[error("session task failed: {0}")]
    Task(String),
}

/// A raw frame buffer that cannot be interpreted with the declared dimensions.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("frame buffer holds {actual} bytes, expected {expected} for an RGBA frame")]
    FrameSize { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
