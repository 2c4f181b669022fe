use log::info;
use referee_vision::phrase::Phrase;
use referee_vision::{PhrasePlayer, PlaybackError};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Opens phrase assets from a directory and holds each one for a fixed duration.
///
/// Stands in for the camera's media service: a missing asset fails exactly like
/// a prepare failure would, and `stop` cuts the current phrase short.
pub struct AssetPlayer {
    assets: PathBuf,
    phrase_duration: Duration,
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl AssetPlayer {
    pub fn new(assets: &Path, phrase_duration: Duration) -> Self {
        Self {
            assets: assets.to_path_buf(),
            phrase_duration,
            stopped: Mutex::new(false),
            wake: Condvar::new(),
        }
    }
}

impl AssetPlayer {
    /// Holds the opened clip until the phrase duration elapses or `stop` is seen.
    fn hold(&self, phrase: Phrase) -> Result<(), PlaybackError> {
        let path = self.assets.join(phrase.asset());
        let _clip = File::open(&path).map_err(|source| PlaybackError::Open { phrase, source })?;
        info!("speaking {phrase}");

        let deadline = Instant::now() + self.phrase_duration;
        let mut stopped = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if *stopped {
                return Err(PlaybackError::Interrupted(phrase));
            }
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return Ok(());
            };
            stopped = self
                .wake
                .wait_timeout(stopped, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

impl PhrasePlayer for AssetPlayer {
    fn play(&self, phrase: Phrase) -> Result<(), PlaybackError> {
        let result = self.hold(phrase);
        // A stop that arrived before this call still counts; it is consumed here.
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner) = false;
        result
    }

    fn stop(&self) {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.wake.notify_all();
    }
}
