//! Shared helpers for the session integration tests.

#![allow(dead_code)]

use referee_vision::core_modules::tracker::PositionSlots;
use referee_vision::phrase::Phrase;
use referee_vision::{PhrasePlayer, PlaybackError, RefereeConfig};
use std::sync::{Arc, Condvar, Mutex, Weak};
use std::time::Duration;

/// A reaction to a start phrase. It runs on its own thread after the phrase
/// has "finished", so it races the session exactly like a camera would.
/// Receives the 1-based round number and the slots the session reads.
pub type StartHook = Arc<dyn Fn(u32, &PositionSlots) + Send + Sync>;

/// Records every phrase it is asked to play and returns at once, unless told
/// to fail or to hang until stopped.
#[derive(Default)]
pub struct ScriptedPlayer {
    played: Mutex<Vec<Phrase>>,
    fail_start_phrases: bool,
    hang_on_start: bool,
    stopped: Mutex<bool>,
    wake: Condvar,
    stop_calls: Mutex<u32>,
    on_start: Option<StartHook>,
    slots: Mutex<Weak<PositionSlots>>,
}

impl ScriptedPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_start() -> Self {
        Self {
            fail_start_phrases: true,
            ..Self::default()
        }
    }

    pub fn hanging_start() -> Self {
        Self {
            hang_on_start: true,
            ..Self::default()
        }
    }

    pub fn with_start_hook(hook: StartHook) -> Self {
        Self {
            on_start: Some(hook),
            ..Self::default()
        }
    }

    /// Gives start hooks access to the slots the session reads.
    pub fn attach(&self, slots: &Arc<PositionSlots>) {
        *self.slots.lock().unwrap() = Arc::downgrade(slots);
    }

    pub fn played(&self) -> Vec<Phrase> {
        self.played.lock().unwrap().clone()
    }

    pub fn start_phrases_played(&self) -> usize {
        self.played().iter().filter(|p| p.is_start()).count()
    }

    pub fn stop_calls(&self) -> u32 {
        *self.stop_calls.lock().unwrap()
    }
}

impl PhrasePlayer for ScriptedPlayer {
    fn play(&self, phrase: Phrase) -> Result<(), PlaybackError> {
        if phrase.is_start() && self.fail_start_phrases {
            return Err(PlaybackError::Open {
                phrase,
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }

        let round = {
            let mut played = self.played.lock().unwrap();
            played.push(phrase);
            played.iter().filter(|p| p.is_start()).count() as u32
        };

        if !phrase.is_start() {
            return Ok(());
        }

        if self.hang_on_start {
            let mut stopped = self.stopped.lock().unwrap();
            while !*stopped {
                stopped = self.wake.wait(stopped).unwrap();
            }
            return Err(PlaybackError::Interrupted(phrase));
        }

        let slots = self.slots.lock().unwrap().upgrade();
        if let (Some(hook), Some(slots)) = (self.on_start.clone(), slots) {
            std::thread::spawn(move || hook(round, &slots));
        }
        Ok(())
    }

    fn stop(&self) {
        *self.stop_calls.lock().unwrap() += 1;
        *self.stopped.lock().unwrap() = true;
        self.wake.notify_all();
    }
}

/// Default game with a fixed seed and the given poll interval.
pub fn fast_config(poll_interval_ms: u64) -> RefereeConfig {
    RefereeConfig {
        poll_interval_ms,
        seed: Some(42),
        ..RefereeConfig::default()
    }
}

/// Upper bound for any single session in these tests.
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(20);

/// How long a start hook waits before moving a marker. Comfortably after the
/// reference snapshot, comfortably before the first poll of a 300 ms interval.
pub const MOVE_DELAY: Duration = Duration::from_millis(60);
pub const SLOW_POLL_MS: u64 = 300;
