// THEORY:
// The session speaks through a `PhrasePlayer`. From the session's point of view
// playing is one blocking call: it returns once the clip has finished, or with
// an error if the clip could not even be started. How the platform actually
// plays audio (callbacks, completion latches, volume) stays behind this trait.
//
// The session calls `play` on a blocking worker thread so the async runtime is
// never stalled, and calls `stop` from its own task when the session is ended
// mid-phrase. A player that honors `stop` makes `play` return early with
// `PlaybackError::Interrupted` and releases whatever it had opened.

use crate::error::PlaybackError;
use crate::phrase::Phrase;

pub trait PhrasePlayer: Send + Sync + 'static {
    /// Plays `phrase` to completion. Blocks the calling thread until done.
    fn play(&self, phrase: Phrase) -> Result<(), PlaybackError>;

    /// Aborts the phrase currently playing, if any.
    fn stop(&self) {}
}
