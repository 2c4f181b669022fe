// THEORY:
// The `session` module is the referee itself: a single background task that
// runs one game from the first "Daruma-san ga koronda" to the verdict.
//
//   Idle -> RoundStart -> Polling -> RoundStart -> ... -> RoundEnd | AllClear -> Idle
//
// Key architectural principles:
// 1.  **One Session at a Time**: `RefereeEngine::start_session` checks and sets
//     a single atomic flag. A second trigger while a game is running is refused,
//     not queued. The flag is owned by a guard that lives inside the task, so it
//     is cleared however the task ends: verdict, playback failure, interruption,
//     runtime shutdown or panic.
// 2.  **Strict Ordering**: The reference snapshot of a round is taken only after
//     its start phrase has finished playing, and every poll sleeps first and
//     reads afterwards. Within the task nothing runs out of order.
// 3.  **Reads, Never Writes**: The session only loads from `PositionSlots`. It
//     does not know the frame tracker exists.
// 4.  **Prompt Cancellation**: Every sleep and every playback wait races against
//     the session's cancel signal. On cancel the player is told to stop, the
//     in-flight playback is awaited so its resource is released, and the task
//     returns `SessionOutcome::Interrupted` without speaking a verdict.

use crate::config::RefereeConfig;
use crate::core_modules::color_band::TrackedColor;
use crate::core_modules::tracker::{MoveFlags, PositionSlots, Positions, check_move};
use crate::error::{PlaybackError, SessionError};
use crate::phrase::Phrase;
use crate::player::PhrasePlayer;
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How a session ended, when it ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// At least one marker moved during `round` (1-based).
    Caught { round: u32, moved: MoveFlags },
    /// Every round ran its full poll budget and nobody moved.
    AllClear,
    /// The session was ended from outside before reaching a verdict.
    Interrupted,
}

/// The protocol states between `Idle` and `Idle`.
#[derive(Debug)]
enum State {
    RoundStart { round: u32 },
    Polling { round: u32, reference: Positions, polls: u32 },
    RoundEnd { round: u32, moved: MoveFlags },
    AllClear,
}

/// Why the protocol stopped early.
enum Halt {
    Interrupted,
    Failed(SessionError),
}

impl From<PlaybackError> for Halt {
    fn from(error: PlaybackError) -> Self {
        match error {
            PlaybackError::Interrupted(_) => Halt::Interrupted,
            other => Halt::Failed(SessionError::Playback(other)),
        }
    }
}

/// Clears the running flag when dropped.
struct RunningGuard {
    flag: Arc<AtomicBool>,
}

impl RunningGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: Arc::clone(flag) })
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Starts and ends refereeing sessions. Cheap to clone; clones share the same
/// running flag, so a session started through one clone blocks all others.
#[derive(Clone)]
pub struct RefereeEngine {
    config: RefereeConfig,
    slots: Arc<PositionSlots>,
    player: Arc<dyn PhrasePlayer>,
    running: Arc<AtomicBool>,
    cancel: Arc<Mutex<Option<watch::Sender<bool>>>>,
    sessions_started: Arc<AtomicU64>,
}

impl RefereeEngine {
    pub fn new(config: RefereeConfig, slots: Arc<PositionSlots>, player: Arc<dyn PhrasePlayer>) -> Self {
        Self {
            config,
            slots,
            player,
            running: Arc::new(AtomicBool::new(false)),
            cancel: Arc::new(Mutex::new(None)),
            sessions_started: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Spawns a new session on the current tokio runtime.
    ///
    /// Fails with `SessionError::AlreadyRunning` if a session is in progress.
    pub fn start_session(&self) -> Result<SessionHandle, SessionError> {
        // Held until the new sender is in place, so `end_session` never sees
        // the flag set while the previous session's sender is still stored.
        let mut cancel = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(guard) = RunningGuard::acquire(&self.running) else {
            warn!("start ignored: a session is already running");
            return Err(SessionError::AlreadyRunning);
        };

        let number = self.sessions_started.fetch_add(1, Ordering::Relaxed) + 1;
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(number)),
            None => StdRng::from_entropy(),
        };

        let (cancel_tx, cancel_rx) = watch::channel(false);
        *cancel = Some(cancel_tx);
        drop(cancel);

        let session = Session {
            number,
            config: self.config.clone(),
            slots: Arc::clone(&self.slots),
            player: Arc::clone(&self.player),
            cancel: cancel_rx,
            rng,
            _guard: guard,
        };
        info!("session {number} started");
        Ok(SessionHandle {
            number,
            task: tokio::spawn(session.run()),
        })
    }

    /// Interrupts the running session, if any. Returns whether one was running.
    pub fn end_session(&self) -> bool {
        let cancel = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        let running = self.is_running();
        if let Some(cancel) = cancel.as_ref() {
            cancel.send_replace(true);
        }
        drop(cancel);
        if running {
            info!("end of session requested");
        }
        running
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// The caller's view of a spawned session.
pub struct SessionHandle {
    number: u64,
    task: JoinHandle<Result<SessionOutcome, SessionError>>,
}

impl SessionHandle {
    /// 1-based count of sessions started by the engine.
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Waits for the session to end and returns its outcome.
    pub async fn wait(self) -> Result<SessionOutcome, SessionError> {
        match self.task.await {
            Ok(result) => result,
            Err(join_error) => Err(SessionError::Task(join_error.to_string())),
        }
    }
}

/// Everything one session owns while it runs.
struct Session {
    number: u64,
    config: RefereeConfig,
    slots: Arc<PositionSlots>,
    player: Arc<dyn PhrasePlayer>,
    cancel: watch::Receiver<bool>,
    rng: StdRng,
    _guard: RunningGuard,
}

impl Session {
    async fn run(mut self) -> Result<SessionOutcome, SessionError> {
        let result = self.referee().await;
        match &result {
            Ok(outcome) => info!("session {} ended: {:?}", self.number, outcome),
            Err(e) => error!("session {} failed: {}", self.number, e),
        }
        result
    }

    async fn referee(&mut self) -> Result<SessionOutcome, SessionError> {
        let mut state = State::RoundStart { round: 1 };
        loop {
            let step = self.step(state).await;
            state = match step {
                Ok(Step::Next(next)) => next,
                Ok(Step::Done(outcome)) => return Ok(outcome),
                Err(Halt::Interrupted) => {
                    info!("session {} interrupted", self.number);
                    return Ok(SessionOutcome::Interrupted);
                }
                Err(Halt::Failed(e)) => return Err(e),
            };
        }
    }

    async fn step(&mut self, state: State) -> Result<Step, Halt> {
        match state {
            State::RoundStart { round } => {
                let phrase = Phrase::START_PHRASES[self.rng.gen_range(0..Phrase::START_PHRASES.len())];
                info!("round {round}/{}: {phrase}", self.config.rounds);
                self.speak(phrase).await?;

                let reference = self.slots.snapshot();
                let polls = self.rng.gen_range(self.config.min_polls..=self.config.max_polls);
                debug!("round {round}: reference {reference:?}, {polls} polls");
                Ok(Step::Next(State::Polling { round, reference, polls }))
            }
            State::Polling { round, reference, polls } => {
                let next = match self.poll(&reference, polls).await? {
                    Some(moved) => State::RoundEnd { round, moved },
                    None if round < self.config.rounds => State::RoundStart { round: round + 1 },
                    None => State::AllClear,
                };
                Ok(Step::Next(next))
            }
            State::RoundEnd { round, moved } => {
                if let Some(phrase) = Phrase::for_moves(&moved) {
                    self.speak(phrase).await?;
                }
                Ok(Step::Done(SessionOutcome::Caught { round, moved }))
            }
            State::AllClear => {
                self.speak(Phrase::AllClear).await?;
                Ok(Step::Done(SessionOutcome::AllClear))
            }
        }
    }

    /// Sleeps and compares up to `polls` times. Returns the flags of the first
    /// poll on which anything moved.
    async fn poll(&mut self, reference: &Positions, polls: u32) -> Result<Option<MoveFlags>, Halt> {
        let interval = self.config.poll_interval();
        for poll in 1..=polls {
            let mut cancel = self.cancel.clone();
            tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => return Err(Halt::Interrupted),
                _ = tokio::time::sleep(interval) => {}
            }

            let current = self.slots.snapshot();
            let mut moved = MoveFlags::default();
            for color in TrackedColor::ALL {
                match check_move(reference[color], current[color], self.config.distance_threshold) {
                    Some(verdict) => moved[color] = verdict,
                    None => debug!("poll {poll}: {color} not comparable ({:?} -> {:?})", reference[color], current[color]),
                }
            }

            if moved.any() {
                info!("poll {poll}/{polls}: caught {:?}", moved.moved().collect::<Vec<_>>());
                return Ok(Some(moved));
            }
        }
        Ok(None)
    }

    /// Plays `phrase` on a blocking worker and waits for it, or for cancellation.
    async fn speak(&mut self, phrase: Phrase) -> Result<(), Halt> {
        if *self.cancel.borrow() {
            return Err(Halt::Interrupted);
        }
        let player = Arc::clone(&self.player);
        let mut playback = tokio::task::spawn_blocking(move || player.play(phrase));
        let mut cancel = self.cancel.clone();

        tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => {
                if !playback.is_finished() {
                    self.player.stop();
                }
                // The clip is released once `play` returns.
                let _ = (&mut playback).await;
                Err(Halt::Interrupted)
            }
            joined = &mut playback => match joined {
                Ok(Ok(())) => {
                    debug!("finished {phrase}");
                    Ok(())
                }
                Ok(Err(e)) => {
                    if !matches!(e, PlaybackError::Interrupted(_)) {
                        error!("could not play {phrase}: {e}");
                    }
                    Err(e.into())
                }
                Err(join_error) => Err(Halt::Failed(SessionError::Task(join_error.to_string()))),
            },
        }
    }
}

enum Step {
    Next(State),
    Done(SessionOutcome),
}

/// Resolves once cancellation has been requested or the engine is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let _ = cancel.wait_for(|&requested| requested).await;
}
