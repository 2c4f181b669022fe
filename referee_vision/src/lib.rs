// THEORY:
// This file is the main entry point for the `referee_vision` library crate.
// It exposes the `Referee` facade from `pipeline` together with the engine,
// config, phrase and player types a device integration needs. The image
// processing stages live in `core_modules` and are public for testing and
// debugging, but an integration only has to hand frames to
// `Referee::process_frame` and call `start_session` on a button press.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod phrase;
pub mod pipeline;
pub mod player;
pub mod session;

pub use config::RefereeConfig;
pub use error::{ConfigError, PlaybackError, SessionError, TrackerError};
pub use pipeline::Referee;
pub use player::PhrasePlayer;
pub use session::{RefereeEngine, SessionHandle, SessionOutcome};
