// THEORY:
// The `pipeline` module is the top-level API of the referee. It wires the two
// halves together around one set of shared position slots:
//
//   camera frame -> FrameTracker -> PositionSlots -> RefereeEngine (on its own clock)
//
// and exposes the two entry points the device needs: "process this frame" for
// the camera callback and "start a session" for the shutter button. The frame
// side needs `&mut self`; the session side is reached through a cloneable
// `RefereeEngine` so button handlers can live on another task.

use crate::config::RefereeConfig;
use crate::core_modules::frame_tracker::{DebugView, FrameTracker};
use crate::core_modules::tracker::PositionSlots;
use crate::error::TrackerError;
use crate::player::PhrasePlayer;
use crate::session::{RefereeEngine, SessionHandle};
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbaImage};
use std::sync::Arc;

// Re-export key data structures for the public API.
pub use crate::core_modules::color_band::{ColorBand, TrackedColor};
pub use crate::core_modules::smart_blob::Point;
pub use crate::core_modules::tracker::{MoveFlags, PerColor, Position, Positions, check_move};
pub use crate::error::SessionError;
pub use crate::phrase::Phrase;
pub use crate::session::SessionOutcome;

/// Size of the on-camera debug preview.
pub const DEBUG_PREVIEW_WIDTH: u32 = 640;
pub const DEBUG_PREVIEW_HEIGHT: u32 = 320;

/// The main, top-level struct of the referee.
pub struct Referee {
    tracker: FrameTracker,
    engine: RefereeEngine,
    debug_view: DebugView,
}

impl Referee {
    pub fn new(config: RefereeConfig, player: Arc<dyn PhrasePlayer>) -> Self {
        let slots = Arc::new(PositionSlots::new());
        let tracker = FrameTracker::new(&config, Arc::clone(&slots));
        let engine = RefereeEngine::new(config, slots, player);
        Self {
            tracker,
            engine,
            debug_view: DebugView::default(),
        }
    }

    /// Per-frame entry point. Updates the shared slots as a side effect.
    pub fn process_frame(&mut self, frame: &RgbaImage) {
        self.tracker.update(frame);
    }

    pub fn process_frame_buffer(&mut self, frame_buffer: &[u8], width: u32, height: u32) -> Result<(), TrackerError> {
        self.tracker.update_buffer(frame_buffer, width, height).map(|_| ())
    }

    /// Starts a session unless one is already running.
    pub fn start_session(&self) -> Result<SessionHandle, SessionError> {
        self.engine.start_session()
    }

    pub fn end_session(&self) -> bool {
        self.engine.end_session()
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    /// A handle for starting and ending sessions from another task.
    pub fn engine(&self) -> RefereeEngine {
        self.engine.clone()
    }

    pub fn slots(&self) -> &Arc<PositionSlots> {
        self.tracker.slots()
    }

    pub fn positions(&self) -> Positions {
        self.tracker.slots().snapshot()
    }

    pub fn debug_view(&self) -> DebugView {
        self.debug_view
    }

    /// Advances the debug display to the next mask.
    pub fn cycle_debug_view(&mut self) -> DebugView {
        self.debug_view = self.debug_view.next();
        self.debug_view
    }

    /// The current debug view's mask scaled up to preview size. `None` while the
    /// view shows the original camera frame.
    pub fn debug_preview(&self) -> Option<GrayImage> {
        let color = self.debug_view.color()?;
        let mask = self.tracker.debug_mask(color)?;
        Some(imageops::resize(&mask, DEBUG_PREVIEW_WIDTH, DEBUG_PREVIEW_HEIGHT, FilterType::Triangle))
    }
}
