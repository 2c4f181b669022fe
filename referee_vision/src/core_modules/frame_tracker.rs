// THEORY:
// The `FrameTracker` is the camera-side half of the referee. It is called once
// per delivered frame and turns that frame into three marker positions, which
// it publishes to the shared `PositionSlots`.
//
// Key architectural principles:
// 1.  **Orchestration**: It is not an analyzer itself. It runs the stages in
//     order (downscale, HSV conversion, per-band masking, binarization, opening,
//     largest-blob selection, centroid) and delegates each to its module.
// 2.  **Bounded Cost**: Every frame is first shrunk to the small working size
//     with linear interpolation. The native camera resolution never reaches the
//     per-pixel stages, so the cost of a frame is fixed.
// 3.  **Scratch Reuse**: The HSV buffer and the four masks (three colors plus one
//     for morphology) are allocated once and overwritten on every frame.
// 4.  **Never Blocks**: The only shared state it touches is one slot lock per
//     color, held for a single copy. It never sleeps and never waits on the
//     session.

use crate::config::RefereeConfig;
use crate::core_modules::D1::pixel::pixel::{Hsv, Pixel};
use crate::core_modules::blob_detector::blob_detector;
use crate::core_modules::color_band::TrackedColor;
use crate::core_modules::mask::mask::Mask;
use crate::core_modules::tracker::{PerColor, Position, PositionSlots, Positions};
use crate::error::TrackerError;
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbaImage};
use log::trace;
use std::sync::Arc;

const RGBA_CHANNELS: usize = 4;

/// Which mask an external debug display is showing. Advanced by a button press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DebugView {
    #[default]
    Green,
    Blue,
    Red,
    Original,
}

impl DebugView {
    pub fn next(self) -> Self {
        match self {
            DebugView::Green => DebugView::Blue,
            DebugView::Blue => DebugView::Red,
            DebugView::Red => DebugView::Original,
            DebugView::Original => DebugView::Green,
        }
    }

    /// The color whose mask this view shows, or `None` for the raw camera frame.
    pub fn color(self) -> Option<TrackedColor> {
        match self {
            DebugView::Green => Some(TrackedColor::Green),
            DebugView::Blue => Some(TrackedColor::Blue),
            DebugView::Red => Some(TrackedColor::Red),
            DebugView::Original => None,
        }
    }
}

/// Converts frames into per-color marker positions and publishes them.
pub struct FrameTracker {
    working_width: u32,
    working_height: u32,
    mask_cutoff: u8,
    slots: Arc<PositionSlots>,
    hsv: Vec<Hsv>,
    masks: PerColor<Mask>,
    scratch: Mask,
    frames_processed: u64,
}

impl FrameTracker {
    pub fn new(config: &RefereeConfig, slots: Arc<PositionSlots>) -> Self {
        let (width, height) = (config.working_width, config.working_height);
        Self {
            working_width: width,
            working_height: height,
            mask_cutoff: config.mask_cutoff,
            slots,
            hsv: vec![Hsv::default(); (width * height) as usize],
            masks: PerColor(TrackedColor::ALL.map(|_| Mask::new(width, height))),
            scratch: Mask::new(width, height),
            frames_processed: 0,
        }
    }

    /// Processes one frame and publishes the largest-blob centroid of each color.
    pub fn update(&mut self, frame: &RgbaImage) -> Positions {
        let working = imageops::resize(frame, self.working_width, self.working_height, FilterType::Triangle);
        for (out, rgba) in self.hsv.iter_mut().zip(working.pixels()) {
            *out = Pixel::from(*rgba).hsv();
        }

        let mut positions = Positions::default();
        for color in TrackedColor::ALL {
            positions[color] = self.locate(color);
            self.slots.store(color, positions[color]);
        }

        self.frames_processed += 1;
        trace!(
            "frame {}: green={:?} blue={:?} red={:?}",
            self.frames_processed,
            positions[TrackedColor::Green],
            positions[TrackedColor::Blue],
            positions[TrackedColor::Red]
        );
        positions
    }

    /// Same as `update`, for a raw RGBA buffer of the given dimensions.
    pub fn update_buffer(&mut self, frame_buffer: &[u8], width: u32, height: u32) -> Result<Positions, TrackerError> {
        let expected = width as usize * height as usize * RGBA_CHANNELS;
        if frame_buffer.len() != expected {
            return Err(TrackerError::FrameSize {
                expected,
                actual: frame_buffer.len(),
            });
        }
        let frame = RgbaImage::from_raw(width, height, frame_buffer.to_vec()).ok_or(TrackerError::FrameSize {
            expected,
            actual: frame_buffer.len(),
        })?;
        Ok(self.update(&frame))
    }

    /// Masks, denoises and measures one color on the current HSV buffer.
    fn locate(&mut self, color: TrackedColor) -> Position {
        let mask = &mut self.masks[color];
        mask.fill_from_band(&self.hsv, &color.band());
        mask.threshold(self.mask_cutoff);
        mask.open(&mut self.scratch);

        blob_detector::largest_blob(mask)
            .and_then(|blob| blob.moments.centroid())
            .into()
    }

    /// The denoised mask of `color` from the most recent frame.
    pub fn debug_mask(&self, color: TrackedColor) -> Option<GrayImage> {
        self.masks[color].to_gray_image()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn slots(&self) -> &Arc<PositionSlots> {
        &self.slots
    }
}
