// THEORY:
// The `tracker` module is where the two schedules of the referee meet. The
// camera side writes the latest marker position for each color; the session
// side reads them on its own clock and decides whether anyone moved.
//
// Key architectural principles:
// 1.  **Latest Value Only**: Each color keeps exactly one `Position`, the one
//     from the most recently processed frame. There is no history.
// 2.  **Independent Guards**: `PositionSlots` is a fixed array of three mutexes,
//     one per color. Writing green never waits on a reader of blue. A `Position`
//     is `Copy` and is swapped whole under its guard, so a reader can never see
//     one axis from an old frame and the other from a new one.
// 3.  **Explicit Absence**: When a color's mask is empty there is no centroid.
//     That is recorded as `Position::NotFound`, never as a made-up coordinate.
// 4.  **Indeterminate Comparisons**: Comparing against `NotFound` yields no
//     verdict at all. An occluded marker is neither caught moving nor cleared.

use crate::core_modules::color_band::TrackedColor;
use crate::core_modules::smart_blob::Point;
use std::ops::{Index, IndexMut};
use std::sync::{Mutex, PoisonError};

/// Where a marker was seen in the latest frame, if anywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Position {
    #[default]
    NotFound,
    At(Point),
}

impl Position {
    pub const fn at(x: i32, y: i32) -> Self {
        Position::At(Point::new(x, y))
    }
}

impl From<Option<Point>> for Position {
    fn from(point: Option<Point>) -> Self {
        point.map_or(Position::NotFound, Position::At)
    }
}

/// Decides whether a marker moved between two sightings.
///
/// Returns `None` when either side is `NotFound`. Otherwise the verdict is
/// `Some(distance > threshold)` using true Euclidean distance, so the result
/// is symmetric in its two arguments and identical points never count.
pub fn check_move(reference: Position, current: Position, threshold: f64) -> Option<bool> {
    let (Position::At(a), Position::At(b)) = (reference, current) else {
        return None;
    };
    Some(a.distance(&b) > threshold)
}

/// One value per tracked color, indexed by `TrackedColor`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerColor<T>(pub [T; TrackedColor::COUNT]);

impl<T> Index<TrackedColor> for PerColor<T> {
    type Output = T;

    fn index(&self, color: TrackedColor) -> &T {
        &self.0[color.index()]
    }
}

impl<T> IndexMut<TrackedColor> for PerColor<T> {
    fn index_mut(&mut self, color: TrackedColor) -> &mut T {
        &mut self.0[color.index()]
    }
}

/// A full set of positions, one per color.
pub type Positions = PerColor<Position>;

/// Per-color "did this marker move" flags for one round.
pub type MoveFlags = PerColor<bool>;

impl MoveFlags {
    pub fn any(&self) -> bool {
        self.0.iter().any(|&moved| moved)
    }

    pub fn moved(&self) -> impl Iterator<Item = TrackedColor> + '_ {
        TrackedColor::ALL.into_iter().filter(|&color| self[color])
    }
}

/// The three independently guarded cells shared between the frame tracker and
/// the referee session.
#[derive(Debug, Default)]
pub struct PositionSlots {
    slots: [Mutex<Position>; TrackedColor::COUNT],
}

impl PositionSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, color: TrackedColor, position: Position) {
        let mut slot = self.slots[color.index()].lock().unwrap_or_else(PoisonError::into_inner);
        *slot = position;
    }

    pub fn load(&self, color: TrackedColor) -> Position {
        *self.slots[color.index()].lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads each color under its own guard, one after another.
    pub fn snapshot(&self) -> Positions {
        PerColor(TrackedColor::ALL.map(|color| self.load(color)))
    }

    pub fn store_all(&self, positions: &Positions) {
        for color in TrackedColor::ALL {
            self.store(color, positions[color]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_positions_never_move() {
        for p in [Position::at(0, 0), Position::at(10, 10), Position::at(159, 79)] {
            assert_eq!(check_move(p, p, 1.0), Some(false));
        }
    }

    #[test]
    fn distance_uses_both_axes() {
        // Only y changes; a formula that reused x would report no movement.
        assert_eq!(check_move(Position::at(10, 10), Position::at(10, 40), 1.0), Some(true));
        // Only x changes.
        assert_eq!(check_move(Position::at(10, 10), Position::at(40, 10), 1.0), Some(true));
    }

    #[test]
    fn comparison_is_symmetric() {
        let a = Position::at(3, 7);
        let b = Position::at(4, 8);
        assert_eq!(check_move(a, b, 1.0), check_move(b, a, 1.0));
        assert_eq!(check_move(a, b, 1.0), Some(true));
    }

    #[test]
    fn one_pixel_step_is_within_threshold() {
        assert_eq!(check_move(Position::at(5, 5), Position::at(6, 5), 1.0), Some(false));
    }

    #[test]
    fn missing_markers_are_indeterminate() {
        let seen = Position::at(10, 10);
        assert_eq!(check_move(Position::NotFound, seen, 1.0), None);
        assert_eq!(check_move(seen, Position::NotFound, 1.0), None);
        assert_eq!(check_move(Position::NotFound, Position::NotFound, 1.0), None);
    }

    #[test]
    fn slots_start_empty_and_keep_the_latest_write() {
        let slots = PositionSlots::new();
        assert_eq!(slots.snapshot(), PerColor([Position::NotFound; 3]));
        slots.store(TrackedColor::Blue, Position::at(1, 2));
        slots.store(TrackedColor::Blue, Position::at(3, 4));
        assert_eq!(slots.load(TrackedColor::Blue), Position::at(3, 4));
        assert_eq!(slots.load(TrackedColor::Green), Position::NotFound);
    }

    #[test]
    fn move_flags_list_moved_colors_in_order() {
        let mut flags = MoveFlags::default();
        flags[TrackedColor::Red] = true;
        flags[TrackedColor::Green] = true;
        assert!(flags.any());
        assert_eq!(flags.moved().collect::<Vec<_>>(), vec![TrackedColor::Green, TrackedColor::Red]);
        assert!(!MoveFlags::default().any());
    }
}
