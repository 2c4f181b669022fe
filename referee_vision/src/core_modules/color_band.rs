// THEORY:
// A `TrackedColor` is one of the three marker colors the referee watches. Each
// carries a closed band in 8-bit HSV space; a pixel belongs to the marker when
// all three of its HSV components sit inside the band. The bands are disjoint
// in hue, so a pixel can match at most one marker.
//
// The set is fixed at compile time. Everything that is "per color" in the
// crate (shared slots, move flags, masks) is a three-element array indexed by
// `TrackedColor::index`.

use crate::core_modules::D1::pixel::pixel::Hsv;
use std::fmt;

/// Inclusive lower and upper HSV bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBand {
    pub min: Hsv,
    pub max: Hsv,
}

impl ColorBand {
    pub const fn new(min: Hsv, max: Hsv) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, hsv: Hsv) -> bool {
        (self.min.hue..=self.max.hue).contains(&hsv.hue)
            && (self.min.saturation..=self.max.saturation).contains(&hsv.saturation)
            && (self.min.value..=self.max.value).contains(&hsv.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedColor {
    Green,
    Blue,
    Red,
}

impl TrackedColor {
    pub const COUNT: usize = 3;
    pub const ALL: [TrackedColor; Self::COUNT] = [TrackedColor::Green, TrackedColor::Blue, TrackedColor::Red];

    pub const fn index(self) -> usize {
        match self {
            TrackedColor::Green => 0,
            TrackedColor::Blue => 1,
            TrackedColor::Red => 2,
        }
    }

    pub const fn band(self) -> ColorBand {
        match self {
            TrackedColor::Green => ColorBand::new(Hsv::new(50, 50, 10), Hsv::new(90, 255, 255)),
            TrackedColor::Blue => ColorBand::new(Hsv::new(100, 100, 10), Hsv::new(130, 255, 255)),
            TrackedColor::Red => ColorBand::new(Hsv::new(0, 100, 30), Hsv::new(5, 255, 255)),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            TrackedColor::Green => "green",
            TrackedColor::Blue => "blue",
            TrackedColor::Red => "red",
        }
    }
}

impl fmt::Display for TrackedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
