// THEORY:
// A `SmartBlob` is a "dumb" data container summarizing one connected region of
// a color mask in a single frame. It carries the pixel coordinates that make it
// up, its area and bounding box, and its raw image moments so the centroid can
// be derived without walking the pixels again.
//
// It has no identity across frames. The referee only ever asks for the largest
// blob of each color, frame by frame.

use crate::core_modules::moment::Moments;

/// A 2D integer point on the working frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// True Euclidean distance, both axes measured independently.
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        dx.hypot(dy)
    }
}

/// Represents a single, spatially coherent region of one mask.
#[derive(Debug, Clone)]
pub struct SmartBlob {
    /// Top-left and bottom-right pixel, inclusive.
    pub bounding_box: (Point, Point),
    /// Every pixel coordinate in the region.
    pub pixel_coords: Vec<Point>,
    /// Raw area moments of the region.
    pub moments: Moments,
}

impl SmartBlob {
    /// The number of pixels in the region.
    pub fn area(&self) -> usize {
        self.pixel_coords.len()
    }
}
