// THEORY:
// Image moments summarize the shape of a region with a handful of sums. The
// referee only needs the first three raw moments:
//
//   M00 = sum(1)      the area
//   M10 = sum(x)      x mass
//   M01 = sum(y)      y mass
//
// The centroid is (M10 / M00, M01 / M00). When the region is empty M00 is zero
// and that division has no meaning; `centroid` returns `None` instead of a
// number, and the tracker turns that into `Position::NotFound`.

use crate::core_modules::smart_blob::Point;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    pub fn accumulate(&mut self, point: Point) {
        self.m00 += 1.0;
        self.m10 += point.x as f64;
        self.m01 += point.y as f64;
    }

    /// Centroid truncated toward zero onto the integer grid, or `None` for an empty region.
    pub fn centroid(&self) -> Option<Point> {
        if self.m00 <= 0.0 {
            return None;
        }
        Some(Point::new(
            (self.m10 / self.m00) as i32,
            (self.m01 / self.m00) as i32,
        ))
    }
}
