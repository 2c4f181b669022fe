// THEORY:
// The `BlobDetector` is the engine of the spatial layer. It takes one denoised
// color mask and answers a single question: where is the marker?
//
// Key architectural principles & algorithm steps:
// 1.  **Seeding**: The mask is scanned row by row. Every `ON` pixel not yet
//     claimed by a region becomes the seed of a new blob.
// 2.  **Region Growing**: From each seed the region expands through all eight
//     neighbors, the same connectivity an external contour follows, until no
//     unclaimed `ON` neighbor is left.
// 3.  **Data Aggregation**: Each finished region is packaged into a `SmartBlob`
//     with its bounding box and raw moments.
// 4.  **Largest Blob Wins**: The referee assumes one marker of each color is in
//     view. The region with the largest area is taken to be it and every smaller
//     match, including background clutter, is ignored. Ties keep the region
//     found first in scan order.
// 5.  **Stateless Utility**: Nothing is remembered between frames.

use crate::core_modules::mask::mask::Mask;
use crate::core_modules::moment::Moments;
use crate::core_modules::smart_blob::{Point, SmartBlob};

pub mod blob_detector {
    use super::*; // Make structs from parent module available.

    const NEIGHBORS: [(i32, i32); 8] = [
        (-1, -1),
        (0, -1),
        (1, -1),
        (-1, 0),
        (1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
    ];

    /// Identifies every connected region of `ON` pixels in the mask.
    pub fn find_blobs(mask: &Mask) -> Vec<SmartBlob> {
        let mut visited = vec![false; mask.pixels.len()];
        let mut blobs: Vec<SmartBlob> = Vec::new();

        for y in 0..mask.height {
            for x in 0..mask.width {
                let index = (y * mask.width + x) as usize;
                if visited[index] || !mask.is_on(x, y) {
                    continue;
                }
                let seed = Point::new(x as i32, y as i32);
                let blob = grow_blob_from_seed(seed, mask, &mut visited);
                blobs.push(blob);
            }
        }

        blobs
    }

    /// The region with the largest area, or `None` when the mask is empty.
    pub fn largest_blob(mask: &Mask) -> Option<SmartBlob> {
        let mut largest: Option<SmartBlob> = None;
        for blob in find_blobs(mask) {
            let bigger = largest.as_ref().is_none_or(|best| blob.area() > best.area());
            if bigger {
                largest = Some(blob);
            }
        }
        largest
    }

    /// Collects all pixels connected to `seed` using an explicit stack.
    fn grow_blob_from_seed(seed: Point, mask: &Mask, visited: &mut [bool]) -> SmartBlob {
        let width = mask.width as i32;
        let height = mask.height as i32;

        let mut pixel_coords: Vec<Point> = Vec::new();
        let mut queue: Vec<Point> = vec![seed];
        visited[(seed.y * width + seed.x) as usize] = true;

        while let Some(current) = queue.pop() {
            pixel_coords.push(current);

            for (dx, dy) in NEIGHBORS {
                let nx = current.x + dx;
                let ny = current.y + dy;
                if nx < 0 || nx >= width || ny < 0 || ny >= height {
                    continue;
                }
                let index = (ny * width + nx) as usize;
                if !visited[index] && mask.is_on(nx as u32, ny as u32) {
                    visited[index] = true;
                    queue.push(Point::new(nx, ny));
                }
            }
        }

        // --- Data Aggregation ---
        let mut min = Point::new(i32::MAX, i32::MAX);
        let mut max = Point::new(i32::MIN, i32::MIN);
        let mut moments = Moments::default();
        for point in &pixel_coords {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
            moments.accumulate(*point);
        }

        SmartBlob {
            bounding_box: (min, max),
            pixel_coords,
            moments,
        }
    }

}
