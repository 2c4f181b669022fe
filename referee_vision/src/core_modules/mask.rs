// THEORY:
// The `Mask` module holds the binary image produced for one color band. It is
// the bridge between per-pixel classification and spatial blob analysis.
//
// Key architectural principles:
// 1.  **Classification**: A mask is built by testing every HSV pixel of the
//     working frame against a `ColorBand`. Matching pixels get 255, others 0.
// 2.  **Binarization**: A fixed cutoff is applied afterwards so the mask holds
//     exactly two values no matter how it was produced.
// 3.  **Denoising**: A morphological opening (erosion then dilation) with a 3x3
//     ellipse removes single-pixel speckle and thin bridges. This must run
//     before blob detection, otherwise sensor noise in the marker's hue shows
//     up as tiny competing blobs.
// 4.  **Data Container**: Like `Pixel`, a `Mask` is "dumb". It knows how to
//     transform itself but knows nothing about blobs or positions.

pub mod mask {
    use crate::core_modules::D1::pixel::pixel::Hsv;
    use crate::core_modules::color_band::ColorBand;
    use image::GrayImage;

    pub const ON: u8 = 255;
    pub const OFF: u8 = 0;

    /// The 3x3 elliptical structuring element: a plus shape.
    const ELLIPSE_3X3: [(i32, i32); 5] = [(0, -1), (-1, 0), (0, 0), (1, 0), (0, 1)];

    /// A binary image, row-major, one byte per pixel.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Mask {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u8>,
    }

    impl Mask {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![OFF; (width * height) as usize],
            }
        }

        /// Marks every pixel whose HSV components fall within `band`, reusing this mask's buffer.
        pub fn fill_from_band(&mut self, hsv: &[Hsv], band: &ColorBand) {
            for (out, pixel) in self.pixels.iter_mut().zip(hsv) {
                *out = if band.contains(*pixel) { ON } else { OFF };
            }
        }

        pub fn get(&self, x: u32, y: u32) -> u8 {
            self.pixels[(y * self.width + x) as usize]
        }

        pub fn set(&mut self, x: u32, y: u32, value: u8) {
            self.pixels[(y * self.width + x) as usize] = value;
        }

        pub fn is_on(&self, x: u32, y: u32) -> bool {
            self.get(x, y) != OFF
        }

        pub fn count_on(&self) -> usize {
            self.pixels.iter().filter(|&&p| p != OFF).count()
        }

        /// Values strictly above `cutoff` become `ON`, the rest `OFF`.
        pub fn threshold(&mut self, cutoff: u8) {
            for pixel in self.pixels.iter_mut() {
                *pixel = if *pixel > cutoff { ON } else { OFF };
            }
        }

        /// Erosion then dilation with the 3x3 ellipse.
        /// `scratch` must be a mask of the same size; its contents are overwritten.
        pub fn open(&mut self, scratch: &mut Mask) {
            self.morph_into(scratch, true);
            scratch.morph_into(self, false);
        }

        /// Applies one erosion (`erode == true`) or dilation pass into `out`.
        /// Neighbors outside the image are ignored, so borders neither erode nor grow.
        fn morph_into(&self, out: &mut Mask, erode: bool) {
            let width = self.width as i32;
            let height = self.height as i32;
            for y in 0..height {
                for x in 0..width {
                    let mut hit = erode;
                    for (dx, dy) in ELLIPSE_3X3 {
                        let nx = x + dx;
                        let ny = y + dy;
                        if nx < 0 || nx >= width || ny < 0 || ny >= height {
                            continue;
                        }
                        let on = self.pixels[(ny * width + nx) as usize] != OFF;
                        if erode && !on {
                            hit = false;
                            break;
                        }
                        if !erode && on {
                            hit = true;
                            break;
                        }
                    }
                    out.pixels[(y * width + x) as usize] = if hit { ON } else { OFF };
                }
            }
        }

        pub fn to_gray_image(&self) -> Option<GrayImage> {
            GrayImage::from_raw(self.width, self.height, self.pixels.clone())
        }
    }

}
