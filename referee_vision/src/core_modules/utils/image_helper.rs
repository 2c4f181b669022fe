pub mod image_helper {
    use image::{GrayImage, ImageEncoder, RgbaImage};
    use std::path::Path;

    /// Writes a single-channel mask as PNG.
    pub fn save_mask(path: impl AsRef<Path>, mask: &GrayImage) -> Result<(), image::error::ImageError> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(mask.as_raw(), mask.width(), mask.height(), image::ExtendedColorType::L8)?;

        Ok(())
    }

    /// Writes a camera frame as PNG.
    pub fn save_frame(path: impl AsRef<Path>, frame: &RgbaImage) -> Result<(), image::error::ImageError> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(frame.as_raw(), frame.width(), frame.height(), image::ExtendedColorType::Rgba8)?;

        Ok(())
    }
}
