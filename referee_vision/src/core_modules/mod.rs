#[allow(non_snake_case)]
pub mod D1;
pub mod blob_detector;
pub mod color_band;
pub mod frame_tracker;
pub mod mask;
pub mod moment;
pub mod smart_blob;
pub mod tracker;
pub mod utils;
