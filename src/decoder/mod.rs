pub mod video;

use std::path::Path;

use crate::core::error::ExtractionError;

pub use video::OpenCvSource;

/// The two video operations a run needs.
pub trait FrameSource {
    /// Measured duration in seconds (frame count / frame rate).
    fn probe_duration(&self, path: &Path) -> Result<f64, ExtractionError>;

    /// Decode the frame at `offset_ms` and write it as an image to `out_path`.
    fn save_frame(&self, path: &Path, offset_ms: f64, out_path: &Path) -> Result<(), ExtractionError>;
}
