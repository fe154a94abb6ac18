use opencv::{core, imgcodecs, prelude::*, videoio};
use std::path::Path;

use super::FrameSource;
use crate::core::error::ExtractionError;
use crate::utils::file_utils::file_name_lossy;

/// An open capture. Released on drop, so every early return frees the handle.
pub struct VideoDecoder {
    capture: videoio::VideoCapture,
    file: String,
}

impl VideoDecoder {
    pub fn open(path: &Path) -> Result<Self, ExtractionError> {
        let file = file_name_lossy(path);
        let open_failure = |reason: String| ExtractionError::VideoOpenFailure {
            file: file.clone(),
            reason,
        };

        // CAP_ANY lets OpenCV pick the backend (FFmpeg for recorder .mp4/.avi files)
        let capture = videoio::VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)
            .map_err(|e| open_failure(e.to_string()))?;

        if !capture.is_opened().map_err(|e| open_failure(e.to_string()))? {
            return Err(open_failure("no backend could open the file".to_string()));
        }

        Ok(Self { capture, file })
    }

    fn property(&self, prop: i32) -> Result<f64, ExtractionError> {
        self.capture
            .get(prop)
            .map_err(|e| ExtractionError::VideoOpenFailure {
                file: self.file.clone(),
                reason: e.to_string(),
            })
    }

    pub fn frame_count(&self) -> Result<i64, ExtractionError> {
        Ok(self.property(videoio::CAP_PROP_FRAME_COUNT)? as i64)
    }

    pub fn fps(&self) -> Result<f64, ExtractionError> {
        self.property(videoio::CAP_PROP_FPS)
    }

    /// Duration from frame count and frame rate; 0 when the rate is unknown.
    pub fn duration_secs(&self) -> Result<f64, ExtractionError> {
        Ok(duration_from(self.frame_count()?, self.fps()?))
    }

    /// Seek to `offset_ms` and decode the frame found there.
    pub fn read_frame_at(&mut self, offset_ms: f64) -> Result<Mat, ExtractionError> {
        let decode_failure = || ExtractionError::FrameDecodeFailure {
            offset_secs: offset_ms / 1000.0,
        };

        self.capture
            .set(videoio::CAP_PROP_POS_MSEC, offset_ms)
            .map_err(|_| decode_failure())?;

        let mut frame = Mat::default();
        let grabbed = self.capture.read(&mut frame).map_err(|_| decode_failure())?;
        if !grabbed || frame.empty() {
            return Err(decode_failure());
        }
        Ok(frame)
    }
}

impl Drop for VideoDecoder {
    fn drop(&mut self) {
        let _ = self.capture.release();
    }
}

pub fn duration_from(frame_count: i64, fps: f64) -> f64 {
    if fps > 0.0 {
        frame_count as f64 / fps
    } else {
        0.0
    }
}

/// Encode `frame` to `out_path`; the format follows the file extension.
pub fn write_image(frame: &Mat, out_path: &Path) -> Result<(), ExtractionError> {
    let write_failure = |reason: String| ExtractionError::ImageWriteFailure {
        path: out_path.to_path_buf(),
        reason,
    };

    let written = imgcodecs::imwrite(
        &out_path.to_string_lossy(),
        frame,
        &core::Vector::<i32>::new(),
    )
    .map_err(|e| write_failure(e.to_string()))?;

    if !written {
        return Err(write_failure("encoder rejected the frame".to_string()));
    }
    Ok(())
}

/// OpenCV-backed frame source used by the CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenCvSource;

impl FrameSource for OpenCvSource {
    fn probe_duration(&self, path: &Path) -> Result<f64, ExtractionError> {
        let decoder = VideoDecoder::open(path)?;
        decoder.duration_secs()
    }

    fn save_frame(&self, path: &Path, offset_ms: f64, out_path: &Path) -> Result<(), ExtractionError> {
        let mut decoder = VideoDecoder::open(path)?;
        let frame = decoder.read_frame_at(offset_ms)?;
        // handle released before the encode
        drop(decoder);
        write_image(&frame, out_path)
    }
}
