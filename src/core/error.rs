use chrono::NaiveDateTime;
use std::path::PathBuf;
use thiserror::Error;

/// Failures scoped to a single video file or a single transaction.
///
/// None of these abort a run: catalog failures exclude the file, extraction
/// failures are reported on the transaction's status line.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unparseable video filename {file}: {reason}")]
    UnparseableFilename { file: String, reason: String },

    #[error("Cannot open {file}: {reason}")]
    VideoOpenFailure { file: String, reason: String },

    #[error("Invalid transaction time {value:?}: {reason}")]
    InvalidTransactionTime { value: String, reason: String },

    #[error("Clock offset {offset_secs}s moves {raw} out of the representable range")]
    OffsetOutOfRange { raw: NaiveDateTime, offset_secs: i64 },

    #[error("No video for {raw} (adjusted {corrected})")]
    NoVideoForTimestamp {
        raw: NaiveDateTime,
        corrected: NaiveDateTime,
    },

    #[error("Adjusted timestamp {corrected} before video start")]
    TimestampBeforeVideoStart { corrected: NaiveDateTime },

    #[error("Adjusted timestamp {corrected} beyond duration {duration:.1}s")]
    TimestampBeyondVideoDuration {
        corrected: NaiveDateTime,
        duration: f64,
    },

    #[error("Failed to read frame at {offset_secs:.1}s")]
    FrameDecodeFailure { offset_secs: f64 },

    #[error("Failed to write {}: {reason}", .path.display())]
    ImageWriteFailure { path: PathBuf, reason: String },
}

impl ExtractionError {
    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::UnparseableFilename { .. } => "unparseable_filename",
            ExtractionError::VideoOpenFailure { .. } => "video_open_failure",
            ExtractionError::InvalidTransactionTime { .. } => "invalid_transaction_time",
            ExtractionError::OffsetOutOfRange { .. } => "offset_out_of_range",
            ExtractionError::NoVideoForTimestamp { .. } => "no_video_for_timestamp",
            ExtractionError::TimestampBeforeVideoStart { .. } => "timestamp_before_video_start",
            ExtractionError::TimestampBeyondVideoDuration { .. } => {
                "timestamp_beyond_video_duration"
            }
            ExtractionError::FrameDecodeFailure { .. } => "frame_decode_failure",
            ExtractionError::ImageWriteFailure { .. } => "image_write_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 6, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_no_video_message_carries_both_timestamps() {
        let err = ExtractionError::NoVideoForTimestamp {
            raw: at(10, 5, 0),
            corrected: at(10, 3, 16),
        };
        assert_eq!(
            err.to_string(),
            "No video for 2023-06-15 10:05:00 (adjusted 2023-06-15 10:03:16)"
        );
        assert_eq!(err.kind(), "no_video_for_timestamp");
    }

    #[test]
    fn test_beyond_duration_message_includes_duration() {
        let err = ExtractionError::TimestampBeyondVideoDuration {
            corrected: at(10, 3, 16),
            duration: 120.04,
        };
        assert_eq!(
            err.to_string(),
            "Adjusted timestamp 2023-06-15 10:03:16 beyond duration 120.0s"
        );
    }
}
