use chrono::NaiveDateTime;

use crate::core::catalog::{VideoCatalog, VideoFileDescriptor};
use crate::core::config::ExtractionConfig;
use crate::core::error::ExtractionError;
use crate::core::transaction::{correct_timestamp, TransactionRecord};
use crate::decoder::FrameSource;
use crate::shared::constants;
use crate::utils::file_utils::file_name_lossy;
use crate::utils::logger;
use crate::utils::sanitize::{sanitize_material, sanitize_simple};

/// Outcome of one transaction: the written file name, or why nothing was written.
pub type ExtractionResult = Result<String, ExtractionError>;

/// Seconds from the video's nominal start to `corrected`.
pub fn offset_into(video: &VideoFileDescriptor, corrected: NaiveDateTime) -> f64 {
    (corrected - video.nominal_start).num_milliseconds() as f64 / 1000.0
}

/// The offset must land inside the measured video, both ends inclusive.
pub fn validate_offset(
    delta_secs: f64,
    video: &VideoFileDescriptor,
    corrected: NaiveDateTime,
) -> Result<(), ExtractionError> {
    if delta_secs < 0.0 {
        return Err(ExtractionError::TimestampBeforeVideoStart { corrected });
    }
    if delta_secs > video.actual_duration {
        return Err(ExtractionError::TimestampBeyondVideoDuration {
            corrected,
            duration: video.actual_duration,
        });
    }
    Ok(())
}

/// `<vehicle>_<weighment>_<weight>_<material>_<YYYYMMDD_HHMMSS>.<ext>`, using the raw timestamp.
pub fn output_file_name(record: &TransactionRecord, raw: NaiveDateTime, extension: &str) -> String {
    format!(
        "{}_{}_{}_{}_{}.{}",
        sanitize_simple(&record.vehicle_type),
        sanitize_simple(&record.weighment_type),
        sanitize_simple(&record.weight),
        sanitize_material(&record.material),
        raw.format(constants::OUTPUT_TIMESTAMP_FORMAT),
        extension
    )
}

/// Match, validate, decode and write the frame for one transaction.
pub fn extract_frame(
    record: &TransactionRecord,
    catalog: &VideoCatalog,
    config: &ExtractionConfig,
    source: &dyn FrameSource,
) -> ExtractionResult {
    let raw = record.timestamp(&config.datetime_format)?;
    let corrected = correct_timestamp(raw, config.clock_offset_secs)?;

    let video = catalog.match_timestamp(raw, corrected)?;
    let delta_secs = offset_into(video, corrected);
    validate_offset(delta_secs, video, corrected)?;

    let file_name = output_file_name(record, raw, &config.image_extension);
    let out_path = config.output_dir.join(&file_name);
    if out_path.exists() {
        logger::debug(&format!("overwriting existing {}", out_path.display()));
    }

    logger::debug(&format!(
        "{} -> {} at {:.3}s",
        raw,
        file_name_lossy(&video.path),
        delta_secs
    ));
    source.save_frame(&video.path, delta_secs * 1000.0, &out_path)?;

    Ok(file_name)
}
