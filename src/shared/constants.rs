pub const APP_NAME: &str = "weighframe";

pub const CONFIG_FILE: &str = "weighframe.config";
pub const ERROR_LOG_FILE: &str = "error.log";
pub const DEBUG_LOG_FILE: &str = "debug.log";

pub const DEFAULT_TRANSACTIONS_PATH: &str = "videos/book1.json";
pub const DEFAULT_VIDEO_DIR: &str = "videos";
pub const DEFAULT_OUTPUT_DIR: &str = "videos/output_images";

/// Only files from this camera/channel take part in matching.
pub const DEFAULT_VIDEO_PATTERN: &str = "steel yard_ch1_main";

/// Format of the "Transaction DateTime" field, e.g. `15-Jun-2023 10:05:00`.
pub const DEFAULT_DATETIME_FORMAT: &str = "%d-%b-%Y %H:%M:%S";

/// The weighbridge clock runs 1m44s ahead of the recorder clock.
pub const DEFAULT_CLOCK_OFFSET_SECS: i64 = 104;
/// Skews beyond a day are configuration mistakes, not clock drift.
pub const MAX_CLOCK_OFFSET_SECS: i64 = 86_400;

pub const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

/// Compact timestamp embedded in recorder filenames.
pub const FILENAME_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
/// Timestamp suffix of extracted image names.
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Underscore-separated field positions of the nominal start/end in a recorder filename.
pub const FILENAME_START_FIELD: usize = 3;
pub const FILENAME_END_FIELD: usize = 4;
