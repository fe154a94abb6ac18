pub mod file_utils;
pub mod logger;
pub mod sanitize;
pub mod time_utils;
