use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::constants;

/// Every tunable of a run. Built once, then only borrowed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionConfig {
    pub transactions_path: PathBuf,
    pub video_dir: PathBuf,
    pub output_dir: PathBuf,
    pub video_pattern: String,
    pub datetime_format: String,
    pub clock_offset_secs: i64,
    pub image_extension: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            transactions_path: PathBuf::from(constants::DEFAULT_TRANSACTIONS_PATH),
            video_dir: PathBuf::from(constants::DEFAULT_VIDEO_DIR),
            output_dir: PathBuf::from(constants::DEFAULT_OUTPUT_DIR),
            video_pattern: constants::DEFAULT_VIDEO_PATTERN.to_string(),
            datetime_format: constants::DEFAULT_DATETIME_FORMAT.to_string(),
            clock_offset_secs: constants::DEFAULT_CLOCK_OFFSET_SECS,
            image_extension: constants::DEFAULT_IMAGE_EXTENSION.to_string(),
        }
    }
}

/// Values given on the command line; each one beats the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub transactions_path: Option<PathBuf>,
    pub video_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub video_pattern: Option<String>,
    pub datetime_format: Option<String>,
    pub clock_offset_secs: Option<i64>,
}

impl ExtractionConfig {
    /// Resolve defaults, then the config file, then `overrides`.
    ///
    /// An explicitly named config file must exist; the default
    /// `weighframe.config` in the working directory is optional.
    pub fn load(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = Self::default();

        match config_path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                config.apply_file(&content)?;
            }
            None => {
                let default_path = Path::new(constants::CONFIG_FILE);
                if let Ok(content) = fs::read_to_string(default_path) {
                    config.apply_file(&content)?;
                }
            }
        }

        config.apply_overrides(overrides);
        check_offset(config.clock_offset_secs)?;
        Ok(config)
    }

    /// Apply `key = value` lines. Blank lines and `#` comments are ignored.
    pub fn apply_file(&mut self, content: &str) -> Result<()> {
        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some((key, value)) = trimmed.split_once('=') else {
                bail!("Config line {}: expected `key = value`, got {:?}", index + 1, trimmed);
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "transactions" => self.transactions_path = PathBuf::from(value),
                "video-dir" => self.video_dir = PathBuf::from(value),
                "output-dir" => self.output_dir = PathBuf::from(value),
                "video-pattern" => self.video_pattern = value.to_string(),
                "date-format" => self.datetime_format = value.to_string(),
                "offset-secs" => {
                    let offset = value.parse::<i64>().with_context(|| {
                        format!("Config line {}: offset-secs must be an integer", index + 1)
                    })?;
                    check_offset(offset)
                        .with_context(|| format!("Config line {}", index + 1))?;
                    self.clock_offset_secs = offset;
                }
                "image-ext" => {
                    let ext = value.trim_start_matches('.');
                    if ext.is_empty() {
                        bail!("Config line {}: image-ext must not be empty", index + 1);
                    }
                    self.image_extension = ext.to_ascii_lowercase();
                }
                other => bail!("Config line {}: unknown key {:?}", index + 1, other),
            }
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(path) = &overrides.transactions_path {
            self.transactions_path = path.clone();
        }
        if let Some(dir) = &overrides.video_dir {
            self.video_dir = dir.clone();
        }
        if let Some(dir) = &overrides.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(pattern) = &overrides.video_pattern {
            self.video_pattern = pattern.clone();
        }
        if let Some(format) = &overrides.datetime_format {
            self.datetime_format = format.clone();
        }
        if let Some(offset) = overrides.clock_offset_secs {
            self.clock_offset_secs = offset;
        }
    }

    /// Offset as `(minutes, seconds)` for the startup banner.
    pub fn offset_minutes_seconds(&self) -> (i64, i64) {
        (
            self.clock_offset_secs.div_euclid(60),
            self.clock_offset_secs.rem_euclid(60),
        )
    }
}

fn check_offset(offset_secs: i64) -> Result<()> {
    if offset_secs.checked_abs().map_or(true, |abs| abs > constants::MAX_CLOCK_OFFSET_SECS) {
        bail!(
            "clock offset {}s is outside ±{}s",
            offset_secs,
            constants::MAX_CLOCK_OFFSET_SECS
        );
    }
    Ok(())
}
