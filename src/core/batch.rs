use anyhow::{Context, Result};
use std::fmt;
use std::fs;

use crate::core::catalog::{build_catalog, SkippedVideo, VideoCatalog};
use crate::core::config::ExtractionConfig;
use crate::core::extractor::{extract_frame, ExtractionResult};
use crate::core::transaction::{load_transactions, TransactionRecord};
use crate::decoder::FrameSource;
use crate::utils::logger;
use crate::utils::time_utils::Timer;

/// What a run did, transaction by transaction.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub saved: usize,
    pub catalog_size: usize,
    pub status_lines: Vec<String>,
    pub skipped_videos: Vec<SkippedVideo>,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.saved, self.total)
    }
}

pub fn status_line(result: &ExtractionResult) -> String {
    match result {
        Ok(file_name) => format!("✅ Saved {}", file_name),
        Err(err) => format!("⚠️ {}", err),
    }
}

/// Status line with a `[n/total]` counter in front, for the console.
pub fn progress_line(index: usize, total: usize, line: &str) -> String {
    let width = total.to_string().len();
    format!("[{:>width$}/{}] {}", index + 1, total, line, width = width)
}

/// Process every record in order, one at a time. Failures are recorded, never raised.
pub fn process_transactions(
    records: &[TransactionRecord],
    catalog: &VideoCatalog,
    config: &ExtractionConfig,
    source: &dyn FrameSource,
    summary: &mut BatchSummary,
) {
    summary.total += records.len();

    for (index, record) in records.iter().enumerate() {
        let result = extract_frame(record, catalog, config, source);
        let line = status_line(&result);

        let progress = progress_line(index, records.len(), &line);
        match &result {
            Ok(_) => {
                summary.saved += 1;
                logger::info(&progress);
            }
            Err(err) => {
                logger::error(&format!("{} ({})", progress, err.kind()));
            }
        }

        println!("{}", progress);
        summary.status_lines.push(line);
    }
}

/// Full run: load transactions, build the catalog once, extract every frame.
pub fn run_batch(config: &ExtractionConfig, source: &dyn FrameSource) -> Result<BatchSummary> {
    let timer = Timer::new();

    println!("Loading transactions from {}", config.transactions_path.display());
    let records = load_transactions(&config.transactions_path)?;
    println!("Loaded {} transactions", records.len());

    println!("Analyzing video files...");
    let (catalog, skipped_videos) = build_catalog(&config.video_dir, &config.video_pattern, source)?;
    println!("Found {} video files", catalog.len());
    for skipped in &skipped_videos {
        eprintln!("⚠️ Skipped {}", skipped.error);
    }

    let (minutes, seconds) = config.offset_minutes_seconds();
    println!("Timestamps are ahead by {}m {}s", minutes, seconds);

    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("Failed to create output directory: {}", config.output_dir.display())
    })?;

    let mut summary = BatchSummary {
        catalog_size: catalog.len(),
        skipped_videos,
        ..Default::default()
    };

    println!("Extracting frames...");
    process_transactions(&records, &catalog, config, source, &mut summary);

    logger::info(&format!(
        "run finished: {} saved in {}ms",
        summary,
        timer.elapsed_ms()
    ));
    println!("Done: {} images saved.", summary);
    Ok(summary)
}
