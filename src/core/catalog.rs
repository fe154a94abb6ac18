use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::core::error::ExtractionError;
use crate::decoder::FrameSource;
use crate::shared::constants;
use crate::utils::file_utils::{self, file_name_lossy};
use crate::utils::logger;

/// One recorder file with its filename-encoded window and measured length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoFileDescriptor {
    pub path: PathBuf,
    pub nominal_start: NaiveDateTime,
    pub nominal_end: NaiveDateTime,
    pub actual_duration: f64,
}

impl VideoFileDescriptor {
    /// Half-open containment: `[nominal_start, nominal_end)`.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.nominal_start <= ts && ts < self.nominal_end
    }
}

/// A file left out of the catalog, with the reason.
#[derive(Debug)]
pub struct SkippedVideo {
    pub path: PathBuf,
    pub error: ExtractionError,
}

impl Serialize for SkippedVideo {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("SkippedVideo", 3)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("kind", self.error.kind())?;
        state.serialize_field("reason", &self.error.to_string())?;
        state.end()
    }
}

/// Videos sorted ascending by nominal start.
#[derive(Debug, Default, Clone, Serialize)]
pub struct VideoCatalog {
    entries: Vec<VideoFileDescriptor>,
}

impl VideoCatalog {
    pub fn new(mut entries: Vec<VideoFileDescriptor>) -> Self {
        entries.sort_by_key(|entry| entry.nominal_start);
        Self { entries }
    }

    pub fn entries(&self) -> &[VideoFileDescriptor] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry (earliest start) whose window contains `ts`.
    ///
    /// Overlapping windows are allowed; the scan order decides between them.
    pub fn find_video(&self, ts: NaiveDateTime) -> Option<&VideoFileDescriptor> {
        self.entries.iter().find(|entry| entry.contains(ts))
    }

    /// Like [`find_video`](Self::find_video), reporting both timestamps on a miss.
    pub fn match_timestamp(
        &self,
        raw: NaiveDateTime,
        corrected: NaiveDateTime,
    ) -> Result<&VideoFileDescriptor, ExtractionError> {
        self.find_video(corrected)
            .ok_or(ExtractionError::NoVideoForTimestamp { raw, corrected })
    }
}

/// Parse the nominal `(start, end)` out of a recorder file name.
///
/// Fields are `_`-separated; the start is field 3 and the end is field 4 up to
/// its first `.`, both `YYYYMMDDHHMMSS`.
pub fn parse_nominal_bounds(file_name: &str) -> Result<(NaiveDateTime, NaiveDateTime), ExtractionError> {
    let unparseable = |reason: String| ExtractionError::UnparseableFilename {
        file: file_name.to_string(),
        reason,
    };

    let parts: Vec<&str> = file_name.split('_').collect();
    if parts.len() <= constants::FILENAME_END_FIELD {
        return Err(unparseable(format!(
            "expected at least {} '_'-separated fields, found {}",
            constants::FILENAME_END_FIELD + 1,
            parts.len()
        )));
    }

    let start_field = parts[constants::FILENAME_START_FIELD];
    let end_field = parts[constants::FILENAME_END_FIELD]
        .split('.')
        .next()
        .unwrap_or_default();

    let parse = |field: &str| {
        NaiveDateTime::parse_from_str(field, constants::FILENAME_TIMESTAMP_FORMAT)
            .map_err(|e| unparseable(format!("{:?} is not a timestamp: {}", field, e)))
    };
    let start = parse(start_field)?;
    let end = parse(end_field)?;

    if start >= end {
        return Err(unparseable(format!("start {} is not before end {}", start, end)));
    }
    Ok((start, end))
}

fn describe(path: &Path, source: &dyn FrameSource) -> Result<VideoFileDescriptor, ExtractionError> {
    let (nominal_start, nominal_end) = parse_nominal_bounds(&file_name_lossy(path))?;
    let actual_duration = source.probe_duration(path)?;
    Ok(VideoFileDescriptor {
        path: path.to_path_buf(),
        nominal_start,
        nominal_end,
        actual_duration,
    })
}

/// Scan `video_dir` for files containing `pattern` and build the catalog.
///
/// Unparseable or unopenable files are collected, not fatal. Only an
/// unreadable directory is an error.
pub fn build_catalog(
    video_dir: &Path,
    pattern: &str,
    source: &dyn FrameSource,
) -> Result<(VideoCatalog, Vec<SkippedVideo>)> {
    let paths = file_utils::list_files_containing(video_dir, pattern)?;
    logger::info(&format!(
        "catalog: {} candidate files in {} matching {:?}",
        paths.len(),
        video_dir.display(),
        pattern
    ));

    let mut entries = Vec::with_capacity(paths.len());
    let mut skipped = Vec::new();

    for path in paths {
        match describe(&path, source) {
            Ok(entry) => {
                logger::debug(&format!(
                    "catalog: {} [{} .. {}) duration {:.1}s",
                    file_name_lossy(&entry.path),
                    entry.nominal_start,
                    entry.nominal_end,
                    entry.actual_duration
                ));
                entries.push(entry);
            }
            Err(error) => {
                logger::error(&format!("catalog: skipped: {}", error));
                skipped.push(SkippedVideo { path, error });
            }
        }
    }

    Ok((VideoCatalog::new(entries), skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::testing::FakeSource;
    use chrono::NaiveDate;
    use std::fs;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 6, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn entry(name: &str, start: NaiveDateTime, end: NaiveDateTime) -> VideoFileDescriptor {
        VideoFileDescriptor {
            path: PathBuf::from(name),
            nominal_start: start,
            nominal_end: end,
            actual_duration: (end - start).num_seconds() as f64,
        }
    }

    #[test]
    fn test_parse_nominal_bounds() {
        let (start, end) =
            parse_nominal_bounds("steel yard_ch1_main_20230615100000_20230615101000.mp4").unwrap();
        assert_eq!(start, at(10, 0, 0));
        assert_eq!(end, at(10, 10, 0));

        // extra trailing fields are fine
        let (start, _) =
            parse_nominal_bounds("steel yard_ch1_main_20230615100000_20230615101000_1.avi").unwrap();
        assert_eq!(start, at(10, 0, 0));
    }

    #[test]
    fn test_parse_nominal_bounds_rejects_bad_names() {
        for name in [
            "steel yard_ch1_main.mp4",
            "steel yard_ch1_main_2023061510_20230615101000.mp4",
            "steel yard_ch1_main_20230615100000_later.mp4",
            "steel yard_ch1_main_20231315100000_20231315101000.mp4",
            "steel yard_ch1_main_20230615101000_20230615100000.mp4",
        ] {
            match parse_nominal_bounds(name) {
                Err(ExtractionError::UnparseableFilename { file, .. }) => assert_eq!(file, name),
                other => panic!("{}: unexpected result {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_catalog_sorted_by_start() {
        let catalog = VideoCatalog::new(vec![
            entry("b", at(10, 10, 0), at(10, 20, 0)),
            entry("a", at(10, 0, 0), at(10, 10, 0)),
        ]);
        let names: Vec<_> = catalog.entries().iter().map(|e| e.path.clone()).collect();
        assert_eq!(names, vec![PathBuf::from("a"), PathBuf::from("b")]);
    }

    #[test]
    fn test_find_video_half_open_interval() {
        let catalog = VideoCatalog::new(vec![
            entry("a", at(10, 0, 0), at(10, 10, 0)),
            entry("b", at(10, 10, 0), at(10, 20, 0)),
        ]);

        assert_eq!(catalog.find_video(at(10, 0, 0)).unwrap().path, PathBuf::from("a"));
        assert_eq!(catalog.find_video(at(10, 9, 59)).unwrap().path, PathBuf::from("a"));
        assert_eq!(catalog.find_video(at(10, 10, 0)).unwrap().path, PathBuf::from("b"));
        assert!(catalog.find_video(at(10, 20, 0)).is_none());
        assert!(catalog.find_video(at(9, 59, 59)).is_none());
    }

    #[test]
    fn test_overlap_prefers_earliest_start() {
        let catalog = VideoCatalog::new(vec![
            entry("late", at(10, 5, 0), at(10, 15, 0)),
            entry("early", at(10, 0, 0), at(10, 10, 0)),
        ]);
        assert_eq!(
            catalog.find_video(at(10, 7, 0)).unwrap().path,
            PathBuf::from("early")
        );
        assert_eq!(
            catalog.find_video(at(10, 12, 0)).unwrap().path,
            PathBuf::from("late")
        );
    }

    #[test]
    fn test_every_inside_timestamp_matches_and_outside_misses() {
        let catalog = VideoCatalog::new(vec![
            entry("a", at(10, 0, 0), at(10, 10, 0)),
            entry("b", at(11, 0, 0), at(11, 30, 0)),
        ]);

        for secs in (0..600).step_by(7) {
            let ts = at(10, 0, 0) + chrono::Duration::seconds(secs);
            assert_eq!(catalog.find_video(ts).unwrap().path, PathBuf::from("a"));
        }
        for secs in (0..3000).step_by(11) {
            let ts = at(10, 10, 0) + chrono::Duration::seconds(secs);
            match catalog.match_timestamp(ts, ts) {
                Err(ExtractionError::NoVideoForTimestamp { corrected, .. }) => {
                    assert_eq!(corrected, ts)
                }
                other => panic!("{}: unexpected result {:?}", ts, other),
            }
        }
    }

    #[test]
    fn test_build_catalog_collects_skips() {
        let dir = tempfile::tempdir().unwrap();
        let good = "steel yard_ch1_main_20230615100000_20230615101000.mp4";
        let earlier = "steel yard_ch1_main_20230615090000_20230615091000.mp4";
        let broken = "steel yard_ch1_main_20230615110000_20230615111000.mp4";
        let unnamed = "steel yard_ch1_main_export.mp4";
        let other_channel = "steel yard_ch2_main_20230615100000_20230615101000.mp4";
        for name in [good, earlier, broken, unnamed, other_channel] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let source = FakeSource::default()
            .with_video(good, 601.2)
            .with_video(earlier, 600.0);

        let (catalog, skipped) =
            build_catalog(dir.path(), "steel yard_ch1_main", &source).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries()[0].nominal_start, at(9, 0, 0));
        assert_eq!(catalog.entries()[1].actual_duration, 601.2);

        let mut kinds: Vec<(String, &str)> = skipped
            .iter()
            .map(|s| (file_name_lossy(&s.path), s.error.kind()))
            .collect();
        kinds.sort();
        assert_eq!(
            kinds,
            vec![
                (broken.to_string(), "video_open_failure"),
                (unnamed.to_string(), "unparseable_filename"),
            ]
        );
    }

    #[test]
    fn test_unparseable_file_is_not_probed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("steel yard_ch1_main_export.mp4"), b"").unwrap();
        let source = FakeSource::default();

        let (catalog, skipped) =
            build_catalog(dir.path(), "steel yard_ch1_main", &source).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(skipped.len(), 1);
        assert_eq!(*source.opens.borrow(), 0);
    }
}
