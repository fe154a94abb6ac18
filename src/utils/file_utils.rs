use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Regular files in `dir` whose file name contains `pattern`, in sorted order.
///
/// An empty result is not an error; callers decide whether that matters.
pub fn list_files_containing(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map_or(false, |name| name.contains(pattern))
        })
        .collect();

    files.sort();
    Ok(files)
}

pub fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
