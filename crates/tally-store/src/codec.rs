//! # Record Codec
//!
//! Shared helpers for the `|`-delimited store files.
//!
//! ## File Shape
//! ```text
//! # <header comment naming the columns>      ← skipped on read
//!                                             ← blank, skipped
//! field|field|field|...                       ← one record per line
//! ```
//!
//! ## Atomic Replace
//! Full-replace saves write `<name>.tmp` next to the target and rename it
//! over the original, so a crash mid-write never leaves a half-written store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

/// Field separator used by every store file.
pub const DELIMITER: char = '|';

/// Splits a line into fields, or `None` for comments and blank lines.
pub(crate) fn record_fields(line: &str) -> Option<Vec<&str>> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() || line.starts_with('#') {
        return None;
    }
    Some(line.split(DELIMITER).collect())
}

/// Empty (after trimming) means absent.
pub(crate) fn optional_field(field: Option<&&str>) -> Option<String> {
    field
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}

/// Absent stays absent; present must parse or the record is dropped.
pub(crate) fn optional_number(field: Option<&&str>) -> Result<Option<i64>, ()> {
    match field.map(|f| f.trim()).filter(|f| !f.is_empty()) {
        None => Ok(None),
        Some(f) => f.parse::<i64>().map(Some).map_err(|_| ()),
    }
}

pub(crate) fn or_empty(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// Parses every record line, skipping the ones `parse` rejects.
///
/// Returns the parsed records and how many lines were skipped.
pub(crate) fn parse_records<T, F>(path: &Path, text: &str, mut parse: F) -> (Vec<T>, usize)
where
    F: FnMut(&[&str]) -> Option<T>,
{
    let mut records = Vec::new();
    let mut skipped = 0;

    for (index, line) in text.lines().enumerate() {
        let Some(fields) = record_fields(line) else {
            continue;
        };
        match parse(&fields) {
            Some(record) => records.push(record),
            None => {
                skipped += 1;
                debug!(path = %path.display(), line = index + 1, "Skipping malformed record");
            }
        }
    }

    if skipped > 0 {
        warn!(
            path = %path.display(),
            skipped,
            loaded = records.len(),
            "Skipped malformed records"
        );
    }

    (records, skipped)
}

/// Reads a store file, creating it with `header` if it does not exist yet.
pub(crate) fn read_or_create(path: &Path, header: &str) -> StoreResult<String> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "Store file missing, creating");
            write_atomic(path, &format!("{}\n", header))?;
            Ok(String::new())
        }
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Where [`write_atomic`] stages its output.
pub fn temp_path(path: &Path) -> PathBuf {
    path.with_extension("tmp")
}

/// Replaces `path` with `contents` via a temp file and rename.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let tmp_path = temp_path(path);
    fs::write(&tmp_path, contents).map_err(|e| StoreError::io(&tmp_path, e))?;

    // On Windows, rename fails if the destination exists; remove it first.
    #[cfg(target_os = "windows")]
    {
        let _ = fs::remove_file(path);
    }

    fs::rename(&tmp_path, path).map_err(|e| StoreError::io(path, e))
}
