//! Target list loading.
//!
//! A target list is plain text with one URL per line. Lines are trimmed and
//! blank lines dropped; everything else is kept verbatim and in order. URLs are
//! not validated here: a malformed entry simply fails when it is probed. Bytes
//! that are not valid UTF-8 are replaced rather than rejected, so one mangled
//! line never costs the rest of the list.

use crate::error::UrlCheckError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read targets from a file.
///
/// # Errors
///
/// Returns `UrlCheckError::FileError` if the file cannot be opened or an I/O
/// error occurs part way through. An empty list is not an error.
pub fn load_targets<P: AsRef<Path>>(path: P) -> Result<Vec<String>, UrlCheckError> {
    let path = path.as_ref();
    let shown = path.display().to_string();

    let file = File::open(path).map_err(|e| UrlCheckError::file_error(&shown, e.to_string()))?;
    let targets = read_targets(BufReader::new(file))
        .map_err(|e| UrlCheckError::file_error(&shown, e.to_string()))?;

    tracing::debug!(path = %shown, count = targets.len(), "loaded targets");
    Ok(targets)
}

/// Read targets from any buffered reader.
///
/// Lines are split on `\n` as raw bytes and decoded lossily. Stops at the
/// first I/O error; no partial list is returned.
pub fn read_targets<R: BufRead>(reader: R) -> std::io::Result<Vec<String>> {
    let mut targets = Vec::new();

    for line in reader.split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            targets.push(trimmed.to_string());
        }
    }

    Ok(targets)
}
