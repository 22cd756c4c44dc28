//! Filesystem line writer and destination validation
//!
//! [`FsLineWriter`] is the production [`LineWriter`]: it joins the produced
//! lines with `\n` and writes them as UTF-8 in one call. Validation of a
//! candidate destination lives here too, next to the code that will write
//! to it.

use std::path::Path;
use tabgrid_core::{Error, LineWriter, Result};

/// Default file name suggested to the path resolver.
pub const DEFAULT_FILE_NAME: &str = "OutputData.csv";

/// Required destination extension, without the dot.
pub const CSV_EXTENSION: &str = "csv";

/// Writes export output to the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLineWriter;

impl LineWriter for FsLineWriter {
    fn write_lines(&self, path: &Path, lines: &[String]) -> bool {
        let mut contents = lines.join("\n");
        contents.push('\n');
        match std::fs::write(path, contents) {
            Ok(()) => true,
            Err(error) => {
                tracing::error!(path = %path.display(), %error, "failed to write export file");
                false
            }
        }
    }
}

/// Validate a candidate export destination.
///
/// Rejects empty paths, extensions other than `.csv` (case-insensitive),
/// and paths whose parent directory does not exist. Whether the path is
/// actually writable only surfaces at write time.
pub fn validate_destination(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::InvalidDestination("empty path".into()));
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case(CSV_EXTENSION) => {}
        _ => {
            return Err(Error::InvalidDestination(format!(
                "expected a .{} file: {}",
                CSV_EXTENSION,
                path.display()
            )))
        }
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(Error::InvalidDestination(format!(
                "directory does not exist: {}",
                parent.display()
            )));
        }
    }

    Ok(())
}
