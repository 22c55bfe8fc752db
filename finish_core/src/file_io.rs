//! # File I/O Module
//!
//! Handles report file writes with one safety feature:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent a half-written
//!   report replacing a good one
//!
//! ## Example
//!
//! ```rust,no_run
//! use finish_core::file_io::write_atomic;
//! use std::path::Path;
//!
//! write_atomic(Path::new("reports/calculation_report.pdf"), b"%PDF-1.7")?;
//! # Ok::<(), finish_core::errors::CalcError>(())
//! ```

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::{CalcError, CalcResult};

/// Write `bytes` to `path` atomically.
///
/// The parent directory is created if needed. Data goes to `<path>.tmp`
/// first and is renamed over `path` only after it has been synced to disk.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> CalcResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            CalcError::file_error("create directory", parent.display().to_string(), e.to_string())
        })?;
    }

    let tmp_path = tmp_path_for(path);
    let written = write_synced(&tmp_path, bytes).and_then(|()| {
        fs::rename(&tmp_path, path).map_err(|e| {
            CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
        })
    });

    // no temp file survives a failed write
    if written.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    written
}

fn write_synced(tmp_path: &Path, bytes: &[u8]) -> CalcResult<()> {
    let mut tmp_file = File::create(tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(bytes).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })
}

/// `report.pdf` -> `report.pdf.tmp`
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("report"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_atomic_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.xlsx");

        write_atomic(&path, b"PK\x03\x04").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"PK\x03\x04");
        assert!(!dir.path().join("report.xlsx.tmp").exists());
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        fs::write(&path, b"old").unwrap();

        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_write_atomic_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports").join("2025").join("report.pdf");

        write_atomic(&path, b"%PDF").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_failed_write_removes_temp_file() {
        let dir = tempdir().unwrap();
        // a non-empty directory can't be replaced by a file
        let path = dir.path().join("report.pdf");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        let err = write_atomic(&path, b"%PDF").unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
        assert!(!dir.path().join("report.pdf.tmp").exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn test_tmp_path() {
        assert_eq!(
            tmp_path_for(Path::new("out/report.pdf")),
            PathBuf::from("out/report.pdf.tmp")
        );
    }
}
