//! Loading config files into memory.
//!
//! The file contents are prepared for the grammar before parsing: embedded
//! NUL bytes become spaces and a line break is appended, so the last line
//! of a file is always terminated.

use std::path::{Path, PathBuf};

use sprig_syntax::ParseResult;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("No file name provided for parsing")]
    NoFileName,

    #[error("Could not open file at {path}: {source}")]
    CantOpenFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("File at {0} has no contents")]
    EmptyFile(PathBuf),
}

impl FileError {
    /// The parse result reported for this error.
    pub fn result(&self) -> ParseResult {
        match self {
            FileError::NoFileName => ParseResult::NoFileName,
            FileError::CantOpenFile { .. } => ParseResult::CantOpenFile,
            FileError::EmptyFile(_) => ParseResult::EmptyFile,
        }
    }
}

/// Read `path` and prepare its contents for parsing.
pub fn read_config_file(path: &Path) -> Result<Vec<u8>, FileError> {
    if path.as_os_str().is_empty() {
        return Err(FileError::NoFileName);
    }
    let mut contents = std::fs::read(path).map_err(|source| FileError::CantOpenFile {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.is_empty() {
        return Err(FileError::EmptyFile(path.to_path_buf()));
    }

    for byte in contents.iter_mut().filter(|b| **b == 0) {
        *byte = b' ';
    }
    contents.push(b'\n');
    log::debug!("read {} bytes from {}", contents.len(), path.display());
    Ok(contents)
}

/// Expand glob patterns into file paths, in pattern order.
///
/// A pattern that matches nothing, or is not a valid pattern, is kept as a
/// literal path so the caller still reports it.
pub fn expand_file_patterns<S: AsRef<str>>(patterns: &[S]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let matched: Vec<PathBuf> = match glob::glob(pattern) {
            Ok(paths) => paths
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(err) => {
                        log::warn!("Skipping unreadable match of {pattern}: {err}");
                        None
                    }
                })
                .collect(),
            Err(err) => {
                log::warn!("Invalid file pattern {pattern}: {err}");
                Vec::new()
            }
        };
        if matched.is_empty() {
            files.push(PathBuf::from(pattern));
        } else {
            files.extend(matched);
        }
    }
    files
}
