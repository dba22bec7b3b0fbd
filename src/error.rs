/*
 * DLSS Archiver v1.0.0
 * Copyright (c) 2026 DLSS Archiver Contributors.
 * Licensed under the MIT License.
 */

//! Error types and handling for the archiver.
//! Core operations return these to the caller; only the batch loop decides
//! whether a failure is logged and skipped.

use std::{
    fmt, io,
    path::{Path, PathBuf},
};

/// Every failure the archiver can report.
#[derive(Debug)]
pub enum ArchiveError {
    /// I/O errors during file operations
    Io(io::Error),
    /// ZIP format errors while reading or writing archives
    Zip(zip::result::ZipError),
    /// Manifest (de)serialization errors
    Json(serde_json::Error),
    /// Network errors while fetching the manifest or release archives
    Http(reqwest::Error),
    /// The embedded signature failed validation and no override was given
    SignatureInvalid(PathBuf),
    /// Malformed PE, DER or CMS structure
    Decode(String),
    /// Bytes on disk or over the wire do not match the recorded hash
    ChecksumMismatch {
        subject: String,
        expected: String,
        actual: String,
    },
    /// Signature verification failure with its reason
    Validation(String),
    /// Configuration or setup errors
    Config(String),
    /// A record construction step failed for a specific file
    Step {
        step: &'static str,
        path: PathBuf,
        source: Box<ArchiveError>,
    },
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::Io(e) => write!(f, "I/O Error: {}", e),
            ArchiveError::Zip(e) => write!(f, "ZIP Error: {}", e),
            ArchiveError::Json(e) => write!(f, "Manifest Error: {}", e),
            ArchiveError::Http(e) => write!(f, "Network Error: {}", e),
            ArchiveError::SignatureInvalid(p) => {
                write!(f, "Invalid signature found: {}", p.display())
            }
            ArchiveError::Decode(s) => write!(f, "Decode Error: {}", s),
            ArchiveError::ChecksumMismatch {
                subject,
                expected,
                actual,
            } => write!(
                f,
                "Checksum mismatch for {}: expected {}, got {}",
                subject, expected, actual
            ),
            ArchiveError::Validation(s) => write!(f, "Validation Error: {}", s),
            ArchiveError::Config(s) => write!(f, "Configuration Error: {}", s),
            ArchiveError::Step { step, path, source } => {
                write!(f, "{} failed for {}: {}", step, path.display(), source)
            }
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiveError::Io(e) => Some(e),
            ArchiveError::Zip(e) => Some(e),
            ArchiveError::Json(e) => Some(e),
            ArchiveError::Http(e) => Some(e),
            ArchiveError::Step { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl ArchiveError {
    /// The innermost error, looking through `Step` context.
    pub fn root(&self) -> &ArchiveError {
        match self {
            ArchiveError::Step { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<io::Error> for ArchiveError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(e: zip::result::ZipError) -> Self {
        Self::Zip(e)
    }
}

impl From<serde_json::Error> for ArchiveError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<reqwest::Error> for ArchiveError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<der::Error> for ArchiveError {
    fn from(e: der::Error) -> Self {
        Self::Decode(format!("DER: {}", e))
    }
}

impl From<goblin::error::Error> for ArchiveError {
    fn from(e: goblin::error::Error) -> Self {
        Self::Decode(format!("PE: {}", e))
    }
}

pub(crate) fn decode_err(msg: impl Into<String>) -> ArchiveError {
    ArchiveError::Decode(msg.into())
}

/// Attaches the failing step and path to an error.
pub(crate) trait StepContext<T> {
    fn step(self, step: &'static str, path: &Path) -> Result<T, ArchiveError>;
}

impl<T, E: Into<ArchiveError>> StepContext<T> for Result<T, E> {
    fn step(self, step: &'static str, path: &Path) -> Result<T, ArchiveError> {
        self.map_err(|e| ArchiveError::Step {
            step,
            path: path.to_path_buf(),
            source: Box::new(e.into()),
        })
    }
}
