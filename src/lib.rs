/*
 * DLSS Archiver v1.0.0
 * Copyright (c) 2026 DLSS Archiver Contributors.
 * Licensed under the MIT License.
 */

//! # DLSS Archiver Library
//!
//! Validates the embedded Authenticode signature of DLSS runtime DLLs,
//! recovers their signing time, and packages each one into a checksummed zip
//! listed in a JSON manifest. It provides the core functionality for the
//! `dlss-archiver` command-line tool.

pub mod builder;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod download;
pub mod error;
pub mod manifest;
pub mod notes;
pub mod pe;
pub mod pkcs7;
pub mod processor;
pub mod record;
pub mod timestamp;
pub mod ui;
pub mod verification;
pub mod version;

#[cfg(test)]
pub(crate) mod testutil;

pub use cli::{build_command, run, run_with};
pub use error::ArchiveError;
pub use record::{build_record, ProvenanceRecord};
pub use timestamp::{extract_signed_timestamp, SignedTimestamp};
pub use verification::{AuthenticodeVerifier, SignatureValidator};

pub const APP_NAME: &str = "DLSS Archiver";
pub const APP_BIN_NAME: &str = "dlss-archiver";
pub const APP_VERSION: &str = "1.0.0";
pub const APP_AUTHOR: &str = "DLSS Archiver Contributors";
pub const APP_ABOUT: &str = "Validates, timestamps and packages signed DLSS runtime releases into a checksummed archive.";
pub const BUFFER_SIZE: usize = 64 * 1024;

/// File name of the library inside every input zip.
pub const DLL_ENTRY_NAME: &str = "nvngx_dlss.dll";
/// Prefix of every packaged zip and of the publish tag derivation.
pub const ARCHIVE_PREFIX: &str = "nvngx_dlss";
pub const MANIFEST_FILE_NAME: &str = "dlss_records.json";
pub const NOTES_FILE_NAME: &str = "additional_notes.txt";

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_INPUT_DIR: &str = "base_dlss";
pub const DEFAULT_MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/beeradmoore/dlss-archive/main/dlss_records.json";
pub const DEFAULT_RELEASE_URL: &str = "https://github.com/beeradmoore/dlss-archive/releases/download";
pub const DEFAULT_JOBS: usize = 4;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Descriptions of production builds. Anything else lands in the experimental list.
pub const DEFAULT_ALLOWED_DESCRIPTIONS: &[&str] = &[
    "NGX DLSS",
    "NGX DLSS - DVS PRODUCTION",
    "NGX DLSS - DVS VIRTUAL",
    "NVIDIA DLSSv2 - DVS PRODUCTION",
    "NVIDIA DLSSv3 - DVS PRODUCTION",
];

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;
