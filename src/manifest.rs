/*
 * DLSS Archiver v1.0.0
 * Copyright (c) 2026 DLSS Archiver Contributors.
 * Licensed under the MIT License.
 */

//! The published record set (`dlss_records.json`) and its reconciliation
//! against the local input directory.

use crate::{
    crypto::CryptoEngine,
    error::ArchiveError,
    record::{compare_manifest_order, same_entry, ProvenanceRecord},
    ui::Ui,
};
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

/// Which manifest list a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Stable,
    Experimental,
}

impl Channel {
    /// Production builds carry one of the allowed descriptions verbatim.
    pub fn classify(description: &str, allowed: &[String]) -> Self {
        if allowed.iter().any(|a| a == description) {
            Self::Stable
        } else {
            Self::Experimental
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => write!(f, "stable"),
            Self::Experimental => write!(f, "experimental"),
        }
    }
}

/// Where the baseline manifest comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    Url(String),
    File(PathBuf),
}

impl ManifestSource {
    /// `http://` and `https://` values are URLs, everything else a path.
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url(value.to_string())
        } else {
            Self::File(PathBuf::from(value))
        }
    }
}

impl fmt::Display for ManifestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{}", url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub stable: Vec<ProvenanceRecord>,
    #[serde(default)]
    pub experimental: Vec<ProvenanceRecord>,
}

/// A baseline zip that has to be fetched into the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub url: String,
    pub destination: PathBuf,
    pub expected_hash: String,
}

impl Manifest {
    pub fn from_json(text: &str) -> Result<Self, ArchiveError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Pretty-printed with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, ArchiveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, ArchiveError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ArchiveError> {
        let mut file = fs::File::create(path)?;
        file.write_all(self.to_json_pretty()?.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    pub fn fetch(url: &str, timeout: Duration) -> Result<Self, ArchiveError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dlss-archiver/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let text = client.get(url).send()?.error_for_status()?.text()?;
        Self::from_json(&text)
    }

    pub fn from_source(source: &ManifestSource, timeout: Duration) -> Result<Self, ArchiveError> {
        match source {
            ManifestSource::Url(url) => Self::fetch(url, timeout),
            ManifestSource::File(path) => Self::load(path),
        }
    }

    pub fn channel(&self, channel: Channel) -> &[ProvenanceRecord] {
        match channel {
            Channel::Stable => &self.stable,
            Channel::Experimental => &self.experimental,
        }
    }

    pub fn push(&mut self, channel: Channel, record: ProvenanceRecord) {
        match channel {
            Channel::Stable => self.stable.push(record),
            Channel::Experimental => self.experimental.push(record),
        }
    }

    /// Both lists in ordering-key order, ties broken by label.
    pub fn sort(&mut self) {
        self.stable.sort_by(compare_manifest_order);
        self.experimental.sort_by(compare_manifest_order);
    }

    pub fn len(&self) -> usize {
        self.stable.len() + self.experimental.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stable entries first, then experimental, each with its channel.
    pub fn entries(&self) -> impl Iterator<Item = (Channel, &ProvenanceRecord)> {
        self.stable
            .iter()
            .map(|r| (Channel::Stable, r))
            .chain(self.experimental.iter().map(|r| (Channel::Experimental, r)))
    }

    /// The entry packaged under `zip_name`, stable list searched first.
    pub fn find_entry(&self, zip_name: &str) -> Option<(Channel, &ProvenanceRecord)> {
        self.entries().find(|(_, r)| r.entry_name() == zip_name)
    }

    pub fn contains(&self, record: &ProvenanceRecord) -> bool {
        self.entries().any(|(_, r)| same_entry(r, record))
    }
}

/// Works out which baseline zips are missing from `base_dir`.
///
/// A present zip whose MD5 matches `zip_md5_hash` is kept. A mismatching one
/// is deleted and queued again. Entries without a download URL, and entries
/// whose local copy cannot be checked or removed, are warned about and
/// skipped.
pub fn plan_downloads(manifest: &Manifest, base_dir: &Path, ui: &Ui) -> Vec<DownloadTask> {
    let mut tasks = Vec::new();

    for (channel, record) in manifest.entries() {
        if record.download_url.is_empty() {
            ui.warn(&format!(
                "{} entry {} has no download URL",
                channel, record.display_version
            ));
            continue;
        }
        let destination = base_dir.join(record.entry_name());

        match clear_stale_copy(&destination, &record.archive_hash, ui) {
            Ok(true) => {}
            Ok(false) => {
                ui.very_verbose(&format!("Up to date: {}", destination.display()));
                continue;
            }
            Err(e) => {
                ui.warn(&format!(
                    "Skipping {}: cannot check local copy: {}",
                    destination.display(),
                    e
                ));
                continue;
            }
        }

        tasks.push(DownloadTask {
            url: record.download_url.clone(),
            destination,
            expected_hash: record.archive_hash.clone(),
        });
    }

    tasks
}

/// Whether `destination` needs downloading. A copy with the wrong MD5 is
/// deleted first.
fn clear_stale_copy(destination: &Path, expected: &str, ui: &Ui) -> Result<bool, ArchiveError> {
    if !destination.exists() {
        return Ok(true);
    }
    let actual = CryptoEngine::compute_stream_md5_with_ui(
        &mut fs::File::open(destination)?,
        Some(ui),
        Some(&destination.display().to_string()),
    )?;
    if actual.eq_ignore_ascii_case(expected) {
        return Ok(false);
    }
    let mismatch = ArchiveError::ChecksumMismatch {
        subject: destination.display().to_string(),
        expected: expected.to_string(),
        actual,
    };
    ui.warn(&format!("{}; deleting and downloading again", mismatch));
    fs::remove_file(destination)?;
    Ok(true)
}
