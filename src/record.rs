/*
 * DLSS Archiver v1.0.0
 * Copyright (c) 2026 DLSS Archiver Contributors.
 * Licensed under the MIT License.
 */

//! Provenance records: one validated DLL and its published packaging.

use crate::{
    crypto::CryptoEngine,
    error::{decode_err, ArchiveError, StepContext},
    manifest::Channel,
    pe::PeImage,
    processor::PackagedArchive,
    timestamp::{timestamp_from_image, SignedTimestamp},
    verification::{AuthenticodeVerifier, SignatureValidator},
    version::FileVersion,
    ARCHIVE_PREFIX,
};
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fs,
    path::{Path, PathBuf},
};

/// Known re-releases that share a version with an earlier build, keyed by
/// the DLL's MD5.
pub const LABEL_OVERRIDES: &[(&str, &str)] = &[
    ("0A71EFBA8DAFF9C284CE6010923C01F1", "v2"), // 2.4.12
    ("31BFD8F750F87E5040557D95C2345080", "v3"), // 2.4.12
    ("40D468487EA4E0F56595F8DE1AC8ED7C", "v2"), // 3.1.1
    ("BF68025B3603C382FCA65B148B979682", "v2"), // 3.5
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    #[serde(skip)]
    pub source_path: PathBuf,

    #[serde(rename = "version")]
    pub display_version: String,

    #[serde(rename = "version_number")]
    ordering_key: u64,

    #[serde(default)]
    pub additional_label: String,

    /// MD5 of the DLL. Integrity only.
    #[serde(rename = "md5_hash")]
    pub content_hash: String,

    #[serde(rename = "zip_md5_hash", default)]
    pub archive_hash: String,

    #[serde(default)]
    pub download_url: String,

    #[serde(rename = "file_description", default)]
    pub description: String,

    #[serde(skip)]
    pub signed_timestamp: SignedTimestamp,

    #[serde(rename = "is_signature_valid")]
    pub signature_valid: bool,

    #[serde(rename = "file_size", default)]
    pub file_size_bytes: u64,

    #[serde(rename = "zip_file_size", default)]
    pub archive_size_bytes: u64,
}

/// Builds a record for `path` using the built-in Authenticode verifier.
pub fn build_record(path: &Path, allow_invalid: bool) -> Result<ProvenanceRecord, ArchiveError> {
    ProvenanceRecord::build(path, allow_invalid, &AuthenticodeVerifier)
}

impl ProvenanceRecord {
    /// Validates, inspects and hashes the DLL at `path`.
    ///
    /// Fails with [`ArchiveError::SignatureInvalid`] when the validator
    /// rejects the file and `allow_invalid` is not set. Every other failure
    /// names the step that broke.
    pub fn build(
        path: &Path,
        allow_invalid: bool,
        validator: &dyn SignatureValidator,
    ) -> Result<Self, ArchiveError> {
        let data = fs::read(path).step("read file", path)?;
        let signature_valid = validator.is_image_signature_valid(path, &data);
        if !signature_valid && !allow_invalid {
            return Err(ArchiveError::SignatureInvalid(path.to_path_buf()));
        }

        let image = PeImage::parse(&data).step("parse PE image", path)?;
        let info = image
            .version_info()
            .and_then(|info| info.ok_or_else(|| decode_err("no version resource")))
            .step("read version resource", path)?;
        let content_hash = CryptoEngine::compute_md5(&data);
        let signed_timestamp = timestamp_from_image(&data)
            .step("extract signing time", path)?
            .timestamp;

        let mut record = Self {
            source_path: path.to_path_buf(),
            additional_label: String::new(),
            content_hash,
            description: info.file_description,
            signed_timestamp,
            signature_valid,
            file_size_bytes: data.len() as u64,
            ..Self::default()
        };
        record.set_version(info.file_version);
        Ok(record)
    }

    /// Sets the display version and recomputes the ordering key.
    pub fn set_version(&mut self, version: FileVersion) {
        self.display_version = version.to_string();
        self.ordering_key = version.ordering_key();
    }

    pub fn ordering_key(&self) -> u64 {
        self.ordering_key
    }

    /// Stable channel: a known re-release gets its override label. Experimental
    /// channel: the description minus every allowed description and its parts.
    pub fn apply_label(&mut self, channel: Channel, allowed: &[String]) {
        self.additional_label = match channel {
            Channel::Stable => label_override(&self.content_hash)
                .unwrap_or_default()
                .to_string(),
            Channel::Experimental => experimental_label(&self.description, allowed),
        };
    }

    /// The label as it appears in file names and tags.
    pub fn file_label(&self) -> String {
        self.additional_label
            .replace(" - ", "_")
            .replace('-', "_")
            .replace(' ', "_")
    }

    fn stem(&self) -> String {
        let label = self.file_label();
        if label.is_empty() {
            self.display_version.clone()
        } else {
            format!("{}_{}", self.display_version, label)
        }
    }

    /// `nvngx_dlss_<version>[_<label>].zip`
    pub fn archive_file_name(&self) -> String {
        format!("{}_{}.zip", ARCHIVE_PREFIX, self.stem())
    }

    /// `v<version>[_<label>]`
    pub fn release_tag(&self) -> String {
        format!("v{}", self.stem())
    }

    pub fn release_url(&self, release_base: &str) -> String {
        format!(
            "{}/{}/{}",
            release_base.trim_end_matches('/'),
            self.release_tag(),
            self.archive_file_name()
        )
    }

    /// File name of the packaged zip: last segment of the download URL, or the
    /// derived name while no URL is assigned.
    pub fn entry_name(&self) -> String {
        match self.download_url.rsplit('/').next() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.archive_file_name(),
        }
    }

    pub fn attach_archive(&mut self, archive: &PackagedArchive) {
        self.archive_hash = archive.hash.clone();
        self.archive_size_bytes = archive.size;
    }
}

/// Whether two records describe the same packaged entry.
pub fn same_entry(a: &ProvenanceRecord, b: &ProvenanceRecord) -> bool {
    a.entry_name() == b.entry_name()
}

/// Ordering key ascending, then label ascending.
pub fn compare_manifest_order(a: &ProvenanceRecord, b: &ProvenanceRecord) -> Ordering {
    a.ordering_key
        .cmp(&b.ordering_key)
        .then_with(|| a.additional_label.cmp(&b.additional_label))
}

pub fn label_override(content_hash: &str) -> Option<&'static str> {
    LABEL_OVERRIDES
        .iter()
        .find(|(hash, _)| hash.eq_ignore_ascii_case(content_hash))
        .map(|(_, label)| *label)
}

pub fn experimental_label(description: &str, allowed: &[String]) -> String {
    let mut label = description.to_string();
    for known in allowed {
        label = label.replace(known.as_str(), "");
        for part in known.split(" - ") {
            if !part.is_empty() {
                label = label.replace(part, "");
            }
        }
    }
    label.trim_matches(|c| c == ' ' || c == '-').to_string()
}
