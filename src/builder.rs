/*
 * DLSS Archiver v1.0.0
 * Copyright (c) 2026 DLSS Archiver Contributors.
 * Licensed under the MIT License.
 */

//! Batch orchestration of one archive build.
//!
//! Load the baseline manifest, reset the output directory, reconcile the
//! input directory with the baseline, then turn every input zip into a manifest entry: reuse
//! it when it matches the baseline byte for byte, otherwise extract, validate
//! and repackage the DLL. A failing zip is logged and skipped; only a missing
//! baseline manifest stops the run.

use crate::{
    config::BuildConfig,
    crypto::CryptoEngine,
    download::Downloader,
    error::ArchiveError,
    manifest::{plan_downloads, Channel, Manifest, ManifestSource},
    notes::ReleaseNotes,
    processor::ArtifactProcessor,
    record::ProvenanceRecord,
    ui::Ui,
    verification::{AuthenticodeVerifier, SignatureValidator},
    DLL_ENTRY_NAME,
};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Counts and failures of a finished build.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub reused: usize,
    pub packaged: usize,
    /// Zips without a DLL entry, or duplicates of an entry already packaged.
    pub skipped: usize,
    pub downloaded: usize,
    pub download_failures: usize,
    pub failed: Vec<(PathBuf, ArchiveError)>,
    pub manifest: Manifest,
}

/// What happened to one input zip.
enum Outcome {
    Reused,
    Packaged,
    Skipped,
}

pub struct ArchiveBuilder {
    config: BuildConfig,
    validator: Box<dyn SignatureValidator>,
}

impl ArchiveBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self::with_validator(config, Box::new(AuthenticodeVerifier))
    }

    pub fn with_validator(config: BuildConfig, validator: Box<dyn SignatureValidator>) -> Self {
        Self { config, validator }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn run(&self, ui: &Ui) -> Result<BuildReport, ArchiveError> {
        let config = &self.config;
        config.validate()?;

        // Read before the reset: the baseline may live in the output directory.
        let baseline = self.load_baseline(ui)?;
        ui.info(&format!(
            "Baseline manifest: {} stable, {} experimental",
            baseline.stable.len(),
            baseline.experimental.len()
        ));

        reset_dir(&config.output_dir)?;
        fs::create_dir_all(&config.base_input_dir)?;
        ui.verbose(&format!("Output directory reset: {}", config.output_dir.display()));

        let mut report = BuildReport::default();
        if config.offline {
            ui.info("Offline: skipping downloads");
        } else {
            let tasks = plan_downloads(&baseline, &config.base_input_dir, ui);
            if !tasks.is_empty() {
                let summary = Downloader::new(config.timeout, config.jobs)?.download_all(&tasks, ui)?;
                report.downloaded = summary.completed.len();
                report.download_failures = summary.failed.len();
            }
        }

        let inputs = collect_zips(&config.base_input_dir)?;
        ui.info(&format!("Found {} input archive(s)", inputs.len()));

        let mut manifest = Manifest::default();
        let mut notes = ReleaseNotes::new();
        for zip in &inputs {
            match self.process_zip(zip, &baseline, &mut manifest, &mut notes, ui) {
                Ok(Outcome::Reused) => report.reused += 1,
                Ok(Outcome::Packaged) => report.packaged += 1,
                Ok(Outcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    ui.error(&format!("Could not process {}: {}", zip.display(), e));
                    report.failed.push((zip.clone(), e));
                }
            }
        }

        manifest.sort();
        manifest.save(&config.manifest_path())?;
        notes.save(&config.notes_path())?;
        ui.print_extracted();

        ui.success(&format!(
            "Wrote {} record(s) to {}",
            manifest.len(),
            config.manifest_path().display()
        ));
        report.manifest = manifest;
        Ok(report)
    }

    fn load_baseline(&self, ui: &Ui) -> Result<Manifest, ArchiveError> {
        let source = &self.config.manifest_source;
        if self.config.offline {
            if let ManifestSource::Url(url) = source {
                ui.warn(&format!(
                    "Offline: not fetching {}, nothing will be reused",
                    url
                ));
                return Ok(Manifest::default());
            }
        }
        ui.verbose(&format!("Loading baseline manifest from {}", source));
        Manifest::from_source(source, self.config.timeout).map_err(|e| {
            ArchiveError::Config(format!("cannot load baseline manifest {}: {}", source, e))
        })
    }

    fn process_zip(
        &self,
        zip: &Path,
        baseline: &Manifest,
        manifest: &mut Manifest,
        notes: &mut ReleaseNotes,
        ui: &Ui,
    ) -> Result<Outcome, ArchiveError> {
        let config = &self.config;
        let zip_name = zip
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Some((channel, existing)) = baseline.find_entry(&zip_name) {
            let hash = CryptoEngine::compute_file_md5(zip)?;
            if hash.eq_ignore_ascii_case(&existing.archive_hash) {
                ui.verbose(&format!("Reusing {} entry {}", channel, zip_name));
                manifest.push(channel, existing.clone());
                return Ok(Outcome::Reused);
            }
            ui.very_verbose(&format!("{} changed since the baseline; rebuilding", zip_name));
        }

        let stem = zip
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dll_dir = config.output_dir.join(stem);
        let Some(dll) = ArtifactProcessor::extract_entry(zip, DLL_ENTRY_NAME, &dll_dir, ui)? else {
            ui.warn(&format!("{} has no {} entry", zip.display(), DLL_ENTRY_NAME));
            return Ok(Outcome::Skipped);
        };
        ui.record_extracted(&dll);

        let mut record =
            ProvenanceRecord::build(&dll, config.allow_invalid, self.validator.as_ref())?;
        if !record.signature_valid {
            ui.warn(&format!("Admitting {} with an invalid signature", dll.display()));
        }
        ArtifactProcessor::stamp_signing_time(&dll, &record.signed_timestamp)?;

        let channel = Channel::classify(&record.description, &config.allowed_descriptions);
        record.apply_label(channel, &config.allowed_descriptions);
        record.download_url = record.release_url(&config.release_url);

        if manifest.contains(&record) {
            ui.warn(&format!(
                "{} duplicates an entry already in the manifest",
                record.archive_file_name()
            ));
            return Ok(Outcome::Skipped);
        }

        let packaged = ArtifactProcessor::create_zip(
            &dll,
            &config.output_dir.join(record.archive_file_name()),
            &record.signed_timestamp,
            ui,
        )?;
        record.attach_archive(&packaged);

        ui.verbose(&format!(
            "{} {} -> {} (signed {})",
            channel,
            record.display_version,
            record.archive_file_name(),
            record.signed_timestamp
        ));
        notes.push(&record);
        manifest.push(channel, record);
        Ok(Outcome::Packaged)
    }
}

impl BuildReport {
    pub fn print(&self, ui: &Ui) {
        ui.print_summary(
            "Build Report",
            &[
                ("Stable", self.manifest.stable.len().to_string()),
                ("Experimental", self.manifest.experimental.len().to_string()),
                ("Packaged", self.packaged.to_string()),
                ("Reused", self.reused.to_string()),
                ("Skipped", self.skipped.to_string()),
                ("Failed", self.failed.len().to_string()),
                (
                    "Downloads",
                    format!("{} ok, {} failed", self.downloaded, self.download_failures),
                ),
            ],
        );
    }
}

/// Remove if present, then create. Not atomic.
fn reset_dir(dir: &Path) -> Result<(), ArchiveError> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Every `*.zip` below `root`, sorted by path.
fn collect_zips(root: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
            {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}
