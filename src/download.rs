/*
 * DLSS Archiver v1.0.0
 * Copyright (c) 2026 DLSS Archiver Contributors.
 * Licensed under the MIT License.
 */

//! Parallel retrieval of baseline zips into the input directory.

use crate::{crypto::CryptoEngine, error::ArchiveError, manifest::DownloadTask, ui::Ui};
use rayon::prelude::*;
use reqwest::blocking::Client;
use std::{
    fs,
    io::Write,
    path::PathBuf,
    time::Duration,
};
use tempfile::NamedTempFile;

/// What a batch of downloads produced.
#[derive(Debug, Default)]
pub struct DownloadSummary {
    pub completed: Vec<PathBuf>,
    /// URL and cause of every download that did not land.
    pub failed: Vec<(String, ArchiveError)>,
}

pub struct Downloader {
    client: Client,
    jobs: usize,
}

impl Downloader {
    pub fn new(timeout: Duration, jobs: usize) -> Result<Self, ArchiveError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dlss-archiver/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, jobs))
    }

    pub fn with_client(client: Client, jobs: usize) -> Self {
        Self {
            client,
            jobs: jobs.max(1),
        }
    }

    /// Streams one zip into a temp file beside its destination, checks the
    /// MD5 and only then moves it into place. On any failure the temp file is
    /// dropped and nothing is left at the destination.
    pub fn download_one(&self, task: &DownloadTask) -> Result<PathBuf, ArchiveError> {
        let parent = task.destination.parent().ok_or_else(|| {
            ArchiveError::Config(format!(
                "download destination has no parent: {}",
                task.destination.display()
            ))
        })?;
        fs::create_dir_all(parent)?;
        let mut tmp = NamedTempFile::new_in(parent)?;

        let mut response = self.client.get(&task.url).send()?.error_for_status()?;
        response.copy_to(tmp.as_file_mut())?;
        tmp.as_file_mut().flush()?;

        let actual = CryptoEngine::compute_file_md5(tmp.path())?;
        if !actual.eq_ignore_ascii_case(&task.expected_hash) {
            return Err(ArchiveError::ChecksumMismatch {
                subject: task.url.clone(),
                expected: task.expected_hash.clone(),
                actual,
            });
        }

        tmp.persist(&task.destination).map_err(|e| ArchiveError::Io(e.error))?;
        Ok(task.destination.clone())
    }

    /// Runs every task on a pool of `jobs` threads. A failed download is
    /// logged and reported in the summary; it never stops the others.
    pub fn download_all(
        &self,
        tasks: &[DownloadTask],
        ui: &Ui,
    ) -> Result<DownloadSummary, ArchiveError> {
        let mut summary = DownloadSummary::default();
        if tasks.is_empty() {
            return Ok(summary);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| ArchiveError::Config(format!("cannot start download pool: {}", e)))?;

        ui.info(&format!(
            "Downloading {} archive(s) with {} job(s)",
            tasks.len(),
            self.jobs
        ));
        ui.show_progress_bar(tasks.len() as u64, "Downloading");

        let results: Vec<(&DownloadTask, Result<PathBuf, ArchiveError>)> = pool.install(|| {
            tasks
                .par_iter()
                .map(|task| {
                    let result = self.download_one(task);
                    let name = task
                        .destination
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    ui.tick_progress(&name);
                    (task, result)
                })
                .collect()
        });
        ui.finish_progress();

        for (task, result) in results {
            match result {
                Ok(path) => {
                    ui.verbose(&format!("Downloaded {}", path.display()));
                    summary.completed.push(path);
                }
                Err(e) => {
                    ui.error(&format!("Failed to download {}: {}", task.url, e));
                    summary.failed.push((task.url.clone(), e));
                }
            }
        }
        Ok(summary)
    }
}
