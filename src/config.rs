/*
 * DLSS Archiver v1.0.0
 * Copyright (c) 2026 DLSS Archiver Contributors.
 * Licensed under the MIT License.
 */

//! Configuration parsing and validation for the archiver CLI.

use crate::{
    error::ArchiveError, manifest::ManifestSource, ui::Ui, DEFAULT_ALLOWED_DESCRIPTIONS,
    DEFAULT_INPUT_DIR, DEFAULT_JOBS, DEFAULT_MANIFEST_URL, DEFAULT_OUTPUT_DIR,
    DEFAULT_RELEASE_URL, DEFAULT_TIMEOUT_SECS, MANIFEST_FILE_NAME, NOTES_FILE_NAME,
};
use clap::ArgMatches;
use std::{
    env,
    path::{self, Component, Path, PathBuf},
    time::Duration,
};

/// Everything one archive build needs. Passed explicitly; there is no
/// process-wide output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Reset at the start of every run.
    pub output_dir: PathBuf,
    /// Searched recursively for input zips; downloads land here.
    pub base_input_dir: PathBuf,
    /// Descriptions that mark a stable build.
    pub allowed_descriptions: Vec<String>,
    pub manifest_source: ManifestSource,
    /// Prefix of every download URL written to the manifest.
    pub release_url: String,
    pub jobs: usize,
    pub timeout: Duration,
    /// Skip downloads.
    pub offline: bool,
    /// Admit DLLs whose signature does not validate.
    pub allow_invalid: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            base_input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            allowed_descriptions: DEFAULT_ALLOWED_DESCRIPTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            manifest_source: ManifestSource::Url(DEFAULT_MANIFEST_URL.to_string()),
            release_url: DEFAULT_RELEASE_URL.to_string(),
            jobs: DEFAULT_JOBS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            offline: false,
            allow_invalid: false,
        }
    }
}

impl BuildConfig {
    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(MANIFEST_FILE_NAME)
    }

    pub fn notes_path(&self) -> PathBuf {
        self.output_dir.join(NOTES_FILE_NAME)
    }

    /// Rejects settings that would make a run destroy its own inputs or do
    /// nothing useful.
    pub fn validate(&self) -> Result<(), ArchiveError> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(ArchiveError::Config("output directory is empty".into()));
        }
        let output = resolve(&self.output_dir)?;
        if resolve(&self.base_input_dir)?.starts_with(&output) {
            return Err(ArchiveError::Config(format!(
                "input directory {} lies inside the output directory {}, which is reset on every run",
                self.base_input_dir.display(),
                self.output_dir.display()
            )));
        }
        if resolve(&env::current_dir()?)?.starts_with(&output) {
            return Err(ArchiveError::Config(format!(
                "output directory {} contains the working directory and cannot be reset",
                self.output_dir.display()
            )));
        }
        if self.allowed_descriptions.is_empty() {
            return Err(ArchiveError::Config(
                "at least one allowed description is required".into(),
            ));
        }
        if self.jobs == 0 {
            return Err(ArchiveError::Config("--jobs must be at least 1".into()));
        }
        if self.timeout.is_zero() {
            return Err(ArchiveError::Config("--timeout must be at least 1".into()));
        }
        if !self.release_url.starts_with("http://") && !self.release_url.starts_with("https://") {
            return Err(ArchiveError::Config(format!(
                "release URL must be http(s): {}",
                self.release_url
            )));
        }
        Ok(())
    }
}

/// Absolute form of `path` with `.` and `..` removed, following symlinks
/// through the part of the path that exists.
fn resolve(path: &Path) -> Result<PathBuf, ArchiveError> {
    let mut normal = PathBuf::new();
    for component in path::absolute(path)?.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normal.pop();
            }
            other => normal.push(other),
        }
    }

    let mut existing = normal.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => break,
        }
    }
    let mut resolved = existing
        .canonicalize()
        .unwrap_or_else(|_| existing.to_path_buf());
    resolved.extend(missing.iter().rev());
    Ok(resolved)
}

/// Execution mode for the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Reconcile, validate and package the whole input directory
    Build(BuildConfig),
    /// Print the provenance record of one DLL
    Inspect { input: PathBuf, allow_invalid: bool },
    /// Check one DLL's embedded signature
    Verify { input: PathBuf },
}

/// Application configuration parsed from command-line arguments.
#[derive(Debug)]
pub struct Config {
    pub mode: Mode,
    /// Whether to suppress non-error output
    pub quiet: bool,
    /// Verbosity level (0 = off, 1 = verbose, 2 = very verbose, 3+ = debug)
    pub verbosity_level: u8,
}

impl Config {
    pub fn from_matches(matches: &ArgMatches, ui: &Ui) -> Result<Self, ArchiveError> {
        let quiet = matches.get_flag("quiet");
        let verbosity_level = matches.get_count("verbose");

        let mode = match matches.subcommand() {
            Some(("build", sub)) => Mode::Build(Self::parse_build(sub, ui)?),
            Some(("inspect", sub)) => Mode::Inspect {
                input: Self::existing_file(sub, ui)?,
                allow_invalid: sub.get_flag("allow_invalid"),
            },
            Some(("verify", sub)) => Mode::Verify {
                input: Self::existing_file(sub, ui)?,
            },
            _ => {
                return Err(ArchiveError::Config(
                    "No subcommand provided. Use 'build', 'inspect' or 'verify'.".into(),
                ))
            }
        };

        Ok(Self {
            mode,
            quiet,
            verbosity_level,
        })
    }

    fn parse_build(matches: &ArgMatches, ui: &Ui) -> Result<BuildConfig, ArchiveError> {
        let mut config = BuildConfig::default();

        if let Some(out) = matches.get_one::<String>("output") {
            config.output_dir = PathBuf::from(out);
        }
        if let Some(input) = matches.get_one::<String>("input") {
            config.base_input_dir = PathBuf::from(input);
        }
        if let Some(source) = matches.get_one::<String>("manifest") {
            config.manifest_source = ManifestSource::parse(source);
        }
        if let Some(url) = matches.get_one::<String>("release_url") {
            config.release_url = url.trim_end_matches('/').to_string();
        }
        if let Some(descriptions) = matches.get_many::<String>("allow_description") {
            config.allowed_descriptions = descriptions.cloned().collect();
        }
        if let Some(jobs) = matches.get_one::<usize>("jobs") {
            config.jobs = *jobs;
        }
        if let Some(secs) = matches.get_one::<u64>("timeout") {
            config.timeout = Duration::from_secs(*secs);
        }
        config.offline = matches.get_flag("offline");
        config.allow_invalid = matches.get_flag("allow_invalid");

        if let ManifestSource::File(path) = &config.manifest_source {
            if !path.is_file() {
                return Err(ArchiveError::Config(format!(
                    "Manifest file does not exist: {}",
                    path.display()
                )));
            }
        }
        config.validate()?;

        ui.debug(&format!("Build configuration: {:?}", config));
        ui.info(&format!("Input: {}", config.base_input_dir.display()));
        ui.info(&format!("Output: {}", config.output_dir.display()));
        ui.info(&format!("Baseline manifest: {}", config.manifest_source));
        if config.allow_invalid {
            ui.warn("DLLs with invalid signatures will be admitted (--allow-invalid)");
        }
        Ok(config)
    }

    fn existing_file(matches: &ArgMatches, ui: &Ui) -> Result<PathBuf, ArchiveError> {
        let input = PathBuf::from(
            matches
                .get_one::<String>("input")
                .ok_or_else(|| ArchiveError::Config("No input file specified".into()))?,
        );
        if !input.is_file() {
            return Err(ArchiveError::Config(format!(
                "Input file does not exist: {}",
                input.display()
            )));
        }
        ui.debug(&format!("Using input file: {}", input.display()));
        Ok(input)
    }
}
