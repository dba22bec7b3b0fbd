/*
 * DLSS Archiver v1.0.0
 * Copyright (c) 2026 DLSS Archiver Contributors.
 * Licensed under the MIT License.
 */

//! ZIP archive handling.
//! Extracts the DLL from input archives, packages validated DLLs into
//! reproducible single-entry zips and verifies their integrity.

use crate::{
    crypto::CryptoEngine, error::ArchiveError, timestamp::SignedTimestamp, ui::Ui, BUFFER_SIZE,
};
use chrono::{Datelike, NaiveDate, Timelike};
use crc32fast::Hasher as Crc32;
use filetime::{set_file_times, FileTime};
use std::{
    ffi::OsStr,
    fs::{self, File},
    io::{self, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};
use zip::{
    write::{FileOptions, ZipWriter},
    CompressionMethod, DateTime as ZipDateTime, ZipArchive,
};

/// A finished zip and the figures recorded for it in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedArchive {
    pub path: PathBuf,
    /// MD5 of the zip file, uppercase hex.
    pub hash: String,
    pub size: u64,
}

/// Zip extraction and packaging for the archive build.
pub struct ArtifactProcessor;

impl ArtifactProcessor {
    /// Extracts the first entry whose file name is `entry_name` into
    /// `dest_dir`, keeping the entry's modification time. Returns `None` when
    /// the archive has no such entry.
    pub fn extract_entry(
        archive_path: &Path,
        entry_name: &str,
        dest_dir: &Path,
        ui: &Ui,
    ) -> Result<Option<PathBuf>, ArchiveError> {
        let mut archive = ZipArchive::new(BufReader::new(File::open(archive_path)?))?;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let matches = entry
                .enclosed_name()
                .is_some_and(|p| p.file_name() == Some(OsStr::new(entry_name)));
            if !matches {
                continue;
            }

            fs::create_dir_all(dest_dir)?;
            let dest = dest_dir.join(entry_name);
            {
                let mut out = BufWriter::with_capacity(BUFFER_SIZE, File::create(&dest)?);
                io::copy(&mut entry, &mut out)?;
                out.flush()?;
            }
            if let Some(modified) = entry.last_modified() {
                let ft = FileTime::from_unix_time(Self::zip_datetime_to_unix(&modified) as i64, 0);
                set_file_times(&dest, ft, ft)?;
            }
            ui.verbose(&format!(
                "Extracted {} from {} ({} bytes)",
                entry.name(),
                archive_path.display(),
                entry.size()
            ));
            return Ok(Some(dest));
        }
        Ok(None)
    }

    /// Packages `source` as the only entry of a new zip at `output`.
    ///
    /// The entry is deflated and stamped with the signing time (1980-01-01
    /// when unknown) so packaging the same DLL twice yields identical bytes.
    pub fn create_zip(
        source: &Path,
        output: &Path,
        signed: &SignedTimestamp,
        ui: &Ui,
    ) -> Result<PackagedArchive, ArchiveError> {
        let entry_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ArchiveError::Config(format!("unusable file name: {}", source.display()))
            })?;
        let timestamp = Self::zip_timestamp(signed);
        ui.verbose(&format!(
            "Timestamp used: {:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
            timestamp.year(),
            timestamp.month(),
            timestamp.day(),
            timestamp.hour(),
            timestamp.minute(),
            timestamp.second()
        ));

        {
            let out_file = File::create(output)?;
            let mut writer = ZipWriter::new(BufWriter::with_capacity(BUFFER_SIZE, out_file));
            let options = FileOptions::<()>::default()
                .compression_method(CompressionMethod::Deflated)
                .last_modified_time(timestamp)
                .unix_permissions(0o644);
            writer.start_file(entry_name, options)?;
            let mut input = BufReader::with_capacity(BUFFER_SIZE, File::open(source)?);
            io::copy(&mut input, &mut writer)?;
            writer.finish()?.flush()?;
        }

        Self::verify_zip_integrity(output)?;
        let hash = CryptoEngine::compute_file_md5(output)?;
        let size = fs::metadata(output)?.len();
        Self::stamp_signing_time(output, signed)?;
        ui.verbose(&format!("Packaged {} ({} bytes, MD5 {})", output.display(), size, hash));

        Ok(PackagedArchive {
            path: output.to_path_buf(),
            hash,
            size,
        })
    }

    /// Sets a file's access and modification times to the signing time.
    /// Leaves the file alone when the time is unknown.
    pub fn stamp_signing_time(path: &Path, signed: &SignedTimestamp) -> Result<(), ArchiveError> {
        if let Some(time) = signed.time() {
            let ft = FileTime::from_unix_time(time.timestamp(), time.timestamp_subsec_nanos());
            set_file_times(path, ft, ft)?;
        }
        Ok(())
    }

    pub fn verify_zip_integrity(path: &Path) -> Result<(), ArchiveError> {
        let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
        let mut buf = vec![0u8; BUFFER_SIZE];
        for i in 0..archive.len() {
            let mut f = archive.by_index(i)?;
            let mut hasher = Crc32::new();
            loop {
                let n = f.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            let stored = f.crc32();
            let computed = hasher.finalize();
            if stored != computed {
                return Err(ArchiveError::Validation(format!(
                    "CRC mismatch for `{}`: stored={:#010x}, computed={:#010x}",
                    f.name(),
                    stored,
                    computed
                )));
            }
        }
        Ok(())
    }

    /// Zip entry time for a signing time, clamped into the range a zip
    /// timestamp can hold.
    fn zip_timestamp(signed: &SignedTimestamp) -> ZipDateTime {
        let Some(time) = signed.time() else {
            return ZipDateTime::default();
        };
        let t = time.naive_utc();
        if t.year() < 1980 {
            return ZipDateTime::default();
        }
        if t.year() > 2107 {
            return ZipDateTime::from_date_and_time(2107, 12, 31, 23, 59, 58)
                .unwrap_or_default();
        }
        ZipDateTime::from_date_and_time(
            t.year() as u16,
            t.month() as u8,
            t.day() as u8,
            t.hour() as u8,
            t.minute() as u8,
            t.second() as u8,
        )
        .unwrap_or_default()
    }

    fn zip_datetime_to_unix(dt: &ZipDateTime) -> u64 {
        let year = (dt.year() as i32).max(1980);
        let nd = NaiveDate::from_ymd_opt(year, dt.month() as u32, dt.day() as u32)
            .or_else(|| NaiveDate::from_ymd_opt(1980, 1, 1))
            .unwrap_or_default();
        let ndt = nd
            .and_hms_opt(dt.hour() as u32, dt.minute() as u32, dt.second() as u32)
            .unwrap_or_default();

        // Zip times carry no zone; they are read as UTC.
        ndt.and_utc().timestamp().max(0) as u64
    }
}
