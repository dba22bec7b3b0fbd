/*
 * DLSS Archiver v1.0.0
 * Copyright (c) 2026 DLSS Archiver Contributors.
 * Licensed under the MIT License.
 */

//! `additional_notes.txt`: one block per packaged record, pasted into
//! release descriptions.

use crate::{error::ArchiveError, record::ProvenanceRecord, timestamp::SignedTimestamp};
use std::{fmt::Write as _, fs, path::Path};

const LONG_DATE_TIME: &str = "%A, %B %-d, %Y %-I:%M:%S %p";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReleaseNotes {
    text: String,
    blocks: usize,
}

impl ReleaseNotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: &ProvenanceRecord) {
        self.text.push_str(&render_block(record));
        self.blocks += 1;
    }

    pub fn len(&self) -> usize {
        self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks == 0
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn save(&self, path: &Path) -> Result<(), ArchiveError> {
        fs::write(path, &self.text)?;
        Ok(())
    }
}

pub fn render_block(record: &ProvenanceRecord) -> String {
    let (date, unix) = match record.signed_timestamp {
        SignedTimestamp::Signed { time, .. } => (
            format!("{} UTC", time.format(LONG_DATE_TIME)),
            time.timestamp().to_string(),
        ),
        SignedTimestamp::Unknown => ("unknown".to_string(), "unknown".to_string()),
    };

    let mut block = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(block, "{}", record.entry_name());
    let _ = writeln!(block, "version: {}", record.display_version);
    let _ = writeln!(block, "versionNumber: {}", record.ordering_key());
    let _ = writeln!(block, "tag: {}", record.release_tag());
    let _ = writeln!(block, "SignedDate: {}", date);
    let _ = writeln!(block, "Signed UnixTimestamp: {}", unix);
    block.push('\n');
    block
}
