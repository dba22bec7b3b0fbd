/*
 * DLSS Archiver v1.0.0
 * Copyright (c) 2026 DLSS Archiver Contributors.
 * Licensed under the MIT License.
 */

use crate::{error::ArchiveError, ui::Ui, BUFFER_SIZE};
use md5::{Digest, Md5};
use ring::digest;
use std::{fs::File, io::Read, path::Path};

pub struct CryptoEngine;

// MD5 is only an integrity check for downloaded and extracted files.
// It must never be used to decide whether a file was tampered with.
impl CryptoEngine {
    pub fn compute_md5(data: &[u8]) -> String {
        hex::encode_upper(Md5::digest(data))
    }

    pub fn compute_stream_md5<R: Read>(reader: &mut R) -> Result<String, ArchiveError> {
        Self::compute_stream_md5_with_ui(reader, None, None)
    }

    pub fn compute_file_md5(path: &Path) -> Result<String, ArchiveError> {
        let mut file = File::open(path)?;
        Self::compute_stream_md5(&mut file)
    }

    pub fn compute_stream_md5_with_ui<R: Read>(
        reader: &mut R,
        ui: Option<&Ui>,
        file_path: Option<&str>,
    ) -> Result<String, ArchiveError> {
        let mut ctx = Md5::new();

        if let (Some(ui), Some(path)) = (ui, file_path) {
            ui.very_verbose(&format!("MD5: {}", path));
        }

        let mut buf = vec![0u8; BUFFER_SIZE];
        let mut processed = 0u64;
        loop {
            let count = reader.read(&mut buf)?;
            if count == 0 {
                break;
            }
            ctx.update(&buf[..count]);
            processed += count as u64;

            if let Some(ui) = ui {
                if ui.debug && processed % (BUFFER_SIZE as u64 * 16) == 0 {
                    ui.debug(&format!("MD5: {} bytes", processed));
                }
            }
        }

        if let Some(ui) = ui {
            ui.debug(&format!("MD5 complete: {} bytes", processed));
        }

        Ok(hex::encode_upper(ctx.finalize()))
    }
}

/// Digest algorithms that appear in Authenticode signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    /// Maps a digest algorithm OID (or a combined signature OID) to its hash.
    pub fn from_oid(oid: &str) -> Option<Self> {
        match oid {
            "1.3.14.3.2.26" | "1.2.840.113549.1.1.5" | "1.2.840.10045.4.1" => Some(Self::Sha1),
            "2.16.840.1.101.3.4.2.1" | "1.2.840.113549.1.1.11" | "1.2.840.10045.4.3.2" => {
                Some(Self::Sha256)
            }
            "2.16.840.1.101.3.4.2.2" | "1.2.840.113549.1.1.12" | "1.2.840.10045.4.3.3" => {
                Some(Self::Sha384)
            }
            "2.16.840.1.101.3.4.2.3" | "1.2.840.113549.1.1.13" | "1.2.840.10045.4.3.4" => {
                Some(Self::Sha512)
            }
            _ => None,
        }
    }

    pub fn ring_algorithm(self) -> &'static digest::Algorithm {
        match self {
            Self::Sha1 => &digest::SHA1_FOR_LEGACY_USE_ONLY,
            Self::Sha256 => &digest::SHA256,
            Self::Sha384 => &digest::SHA384,
            Self::Sha512 => &digest::SHA512,
        }
    }

    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        digest::digest(self.ring_algorithm(), data).as_ref().to_vec()
    }

    pub fn context(self) -> digest::Context {
        digest::Context::new(self.ring_algorithm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_is_uppercase_hex_without_separators() {
        let hash = CryptoEngine::compute_md5(b"abc");
        assert_eq!(hash, "900150983CD24FB0D6963F7D28E17F72");
    }

    #[test]
    fn streamed_md5_matches_one_shot() {
        let data = vec![0x5au8; BUFFER_SIZE * 3 + 17];
        let streamed = CryptoEngine::compute_stream_md5(&mut data.as_slice()).unwrap();
        assert_eq!(streamed, CryptoEngine::compute_md5(&data));
    }

    #[test]
    fn digest_oids_resolve() {
        assert_eq!(
            DigestAlgorithm::from_oid("2.16.840.1.101.3.4.2.1"),
            Some(DigestAlgorithm::Sha256)
        );
        assert_eq!(
            DigestAlgorithm::from_oid("1.2.840.113549.1.1.5"),
            Some(DigestAlgorithm::Sha1)
        );
        assert_eq!(DigestAlgorithm::from_oid("1.2.840.113549.2.5"), None);
        assert_eq!(DigestAlgorithm::Sha256.digest(b"").len(), 32);
    }
}
