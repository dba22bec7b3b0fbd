/*
 * DLSS Archiver v1.0.0
 * Copyright (c) 2026 DLSS Archiver Contributors.
 * Licensed under the MIT License.
 */

//! Recovers the trusted signing time from an embedded Authenticode signature.
//!
//! Two timestamping conventions exist in the wild. Older binaries carry a
//! PKCS#9 counter-signature whose own signed attributes hold `signingTime`;
//! newer ones embed a complete RFC3161 token as a nested SignedData under a
//! Microsoft OID. Both live in the unsigned attributes of the outer signer and
//! are tried per attribute, counter-signature first.

use crate::{
    error::ArchiveError,
    pe::PeImage,
    pkcs7::{
        counter_signers, signed_attributes, signing_time, timestamp_tokens, unsigned_attributes,
        SignedMessage, OID_COUNTER_SIGNATURE, OID_KP_TIMESTAMP_SIGNING, OID_MS_TIMESTAMP_TOKEN,
        OID_SPC_TIMESTAMP_REQUEST,
    },
};
use chrono::{DateTime, Utc};
use cms::signed_data::SignerInfo;
use std::{fmt, fs, path::Path};
use x509_cert::attr::Attribute;

/// Which timestamping convention supplied the time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampSource {
    CounterSignature,
    Rfc3161Token,
}

impl fmt::Display for TimestampSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CounterSignature => write!(f, "PKCS#9 counter-signature"),
            Self::Rfc3161Token => write!(f, "RFC3161 timestamp token"),
        }
    }
}

/// Signing time of a binary, or the explicit "no timestamp found" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignedTimestamp {
    Signed {
        time: DateTime<Utc>,
        source: TimestampSource,
    },
    #[default]
    Unknown,
}

impl SignedTimestamp {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Signed { time, .. } => Some(*time),
            Self::Unknown => None,
        }
    }

    pub fn source(&self) -> Option<TimestampSource> {
        match self {
            Self::Signed { source, .. } => Some(*source),
            Self::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Signed { .. })
    }
}

impl fmt::Display for SignedTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signed { time, source } => write!(f, "{} ({})", time.to_rfc3339(), source),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// The timestamp plus what the walk saw on the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimestampExtraction {
    pub timestamp: SignedTimestamp,
    /// Timestamp-request and timestamp-signing attributes passed over.
    pub reserved_attributes: usize,
}

/// Reads `path` and extracts its signing time.
///
/// An unsigned PE yields [`SignedTimestamp::Unknown`]; unreadable files and
/// malformed PE or CMS structures are errors.
pub fn extract_signed_timestamp(path: &Path) -> Result<SignedTimestamp, ArchiveError> {
    Ok(extract_timestamp_details(path)?.timestamp)
}

pub fn extract_timestamp_details(path: &Path) -> Result<TimestampExtraction, ArchiveError> {
    let data = fs::read(path)?;
    timestamp_from_image(&data)
}

pub(crate) fn timestamp_from_image(data: &[u8]) -> Result<TimestampExtraction, ArchiveError> {
    match PeImage::parse(data)?.signed_data() {
        Some(blob) => timestamp_details_from_der(blob),
        None => Ok(TimestampExtraction::default()),
    }
}

/// Runs the walk over a bare PKCS#7 signed-data blob.
pub fn signed_timestamp_from_der(blob: &[u8]) -> Result<SignedTimestamp, ArchiveError> {
    Ok(timestamp_details_from_der(blob)?.timestamp)
}

fn timestamp_details_from_der(blob: &[u8]) -> Result<TimestampExtraction, ArchiveError> {
    let message = SignedMessage::from_der(blob)?;
    let mut reserved_attributes = 0;

    for signer in message.signer_infos() {
        for attr in unsigned_attributes(signer) {
            let found = if attr.oid == OID_COUNTER_SIGNATURE {
                find_counter_signature_time(attr)?
            } else if attr.oid == OID_MS_TIMESTAMP_TOKEN {
                find_nested_timestamp_token_time(attr)?
            } else {
                if is_reserved(attr) {
                    reserved_attributes += 1;
                }
                None
            };
            if let Some(timestamp) = found {
                return Ok(TimestampExtraction {
                    timestamp,
                    reserved_attributes,
                });
            }
        }

        // Signed attributes can carry the same reserved OIDs. They never hold
        // a timestamp, so this pass only counts them.
        reserved_attributes += signed_attributes(signer)
            .iter()
            .filter(|a| is_reserved(a))
            .count();
    }

    Ok(TimestampExtraction {
        timestamp: SignedTimestamp::Unknown,
        reserved_attributes,
    })
}

fn is_reserved(attr: &Attribute) -> bool {
    attr.oid == OID_SPC_TIMESTAMP_REQUEST || attr.oid == OID_KP_TIMESTAMP_SIGNING
}

fn first_signing_time(signers: &[SignerInfo]) -> Result<Option<DateTime<Utc>>, ArchiveError> {
    for signer in signers {
        if let Some(time) = signing_time(signer)? {
            return Ok(Some(time));
        }
    }
    Ok(None)
}

/// `signingTime` from a PKCS#9 counter-signature attribute. Any other
/// attribute yields `None` without being decoded.
pub fn find_counter_signature_time(attr: &Attribute) -> Result<Option<SignedTimestamp>, ArchiveError> {
    if attr.oid != OID_COUNTER_SIGNATURE {
        return Ok(None);
    }
    Ok(first_signing_time(&counter_signers(attr)?)?.map(|time| SignedTimestamp::Signed {
        time,
        source: TimestampSource::CounterSignature,
    }))
}

/// `signingTime` from the signers of a nested RFC3161 timestamp token.
pub fn find_nested_timestamp_token_time(
    attr: &Attribute,
) -> Result<Option<SignedTimestamp>, ArchiveError> {
    if attr.oid != OID_MS_TIMESTAMP_TOKEN {
        return Ok(None);
    }
    for token in timestamp_tokens(attr)? {
        if let Some(time) = first_signing_time(token.signer_infos())? {
            return Ok(Some(SignedTimestamp::Signed {
                time,
                source: TimestampSource::Rfc3161Token,
            }));
        }
    }
    Ok(None)
}
