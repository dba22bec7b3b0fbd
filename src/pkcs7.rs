/*
 * DLSS Archiver v1.0.0
 * Copyright (c) 2026 DLSS Archiver Contributors.
 * Licensed under the MIT License.
 */

//! Authenticode views over the `cms` SignedData types.

use crate::error::{decode_err, ArchiveError};
use chrono::{DateTime, Utc};
use cms::{
    cert::CertificateChoices,
    content_info::ContentInfo,
    signed_data::{SignedData, SignerInfo},
};
use der::{
    asn1::{Any, ObjectIdentifier, OctetString},
    Decode, DecodeOwned, Encode, Sequence, SliceReader,
};
use x509_cert::{attr::Attribute, spki::AlgorithmIdentifierOwned, time::Time, Certificate};

pub const OID_SIGNED_DATA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.2");
pub const OID_CONTENT_TYPE: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.3");
pub const OID_MESSAGE_DIGEST: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.4");
pub const OID_SIGNING_TIME: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.5");
pub const OID_COUNTER_SIGNATURE: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.6");
/// Microsoft nested RFC3161 timestamp token.
pub const OID_MS_TIMESTAMP_TOKEN: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.311.3.3.1");
pub const OID_SPC_TIMESTAMP_REQUEST: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.311.3.2.1");
pub const OID_KP_TIMESTAMP_SIGNING: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.311.10.3.2");
pub const OID_SPC_INDIRECT_DATA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.311.2.1.4");

/// `SpcIndirectDataContent`: what an Authenticode signer actually signs.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct SpcIndirectDataContent {
    pub data: Any,
    pub message_digest: DigestInfo,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct DigestInfo {
    pub digest_algorithm: AlgorithmIdentifierOwned,
    pub digest: OctetString,
}

/// A ContentInfo that wraps SignedData.
#[derive(Clone, Debug)]
pub struct SignedMessage {
    pub signed_data: SignedData,
}

impl SignedMessage {
    /// Decodes the leading ContentInfo of `blob`. Anything after it, such as
    /// certificate-table alignment padding, is ignored.
    pub fn from_der(blob: &[u8]) -> Result<Self, ArchiveError> {
        let mut reader = SliceReader::new(blob)?;
        Self::from_content_info(&ContentInfo::decode(&mut reader)?)
    }

    pub fn from_content_info(content_info: &ContentInfo) -> Result<Self, ArchiveError> {
        if content_info.content_type != OID_SIGNED_DATA {
            return Err(decode_err(format!(
                "content type {} is not SignedData",
                content_info.content_type
            )));
        }
        Ok(Self {
            signed_data: decode_any(&content_info.content)?,
        })
    }

    pub fn content_type(&self) -> ObjectIdentifier {
        self.signed_data.encap_content_info.econtent_type
    }

    pub fn content(&self) -> Option<&Any> {
        self.signed_data.encap_content_info.econtent.as_ref()
    }

    pub fn signer_infos(&self) -> &[SignerInfo] {
        self.signed_data.signer_infos.0.as_slice()
    }

    pub fn certificates(&self) -> impl Iterator<Item = &Certificate> + '_ {
        self.signed_data
            .certificates
            .iter()
            .flat_map(|set| set.0.iter())
            .filter_map(|choice| match choice {
                CertificateChoices::Certificate(cert) => Some(cert),
                _ => None,
            })
    }
}

/// Re-reads an `ANY` value as a concrete type.
pub fn decode_any<T: DecodeOwned>(value: &Any) -> Result<T, ArchiveError> {
    Ok(T::from_der(&value.to_der()?)?)
}

pub fn signed_attribute(signer: &SignerInfo, oid: ObjectIdentifier) -> Option<&Attribute> {
    signer.signed_attrs.as_ref()?.iter().find(|a| a.oid == oid)
}

pub fn signed_attributes(signer: &SignerInfo) -> &[Attribute] {
    signer
        .signed_attrs
        .as_ref()
        .map(|set| set.as_slice())
        .unwrap_or_default()
}

pub fn unsigned_attributes(signer: &SignerInfo) -> &[Attribute] {
    signer
        .unsigned_attrs
        .as_ref()
        .map(|set| set.as_slice())
        .unwrap_or_default()
}

/// The signingTime signed attribute, if present.
pub fn signing_time(signer: &SignerInfo) -> Result<Option<DateTime<Utc>>, ArchiveError> {
    let Some(value) = signed_attribute(signer, OID_SIGNING_TIME).and_then(|a| a.values.iter().next())
    else {
        return Ok(None);
    };
    let since_epoch = decode_any::<Time>(value)?.to_unix_duration();
    let seconds = i64::try_from(since_epoch.as_secs())
        .map_err(|_| decode_err("signingTime out of range"))?;
    DateTime::from_timestamp(seconds, since_epoch.subsec_nanos())
        .map(Some)
        .ok_or_else(|| decode_err("signingTime out of range"))
}

/// Octets of the messageDigest signed attribute.
pub fn message_digest(signer: &SignerInfo) -> Result<Option<Vec<u8>>, ArchiveError> {
    match signed_attribute(signer, OID_MESSAGE_DIGEST).and_then(|a| a.values.iter().next()) {
        Some(value) => Ok(Some(decode_any::<OctetString>(value)?.as_bytes().to_vec())),
        None => Ok(None),
    }
}

/// The bytes the signer signed: the signed attributes as a universal `SET OF`.
pub fn signed_attributes_der(signer: &SignerInfo) -> Result<Option<Vec<u8>>, ArchiveError> {
    Ok(signer.signed_attrs.as_ref().map(|set| set.to_der()).transpose()?)
}

/// Counter-signers carried by a PKCS#9 counterSignature attribute.
pub fn counter_signers(attr: &Attribute) -> Result<Vec<SignerInfo>, ArchiveError> {
    attr.values.iter().map(decode_any::<SignerInfo>).collect()
}

/// Timestamp tokens carried by a Microsoft nested-token attribute.
pub fn timestamp_tokens(attr: &Attribute) -> Result<Vec<SignedMessage>, ArchiveError> {
    attr.values
        .iter()
        .map(|value| SignedMessage::from_content_info(&decode_any::<ContentInfo>(value)?))
        .collect()
}
