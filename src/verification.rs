/*
 * DLSS Archiver v1.0.0
 * Copyright (c) 2026 DLSS Archiver Contributors.
 * Licensed under the MIT License.
 */

use cms::signed_data::{SignerIdentifier, SignerInfo};
use der::{asn1::ObjectIdentifier, Decode};
use ring::signature::{self, UnparsedPublicKey, VerificationAlgorithm};
use std::{fs, path::Path};
use x509_cert::{ext::pkix::SubjectKeyIdentifier, Certificate};

use crate::{
    crypto::DigestAlgorithm,
    error::ArchiveError,
    pe::PeImage,
    pkcs7::{
        decode_any, message_digest, signed_attributes_der, SignedMessage, SpcIndirectDataContent,
        OID_SPC_INDIRECT_DATA,
    },
};

const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
const OID_SUBJECT_KEY_IDENTIFIER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.14");

/// Answers one question: does this file carry a valid embedded signature?
pub trait SignatureValidator: Send + Sync {
    /// `false` on any failure, including unsigned or unreadable files.
    fn is_embedded_signature_valid(&self, path: &Path) -> bool;

    /// Same answer for bytes already read from `path`.
    fn is_image_signature_valid(&self, path: &Path, _data: &[u8]) -> bool {
        self.is_embedded_signature_valid(path)
    }
}

/// Cryptographic Authenticode check of a PE file.
///
/// Confirms the image digest, the signed-attribute digest and the signer's
/// signature. Certificate chains, revocation and policy are not examined.
#[derive(Debug, Default, Clone, Copy)]
pub struct AuthenticodeVerifier;

impl SignatureValidator for AuthenticodeVerifier {
    fn is_embedded_signature_valid(&self, path: &Path) -> bool {
        Self::verify(path).is_ok()
    }

    fn is_image_signature_valid(&self, _path: &Path, data: &[u8]) -> bool {
        Self::verify_image(data).is_ok()
    }
}

impl AuthenticodeVerifier {
    pub fn verify(path: &Path) -> Result<(), ArchiveError> {
        let data = fs::read(path)?;
        Self::verify_image(&data)
    }

    pub fn verify_image(data: &[u8]) -> Result<(), ArchiveError> {
        let pe = PeImage::parse(data)?;
        let blob = pe
            .signed_data()
            .ok_or_else(|| ArchiveError::Validation("file has no embedded signature".into()))?;
        let message = SignedMessage::from_der(blob)?;

        if message.content_type() != OID_SPC_INDIRECT_DATA {
            return Err(ArchiveError::Validation(format!(
                "signed content type {} is not SpcIndirectDataContent",
                message.content_type()
            )));
        }
        let content = message
            .content()
            .ok_or_else(|| ArchiveError::Validation("SignedData carries no content".into()))?;

        let indirect: SpcIndirectDataContent = decode_any(content)?;
        let image_alg_oid = indirect.message_digest.digest_algorithm.oid.to_string();
        let image_alg = DigestAlgorithm::from_oid(&image_alg_oid).ok_or_else(|| {
            ArchiveError::Validation(format!("unsupported image digest {}", image_alg_oid))
        })?;
        if pe.authenticode_digest(image_alg) != indirect.message_digest.digest.as_bytes() {
            return Err(ArchiveError::Validation(
                "image digest does not match the signed digest".into(),
            ));
        }

        let signer = message
            .signer_infos()
            .first()
            .ok_or_else(|| ArchiveError::Validation("SignedData has no signer".into()))?;
        let signer_alg_oid = signer.digest_alg.oid.to_string();
        let signer_alg = DigestAlgorithm::from_oid(&signer_alg_oid).ok_or_else(|| {
            ArchiveError::Validation(format!("unsupported signer digest {}", signer_alg_oid))
        })?;
        let expected = message_digest(signer)?
            .ok_or_else(|| ArchiveError::Validation("signer has no messageDigest".into()))?;
        // The digest covers the content octets, without the SEQUENCE header.
        if signer_alg.digest(content.value()) != expected {
            return Err(ArchiveError::Validation(
                "messageDigest does not match the signed content".into(),
            ));
        }

        let signed_bytes = signed_attributes_der(signer)?.ok_or_else(|| {
            ArchiveError::Validation("signer has no signed attributes".into())
        })?;
        let cert = find_signer_certificate(&message, &signer.sid)?;
        verify_signer_signature(cert, signer, signer_alg, &signed_bytes)
    }
}

fn subject_key_id(cert: &Certificate) -> Option<SubjectKeyIdentifier> {
    cert.tbs_certificate
        .extensions
        .as_ref()?
        .iter()
        .find(|ext| ext.extn_id == OID_SUBJECT_KEY_IDENTIFIER)
        .and_then(|ext| SubjectKeyIdentifier::from_der(ext.extn_value.as_bytes()).ok())
}

fn find_signer_certificate<'m>(
    message: &'m SignedMessage,
    sid: &SignerIdentifier,
) -> Result<&'m Certificate, ArchiveError> {
    message
        .certificates()
        .find(|cert| match sid {
            SignerIdentifier::IssuerAndSerialNumber(id) => {
                cert.tbs_certificate.issuer == id.issuer
                    && cert.tbs_certificate.serial_number == id.serial_number
            }
            SignerIdentifier::SubjectKeyIdentifier(ski) => subject_key_id(cert).as_ref() == Some(ski),
        })
        .ok_or_else(|| {
            ArchiveError::Validation("signer certificate not present in the signature".into())
        })
}

fn verify_signer_signature(
    cert: &Certificate,
    signer: &SignerInfo,
    digest: DigestAlgorithm,
    signed_bytes: &[u8],
) -> Result<(), ArchiveError> {
    let spki = &cert.tbs_certificate.subject_public_key_info;
    let key = spki.subject_public_key.raw_bytes();
    // rsaEncryption names no hash; the digest algorithm decides.
    let hash = DigestAlgorithm::from_oid(&signer.signature_algorithm.oid.to_string()).unwrap_or(digest);
    let key_alg = spki.algorithm.oid.to_string();

    let algorithm: &'static dyn VerificationAlgorithm = match (key_alg.as_str(), hash, key.len()) {
        (OID_RSA_ENCRYPTION, DigestAlgorithm::Sha1, _) => {
            &signature::RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY
        }
        (OID_RSA_ENCRYPTION, DigestAlgorithm::Sha256, _) => &signature::RSA_PKCS1_2048_8192_SHA256,
        (OID_RSA_ENCRYPTION, DigestAlgorithm::Sha384, _) => &signature::RSA_PKCS1_2048_8192_SHA384,
        (OID_RSA_ENCRYPTION, DigestAlgorithm::Sha512, _) => &signature::RSA_PKCS1_2048_8192_SHA512,
        // Uncompressed points: 0x04 || X || Y.
        (OID_EC_PUBLIC_KEY, DigestAlgorithm::Sha256, 65) => &signature::ECDSA_P256_SHA256_ASN1,
        (OID_EC_PUBLIC_KEY, DigestAlgorithm::Sha384, 65) => &signature::ECDSA_P256_SHA384_ASN1,
        (OID_EC_PUBLIC_KEY, DigestAlgorithm::Sha256, 97) => &signature::ECDSA_P384_SHA256_ASN1,
        (OID_EC_PUBLIC_KEY, DigestAlgorithm::Sha384, 97) => &signature::ECDSA_P384_SHA384_ASN1,
        (key_alg, hash, _) => {
            return Err(ArchiveError::Validation(format!(
                "unsupported signature: key {} with {:?}",
                key_alg, hash
            )))
        }
    };

    UnparsedPublicKey::new(algorithm, key)
        .verify(signed_bytes, signer.signature.as_bytes())
        .map_err(|_| ArchiveError::Validation("signer signature does not verify".into()))
}
