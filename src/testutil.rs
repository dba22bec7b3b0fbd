/*
 * DLSS Archiver v1.0.0
 * Copyright (c) 2026 DLSS Archiver Contributors.
 * Licensed under the MIT License.
 */

//! Synthetic PE images and signatures for unit tests.

use crate::{
    crypto::DigestAlgorithm, pe::PeImage, record::ProvenanceRecord,
    verification::SignatureValidator, version::FileVersion,
};
use der::{asn1::Any, Decode};
use ring::{
    rand::SystemRandom,
    signature::{
        EcdsaKeyPair, KeyPair, RsaKeyPair, ECDSA_P256_SHA256_ASN1_SIGNING, RSA_PKCS1_SHA256,
    },
};
use simple_asn1::{oid, ASN1Block, BigInt, OID};
use std::{fs::File, io::Write, path::Path};
use zip::{write::FileOptions, ZipWriter};

pub const COUNTER_SIGNATURE_TIME: &str = "2022-06-30T18:05:09+00:00";
pub const TOKEN_TIME: &str = "2023-03-14T09:26:53+00:00";

/// File offset of the `.rsrc` section in [`minimal_pe`] images.
pub const RSRC_RAW_OFFSET: usize = 0x200;
const RSRC_RVA: u32 = 0x1000;
const OPTIONAL_HEADER: usize = 0x58;
const DATA_DIRECTORIES: usize = OPTIONAL_HEADER + 96;
const SECTION_TABLE: usize = OPTIONAL_HEADER + 0xE0;
const VERSION_INFO_OFFSET: usize = 88;

const TAG_OCTET_STRING: u8 = 0x04;
const TAG_SEQUENCE: u8 = 0x30;
const TAG_SET: u8 = 0x31;

/// 2048-bit RSA key, PKCS#8 DER.
const RSA_PKCS8: &[u8] = include_bytes!("testdata/rsa2048.pk8");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampStyle {
    #[default]
    None,
    CounterSignature,
    Rfc3161,
    /// A counter-signature and a token in the same signer.
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningKey {
    #[default]
    Ecdsa,
    Rsa,
}

/// Shape of a synthetic Authenticode blob.
#[derive(Debug, Clone, Default)]
pub struct BlobSpec<'a> {
    pub style: TimestampStyle,
    /// Unsigned attributes with these OIDs and a NULL value.
    pub reserved_unsigned: &'a [OID],
    /// Same, placed among the signed attributes.
    pub reserved_signed: &'a [OID],
    /// Adds a second signer info that carries no unsigned attributes.
    pub untimed_extra_signer: bool,
    pub key: SigningKey,
}

/// Validator with a fixed answer.
pub struct FixedValidator(pub bool);

impl SignatureValidator for FixedValidator {
    fn is_embedded_signature_valid(&self, _path: &Path) -> bool {
        self.0
    }
}

pub fn utc_time(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> ASN1Block {
    let date = time::Date::from_calendar_date(year, time::Month::try_from(month).unwrap(), day)
        .unwrap();
    let clock = time::Time::from_hms(hour, minute, second).unwrap();
    ASN1Block::UTCTime(0, time::PrimitiveDateTime::new(date, clock))
}

// ---------------------------------------------------------------------------
// DER building blocks
// ---------------------------------------------------------------------------

pub fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    let len = content.len();
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let bytes = (len as u32).to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        out.push(0x80 | (4 - skip) as u8);
        out.extend_from_slice(&bytes[skip..]);
    }
    out.extend_from_slice(content);
    out
}

pub fn cons(tag: u8, parts: &[Vec<u8>]) -> Vec<u8> {
    tlv(tag, &parts.concat())
}

/// A DER `SET OF` (or implicitly tagged one): elements in ascending
/// encoded order.
fn set_of(tag: u8, parts: &[Vec<u8>]) -> Vec<u8> {
    let mut sorted = parts.to_vec();
    sorted.sort();
    cons(tag, &sorted)
}

fn asn1(block: ASN1Block) -> Vec<u8> {
    simple_asn1::to_der(&block).unwrap()
}

fn oid_der(oid: OID) -> Vec<u8> {
    asn1(ASN1Block::ObjectIdentifier(0, oid))
}

fn integer(value: i64) -> Vec<u8> {
    asn1(ASN1Block::Integer(0, BigInt::from(value)))
}

fn bit_string(bytes: &[u8]) -> Vec<u8> {
    let mut content = vec![0u8];
    content.extend_from_slice(bytes);
    tlv(0x03, &content)
}

fn null() -> Vec<u8> {
    asn1(ASN1Block::Null(0))
}

fn algorithm(oid: OID, with_null: bool) -> Vec<u8> {
    let mut parts = vec![oid_der(oid)];
    if with_null {
        parts.push(null());
    }
    cons(TAG_SEQUENCE, &parts)
}

fn sha256_algorithm() -> Vec<u8> {
    algorithm(oid!(2, 16, 840, 1, 101, 3, 4, 2, 1), true)
}

fn name(common_name: &str) -> Vec<u8> {
    cons(
        TAG_SEQUENCE,
        &[set_of(
            TAG_SET,
            &[cons(
                TAG_SEQUENCE,
                &[
                    oid_der(oid!(2, 5, 4, 3)),
                    asn1(ASN1Block::UTF8String(0, common_name.to_string())),
                ],
            )],
        )],
    )
}

fn attribute(oid: OID, values: Vec<Vec<u8>>) -> Vec<u8> {
    cons(TAG_SEQUENCE, &[oid_der(oid), set_of(TAG_SET, &values)])
}

pub fn explicit(tag: u8, inner: Vec<u8>) -> Vec<u8> {
    tlv(0xA0 | tag, &inner)
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

enum TestKey {
    Ecdsa(EcdsaKeyPair),
    Rsa(RsaKeyPair),
}

impl TestKey {
    fn new(kind: SigningKey, rng: &SystemRandom) -> Self {
        match kind {
            SigningKey::Ecdsa => {
                let pkcs8 =
                    EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, rng).unwrap();
                Self::Ecdsa(
                    EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref(), rng)
                        .unwrap(),
                )
            }
            SigningKey::Rsa => Self::Rsa(RsaKeyPair::from_pkcs8(RSA_PKCS8).unwrap()),
        }
    }

    fn sign(&self, rng: &SystemRandom, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Ecdsa(key) => key.sign(rng, message).unwrap().as_ref().to_vec(),
            Self::Rsa(key) => {
                let mut signature = vec![0u8; key.public().modulus_len()];
                key.sign(&RSA_PKCS1_SHA256, rng, message, &mut signature)
                    .unwrap();
                signature
            }
        }
    }

    /// Algorithm of signatures this key makes over certificates.
    fn certificate_signature_algorithm(&self) -> Vec<u8> {
        match self {
            Self::Ecdsa(_) => algorithm(oid!(1, 2, 840, 10045, 4, 3, 2), false),
            Self::Rsa(_) => algorithm(oid!(1, 2, 840, 113549, 1, 1, 11), true),
        }
    }

    /// SignerInfo `signatureAlgorithm`. RSA signers name only the key type.
    fn signer_signature_algorithm(&self) -> Vec<u8> {
        match self {
            Self::Ecdsa(_) => algorithm(oid!(1, 2, 840, 10045, 4, 3, 2), false),
            Self::Rsa(_) => algorithm(oid!(1, 2, 840, 113549, 1, 1, 1), true),
        }
    }

    fn subject_public_key_info(&self) -> Vec<u8> {
        match self {
            Self::Ecdsa(key) => cons(
                TAG_SEQUENCE,
                &[
                    cons(
                        TAG_SEQUENCE,
                        &[
                            oid_der(oid!(1, 2, 840, 10045, 2, 1)),
                            oid_der(oid!(1, 2, 840, 10045, 3, 1, 7)),
                        ],
                    ),
                    bit_string(key.public_key().as_ref()),
                ],
            ),
            Self::Rsa(key) => cons(
                TAG_SEQUENCE,
                &[
                    algorithm(oid!(1, 2, 840, 113549, 1, 1, 1), true),
                    bit_string(key.public_key().as_ref()),
                ],
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// CMS fixtures
// ---------------------------------------------------------------------------

const SIGNER_NAME: &str = "DLSS Archiver Test Signer";
const SIGNER_SERIAL: i64 = 0x1234_5678;

fn signer_info(
    signed: &[Vec<u8>],
    signature_algorithm: Vec<u8>,
    signature: &[u8],
    unsigned: &[Vec<u8>],
) -> Vec<u8> {
    let mut fields = vec![
        integer(1),
        cons(TAG_SEQUENCE, &[name(SIGNER_NAME), integer(SIGNER_SERIAL)]),
        sha256_algorithm(),
        set_of(0xA0, signed),
        signature_algorithm,
        tlv(TAG_OCTET_STRING, signature),
    ];
    if !unsigned.is_empty() {
        fields.push(set_of(0xA1, unsigned));
    }
    cons(TAG_SEQUENCE, &fields)
}

fn content_info(
    content_type: OID,
    content: Vec<u8>,
    certificates: &[Vec<u8>],
    signers: &[Vec<u8>],
) -> Vec<u8> {
    let mut fields = vec![
        integer(1),
        set_of(TAG_SET, &[sha256_algorithm()]),
        cons(TAG_SEQUENCE, &[oid_der(content_type), explicit(0, content)]),
    ];
    if !certificates.is_empty() {
        fields.push(set_of(0xA0, certificates));
    }
    fields.push(set_of(TAG_SET, signers));
    cons(
        TAG_SEQUENCE,
        &[
            oid_der(oid!(1, 2, 840, 113549, 1, 7, 2)),
            explicit(0, cons(TAG_SEQUENCE, &fields)),
        ],
    )
}

/// A ContentInfo of type `id-data`.
pub fn content_info_of_data(content: &[u8]) -> Vec<u8> {
    cons(
        TAG_SEQUENCE,
        &[
            oid_der(oid!(1, 2, 840, 113549, 1, 7, 1)),
            explicit(0, content.to_vec()),
        ],
    )
}

fn ecdsa_placeholder_algorithm() -> Vec<u8> {
    algorithm(oid!(1, 2, 840, 10045, 4, 3, 2), false)
}

fn counter_signature() -> Vec<u8> {
    let signing_time = attribute(
        oid!(1, 2, 840, 113549, 1, 9, 5),
        vec![asn1(utc_time(2022, 6, 30, 18, 5, 9))],
    );
    attribute(
        oid!(1, 2, 840, 113549, 1, 9, 6),
        vec![signer_info(
            &[signing_time],
            ecdsa_placeholder_algorithm(),
            &[0x5a; 64],
            &[],
        )],
    )
}

fn timestamp_token() -> Vec<u8> {
    let tst_info = cons(
        TAG_SEQUENCE,
        &[integer(1), oid_der(oid!(1, 3, 6, 1, 4, 1, 601, 10, 3, 1))],
    );
    let signed = [
        attribute(
            oid!(1, 2, 840, 113549, 1, 9, 3),
            vec![oid_der(oid!(1, 2, 840, 113549, 1, 9, 16, 1, 4))],
        ),
        attribute(
            oid!(1, 2, 840, 113549, 1, 9, 5),
            vec![asn1(utc_time(2023, 3, 14, 9, 26, 53))],
        ),
    ];
    let token = content_info(
        oid!(1, 2, 840, 113549, 1, 9, 16, 1, 4),
        tlv(TAG_OCTET_STRING, &tst_info),
        &[],
        &[signer_info(
            &signed,
            ecdsa_placeholder_algorithm(),
            &[0xa5; 64],
            &[],
        )],
    );
    attribute(oid!(1, 3, 6, 1, 4, 1, 311, 3, 3, 1), vec![token])
}

fn certificate(key: &TestKey, rng: &SystemRandom) -> Vec<u8> {
    let tbs = cons(
        TAG_SEQUENCE,
        &[
            explicit(0, integer(2)),
            integer(SIGNER_SERIAL),
            key.certificate_signature_algorithm(),
            name(SIGNER_NAME),
            cons(
                TAG_SEQUENCE,
                &[
                    asn1(utc_time(2020, 1, 1, 0, 0, 0)),
                    asn1(utc_time(2040, 1, 1, 0, 0, 0)),
                ],
            ),
            name(SIGNER_NAME),
            key.subject_public_key_info(),
        ],
    );
    let signature = key.sign(rng, &tbs);
    cons(
        TAG_SEQUENCE,
        &[tbs, key.certificate_signature_algorithm(), bit_string(&signature)],
    )
}

fn reserved_attributes(oids: &[OID]) -> Vec<Vec<u8>> {
    oids.iter()
        .map(|oid| attribute(oid.clone(), vec![null()]))
        .collect()
}

/// A signed Authenticode blob over `image_digest` (SHA-256). Returns the blob
/// and the raw signer signature.
fn authenticode_blob(image_digest: &[u8], spec: &BlobSpec<'_>) -> (Vec<u8>, Vec<u8>) {
    let rng = SystemRandom::new();
    let key = TestKey::new(spec.key, &rng);

    let spc = cons(
        TAG_SEQUENCE,
        &[
            cons(
                TAG_SEQUENCE,
                &[
                    oid_der(oid!(1, 3, 6, 1, 4, 1, 311, 2, 1, 15)),
                    cons(TAG_SEQUENCE, &[]),
                ],
            ),
            cons(
                TAG_SEQUENCE,
                &[sha256_algorithm(), tlv(TAG_OCTET_STRING, image_digest)],
            ),
        ],
    );
    let spc_content = Any::from_der(&spc).unwrap().value().to_vec();
    let message_digest = DigestAlgorithm::Sha256.digest(&spc_content);

    let mut signed = vec![
        attribute(
            oid!(1, 2, 840, 113549, 1, 9, 3),
            vec![oid_der(oid!(1, 3, 6, 1, 4, 1, 311, 2, 1, 4))],
        ),
        attribute(
            oid!(1, 2, 840, 113549, 1, 9, 4),
            vec![tlv(TAG_OCTET_STRING, &message_digest)],
        ),
    ];
    signed.extend(reserved_attributes(spec.reserved_signed));
    let signature = key.sign(&rng, &set_of(TAG_SET, &signed));

    let mut unsigned = reserved_attributes(spec.reserved_unsigned);
    match spec.style {
        TimestampStyle::None => {}
        TimestampStyle::CounterSignature => unsigned.push(counter_signature()),
        TimestampStyle::Rfc3161 => unsigned.push(timestamp_token()),
        TimestampStyle::Both => {
            unsigned.push(counter_signature());
            unsigned.push(timestamp_token());
        }
    }

    let mut signers = vec![signer_info(
        &signed,
        key.signer_signature_algorithm(),
        &signature,
        &unsigned,
    )];
    if spec.untimed_extra_signer {
        let extra = key.sign(&rng, &set_of(TAG_SET, &signed));
        signers.push(signer_info(
            &signed,
            key.signer_signature_algorithm(),
            &extra,
            &[],
        ));
    }

    let blob = content_info(
        oid!(1, 3, 6, 1, 4, 1, 311, 2, 1, 4),
        spc,
        &[certificate(&key, &rng)],
        &signers,
    );
    (blob, signature)
}

/// A signed-data blob whose image digest is all zeroes.
pub fn signed_message(style: TimestampStyle, reserved_unsigned: &[OID]) -> Vec<u8> {
    signed_message_with(&BlobSpec {
        style,
        reserved_unsigned,
        ..BlobSpec::default()
    })
}

pub fn signed_message_with(spec: &BlobSpec<'_>) -> Vec<u8> {
    authenticode_blob(&[0u8; 32], spec).0
}

// ---------------------------------------------------------------------------
// PE fixtures
// ---------------------------------------------------------------------------

fn put_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn pad4(buf: &mut Vec<u8>) {
    while buf.len() % 4 != 0 {
        buf.push(0);
    }
}

fn utf16z(text: &str) -> Vec<u8> {
    text.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(|u| u.to_le_bytes())
        .collect()
}

fn version_block(key: &str, value: &[u8], text: bool, children: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![0u8; 6];
    out.extend(utf16z(key));
    pad4(&mut out);
    out.extend_from_slice(value);
    for child in children {
        pad4(&mut out);
        out.extend_from_slice(child);
    }
    let length = out.len() as u16;
    let value_length = (if text { value.len() / 2 } else { value.len() }) as u16;
    put_u16(&mut out, 0, length);
    put_u16(&mut out, 2, value_length);
    put_u16(&mut out, 4, text as u16);
    out
}

/// A `VS_VERSIONINFO` block with the given file version and description.
pub fn version_resource(version: (u16, u16, u16, u16), description: &str) -> Vec<u8> {
    let (major, minor, build, revision) = version;
    let ms = (major as u32) << 16 | minor as u32;
    let ls = (build as u32) << 16 | revision as u32;
    let fixed: Vec<u8> = [
        0xFEEF_04BD,
        0x0001_0000,
        ms,
        ls,
        ms,
        ls,
        0x3F,
        0,
        0x0004_0004,
        2,
        0,
        0,
        0,
    ]
    .iter()
    .flat_map(|w: &u32| w.to_le_bytes())
    .collect();

    let dotted = format!("{}.{}.{}.{}", major, minor, build, revision);
    let strings = version_block(
        "040904b0",
        &[],
        true,
        &[
            version_block("CompanyName", &utf16z("NVIDIA Corporation"), true, &[]),
            version_block("FileDescription", &utf16z(description), true, &[]),
            version_block("FileVersion", &utf16z(&dotted), true, &[]),
        ],
    );
    let string_info = version_block("StringFileInfo", &[], true, &[strings]);
    let translation = version_block("Translation", &[0x09, 0x04, 0xb0, 0x04], false, &[]);
    let var_info = version_block("VarFileInfo", &[], true, &[translation]);

    version_block("VS_VERSION_INFO", &fixed, false, &[string_info, var_info])
}

/// A PE32 DLL with one `.rsrc` section holding a version resource. The
/// length is a multiple of 8 so a certificate table can follow directly.
pub fn minimal_pe(version: (u16, u16, u16, u16), description: &str) -> Vec<u8> {
    let version_info = version_resource(version, description);

    // root -> type 16 -> id 1 -> lang 0x409 -> data entry -> VS_VERSIONINFO
    let mut rsrc = vec![0u8; VERSION_INFO_OFFSET];
    put_u16(&mut rsrc, 14, 1);
    put_u32(&mut rsrc, 16, 16);
    put_u32(&mut rsrc, 20, 0x8000_0000 | 24);
    put_u16(&mut rsrc, 24 + 14, 1);
    put_u32(&mut rsrc, 40, 1);
    put_u32(&mut rsrc, 44, 0x8000_0000 | 48);
    put_u16(&mut rsrc, 48 + 14, 1);
    put_u32(&mut rsrc, 64, 0x409);
    put_u32(&mut rsrc, 68, 72);
    put_u32(&mut rsrc, 72, RSRC_RVA + VERSION_INFO_OFFSET as u32);
    put_u32(&mut rsrc, 76, version_info.len() as u32);
    rsrc.extend_from_slice(&version_info);
    let virtual_size = rsrc.len() as u32;
    rsrc.resize(rsrc.len().div_ceil(0x200) * 0x200, 0);

    let mut image = vec![0u8; RSRC_RAW_OFFSET];
    image[..2].copy_from_slice(b"MZ");
    put_u32(&mut image, 0x3C, 0x40);
    image[0x40..0x44].copy_from_slice(b"PE\0\0");

    let coff = 0x44;
    put_u16(&mut image, coff, 0x014C);
    put_u16(&mut image, coff + 2, 1);
    put_u16(&mut image, coff + 16, 0xE0);
    put_u16(&mut image, coff + 18, 0x2102);

    let opt = OPTIONAL_HEADER;
    put_u16(&mut image, opt, 0x10B);
    put_u32(&mut image, opt + 28, 0x1000_0000);
    put_u32(&mut image, opt + 32, 0x1000);
    put_u32(&mut image, opt + 36, 0x200);
    put_u32(&mut image, opt + 56, RSRC_RVA + 0x1000);
    put_u32(&mut image, opt + 60, RSRC_RAW_OFFSET as u32);
    put_u32(&mut image, opt + 64, 0xDEAD_BEEF);
    put_u16(&mut image, opt + 68, 2);
    put_u32(&mut image, opt + 92, 16);
    put_u32(&mut image, DATA_DIRECTORIES + 2 * 8, RSRC_RVA);
    put_u32(&mut image, DATA_DIRECTORIES + 2 * 8 + 4, virtual_size);

    let section = SECTION_TABLE;
    image[section..section + 5].copy_from_slice(b".rsrc");
    put_u32(&mut image, section + 8, virtual_size);
    put_u32(&mut image, section + 12, RSRC_RVA);
    put_u32(&mut image, section + 16, rsrc.len() as u32);
    put_u32(&mut image, section + 20, RSRC_RAW_OFFSET as u32);
    put_u32(&mut image, section + 36, 0x4000_0040);

    image.extend_from_slice(&rsrc);
    image
}

/// Appends `blob` as a `WIN_CERT_TYPE_PKCS_SIGNED_DATA` certificate and
/// points the security directory at it.
pub fn attach_signature(image: &[u8], blob: &[u8]) -> Vec<u8> {
    let mut out = image.to_vec();
    while out.len() % 8 != 0 {
        out.push(0);
    }
    let start = out.len();
    let length = (8 + blob.len()).div_ceil(8) * 8;
    out.extend_from_slice(&(length as u32).to_le_bytes());
    out.extend_from_slice(&0x0200u16.to_le_bytes());
    out.extend_from_slice(&0x0002u16.to_le_bytes());
    out.extend_from_slice(blob);
    out.resize(start + length, 0);

    put_u32(&mut out, DATA_DIRECTORIES + 4 * 8, start as u32);
    put_u32(&mut out, DATA_DIRECTORIES + 4 * 8 + 4, length as u32);
    out
}

pub struct SignedPe {
    pub image: Vec<u8>,
    /// First byte of section data; covered by the image digest.
    pub section_offset: usize,
    /// File offset just past the signer's signature octets.
    pub signature_end: usize,
}

/// A PE with a valid ECDSA Authenticode signature.
pub fn signed_pe(
    version: (u16, u16, u16, u16),
    description: &str,
    style: TimestampStyle,
) -> SignedPe {
    signed_pe_with(
        version,
        description,
        &BlobSpec {
            style,
            ..BlobSpec::default()
        },
    )
}

pub fn signed_pe_with(
    version: (u16, u16, u16, u16),
    description: &str,
    spec: &BlobSpec<'_>,
) -> SignedPe {
    let unsigned = minimal_pe(version, description);
    let digest = PeImage::parse(&unsigned)
        .unwrap()
        .authenticode_digest(DigestAlgorithm::Sha256);
    let (blob, signature) = authenticode_blob(&digest, spec);
    let image = attach_signature(&unsigned, &blob);

    let in_blob = blob
        .windows(signature.len())
        .position(|w| w == signature.as_slice())
        .unwrap();
    SignedPe {
        signature_end: unsigned.len() + 8 + in_blob + signature.len(),
        section_offset: RSRC_RAW_OFFSET,
        image,
    }
}

// ---------------------------------------------------------------------------
// Archive fixtures
// ---------------------------------------------------------------------------

/// Writes a zip holding `dll` under `entry_name`.
pub fn write_input_zip(path: &Path, entry_name: &str, dll: &[u8]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    writer
        .start_file(entry_name, FileOptions::<()>::default())
        .unwrap();
    writer.write_all(dll).unwrap();
    writer.finish().unwrap();
}

pub fn record(version: (u32, u32, u32, u32), label: &str, description: &str) -> ProvenanceRecord {
    let mut record = ProvenanceRecord::default();
    record.set_version(FileVersion::new(version.0, version.1, version.2, version.3));
    record.additional_label = label.to_string();
    record.description = description.to_string();
    record
}
