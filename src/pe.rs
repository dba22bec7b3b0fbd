/*
 * DLSS Archiver v1.0.0
 * Copyright (c) 2026 DLSS Archiver Contributors.
 * Licensed under the MIT License.
 */

//! PE/COFF access through `goblin`: the attribute certificate table, the
//! Authenticode image digest and the `RT_VERSION` resource.

use crate::{
    crypto::DigestAlgorithm,
    error::{decode_err, ArchiveError},
    version::VersionInfo,
};
use goblin::pe::{
    certificate_table::AttributeCertificateType, options::ParseOptions, utils::find_offset, PE,
};

const RT_VERSION: u32 = 16;
const RESOURCE_DIRECTORY_LEN: usize = 16;
const RESOURCE_ENTRY_LEN: usize = 8;

/// A parsed PE image borrowing the file bytes.
pub struct PeImage<'a> {
    data: &'a [u8],
    pe: PE<'a>,
}

fn read_u16(data: &[u8], offset: usize) -> Result<u16, ArchiveError> {
    data.get(offset..offset + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or_else(|| decode_err(format!("resource data truncated at 0x{:X}", offset)))
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32, ArchiveError> {
    data.get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| decode_err(format!("resource data truncated at 0x{:X}", offset)))
}

impl<'a> PeImage<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, ArchiveError> {
        Ok(Self {
            data,
            pe: PE::parse(data)?,
        })
    }

    /// The first PKCS#7 signed-data entry of the certificate table, padding
    /// included.
    pub fn signed_data(&self) -> Option<&'a [u8]> {
        self.pe
            .certificates
            .iter()
            .find(|c| matches!(c.certificate_type, AttributeCertificateType::PkcsSignedData))
            .map(|c| c.certificate)
    }

    /// Authenticode image hash: every byte of the file except the checksum
    /// field, the security directory entry and the certificate table.
    pub fn authenticode_digest(&self, algorithm: DigestAlgorithm) -> Vec<u8> {
        let mut ctx = algorithm.context();
        for range in self.pe.authenticode_ranges() {
            ctx.update(range);
        }
        ctx.finish().as_ref().to_vec()
    }

    pub fn rva_to_offset(&self, rva: u32) -> Option<usize> {
        let file_alignment = self
            .pe
            .header
            .optional_header
            .as_ref()?
            .windows_fields
            .file_alignment;
        find_offset(
            rva as usize,
            &self.pe.sections,
            file_alignment,
            &ParseOptions::default(),
        )
    }

    fn slice_at_rva(&self, rva: u32, len: usize) -> Result<&'a [u8], ArchiveError> {
        let offset = self
            .rva_to_offset(rva)
            .ok_or_else(|| decode_err(format!("RVA 0x{:X} is outside every section", rva)))?;
        self.data
            .get(offset..offset + len)
            .ok_or_else(|| decode_err(format!("RVA 0x{:X}+{} is past end of file", rva, len)))
    }

    /// Raw `VS_VERSIONINFO` bytes from the resource directory.
    pub fn version_resource(&self) -> Result<Option<&'a [u8]>, ArchiveError> {
        let Some((address, size)) = self
            .pe
            .header
            .optional_header
            .as_ref()
            .and_then(|h| h.data_directories.get_resource_table())
            .map(|d| (d.virtual_address, d.size))
        else {
            return Ok(None);
        };
        if address == 0 || size == 0 {
            return Ok(None);
        }
        let root = self
            .rva_to_offset(address)
            .ok_or_else(|| decode_err("resource directory is outside every section"))?;

        // type -> name -> language -> data entry
        let Some(by_type) = self.resource_child(root, root, Some(RT_VERSION))? else {
            return Ok(None);
        };
        let by_name = self
            .resource_child(root, by_type, None)?
            .ok_or_else(|| decode_err("empty RT_VERSION directory"))?;
        let data_entry = self
            .resource_child(root, by_name, None)?
            .ok_or_else(|| decode_err("empty RT_VERSION language directory"))?;

        let rva = read_u32(self.data, data_entry)?;
        let size = read_u32(self.data, data_entry + 4)? as usize;
        self.slice_at_rva(rva, size).map(Some)
    }

    /// Follows one level of the resource tree. Returns the file offset of the
    /// matching (or first) child.
    fn resource_child(
        &self,
        root: usize,
        directory: usize,
        id: Option<u32>,
    ) -> Result<Option<usize>, ArchiveError> {
        let named = read_u16(self.data, directory + 12)? as usize;
        let ids = read_u16(self.data, directory + 14)? as usize;
        for i in 0..named + ids {
            let entry = directory + RESOURCE_DIRECTORY_LEN + i * RESOURCE_ENTRY_LEN;
            let name = read_u32(self.data, entry)?;
            let target = read_u32(self.data, entry + 4)?;
            let matches = match id {
                Some(wanted) => name & 0x8000_0000 == 0 && name == wanted,
                None => true,
            };
            if matches {
                return Ok(Some(root + (target & 0x7FFF_FFFF) as usize));
            }
        }
        Ok(None)
    }

    pub fn version_info(&self) -> Result<Option<VersionInfo>, ArchiveError> {
        self.version_resource()?.map(VersionInfo::parse).transpose()
    }
}
