//! Table Builders.
//!
//! One builder per supported table. Every builder follows the same shape:
//! fetch typed objects from the repository, run the sizing pass (computing
//! the exact region offsets and populating the node indexer where the
//! table has cross-references), allocate one zeroed buffer, emit the
//! header and every node, and finalize the checksum. Emission never
//! recomputes offsets; the sizing pass is authoritative.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

pub mod iort;
pub mod madt;
pub mod mcfg;
pub mod srat;

use alloc::vec::Vec;

use tarnish_acpi::acpi_table::AcpiTableHeader;
use tarnish_acpi::checksum;

use crate::error::GenError;
use crate::objects::PlatformObject;

/// Byte offset of the checksum field within the standard header.
const CHECKSUM_OFFSET: usize = 9;

/// OEM and creator identity stamped into every generated table.
#[derive(Debug, Clone, Copy)]
pub struct TableInfo {
    pub oem_id: [u8; 6],
    pub oem_table_id: [u8; 8],
    pub oem_revision: u32,
    pub creator_id: u32,
    pub creator_revision: u32,
}

impl Default for TableInfo {
    fn default() -> Self {
        TableInfo {
            oem_id: *b"TARNSH",
            oem_table_id: *b"TARNEDGE",
            oem_revision: 1,
            creator_id: u32::from_le_bytes(*b"TRNS"),
            creator_revision: 0x0001_0000,
        }
    }
}

/// Write the standard header at the start of `buf` with a zero checksum.
/// Returns the offset just past the header.
pub(crate) fn write_header(
    buf: &mut [u8],
    signature: u32,
    length: u32,
    revision: u8,
    info: &TableInfo,
) -> Result<usize, GenError> {
    let header = AcpiTableHeader {
        signature,
        length,
        revision,
        checksum: 0,
        oem_id: info.oem_id,
        oem_table_id: info.oem_table_id,
        oem_revision: info.oem_revision,
        creator_id: info.creator_id,
        creator_revision: info.creator_revision,
    };
    let mut offset = 0;
    header.write_into(buf, &mut offset)?;
    Ok(offset)
}

/// Store the checksum complement so the finished table byte-sums to zero.
pub(crate) fn finalize(buf: &mut [u8]) {
    checksum::finalize(buf, CHECKSUM_OFFSET);
}

/// Narrow a repository list to one object kind; any stray variant is an
/// `InvalidObjectType` failure.
pub(crate) fn typed<T>(
    objects: Vec<PlatformObject>,
    extract: fn(PlatformObject) -> Option<T>,
) -> Result<Vec<T>, GenError> {
    objects.into_iter().map(|o| extract(o).ok_or(GenError::InvalidObjectType)).collect()
}
