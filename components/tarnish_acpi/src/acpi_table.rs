//! ACPI Table Layout Primitives.
//!
//! Defines the standard ACPI description header and the Generic Address
//! Structure in their packed on-disk forms. Supports only ACPI version >= 2.0.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use alloc::vec::Vec;
use core::mem;

use scroll::{Pread, Pwrite, LE};

use crate::signature::ACPI_HEADER_LEN;

/// Represents a standard ACPI description header.
/// Equivalent to EFI_ACPI_DESCRIPTION_HEADER.
#[repr(C)]
#[derive(Default, Clone, Debug, Copy, PartialEq, Eq)]
pub struct AcpiTableHeader {
    pub signature: u32,
    pub length: u32,
    pub revision: u8,
    pub checksum: u8,
    pub oem_id: [u8; 6],
    pub oem_table_id: [u8; 8],
    pub oem_revision: u32,
    pub creator_id: u32,
    pub creator_revision: u32,
}

impl AcpiTableHeader {
    /// Serialize an `AcpiTableHeader` into a `Vec<u8>` in ACPI's canonical layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(ACPI_HEADER_LEN);

        buf.extend_from_slice(&self.signature.to_le_bytes());
        buf.extend_from_slice(&self.length.to_le_bytes());
        buf.push(self.revision);
        buf.push(self.checksum);
        buf.extend_from_slice(&self.oem_id);
        buf.extend_from_slice(&self.oem_table_id);
        buf.extend_from_slice(&self.oem_revision.to_le_bytes());
        buf.extend_from_slice(&self.creator_id.to_le_bytes());
        buf.extend_from_slice(&self.creator_revision.to_le_bytes());

        buf
    }

    /// Write the header into `buf` at `offset`, advancing `offset` past it.
    /// Fails if fewer than [`ACPI_HEADER_LEN`] bytes remain.
    pub fn write_into(&self, buf: &mut [u8], offset: &mut usize) -> Result<(), scroll::Error> {
        buf.gwrite_with(self.signature, offset, LE)?;
        buf.gwrite_with(self.length, offset, LE)?;
        buf.gwrite_with(self.revision, offset, LE)?;
        buf.gwrite_with(self.checksum, offset, LE)?;
        buf.gwrite_with::<&[u8]>(&self.oem_id, offset, ())?;
        buf.gwrite_with::<&[u8]>(&self.oem_table_id, offset, ())?;
        buf.gwrite_with(self.oem_revision, offset, LE)?;
        buf.gwrite_with(self.creator_id, offset, LE)?;
        buf.gwrite_with(self.creator_revision, offset, LE)?;
        Ok(())
    }

    /// Read a header from the start of `buf`.
    /// Returns `None` when `buf` is shorter than the fixed header.
    pub fn read(buf: &[u8]) -> Option<AcpiTableHeader> {
        if buf.len() < ACPI_HEADER_LEN {
            return None;
        }
        let mut offset = 0;
        let mut hdr = AcpiTableHeader {
            signature: buf.gread_with(&mut offset, LE).ok()?,
            length: buf.gread_with(&mut offset, LE).ok()?,
            revision: buf.gread_with(&mut offset, LE).ok()?,
            checksum: buf.gread_with(&mut offset, LE).ok()?,
            ..Default::default()
        };
        hdr.oem_id.copy_from_slice(&buf[offset..offset + 6]);
        offset += 6;
        hdr.oem_table_id.copy_from_slice(&buf[offset..offset + 8]);
        offset += 8;
        hdr.oem_revision = buf.gread_with(&mut offset, LE).ok()?;
        hdr.creator_id = buf.gread_with(&mut offset, LE).ok()?;
        hdr.creator_revision = buf.gread_with(&mut offset, LE).ok()?;
        Some(hdr)
    }
}

/// Byte length of the Generic Address Structure.
pub const GAS_LEN: usize = 12;

/// Represents an ACPI address space for ACPI 2.0+.
/// Equivalent to EFI_ACPI_3_0_GENERIC_ADDRESS_STRUCTURE.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenericAddressStructure {
    pub address_space_id: u8,
    pub register_bit_width: u8,
    pub register_bit_offset: u8,
    pub access_size: u8,
    pub address: u64,
}

impl GenericAddressStructure {
    /// Write the GAS into `buf` at `offset`, advancing `offset` past it.
    pub fn write_into(&self, buf: &mut [u8], offset: &mut usize) -> Result<(), scroll::Error> {
        buf.gwrite_with(self.address_space_id, offset, LE)?;
        buf.gwrite_with(self.register_bit_width, offset, LE)?;
        buf.gwrite_with(self.register_bit_offset, offset, LE)?;
        buf.gwrite_with(self.access_size, offset, LE)?;
        buf.gwrite_with(self.address, offset, LE)?;
        Ok(())
    }
}

const _: () = assert!(mem::size_of::<GenericAddressStructure>() == GAS_LEN);

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    #[test]
    fn test_header_round_trip() {
        let hdr = AcpiTableHeader {
            signature: crate::signature::MADT,
            length: 44,
            revision: 5,
            checksum: 0x12,
            oem_id: *b"TARNSH",
            oem_table_id: *b"TARNMADT",
            oem_revision: 1,
            creator_id: u32::from_le_bytes(*b"TRSH"),
            creator_revision: 0x2026_0100,
        };

        let bytes = hdr.to_bytes();
        assert_eq!(bytes.len(), ACPI_HEADER_LEN);
        assert_eq!(&bytes[0..4], b"APIC");
        assert_eq!(AcpiTableHeader::read(&bytes), Some(hdr));

        // write_into produces the same bytes as to_bytes
        let mut buf = vec![0u8; ACPI_HEADER_LEN];
        let mut offset = 0;
        hdr.write_into(&mut buf, &mut offset).expect("header should fit");
        assert_eq!(offset, ACPI_HEADER_LEN);
        assert_eq!(buf, bytes);
    }

    #[test]
    fn test_header_read_too_short() {
        let buf = vec![0u8; ACPI_HEADER_LEN - 1];
        assert!(AcpiTableHeader::read(&buf).is_none());
    }

    #[test]
    fn test_gas_layout() {
        let gas = GenericAddressStructure {
            address_space_id: 0,
            register_bit_width: 0x40,
            register_bit_offset: 0,
            access_size: 4,
            address: 0xF00,
        };
        let mut buf = vec![0u8; GAS_LEN];
        let mut offset = 0;
        gas.write_into(&mut buf, &mut offset).expect("gas should fit");
        assert_eq!(offset, GAS_LEN);
        assert_eq!(buf, vec![0x00, 0x40, 0x00, 0x04, 0x00, 0x0F, 0, 0, 0, 0, 0, 0]);
    }
}
