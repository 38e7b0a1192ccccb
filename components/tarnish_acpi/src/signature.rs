//! ACPI Signatures and Table Constants.
//!
//! Defines table signatures and revision constants for the tables handled by
//! the inspector and the generator. The following definitions only support
//! ACPI 2.0+.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

/// Byte length of the standard ACPI description header.
pub const ACPI_HEADER_LEN: usize = 36;

pub const XSDT: u32 = u32::from_le_bytes(*b"XSDT");
pub const FACP: u32 = u32::from_le_bytes(*b"FACP");
pub const FACS: u32 = u32::from_le_bytes(*b"FACS");
pub const DSDT: u32 = u32::from_le_bytes(*b"DSDT");
pub const SSDT: u32 = u32::from_le_bytes(*b"SSDT");
pub const MADT: u32 = u32::from_le_bytes(*b"APIC");
pub const MCFG: u32 = u32::from_le_bytes(*b"MCFG");
pub const GTDT: u32 = u32::from_le_bytes(*b"GTDT");
pub const IORT: u32 = u32::from_le_bytes(*b"IORT");
pub const PPTT: u32 = u32::from_le_bytes(*b"PPTT");
pub const SRAT: u32 = u32::from_le_bytes(*b"SRAT");
pub const SLIT: u32 = u32::from_le_bytes(*b"SLIT");
pub const SPCR: u32 = u32::from_le_bytes(*b"SPCR");
pub const DBG2: u32 = u32::from_le_bytes(*b"DBG2");
pub const BGRT: u32 = u32::from_le_bytes(*b"BGRT");

/// For legacy ACPI reasons, the FADT has signature 'FACP'.
pub const FADT: u32 = FACP;

/// The RSDP is not a standard table; its signature is the 8-byte "RSD PTR ".
pub const ACPI_RSDP_TABLE: u64 = u64::from_le_bytes(*b"RSD PTR ");
pub const ACPI_RSDP_LEN: usize = 36;
pub const ACPI_RSDP_REVISION: u8 = 2;

pub const ACPI_XSDT_REVISION: u8 = 1;

// Table revisions emitted by the generator, per ACPI 6.3 (IORT per the IO
// Remapping Table Platform Design Document, revision D).
pub const ACPI_6_3_MADT_REVISION: u8 = 5;
pub const ACPI_6_3_SRAT_REVISION: u8 = 3;
pub const ACPI_MCFG_REVISION: u8 = 1;
pub const IORT_TABLE_REVISION: u8 = 0;

pub const ACPI_RESERVED_BYTE: u8 = 0x00;

// Fixed (sub-structure-free) portion of each table the inspector handles.
// For tables with a trailing variable-length region these are minimum sizes.
pub const FADT_SIZE: usize = 276;
pub const FACS_SIZE: usize = 64;
pub const MADT_SIZE: usize = 44;
pub const MCFG_SIZE: usize = 44;
pub const GTDT_SIZE: usize = 104;
pub const IORT_SIZE: usize = 48;
pub const PPTT_SIZE: usize = ACPI_HEADER_LEN;
pub const SRAT_SIZE: usize = 48;
pub const SLIT_SIZE: usize = 44;
pub const SPCR_SIZE: usize = 80;
pub const DBG2_SIZE: usize = 44;
pub const BGRT_SIZE: usize = 56;

/// Minimum valid length for a table with the given signature.
/// Defaults to the header size for signatures without additional sizing
/// information.
pub fn acpi_table_min_size(signature: u32) -> usize {
    match signature {
        FACP => FADT_SIZE,
        FACS => FACS_SIZE,
        MADT => MADT_SIZE,
        MCFG => MCFG_SIZE,
        GTDT => GTDT_SIZE,
        IORT => IORT_SIZE,
        SRAT => SRAT_SIZE,
        SLIT => SLIT_SIZE,
        SPCR => SPCR_SIZE,
        DBG2 => DBG2_SIZE,
        BGRT => BGRT_SIZE,
        _ => ACPI_HEADER_LEN,
    }
}

/// Render a 4-byte signature as ASCII for report lines.
pub fn signature_name(signature: u32) -> [u8; 4] {
    signature.to_le_bytes()
}
