//! Per-Table Dispatchers.
//!
//! One dispatcher per supported ACPI table, registered by signature. Every
//! dispatcher follows the same protocol: bail out when tracing is off,
//! reset its structure database, walk the fixed header (populating the
//! header-info sidecar), iterate the tag-and-length sub-structure region,
//! and finish with the table's cross-structure checks under consistency
//! mode.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

pub mod bgrt;
pub mod dbg2;
pub mod dsdt;
pub mod facs;
pub mod fadt;
pub mod gas;
pub mod gtdt;
pub mod iort;
pub mod madt;
pub mod mcfg;
pub mod pptt;
pub mod rsdp;
pub mod slit;
pub mod spcr;
pub mod srat;
pub mod xsdt;

use phf::phf_map;

use tarnish_acpi::checksum;
use tarnish_acpi::signature::{self, ACPI_HEADER_LEN};

use crate::field::{read_uint, CaptureId, Captures, FieldDescriptor, FieldFormat};
use crate::parser::parse_fields;
use crate::report::{ErrorKind, Severity, ViewContext};

/// One registered table parser.
pub struct TableHandler {
    pub name: &'static str,
    pub parse: fn(&mut ViewContext, &[u8], u8),
}

/// Pseudo-signature under which the RSDP parser is registered; the RSDP's
/// real signature is the 8-byte "RSD PTR ".
pub const RSDP_PSEUDO_SIGNATURE: u32 = u32::from_le_bytes(*b"RSDP");

/// Registry of supported tables, keyed by signature.
pub static TABLE_REGISTRY: phf::Map<u32, TableHandler> = phf_map! {
    0x50445352u32 => TableHandler { name: "RSDP", parse: rsdp::parse }, // pseudo-signature
    0x54445358u32 => TableHandler { name: "XSDT", parse: xsdt::parse },
    0x50434146u32 => TableHandler { name: "FADT", parse: fadt::parse }, // signature "FACP"
    0x53434146u32 => TableHandler { name: "FACS", parse: facs::parse },
    0x54445344u32 => TableHandler { name: "DSDT", parse: dsdt::parse },
    0x54445353u32 => TableHandler { name: "SSDT", parse: dsdt::parse },
    0x43495041u32 => TableHandler { name: "MADT", parse: madt::parse }, // signature "APIC"
    0x4746434Du32 => TableHandler { name: "MCFG", parse: mcfg::parse },
    0x54445447u32 => TableHandler { name: "GTDT", parse: gtdt::parse },
    0x54524F49u32 => TableHandler { name: "IORT", parse: iort::parse },
    0x54545050u32 => TableHandler { name: "PPTT", parse: pptt::parse },
    0x54415253u32 => TableHandler { name: "SRAT", parse: srat::parse },
    0x54494C53u32 => TableHandler { name: "SLIT", parse: slit::parse },
    0x52435053u32 => TableHandler { name: "SPCR", parse: spcr::parse },
    0x32474244u32 => TableHandler { name: "DBG2", parse: dbg2::parse },
    0x54524742u32 => TableHandler { name: "BGRT", parse: bgrt::parse },
};

/// Inspect one table image: verify its checksum under consistency mode,
/// then hand it to the parser registered for `sig`. Unknown signatures are
/// a `value` report, not a failure.
pub fn parse_table(ctx: &mut ViewContext, sig: u32, buf: &[u8], revision: u8) {
    let Some(handler) = TABLE_REGISTRY.get(&sig) else {
        let name = signature::signature_name(sig);
        ctx.error(
            ErrorKind::Value,
            format_args!(
                "No parser for table signature '{}{}{}{}'",
                name[0] as char, name[1] as char, name[2] as char, name[3] as char
            ),
        );
        return;
    };

    // The RSDP carries its own pair of checksums and the FACS carries none;
    // both are handled inside their parsers.
    if ctx.consistency() && sig != RSDP_PSEUDO_SIGNATURE && sig != signature::FACS {
        if checksum::verifies(buf) {
            if ctx.trace() {
                ctx.line(Severity::Good, format_args!("{}: table checksum OK", handler.name));
            }
        } else {
            ctx.error(
                ErrorKind::Checksum,
                format_args!("{}: table byte-sum is 0x{:X}, expected 0", handler.name, checksum::byte_sum(buf)),
            );
        }
    }

    (handler.parse)(ctx, buf, revision);
}

// Capture slots of the standard description header sidecar.
pub const HDR_SIGNATURE: CaptureId = 0;
pub const HDR_LENGTH: CaptureId = 1;
pub const HDR_REVISION: CaptureId = 2;
pub const HDR_CHECKSUM: CaptureId = 3;
pub const HDR_OEM_ID: CaptureId = 4;
pub const HDR_OEM_TABLE_ID: CaptureId = 5;
pub const HDR_OEM_REVISION: CaptureId = 6;
pub const HDR_CREATOR_ID: CaptureId = 7;
pub const HDR_CREATOR_REVISION: CaptureId = 8;

/// Descriptors for the standard ACPI description header.
pub const HEADER_DESCRIPTORS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Signature", 4, 0, FieldFormat::Ascii).with_capture(HDR_SIGNATURE),
    FieldDescriptor::new("Length", 4, 4, FieldFormat::UintDec).with_capture(HDR_LENGTH),
    FieldDescriptor::new("Revision", 1, 8, FieldFormat::UintDec).with_capture(HDR_REVISION),
    FieldDescriptor::new("Checksum", 1, 9, FieldFormat::UintHex).with_capture(HDR_CHECKSUM),
    FieldDescriptor::new("Oem ID", 6, 10, FieldFormat::Ascii).with_capture(HDR_OEM_ID),
    FieldDescriptor::new("Oem Table ID", 8, 16, FieldFormat::Ascii).with_capture(HDR_OEM_TABLE_ID),
    FieldDescriptor::new("Oem Revision", 4, 24, FieldFormat::UintHex).with_capture(HDR_OEM_REVISION),
    FieldDescriptor::new("Creator ID", 4, 28, FieldFormat::Ascii).with_capture(HDR_CREATOR_ID),
    FieldDescriptor::new("Creator Revision", 4, 32, FieldFormat::UintHex).with_capture(HDR_CREATOR_REVISION),
];

/// Captured view of the standard header, populated as a side effect of
/// parsing it. Lives for one table parse; the captured ranges borrow
/// against the buffer handed to [`HeaderInfo::parse`].
#[derive(Default)]
pub struct HeaderInfo {
    captures: Captures,
}

impl HeaderInfo {
    pub fn new() -> Self {
        HeaderInfo::default()
    }

    /// Trace the standard header and populate the sidecar. Returns the
    /// parsed byte count (the offset at which the table body begins).
    pub fn parse(&mut self, ctx: &mut ViewContext, buf: &[u8], trace: bool) -> usize {
        parse_fields(ctx, "ACPI Table Header", buf, HEADER_DESCRIPTORS, &mut self.captures, trace)
    }

    pub fn length(&self, buf: &[u8]) -> Option<u32> {
        self.captures.read_u32(HDR_LENGTH, buf)
    }

    pub fn revision(&self, buf: &[u8]) -> Option<u8> {
        self.captures.read_u8(HDR_REVISION, buf)
    }

    pub fn signature(&self, buf: &[u8]) -> Option<u32> {
        self.captures.read_u32(HDR_SIGNATURE, buf)
    }
}

/// Read one sub-structure header in no-trace mode through its capture
/// slots. Returns the type tag and declared length, or reports a `parse`
/// error when either capture stayed empty (the stop condition of the
/// sub-structure loop).
pub(crate) fn read_struct_header(
    ctx: &mut ViewContext,
    buf: &[u8],
    descriptors: &[FieldDescriptor],
    kind_slot: CaptureId,
    length_slot: CaptureId,
    offset: usize,
) -> Option<(u8, usize)> {
    let mut captures = Captures::new();
    parse_fields(ctx, "Structure Header", buf, descriptors, &mut captures, false);

    let kind = captures.read_u8(kind_slot, buf);
    let length = captures.bytes(length_slot, buf).and_then(read_uint);
    match (kind, length) {
        (Some(kind), Some(length)) => Some((kind, length as usize)),
        _ => {
            ctx.error(
                ErrorKind::Parse,
                format_args!("structure header at offset 0x{offset:X} could not be read"),
            );
            None
        }
    }
}

/// Shared prologue assertion: a table shorter than the standard header is
/// reported and skipped by dispatchers for header-bearing tables.
pub(crate) fn check_header_fits(ctx: &mut ViewContext, name: &str, buf: &[u8]) -> bool {
    if buf.len() < ACPI_HEADER_LEN {
        ctx.error(
            ErrorKind::Length,
            format_args!("{name}: table length 0x{:X} is below the standard header size", buf.len()),
        );
        return false;
    }
    true
}
