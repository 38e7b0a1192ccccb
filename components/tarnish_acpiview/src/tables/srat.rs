//! SRAT Parser.
//!
//! System Resource Affinity Table, ACPI 6.3 section 5.2.16. The body is a
//! list of resource allocation structures tagged with a one-byte type and a
//! one-byte length. GIC ITS affinity structures must carry unique ITS ids.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use alloc::vec::Vec;

use scroll::{Pread, LE};

use tarnish_acpi::srat::{self, STRUCTURE_HEADER_LEN};

use crate::arch::{ArchSet, APIC_ARCHES, GIC_ARCHES};
use crate::cross::{all_unique, CrossEntry};
use crate::field::{validate_equals, validate_reserved_zero, CaptureId, Captures, FieldDescriptor, FieldFormat};
use crate::parser::parse_fields;
use crate::registry::{Handler, StructDb, StructInfo};
use crate::report::{ErrorKind, ViewContext};
use crate::tables::{read_struct_header, HeaderInfo};

// Offsets are relative to the end of the standard header. The first
// reserved dword must read 1 for backward compatibility.
const SRAT_BODY: &[FieldDescriptor] = &[
    FieldDescriptor::new("Reserved", 4, 0, FieldFormat::UintDec).with_validator(validate_equals, srat::SRAT_RESERVED_DWORD),
    FieldDescriptor::new("Reserved", 8, 4, FieldFormat::UintHex),
];

const STRUCT_KIND: CaptureId = 0;
const STRUCT_LENGTH: CaptureId = 1;

const STRUCT_HEADER: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::Hidden).with_capture(STRUCT_KIND),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::Hidden).with_capture(STRUCT_LENGTH),
];

const APIC_AFFINITY_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Proximity Domain [7:0]", 1, 2, FieldFormat::UintHex),
    FieldDescriptor::new("APIC ID", 1, 3, FieldFormat::UintHex),
    FieldDescriptor::new("Flags", 4, 4, FieldFormat::UintHex),
    FieldDescriptor::new("Local SAPIC EID", 1, 8, FieldFormat::UintHex),
    FieldDescriptor::new("Proximity Domain [31:8]", 3, 9, FieldFormat::HexDump),
    FieldDescriptor::new("Clock Domain", 4, 12, FieldFormat::UintDec),
];

const MEMORY_AFFINITY_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Proximity Domain", 4, 2, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 2, 6, FieldFormat::UintHex),
    FieldDescriptor::new("Base Address Low", 4, 8, FieldFormat::UintHex),
    FieldDescriptor::new("Base Address High", 4, 12, FieldFormat::UintHex),
    FieldDescriptor::new("Length Low", 4, 16, FieldFormat::UintHex),
    FieldDescriptor::new("Length High", 4, 20, FieldFormat::UintHex),
    FieldDescriptor::new("Reserved", 4, 24, FieldFormat::UintHex),
    FieldDescriptor::new("Flags", 4, 28, FieldFormat::UintHex),
    FieldDescriptor::new("Reserved", 8, 32, FieldFormat::UintHex),
];

const X2APIC_AFFINITY_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 2, 2, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Proximity Domain", 4, 4, FieldFormat::UintDec),
    FieldDescriptor::new("X2APIC ID", 4, 8, FieldFormat::UintHex),
    FieldDescriptor::new("Flags", 4, 12, FieldFormat::UintHex),
    FieldDescriptor::new("Clock Domain", 4, 16, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 4, 20, FieldFormat::UintHex),
];

const GICC_AFFINITY_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Proximity Domain", 4, 2, FieldFormat::UintDec),
    FieldDescriptor::new("ACPI Processor UID", 4, 6, FieldFormat::UintHex),
    FieldDescriptor::new("Flags", 4, 10, FieldFormat::UintHex),
    FieldDescriptor::new("Clock Domain", 4, 14, FieldFormat::UintDec),
];

const GIC_ITS_AFFINITY_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Proximity Domain", 4, 2, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 2, 6, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("ITS ID", 4, 8, FieldFormat::UintDec),
];

const GENERIC_INITIATOR_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 1, 2, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Device Handle Type", 1, 3, FieldFormat::UintDec),
    FieldDescriptor::new("Proximity Domain", 4, 4, FieldFormat::UintDec),
    FieldDescriptor::new("Device Handle", 16, 8, FieldFormat::HexDump),
    FieldDescriptor::new("Flags", 4, 24, FieldFormat::UintHex),
    FieldDescriptor::new("Reserved", 4, 28, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
];

const ENTRIES: &[StructInfo] = &[
    StructInfo {
        name: "Processor Local APIC/SAPIC Affinity",
        kind: srat::PROCESSOR_APIC_AFFINITY,
        arch: APIC_ARCHES,
        min_len: srat::PROCESSOR_APIC_AFFINITY_LEN,
        handler: Handler::Fields(APIC_AFFINITY_FIELDS),
    },
    StructInfo {
        name: "Memory Affinity",
        kind: srat::MEMORY_AFFINITY,
        arch: ArchSet::ALL,
        min_len: srat::MEMORY_AFFINITY_LEN,
        handler: Handler::Fields(MEMORY_AFFINITY_FIELDS),
    },
    StructInfo {
        name: "Processor Local x2APIC Affinity",
        kind: srat::X2APIC_AFFINITY,
        arch: APIC_ARCHES,
        min_len: srat::X2APIC_AFFINITY_LEN,
        handler: Handler::Fields(X2APIC_AFFINITY_FIELDS),
    },
    StructInfo {
        name: "GICC Affinity",
        kind: srat::GICC_AFFINITY,
        arch: GIC_ARCHES,
        min_len: srat::GICC_AFFINITY_LEN,
        handler: Handler::Fields(GICC_AFFINITY_FIELDS),
    },
    StructInfo {
        name: "GIC ITS Affinity",
        kind: srat::GIC_ITS_AFFINITY,
        arch: GIC_ARCHES,
        min_len: srat::GIC_ITS_AFFINITY_LEN,
        handler: Handler::Fields(GIC_ITS_AFFINITY_FIELDS),
    },
    StructInfo {
        name: "Generic Initiator Affinity",
        kind: srat::GENERIC_INITIATOR_AFFINITY,
        arch: ArchSet::ALL,
        min_len: srat::GENERIC_INITIATOR_AFFINITY_LEN,
        handler: Handler::Fields(GENERIC_INITIATOR_FIELDS),
    },
];

pub fn structure_db() -> StructDb {
    StructDb::new("Resource Allocation Structure", ENTRIES)
}

pub fn parse(ctx: &mut ViewContext, buf: &[u8], revision: u8) {
    let mut db = structure_db();
    parse_with_db(ctx, buf, revision, &mut db);
}

pub(crate) fn parse_with_db(ctx: &mut ViewContext, buf: &[u8], revision: u8, db: &mut StructDb) {
    if !ctx.trace() {
        return;
    }
    if !super::check_header_fits(ctx, "SRAT", buf) {
        return;
    }
    ctx.revision = revision;
    db.reset_counts();

    let mut header = HeaderInfo::new();
    let body = header.parse(ctx, buf, true);
    parse_fields(ctx, "SRAT", &buf[body..], SRAT_BODY, &mut Captures::new(), true);

    let mut its_ids: Vec<CrossEntry> = Vec::new();
    let mut captures = Captures::new();
    let mut cross: Vec<CrossEntry> = Vec::new();

    let mut offset = body + 12;
    while offset + STRUCTURE_HEADER_LEN <= buf.len() {
        let Some((kind, length)) =
            read_struct_header(ctx, &buf[offset..], STRUCT_HEADER, STRUCT_KIND, STRUCT_LENGTH, offset)
        else {
            break;
        };
        if !db.member_integrity(ctx, kind, length, offset, buf.len()) {
            break;
        }

        db.parse_struct(ctx, buf, offset, kind, length, &mut captures, &mut cross);

        if kind == srat::GIC_ITS_AFFINITY {
            if let Ok(its_id) = buf.pread_with::<u32>(offset + 8, LE) {
                its_ids.push(CrossEntry { bytes: its_id.to_le_bytes().to_vec(), kind, offset });
            }
        }

        offset += length;
    }

    if !ctx.consistency() {
        return;
    }

    all_unique(ctx, &its_ids, |a, b| a.bytes == b.bytes, "GIC ITS Affinity", "ITS ID");
    db.report_counts(ctx);
}
