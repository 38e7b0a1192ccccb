//! MADT Parser.
//!
//! Multiple APIC Description Table, ACPI 6.3 section 5.2.12. The body is a
//! list of interrupt controller structures, each introduced by a one-byte
//! type tag and a one-byte length. Cross-structure rules checked here: at
//! most one GICD, and GICC ACPI Processor UIDs must be unique.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use alloc::vec::Vec;

use scroll::{Pread, LE};

use tarnish_acpi::madt::{self, STRUCTURE_HEADER_LEN};

use crate::arch::{APIC_ARCHES, GIC_ARCHES};
use crate::cross::{all_unique, CrossEntry};
use crate::field::{
    read_uint, validate_equals, validate_reserved_zero, CaptureId, Captures, FieldDescriptor, FieldFormat,
};
use crate::parser::parse_fields;
use crate::registry::{Handler, StructDb, StructInfo};
use crate::report::{ErrorKind, ViewContext};
use crate::tables::{read_struct_header, HeaderInfo};

// Offsets are relative to the end of the standard header.
const MADT_BODY: &[FieldDescriptor] = &[
    FieldDescriptor::new("Local Interrupt Controller Address", 4, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Flags", 4, 4, FieldFormat::UintHex),
];

const STRUCT_KIND: CaptureId = 0;
const STRUCT_LENGTH: CaptureId = 1;

/// The tag-and-length header every interrupt controller structure starts
/// with; parsed in no-trace mode to steer the loop.
const STRUCT_HEADER: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::Hidden).with_capture(STRUCT_KIND),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::Hidden).with_capture(STRUCT_LENGTH),
];

/// The SPE overflow interrupt bytes were reserved space before MADT
/// revision 5 (ACPI 6.3) repurposed them.
fn validate_spe_overflow(ctx: &mut ViewContext, bytes: &[u8], _context: u32) {
    if ctx.revision < 5 && read_uint(bytes) != Some(0) {
        ctx.warn(format_args!("SPE Overflow Interrupt is reserved before MADT revision 5"));
    }
}

fn validate_gic_version(ctx: &mut ViewContext, bytes: &[u8], _context: u32) {
    if let Some(version) = read_uint(bytes) {
        if version > 4 {
            ctx.error(ErrorKind::Value, format_args!("GIC version {version} is not defined"));
        }
    }
}

const LOCAL_APIC_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("ACPI Processor UID", 1, 2, FieldFormat::UintHex),
    FieldDescriptor::new("APIC ID", 1, 3, FieldFormat::UintHex),
    FieldDescriptor::new("Flags", 4, 4, FieldFormat::UintHex),
];

const IO_APIC_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("I/O APIC ID", 1, 2, FieldFormat::UintHex),
    FieldDescriptor::new("Reserved", 1, 3, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("I/O APIC Address", 4, 4, FieldFormat::UintHex),
    FieldDescriptor::new("Global System Interrupt Base", 4, 8, FieldFormat::UintDec),
];

const ISO_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Bus", 1, 2, FieldFormat::UintDec).with_validator(validate_equals, 0),
    FieldDescriptor::new("Source", 1, 3, FieldFormat::UintHex),
    FieldDescriptor::new("Global System Interrupt", 4, 4, FieldFormat::UintDec),
    FieldDescriptor::new("Flags", 2, 8, FieldFormat::UintHex),
];

const NMI_SOURCE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Flags", 2, 2, FieldFormat::UintHex),
    FieldDescriptor::new("Global System Interrupt", 4, 4, FieldFormat::UintDec),
];

const LOCAL_APIC_NMI_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("ACPI Processor UID", 1, 2, FieldFormat::UintHex),
    FieldDescriptor::new("Flags", 2, 3, FieldFormat::UintHex),
    FieldDescriptor::new("Local APIC LINT#", 1, 5, FieldFormat::UintDec),
];

const LOCAL_APIC_OVERRIDE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 2, 2, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Local APIC Address", 8, 4, FieldFormat::UintHex),
];

const IO_SAPIC_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("I/O APIC ID", 1, 2, FieldFormat::UintHex),
    FieldDescriptor::new("Reserved", 1, 3, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Global System Interrupt Base", 4, 4, FieldFormat::UintDec),
    FieldDescriptor::new("I/O SAPIC Address", 8, 8, FieldFormat::UintHex),
];

const LOCAL_SAPIC_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("ACPI Processor ID", 1, 2, FieldFormat::UintHex),
    FieldDescriptor::new("Local SAPIC ID", 1, 3, FieldFormat::UintHex),
    FieldDescriptor::new("Local SAPIC EID", 1, 4, FieldFormat::UintHex),
    FieldDescriptor::new("Reserved", 3, 5, FieldFormat::HexDump).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Flags", 4, 8, FieldFormat::UintHex),
    FieldDescriptor::new("ACPI Processor UID Value", 4, 12, FieldFormat::UintHex),
];

const PLATFORM_INT_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Flags", 2, 2, FieldFormat::UintHex),
    FieldDescriptor::new("Interrupt Type", 1, 4, FieldFormat::UintDec),
    FieldDescriptor::new("Processor ID", 1, 5, FieldFormat::UintHex),
    FieldDescriptor::new("Processor EID", 1, 6, FieldFormat::UintHex),
    FieldDescriptor::new("I/O SAPIC Vector", 1, 7, FieldFormat::UintHex),
    FieldDescriptor::new("Global System Interrupt", 4, 8, FieldFormat::UintDec),
    FieldDescriptor::new("Platform Interrupt Source Flags", 4, 12, FieldFormat::UintHex),
];

const LOCAL_X2APIC_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 2, 2, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("X2APIC ID", 4, 4, FieldFormat::UintHex),
    FieldDescriptor::new("Flags", 4, 8, FieldFormat::UintHex),
    FieldDescriptor::new("ACPI Processor UID", 4, 12, FieldFormat::UintHex),
];

const LOCAL_X2APIC_NMI_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Flags", 2, 2, FieldFormat::UintHex),
    FieldDescriptor::new("ACPI Processor UID", 4, 4, FieldFormat::UintHex),
    FieldDescriptor::new("Local x2APIC LINT#", 1, 8, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 3, 9, FieldFormat::HexDump).with_validator(validate_reserved_zero, 0),
];

const GICC_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 2, 2, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("CPU Interface Number", 4, 4, FieldFormat::UintDec),
    FieldDescriptor::new("ACPI Processor UID", 4, 8, FieldFormat::UintHex),
    FieldDescriptor::new("Flags", 4, 12, FieldFormat::UintHex),
    FieldDescriptor::new("Parking Protocol Version", 4, 16, FieldFormat::UintDec),
    FieldDescriptor::new("Performance Interrupt GSIV", 4, 20, FieldFormat::UintDec),
    FieldDescriptor::new("Parked Address", 8, 24, FieldFormat::UintHex),
    FieldDescriptor::new("Physical Base Address", 8, 32, FieldFormat::UintHex),
    FieldDescriptor::new("GICV", 8, 40, FieldFormat::UintHex),
    FieldDescriptor::new("GICH", 8, 48, FieldFormat::UintHex),
    FieldDescriptor::new("VGIC Maintenance interrupt", 4, 56, FieldFormat::UintDec),
    FieldDescriptor::new("GICR Base Address", 8, 60, FieldFormat::UintHex),
    FieldDescriptor::new("MPIDR", 8, 68, FieldFormat::UintHex),
    FieldDescriptor::new("Processor Power Efficiency Class", 1, 76, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 1, 77, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("SPE Overflow Interrupt", 2, 78, FieldFormat::UintDec).with_validator(validate_spe_overflow, 0),
];

const GICD_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 2, 2, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("GIC ID", 4, 4, FieldFormat::UintDec),
    FieldDescriptor::new("Physical Base Address", 8, 8, FieldFormat::UintHex),
    FieldDescriptor::new("System Vector Base", 4, 16, FieldFormat::UintDec).with_validator(validate_equals, 0),
    FieldDescriptor::new("GIC Version", 1, 20, FieldFormat::UintDec).with_validator(validate_gic_version, 0),
    FieldDescriptor::new("Reserved", 3, 21, FieldFormat::HexDump).with_validator(validate_reserved_zero, 0),
];

const GIC_MSI_FRAME_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 2, 2, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("GIC MSI Frame ID", 4, 4, FieldFormat::UintDec),
    FieldDescriptor::new("Physical Base Address", 8, 8, FieldFormat::UintHex),
    FieldDescriptor::new("Flags", 4, 16, FieldFormat::UintHex),
    FieldDescriptor::new("SPI Count", 2, 20, FieldFormat::UintDec),
    FieldDescriptor::new("SPI Base", 2, 22, FieldFormat::UintDec),
];

const GICR_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 2, 2, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Discovery Range Base Address", 8, 4, FieldFormat::UintHex),
    FieldDescriptor::new("Discovery Range Length", 4, 12, FieldFormat::UintHex),
];

const GIC_ITS_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 2, 2, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("GIC ITS ID", 4, 4, FieldFormat::UintDec),
    FieldDescriptor::new("Physical Base Address", 8, 8, FieldFormat::UintHex),
    FieldDescriptor::new("Reserved", 4, 16, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
];

const ENTRIES: &[StructInfo] = &[
    StructInfo {
        name: "Processor Local APIC",
        kind: madt::LOCAL_APIC,
        arch: APIC_ARCHES,
        min_len: madt::LOCAL_APIC_LEN,
        handler: Handler::Fields(LOCAL_APIC_FIELDS),
    },
    StructInfo {
        name: "I/O APIC",
        kind: madt::IO_APIC,
        arch: APIC_ARCHES,
        min_len: madt::IO_APIC_LEN,
        handler: Handler::Fields(IO_APIC_FIELDS),
    },
    StructInfo {
        name: "Interrupt Source Override",
        kind: madt::INTERRUPT_SOURCE_OVERRIDE,
        arch: APIC_ARCHES,
        min_len: madt::INTERRUPT_SOURCE_OVERRIDE_LEN,
        handler: Handler::Fields(ISO_FIELDS),
    },
    StructInfo {
        name: "NMI Source",
        kind: madt::NMI_SOURCE,
        arch: APIC_ARCHES,
        min_len: madt::NMI_SOURCE_LEN,
        handler: Handler::Fields(NMI_SOURCE_FIELDS),
    },
    StructInfo {
        name: "Local APIC NMI",
        kind: madt::LOCAL_APIC_NMI,
        arch: APIC_ARCHES,
        min_len: madt::LOCAL_APIC_NMI_LEN,
        handler: Handler::Fields(LOCAL_APIC_NMI_FIELDS),
    },
    StructInfo {
        name: "Local APIC Address Override",
        kind: madt::LOCAL_APIC_ADDRESS_OVERRIDE,
        arch: APIC_ARCHES,
        min_len: madt::LOCAL_APIC_ADDRESS_OVERRIDE_LEN,
        handler: Handler::Fields(LOCAL_APIC_OVERRIDE_FIELDS),
    },
    StructInfo {
        name: "I/O SAPIC",
        kind: madt::IO_SAPIC,
        arch: APIC_ARCHES,
        min_len: madt::IO_SAPIC_LEN,
        handler: Handler::Fields(IO_SAPIC_FIELDS),
    },
    StructInfo {
        name: "Local SAPIC",
        kind: madt::LOCAL_SAPIC,
        arch: APIC_ARCHES,
        min_len: madt::LOCAL_SAPIC_MIN_LEN,
        handler: Handler::Fields(LOCAL_SAPIC_FIELDS),
    },
    StructInfo {
        name: "Platform Interrupt Sources",
        kind: madt::PLATFORM_INTERRUPT_SOURCES,
        arch: APIC_ARCHES,
        min_len: madt::PLATFORM_INTERRUPT_SOURCES_LEN,
        handler: Handler::Fields(PLATFORM_INT_FIELDS),
    },
    StructInfo {
        name: "Processor Local x2APIC",
        kind: madt::LOCAL_X2APIC,
        arch: APIC_ARCHES,
        min_len: madt::LOCAL_X2APIC_LEN,
        handler: Handler::Fields(LOCAL_X2APIC_FIELDS),
    },
    StructInfo {
        name: "Local x2APIC NMI",
        kind: madt::LOCAL_X2APIC_NMI,
        arch: APIC_ARCHES,
        min_len: madt::LOCAL_X2APIC_NMI_LEN,
        handler: Handler::Fields(LOCAL_X2APIC_NMI_FIELDS),
    },
    StructInfo {
        name: "GICC",
        kind: madt::GICC,
        arch: GIC_ARCHES,
        min_len: madt::GICC_LEN,
        handler: Handler::Fields(GICC_FIELDS),
    },
    StructInfo {
        name: "GICD",
        kind: madt::GICD,
        arch: GIC_ARCHES,
        min_len: madt::GICD_LEN,
        handler: Handler::Fields(GICD_FIELDS),
    },
    StructInfo {
        name: "GIC MSI Frame",
        kind: madt::GIC_MSI_FRAME,
        arch: GIC_ARCHES,
        min_len: madt::GIC_MSI_FRAME_LEN,
        handler: Handler::Fields(GIC_MSI_FRAME_FIELDS),
    },
    StructInfo {
        name: "GICR",
        kind: madt::GICR,
        arch: GIC_ARCHES,
        min_len: madt::GICR_LEN,
        handler: Handler::Fields(GICR_FIELDS),
    },
    StructInfo {
        name: "GIC ITS",
        kind: madt::GIC_ITS,
        arch: GIC_ARCHES,
        min_len: madt::GIC_ITS_LEN,
        handler: Handler::Fields(GIC_ITS_FIELDS),
    },
];

pub fn structure_db() -> StructDb {
    StructDb::new("Interrupt Controller Structure", ENTRIES)
}

pub fn parse(ctx: &mut ViewContext, buf: &[u8], revision: u8) {
    let mut db = structure_db();
    parse_with_db(ctx, buf, revision, &mut db);
}

pub(crate) fn parse_with_db(ctx: &mut ViewContext, buf: &[u8], revision: u8, db: &mut StructDb) {
    if !ctx.trace() {
        return;
    }
    if !super::check_header_fits(ctx, "MADT", buf) {
        return;
    }
    ctx.revision = revision;
    db.reset_counts();

    let mut header = HeaderInfo::new();
    let body = header.parse(ctx, buf, true);
    parse_fields(ctx, "MADT", &buf[body..], MADT_BODY, &mut Captures::new(), true);

    let mut gicc_uids: Vec<CrossEntry> = Vec::new();
    let mut captures = Captures::new();
    let mut cross: Vec<CrossEntry> = Vec::new();

    let mut offset = body + 8;
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

        // Sample the GICC's ACPI Processor UID for the uniqueness check.
        if kind == madt::GICC {
            if let Ok(uid) = buf.pread_with::<u32>(offset + 8, LE) {
                gicc_uids.push(CrossEntry { bytes: uid.to_le_bytes().to_vec(), kind, offset });
            }
        }

        offset += length;
    }

    if !ctx.consistency() {
        return;
    }

    if db.count(madt::GICD) > 1 {
        ctx.error(ErrorKind::Cross, format_args!("Only one GICD must be present"));
    }
    all_unique(ctx, &gicc_uids, |a, b| a.bytes == b.bytes, "GICC", "ACPI Processor UID");
    db.report_counts(ctx);
}

#[cfg(test)]
mod tests {
    extern crate std;

    use scroll::{Pwrite, LE};

    use super::*;
    use crate::arch::ArchSet;
    use crate::config::ViewConfig;
    use crate::report::StringSink;
    use crate::tables::test_support::test_header;
    use tarnish_acpi::signature;

    fn gicc(uid: u32) -> alloc::vec::Vec<u8> {
        let mut bytes = alloc::vec![0u8; madt::GICC_LEN];
        bytes[0] = madt::GICC;
        bytes[1] = madt::GICC_LEN as u8;
        bytes.pwrite_with(uid, 8, LE).unwrap();
        bytes.pwrite_with(1u32, 12, LE).unwrap(); // enabled
        bytes
    }

    fn gicd() -> alloc::vec::Vec<u8> {
        let mut bytes = alloc::vec![0u8; madt::GICD_LEN];
        bytes[0] = madt::GICD;
        bytes[1] = madt::GICD_LEN as u8;
        bytes.pwrite_with(3u8, 20, LE).unwrap(); // GICv3
        bytes
    }

    fn madt_table(structs: &[&[u8]]) -> alloc::vec::Vec<u8> {
        let body_len: usize = structs.iter().map(|s| s.len()).sum();
        let length = 44 + body_len;
        let mut buf = test_header(signature::MADT, length as u32, 5);
        buf.resize(44, 0);
        for s in structs {
            buf.extend_from_slice(s);
        }
        tarnish_acpi::checksum::finalize(&mut buf, 9);
        buf
    }

    fn aarch64_config() -> ViewConfig {
        ViewConfig { arch: ArchSet::AARCH64, ..Default::default() }
    }

    #[test]
    fn test_one_gicc_one_gicd() {
        let buf = madt_table(&[&gicc(0), &gicd()]);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, aarch64_config());
        let mut db = structure_db();
        parse_with_db(&mut ctx, &buf, 5, &mut db);

        assert_eq!(db.count(madt::GICC), 1);
        assert_eq!(db.count(madt::GICD), 1);
        assert_eq!(ctx.error_count_of(ErrorKind::Cross), 0);
        assert_eq!(ctx.error_count(), 0);
        drop(ctx);
        assert!(sink.output().contains("GICC[0] (+0x2C)"));
        assert!(sink.output().contains("GICD[0] (+0x7C)"));
    }

    #[test]
    fn test_two_gicds_rejected() {
        let buf = madt_table(&[&gicc(0), &gicd(), &gicd()]);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, aarch64_config());
        parse(&mut ctx, &buf, 5);
        assert_eq!(ctx.error_count_of(ErrorKind::Cross), 1);
        drop(ctx);
        assert!(sink.output().contains("Only one GICD must be present"));
    }

    #[test]
    fn test_duplicate_gicc_uids() {
        let buf = madt_table(&[&gicc(7), &gicc(7)]);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, aarch64_config());
        parse(&mut ctx, &buf, 5);
        assert_eq!(ctx.error_count_of(ErrorKind::Cross), 1);
        drop(ctx);
        // Both structure offsets are cited: 44 and 124.
        assert!(sink.output().contains("ACPI Processor UID"));
        assert!(sink.output().contains("+0x2C"));
        assert!(sink.output().contains("+0x7C"));
    }

    #[test]
    fn test_unknown_type_reported() {
        let unknown = [0x42u8, 4, 0, 0];
        let buf = madt_table(&[&unknown]);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, aarch64_config());
        parse(&mut ctx, &buf, 5);
        assert_eq!(ctx.error_count_of(ErrorKind::Value), 1);
        drop(ctx);
        assert!(sink.output().contains("Unknown Interrupt Controller Structure type 0x42"));
    }

    #[test]
    fn test_zero_length_stops_iteration() {
        let broken = [madt::GICD, 0, 0, 0];
        let buf = madt_table(&[&broken, &gicd()]);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, aarch64_config());
        let mut db = structure_db();
        parse_with_db(&mut ctx, &buf, 5, &mut db);
        assert_eq!(ctx.error_count_of(ErrorKind::Length), 1);
        // The iteration stopped: the trailing well-formed GICD was not reached.
        assert_eq!(db.count(madt::GICD), 0);
    }

    #[test]
    fn test_truncated_structure_stops_iteration() {
        // GICC declares 80 bytes but the table ends before that.
        let mut short = gicc(0);
        short.truncate(40);
        let mut buf = madt_table(&[&short]);
        // Patch table length to match actual bytes.
        let len = buf.len() as u32;
        buf.pwrite_with(len, 4, LE).unwrap();
        tarnish_acpi::checksum::finalize(&mut buf, 9);

        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, aarch64_config());
        parse(&mut ctx, &buf, 5);
        assert_eq!(ctx.error_count_of(ErrorKind::Length), 1);
    }

    #[test]
    fn test_gic_structures_on_x64_are_flagged() {
        let buf = madt_table(&[&gicd()]);
        let mut sink = StringSink::new();
        let config = ViewConfig { arch: ArchSet::X64, ..Default::default() };
        let mut ctx = ViewContext::new(&mut sink, config);
        parse(&mut ctx, &buf, 5);
        drop(ctx);
        assert!(sink.output().contains("not valid for the target architecture"));
    }

    #[test]
    fn test_spe_overflow_reserved_before_revision_5() {
        let mut g = gicc(0);
        g.pwrite_with(0x1234u16, 78, LE).unwrap();
        let mut buf = madt_table(&[&g]);
        buf[8] = 4; // table revision 4
        tarnish_acpi::checksum::finalize(&mut buf, 9);

        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, aarch64_config());
        parse(&mut ctx, &buf, 4);
        assert_eq!(ctx.warning_count(), 1);
        drop(ctx);
        assert!(sink.output().contains("reserved before MADT revision 5"));
    }
}
