//! PPTT Parser.
//!
//! Processor Properties Topology Table, ACPI 6.3 section 5.2.29. Processor
//! hierarchy nodes reference their parents by table offset, caches chain
//! through next-level references, and hierarchy nodes carry private
//! resource references that must land on Cache or ID structures. All three
//! reference families are validated after the walk, with bounded cycle
//! detection on the chains.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use alloc::vec::Vec;

use scroll::{Pread, LE};

use tarnish_acpi::signature::ACPI_HEADER_LEN;

use crate::arch::ArchSet;
use crate::cross::{reference_valid, resource_valid, CrossEntry, RefCheck};
use crate::field::{read_uint, validate_reserved_zero, CaptureId, Captures, FieldDescriptor, FieldFormat};
use crate::parser::parse_fields;
use crate::registry::{Handler, StructDb, StructInfo};
use crate::report::{ErrorKind, ViewContext};
use crate::tables::{read_struct_header, HeaderInfo};

/// Processor topology structure type tags.
pub const PROCESSOR_HIERARCHY: u8 = 0;
pub const CACHE_TYPE: u8 = 1;
pub const ID_TYPE: u8 = 2;

const PROCESSOR_HIERARCHY_MIN_LEN: usize = 20;
const CACHE_TYPE_LEN: usize = 24;
const ID_TYPE_LEN: usize = 30;

/// Processor hierarchy flags, ACPI 6.3 table 5-161.
const FLAG_LEAF_NODE: u32 = 1 << 3;

const STRUCT_KIND: CaptureId = 0;
const STRUCT_LENGTH: CaptureId = 1;

const STRUCT_HEADER: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::Hidden).with_capture(STRUCT_KIND),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::Hidden).with_capture(STRUCT_LENGTH),
];

fn validate_cache_attributes(ctx: &mut ViewContext, bytes: &[u8], _context: u32) {
    if let Some(attributes) = read_uint(bytes) {
        if attributes & !0x1F != 0 {
            ctx.error(
                ErrorKind::Value,
                format_args!("Cache attributes reserved bits must be zero, found 0x{attributes:X}"),
            );
        }
    }
}

const HIERARCHY_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 2, 2, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Flags", 4, 4, FieldFormat::UintHex),
    FieldDescriptor::new("Parent", 4, 8, FieldFormat::UintHex),
    FieldDescriptor::new("ACPI Processor ID", 4, 12, FieldFormat::UintHex),
    FieldDescriptor::new("Number of Private Resources", 4, 16, FieldFormat::UintDec),
];

const CACHE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 2, 2, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Flags", 4, 4, FieldFormat::UintHex),
    FieldDescriptor::new("Next Level of Cache", 4, 8, FieldFormat::UintHex),
    FieldDescriptor::new("Size", 4, 12, FieldFormat::UintDec),
    FieldDescriptor::new("Number of Sets", 4, 16, FieldFormat::UintDec),
    FieldDescriptor::new("Associativity", 1, 20, FieldFormat::UintDec),
    FieldDescriptor::new("Attributes", 1, 21, FieldFormat::UintHex).with_validator(validate_cache_attributes, 0),
    FieldDescriptor::new("Line Size", 2, 22, FieldFormat::UintDec),
];

const ID_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 2, 2, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("VENDOR_ID", 4, 4, FieldFormat::Ascii),
    FieldDescriptor::new("LEVEL_1_ID", 8, 8, FieldFormat::UintHex),
    FieldDescriptor::new("LEVEL_2_ID", 8, 16, FieldFormat::UintHex),
    FieldDescriptor::new("MAJOR_REV", 2, 24, FieldFormat::UintHex),
    FieldDescriptor::new("MINOR_REV", 2, 26, FieldFormat::UintHex),
    FieldDescriptor::new("SPIN_REV", 2, 28, FieldFormat::UintHex),
];

/// Processor hierarchy node: fixed fields, then the inline array of
/// private resource references.
fn parse_hierarchy_node(ctx: &mut ViewContext, bytes: &[u8], offset: usize, _cross: &mut Vec<CrossEntry>) {
    ctx.with_indent(|ctx| {
        parse_fields(ctx, "Processor Hierarchy", bytes, HIERARCHY_FIELDS, &mut Captures::new(), true);

        let count = bytes.pread_with::<u32>(16, LE).unwrap_or(0) as usize;
        let needed = PROCESSOR_HIERARCHY_MIN_LEN + count * 4;
        if needed > bytes.len() {
            ctx.error(
                ErrorKind::Length,
                format_args!(
                    "Processor Hierarchy at +0x{offset:X}: {count} private resources do not fit its length 0x{:X}",
                    bytes.len()
                ),
            );
            return;
        }
        for index in 0..count {
            let resource: u32 = bytes.pread_with(PROCESSOR_HIERARCHY_MIN_LEN + index * 4, LE).unwrap_or(0);
            ctx.info(format_args!("Private Resource[{index}]          : 0x{resource:X}"));
        }
    });
}

const ENTRIES: &[StructInfo] = &[
    StructInfo {
        name: "Processor Hierarchy",
        kind: PROCESSOR_HIERARCHY,
        arch: ArchSet::ALL,
        min_len: PROCESSOR_HIERARCHY_MIN_LEN,
        handler: Handler::Custom(parse_hierarchy_node),
    },
    StructInfo {
        name: "Cache Type",
        kind: CACHE_TYPE,
        arch: ArchSet::ALL,
        min_len: CACHE_TYPE_LEN,
        handler: Handler::Fields(CACHE_FIELDS),
    },
    StructInfo { name: "ID", kind: ID_TYPE, arch: ArchSet::ALL, min_len: ID_TYPE_LEN, handler: Handler::Fields(ID_FIELDS) },
];

pub fn structure_db() -> StructDb {
    StructDb::new("Processor Topology Structure", ENTRIES)
}

fn parent_of(entry: &CrossEntry) -> Option<u32> {
    entry.bytes.pread_with(8, LE).ok()
}

fn next_cache_of(entry: &CrossEntry) -> Option<u32> {
    entry.bytes.pread_with(8, LE).ok()
}

fn is_leaf(entry: &CrossEntry) -> bool {
    entry.bytes.pread_with::<u32>(4, LE).map(|flags| flags & FLAG_LEAF_NODE != 0).unwrap_or(false)
}

pub fn parse(ctx: &mut ViewContext, buf: &[u8], revision: u8) {
    let mut db = structure_db();
    parse_with_db(ctx, buf, revision, &mut db);
}

pub(crate) fn parse_with_db(ctx: &mut ViewContext, buf: &[u8], revision: u8, db: &mut StructDb) {
    if !ctx.trace() {
        return;
    }
    if !super::check_header_fits(ctx, "PPTT", buf) {
        return;
    }
    ctx.revision = revision;
    db.reset_counts();

    let mut header = HeaderInfo::new();
    header.parse(ctx, buf, true);

    // The cross-reference list carries one entry per structure, holding an
    // owned copy of the whole structure so the post-loop checks can read
    // flags and chain fields.
    let mut nodes: Vec<CrossEntry> = Vec::new();
    let mut captures = Captures::new();
    let mut cross: Vec<CrossEntry> = Vec::new();

    let mut offset = ACPI_HEADER_LEN;
    while offset + 2 <= buf.len() {
        let Some((kind, length)) =
            read_struct_header(ctx, &buf[offset..], STRUCT_HEADER, STRUCT_KIND, STRUCT_LENGTH, offset)
        else {
            break;
        };
        if !db.member_integrity(ctx, kind, length, offset, buf.len()) {
            break;
        }

        db.parse_struct(ctx, buf, offset, kind, length, &mut captures, &mut cross);
        nodes.push(CrossEntry { bytes: buf[offset..offset + length].to_vec(), kind, offset });

        offset += length;
    }

    if !ctx.consistency() {
        return;
    }

    let hierarchy_check = RefCheck {
        kind: PROCESSOR_HIERARCHY,
        kind_name: "Processor Hierarchy",
        next: parent_of,
        reject: Some((is_leaf, "a leaf processor node")),
    };
    let cache_check =
        RefCheck { kind: CACHE_TYPE, kind_name: "Cache Type", next: next_cache_of, reject: None };

    // One reference-loop report per table is enough: once a cycle exists,
    // every chain that feeds it would report again.
    let mut loop_reported = false;
    for node in &nodes {
        match node.kind {
            PROCESSOR_HIERARCHY => {
                let parent = parent_of(node).unwrap_or(0);
                if !loop_reported {
                    let before = ctx.error_count_of(ErrorKind::Cross);
                    if !reference_valid(ctx, &nodes, parent, &hierarchy_check) {
                        loop_reported = ctx.error_count_of(ErrorKind::Cross) > before;
                    }
                }
                let count = node.bytes.pread_with::<u32>(16, LE).unwrap_or(0) as usize;
                for index in 0..count {
                    let Ok(resource) = node.bytes.pread_with::<u32>(20 + index * 4, LE) else {
                        break;
                    };
                    resource_valid(ctx, &nodes, resource, &[CACHE_TYPE, ID_TYPE], "a Cache or ID structure");
                }
            }
            CACHE_TYPE => {
                if !loop_reported {
                    let next = next_cache_of(node).unwrap_or(0);
                    let before = ctx.error_count_of(ErrorKind::Cross);
                    if !reference_valid(ctx, &nodes, next, &cache_check) {
                        loop_reported = ctx.error_count_of(ErrorKind::Cross) > before;
                    }
                }
            }
            _ => {}
        }
    }

    db.report_counts(ctx);
}
