//! IORT Parser.
//!
//! IO Remapping Table, per the IO Remapping Table Platform Design Document,
//! revision D. The body is a counted array of nodes, each carrying a
//! 16-byte header (type, 16-bit length, revision, reserved, id-mapping
//! count, id-mapping array reference) and a kind-specific body. ID mappings
//! route requester ids between nodes by table offset; every output
//! reference must land on an ITS group or SMMU node within the table.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use alloc::vec::Vec;

use scroll::{Pread, LE};

use tarnish_acpi::iort::{self, ID_MAPPING_LEN, NODE_HEADER_LEN, SMMU_INTERRUPT_LEN};

use crate::arch::GIC_ARCHES;
use crate::cross::{find_entry, resource_valid, CrossEntry};
use crate::field::{validate_reserved_zero, CaptureId, Captures, FieldDescriptor, FieldFormat};
use crate::parser::parse_fields;
use crate::registry::{Handler, StructDb, StructInfo};
use crate::report::{ErrorKind, ViewContext};
use crate::tables::{read_struct_header, HeaderInfo};

const NODE_COUNT: CaptureId = 0;
const NODE_ARRAY_OFFSET: CaptureId = 1;

// Offsets are relative to the end of the standard header.
const IORT_BODY: &[FieldDescriptor] = &[
    FieldDescriptor::new("Number of IORT Nodes", 4, 0, FieldFormat::UintDec).with_capture(NODE_COUNT),
    FieldDescriptor::new("Offset to Array of IORT Nodes", 4, 4, FieldFormat::UintHex).with_capture(NODE_ARRAY_OFFSET),
    FieldDescriptor::new("Reserved", 4, 8, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
];

const STRUCT_KIND: CaptureId = 0;
const STRUCT_LENGTH: CaptureId = 1;

/// IORT nodes carry a one-byte type and a two-byte length.
const STRUCT_HEADER: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::Hidden).with_capture(STRUCT_KIND),
    FieldDescriptor::new("Length", 2, 1, FieldFormat::Hidden).with_capture(STRUCT_LENGTH),
];

const ITS_GROUP_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintDec),
    FieldDescriptor::new("Length", 2, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Revision", 1, 3, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 4, 4, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Number of ID Mappings", 4, 8, FieldFormat::UintDec),
    FieldDescriptor::new("Reference to ID Array", 4, 12, FieldFormat::UintHex),
    FieldDescriptor::new("Number of ITS Identifiers", 4, 16, FieldFormat::UintDec),
];

const NAMED_COMPONENT_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintDec),
    FieldDescriptor::new("Length", 2, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Revision", 1, 3, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 4, 4, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Number of ID Mappings", 4, 8, FieldFormat::UintDec),
    FieldDescriptor::new("Reference to ID Array", 4, 12, FieldFormat::UintHex),
    FieldDescriptor::new("Node Flags", 4, 16, FieldFormat::UintHex),
    FieldDescriptor::new("Cache Coherent", 4, 20, FieldFormat::UintHex),
    FieldDescriptor::new("Allocation Hints", 1, 24, FieldFormat::UintHex),
    FieldDescriptor::new("Reserved", 2, 25, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Memory Access Flags", 1, 27, FieldFormat::UintHex),
    FieldDescriptor::new("Device Memory Address Size Limit", 1, 28, FieldFormat::UintDec),
];

const ROOT_COMPLEX_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintDec),
    FieldDescriptor::new("Length", 2, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Revision", 1, 3, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 4, 4, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Number of ID Mappings", 4, 8, FieldFormat::UintDec),
    FieldDescriptor::new("Reference to ID Array", 4, 12, FieldFormat::UintHex),
    FieldDescriptor::new("Cache Coherent", 4, 16, FieldFormat::UintHex),
    FieldDescriptor::new("Allocation Hints", 1, 20, FieldFormat::UintHex),
    FieldDescriptor::new("Reserved", 2, 21, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Memory Access Flags", 1, 23, FieldFormat::UintHex),
    FieldDescriptor::new("ATS Attribute", 4, 24, FieldFormat::UintHex),
    FieldDescriptor::new("PCI Segment Number", 4, 28, FieldFormat::UintDec),
    FieldDescriptor::new("Memory Address Size Limit", 1, 32, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 3, 33, FieldFormat::HexDump).with_validator(validate_reserved_zero, 0),
];

const SMMU_V1_V2_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintDec),
    FieldDescriptor::new("Length", 2, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Revision", 1, 3, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 4, 4, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Number of ID Mappings", 4, 8, FieldFormat::UintDec),
    FieldDescriptor::new("Reference to ID Array", 4, 12, FieldFormat::UintHex),
    FieldDescriptor::new("Base Address", 8, 16, FieldFormat::UintHex),
    FieldDescriptor::new("Span", 8, 24, FieldFormat::UintHex),
    FieldDescriptor::new("Model", 4, 32, FieldFormat::UintDec),
    FieldDescriptor::new("Flags", 4, 36, FieldFormat::UintHex),
    FieldDescriptor::new("Global Interrupt Array Reference", 4, 40, FieldFormat::UintHex),
    FieldDescriptor::new("Number of Context Interrupts", 4, 44, FieldFormat::UintDec),
    FieldDescriptor::new("Context Interrupt Array Reference", 4, 48, FieldFormat::UintHex),
    FieldDescriptor::new("Number of PMU Interrupts", 4, 52, FieldFormat::UintDec),
    FieldDescriptor::new("PMU Interrupt Array Reference", 4, 56, FieldFormat::UintHex),
    FieldDescriptor::new("SMMU_NSgIrpt", 4, 60, FieldFormat::UintDec),
    FieldDescriptor::new("SMMU_NSgIrpt Flags", 4, 64, FieldFormat::UintHex),
    FieldDescriptor::new("SMMU_NSgCfgIrpt", 4, 68, FieldFormat::UintDec),
    FieldDescriptor::new("SMMU_NSgCfgIrpt Flags", 4, 72, FieldFormat::UintHex),
];

const SMMU_V3_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintDec),
    FieldDescriptor::new("Length", 2, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Revision", 1, 3, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 4, 4, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Number of ID Mappings", 4, 8, FieldFormat::UintDec),
    FieldDescriptor::new("Reference to ID Array", 4, 12, FieldFormat::UintHex),
    FieldDescriptor::new("Base Address", 8, 16, FieldFormat::UintHex),
    FieldDescriptor::new("Flags", 4, 24, FieldFormat::UintHex),
    FieldDescriptor::new("Reserved", 4, 28, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("VATOS Address", 8, 32, FieldFormat::UintHex),
    FieldDescriptor::new("Model", 4, 40, FieldFormat::UintDec),
    FieldDescriptor::new("Event GSIV", 4, 44, FieldFormat::UintDec),
    FieldDescriptor::new("PRI GSIV", 4, 48, FieldFormat::UintDec),
    FieldDescriptor::new("GERR GSIV", 4, 52, FieldFormat::UintDec),
    FieldDescriptor::new("Sync GSIV", 4, 56, FieldFormat::UintDec),
    FieldDescriptor::new("Proximity Domain", 4, 60, FieldFormat::UintDec),
    FieldDescriptor::new("Device ID Mapping Index", 4, 64, FieldFormat::UintDec),
];

const PMCG_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintDec),
    FieldDescriptor::new("Length", 2, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Revision", 1, 3, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 4, 4, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Number of ID Mappings", 4, 8, FieldFormat::UintDec),
    FieldDescriptor::new("Reference to ID Array", 4, 12, FieldFormat::UintHex),
    FieldDescriptor::new("Page 0 Base Address", 8, 16, FieldFormat::UintHex),
    FieldDescriptor::new("Overflow Interrupt GSIV", 4, 24, FieldFormat::UintDec),
    FieldDescriptor::new("Node Reference", 4, 28, FieldFormat::UintHex),
    FieldDescriptor::new("Page 1 Base Address", 8, 32, FieldFormat::UintHex),
];

const ID_MAPPING_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Input Base", 4, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Number of IDs", 4, 4, FieldFormat::UintDec),
    FieldDescriptor::new("Output Base", 4, 8, FieldFormat::UintHex),
    FieldDescriptor::new("Output Reference", 4, 12, FieldFormat::UintHex),
    FieldDescriptor::new("Flags", 4, 16, FieldFormat::UintHex),
];

/// Trace the node's id-mapping array. Bounds are validated by the
/// dispatcher, so a malformed array is silently truncated here.
fn dump_id_mappings(ctx: &mut ViewContext, bytes: &[u8], offset: usize) {
    let count = bytes.pread_with::<u32>(8, LE).unwrap_or(0) as usize;
    let array = bytes.pread_with::<u32>(12, LE).unwrap_or(0) as usize;
    for index in 0..count {
        let start = array + index * ID_MAPPING_LEN;
        let Some(mapping) = bytes.get(start..start + ID_MAPPING_LEN) else {
            break;
        };
        ctx.item(format_args!("ID Mapping[{index}] (+0x{:X})", offset + start));
        parse_fields(ctx, "ID Mapping", mapping, ID_MAPPING_FIELDS, &mut Captures::new(), true);
    }
}

fn parse_its_group(ctx: &mut ViewContext, bytes: &[u8], offset: usize, _cross: &mut Vec<CrossEntry>) {
    ctx.with_indent(|ctx| {
        parse_fields(ctx, "ITS Group", bytes, ITS_GROUP_FIELDS, &mut Captures::new(), true);
        let count = bytes.pread_with::<u32>(16, LE).unwrap_or(0) as usize;
        if iort::ITS_GROUP_NODE_LEN + count * 4 > bytes.len() {
            ctx.error(
                ErrorKind::Length,
                format_args!("ITS group at +0x{offset:X}: {count} identifiers exceed the node length"),
            );
            return;
        }
        for index in 0..count {
            let id: u32 = bytes.pread_with(iort::ITS_GROUP_NODE_LEN + index * 4, LE).unwrap_or(0);
            ctx.info(format_args!("GIC ITS Identifier[{index}]       : {id}"));
        }
        dump_id_mappings(ctx, bytes, offset);
    });
}

fn parse_named_component(ctx: &mut ViewContext, bytes: &[u8], offset: usize, _cross: &mut Vec<CrossEntry>) {
    ctx.with_indent(|ctx| {
        parse_fields(ctx, "Named Component", bytes, NAMED_COMPONENT_FIELDS, &mut Captures::new(), true);
        // Null-terminated device object name, padded to a 4-byte boundary.
        let name_bytes = &bytes[iort::NAMED_COMPONENT_NODE_LEN.min(bytes.len())..];
        let end = name_bytes.iter().position(|b| *b == 0).unwrap_or(name_bytes.len());
        let mut name = alloc::string::String::new();
        for b in &name_bytes[..end] {
            name.push(if b.is_ascii_graphic() { *b as char } else { '.' });
        }
        ctx.info(format_args!("{:<28} : {name}", "Device Object Name"));
        dump_id_mappings(ctx, bytes, offset);
    });
}

fn parse_root_complex(ctx: &mut ViewContext, bytes: &[u8], offset: usize, _cross: &mut Vec<CrossEntry>) {
    ctx.with_indent(|ctx| {
        parse_fields(ctx, "Root Complex", bytes, ROOT_COMPLEX_FIELDS, &mut Captures::new(), true);
        dump_id_mappings(ctx, bytes, offset);
    });
}

fn parse_smmu_v1_v2(ctx: &mut ViewContext, bytes: &[u8], offset: usize, _cross: &mut Vec<CrossEntry>) {
    ctx.with_indent(|ctx| {
        parse_fields(ctx, "SMMUv1/v2", bytes, SMMU_V1_V2_FIELDS, &mut Captures::new(), true);

        // Context and PMU interrupt arrays: node-relative (reference, count)
        // pairs of GSIV/flags dwords.
        for (what, count_at, array_at) in [("Context Interrupt", 44usize, 48usize), ("PMU Interrupt", 52, 56)] {
            let count = bytes.pread_with::<u32>(count_at, LE).unwrap_or(0) as usize;
            let array = bytes.pread_with::<u32>(array_at, LE).unwrap_or(0) as usize;
            if count == 0 {
                continue;
            }
            if array + count * SMMU_INTERRUPT_LEN > bytes.len() {
                ctx.error(
                    ErrorKind::Length,
                    format_args!("SMMUv1/v2 at +0x{offset:X}: {what} array exceeds the node length"),
                );
                continue;
            }
            for index in 0..count {
                let gsiv: u32 = bytes.pread_with(array + index * SMMU_INTERRUPT_LEN, LE).unwrap_or(0);
                let flags: u32 = bytes.pread_with(array + index * SMMU_INTERRUPT_LEN + 4, LE).unwrap_or(0);
                ctx.info(format_args!("{what}[{index}] : GSIV {gsiv}, Flags 0x{flags:X}"));
            }
        }
        dump_id_mappings(ctx, bytes, offset);
    });
}

fn parse_smmu_v3(ctx: &mut ViewContext, bytes: &[u8], offset: usize, _cross: &mut Vec<CrossEntry>) {
    ctx.with_indent(|ctx| {
        parse_fields(ctx, "SMMUv3", bytes, SMMU_V3_FIELDS, &mut Captures::new(), true);
        dump_id_mappings(ctx, bytes, offset);
    });
}

fn parse_pmcg(ctx: &mut ViewContext, bytes: &[u8], offset: usize, _cross: &mut Vec<CrossEntry>) {
    ctx.with_indent(|ctx| {
        parse_fields(ctx, "PMCG", bytes, PMCG_FIELDS, &mut Captures::new(), true);
        dump_id_mappings(ctx, bytes, offset);
    });
}

const ENTRIES: &[StructInfo] = &[
    StructInfo {
        name: "ITS Group",
        kind: iort::ITS_GROUP,
        arch: GIC_ARCHES,
        min_len: iort::ITS_GROUP_NODE_LEN,
        handler: Handler::Custom(parse_its_group),
    },
    StructInfo {
        name: "Named Component",
        kind: iort::NAMED_COMPONENT,
        arch: GIC_ARCHES,
        min_len: iort::NAMED_COMPONENT_NODE_LEN,
        handler: Handler::Custom(parse_named_component),
    },
    StructInfo {
        name: "Root Complex",
        kind: iort::ROOT_COMPLEX,
        arch: GIC_ARCHES,
        min_len: iort::ROOT_COMPLEX_NODE_LEN,
        handler: Handler::Custom(parse_root_complex),
    },
    StructInfo {
        name: "SMMUv1/v2",
        kind: iort::SMMU_V1_V2,
        arch: GIC_ARCHES,
        min_len: iort::SMMU_V1_V2_NODE_LEN,
        handler: Handler::Custom(parse_smmu_v1_v2),
    },
    StructInfo {
        name: "SMMUv3",
        kind: iort::SMMU_V3,
        arch: GIC_ARCHES,
        min_len: iort::SMMU_V3_NODE_LEN,
        handler: Handler::Custom(parse_smmu_v3),
    },
    StructInfo {
        name: "PMCG",
        kind: iort::PMCG,
        arch: GIC_ARCHES,
        min_len: iort::PMCG_NODE_LEN,
        handler: Handler::Custom(parse_pmcg),
    },
];

pub fn structure_db() -> StructDb {
    StructDb::new("IORT Node", ENTRIES)
}

pub fn parse(ctx: &mut ViewContext, buf: &[u8], revision: u8) {
    let mut db = structure_db();
    parse_with_db(ctx, buf, revision, &mut db);
}

pub(crate) fn parse_with_db(ctx: &mut ViewContext, buf: &[u8], revision: u8, db: &mut StructDb) {
    if !ctx.trace() {
        return;
    }
    if !super::check_header_fits(ctx, "IORT", buf) {
        return;
    }
    ctx.revision = revision;
    db.reset_counts();

    let mut header = HeaderInfo::new();
    let body = header.parse(ctx, buf, true);
    let body_buf = &buf[body..];
    let mut body_captures = Captures::new();
    parse_fields(ctx, "IORT", body_buf, IORT_BODY, &mut body_captures, true);

    let declared_nodes = body_captures.read_u32(NODE_COUNT, body_buf).unwrap_or(0) as usize;
    let node_array = body_captures.read_u32(NODE_ARRAY_OFFSET, body_buf).unwrap_or(0) as usize;
    if declared_nodes == 0 {
        return;
    }
    if node_array < body || node_array >= buf.len() {
        if ctx.consistency() {
            ctx.error(ErrorKind::Length, format_args!("IORT: node array offset 0x{node_array:X} is outside the table"));
        }
        return;
    }

    let mut nodes: Vec<CrossEntry> = Vec::new();
    let mut id_refs: Vec<u32> = Vec::new();
    let mut node_refs: Vec<(usize, u32)> = Vec::new();
    let mut captures = Captures::new();
    let mut cross: Vec<CrossEntry> = Vec::new();

    let mut walked = 0usize;
    let mut offset = node_array;
    while walked < declared_nodes && offset + 3 <= buf.len() {
        let Some((kind, length)) =
            read_struct_header(ctx, &buf[offset..], STRUCT_HEADER, STRUCT_KIND, STRUCT_LENGTH, offset)
        else {
            break;
        };
        if !db.member_integrity(ctx, kind, length, offset, buf.len()) {
            break;
        }

        db.parse_struct(ctx, buf, offset, kind, length, &mut captures, &mut cross);
        nodes.push(CrossEntry { bytes: buf[offset..offset + NODE_HEADER_LEN.min(length)].to_vec(), kind, offset });

        // ID mapping array: bounds per the node's own length, references
        // collected for the post-loop check.
        let map_count = buf.pread_with::<u32>(offset + 8, LE).unwrap_or(0) as usize;
        let map_array = buf.pread_with::<u32>(offset + 12, LE).unwrap_or(0) as usize;
        if map_count > 0 {
            if map_array + map_count * ID_MAPPING_LEN > length {
                if ctx.consistency() {
                    ctx.error(
                        ErrorKind::Length,
                        format_args!(
                            "IORT node at +0x{offset:X}: {map_count} id mappings at node offset 0x{map_array:X} exceed its length 0x{length:X}"
                        ),
                    );
                }
            } else {
                for index in 0..map_count {
                    let mapping = offset + map_array + index * ID_MAPPING_LEN;
                    if let Ok(reference) = buf.pread_with::<u32>(mapping + 12, LE) {
                        id_refs.push(reference);
                    }
                }
            }
        }
        if kind == iort::PMCG {
            if let Ok(reference) = buf.pread_with::<u32>(offset + 28, LE) {
                node_refs.push((offset + 28, reference));
            }
        }

        offset += length;
        walked += 1;
    }

    if !ctx.consistency() {
        return;
    }

    if walked != declared_nodes {
        ctx.error(
            ErrorKind::Value,
            format_args!("IORT: node count is {declared_nodes} but {walked} nodes were walked"),
        );
    }
    for reference in &id_refs {
        resource_valid(ctx, &nodes, *reference, &[iort::ITS_GROUP, iort::SMMU_V1_V2, iort::SMMU_V3], "an ITS Group or SMMU node");
    }
    for (source, reference) in &node_refs {
        if *reference != 0 && find_entry(&nodes, *reference).is_none() {
            ctx.error(
                ErrorKind::Cross,
                format_args!("PMCG node reference at +0x{source:X} targets no IORT node (0x{reference:X})"),
            );
        }
    }
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

    fn node_header(bytes: &mut [u8], kind: u8, mappings: u32, map_array: u32) {
        bytes[0] = kind;
        bytes.pwrite_with(bytes.len() as u16, 1, LE).unwrap();
        bytes.pwrite_with(mappings, 8, LE).unwrap();
        bytes.pwrite_with(map_array, 12, LE).unwrap();
    }

    fn its_group(ids: &[u32]) -> alloc::vec::Vec<u8> {
        let length = iort::ITS_GROUP_NODE_LEN + ids.len() * 4;
        let mut bytes = alloc::vec![0u8; length];
        node_header(&mut bytes, iort::ITS_GROUP, 0, 0);
        bytes.pwrite_with(ids.len() as u32, 16, LE).unwrap();
        for (i, id) in ids.iter().enumerate() {
            bytes.pwrite_with(*id, iort::ITS_GROUP_NODE_LEN + i * 4, LE).unwrap();
        }
        bytes
    }

    fn root_complex(output_reference: u32) -> alloc::vec::Vec<u8> {
        let length = iort::ROOT_COMPLEX_NODE_LEN + ID_MAPPING_LEN;
        let mut bytes = alloc::vec![0u8; length];
        node_header(&mut bytes, iort::ROOT_COMPLEX, 1, iort::ROOT_COMPLEX_NODE_LEN as u32);
        // One id mapping covering the whole requester id space.
        let map = iort::ROOT_COMPLEX_NODE_LEN;
        bytes.pwrite_with(0u32, map, LE).unwrap();
        bytes.pwrite_with(0x10000u32, map + 4, LE).unwrap();
        bytes.pwrite_with(0u32, map + 8, LE).unwrap();
        bytes.pwrite_with(output_reference, map + 12, LE).unwrap();
        bytes
    }

    fn iort_table(nodes: &[&[u8]]) -> alloc::vec::Vec<u8> {
        let body_len: usize = nodes.iter().map(|n| n.len()).sum();
        let length = 48 + body_len;
        let mut buf = test_header(signature::IORT, length as u32, 0);
        buf.resize(48, 0);
        buf.pwrite_with(nodes.len() as u32, 36, LE).unwrap();
        buf.pwrite_with(48u32, 40, LE).unwrap();
        for n in nodes {
            buf.extend_from_slice(n);
        }
        tarnish_acpi::checksum::finalize(&mut buf, 9);
        buf
    }

    fn aarch64_config() -> ViewConfig {
        ViewConfig { arch: ArchSet::AARCH64, ..Default::default() }
    }

    #[test]
    fn test_its_group_and_root_complex() {
        // ITS group at 48 (28 bytes), root complex at 76 referencing it.
        let its = its_group(&[1, 2]);
        let rc = root_complex(48);
        let buf = iort_table(&[&its, &rc]);

        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, aarch64_config());
        let mut db = structure_db();
        parse_with_db(&mut ctx, &buf, 0, &mut db);
        assert_eq!(db.count(iort::ITS_GROUP), 1);
        assert_eq!(db.count(iort::ROOT_COMPLEX), 1);
        assert_eq!(ctx.error_count(), 0);
        drop(ctx);
        assert!(sink.output().contains("GIC ITS Identifier[1]"));
        assert!(sink.output().contains("ID Mapping[0]"));
        assert!(sink.output().contains("Output Reference"));
    }

    #[test]
    fn test_dangling_output_reference() {
        let rc = root_complex(0x200);
        let buf = iort_table(&[&rc]);

        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, aarch64_config());
        parse(&mut ctx, &buf, 0);
        assert_eq!(ctx.error_count_of(ErrorKind::Cross), 1);
    }

    #[test]
    fn test_output_reference_to_wrong_kind() {
        // Root complex at 48 whose mapping references the second root
        // complex at 104: not an ITS group or SMMU.
        let rc_a = root_complex(104);
        let rc_b = root_complex(48);
        let buf = iort_table(&[&rc_a, &rc_b]);

        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, aarch64_config());
        parse(&mut ctx, &buf, 0);
        // Both mappings reference a root complex.
        assert_eq!(ctx.error_count_of(ErrorKind::Cross), 2);
    }

    #[test]
    fn test_id_mapping_array_overflow() {
        let mut rc = root_complex(48);
        // Claim 4 mappings; the node only holds one.
        rc.pwrite_with(4u32, 8, LE).unwrap();
        let its = its_group(&[1]);
        let buf = iort_table(&[&its, &rc]);

        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, aarch64_config());
        parse(&mut ctx, &buf, 0);
        assert_eq!(ctx.error_count_of(ErrorKind::Length), 1);
    }

    #[test]
    fn test_node_count_mismatch() {
        let its = its_group(&[1]);
        let mut buf = iort_table(&[&its]);
        buf.pwrite_with(3u32, 36, LE).unwrap();
        tarnish_acpi::checksum::finalize(&mut buf, 9);

        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, aarch64_config());
        parse(&mut ctx, &buf, 0);
        assert_eq!(ctx.error_count_of(ErrorKind::Value), 1);
    }
}
