//! MCFG Parser.
//!
//! PCI Express Memory-mapped Configuration Space base address description
//! table: a reserved qword followed by fixed 16-byte allocation records.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use tarnish_acpi::mcfg::{ALLOCATION_LEN, RESERVED_LEN};

use crate::field::{validate_reserved_zero, CaptureId, Captures, FieldDescriptor, FieldFormat};
use crate::parser::parse_fields;
use crate::report::{ErrorKind, ViewContext};
use crate::tables::HeaderInfo;

const RESERVED: &[FieldDescriptor] =
    &[FieldDescriptor::new("Reserved", 8, 0, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0)];

const ALLOC_START_BUS: CaptureId = 0;
const ALLOC_END_BUS: CaptureId = 1;

// Offsets are relative to the start of one allocation record.
const ALLOCATION_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Base Address", 8, 0, FieldFormat::UintHex),
    FieldDescriptor::new("PCI Segment Group Number", 2, 8, FieldFormat::UintDec),
    FieldDescriptor::new("Start Bus Number", 1, 10, FieldFormat::UintHex).with_capture(ALLOC_START_BUS),
    FieldDescriptor::new("End Bus Number", 1, 11, FieldFormat::UintHex).with_capture(ALLOC_END_BUS),
    FieldDescriptor::new("Reserved", 4, 12, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
];

pub fn parse(ctx: &mut ViewContext, buf: &[u8], revision: u8) {
    if !ctx.trace() {
        return;
    }
    if !super::check_header_fits(ctx, "MCFG", buf) {
        return;
    }
    ctx.revision = revision;

    let mut header = HeaderInfo::new();
    let body = header.parse(ctx, buf, true);
    parse_fields(ctx, "MCFG", &buf[body..], RESERVED, &mut Captures::new(), true);

    let allocations = body + RESERVED_LEN;
    if ctx.consistency() && (buf.len() - allocations) % ALLOCATION_LEN != 0 {
        ctx.error(
            ErrorKind::Length,
            format_args!(
                "MCFG: allocation region size 0x{:X} is not a multiple of 0x{ALLOCATION_LEN:X}",
                buf.len() - allocations
            ),
        );
    }

    let mut captures = Captures::new();
    let mut offset = allocations;
    let mut index = 0;
    while offset + ALLOCATION_LEN <= buf.len() {
        ctx.with_indent(|ctx| {
            ctx.item(format_args!("Configuration Space Allocation[{index}] (+0x{offset:X})"));
        });
        let record = &buf[offset..offset + ALLOCATION_LEN];
        ctx.with_indent(|ctx| {
            parse_fields(ctx, "Configuration Space Allocation", record, ALLOCATION_FIELDS, &mut captures, true);
        });

        if ctx.consistency() {
            let start = captures.read_u8(ALLOC_START_BUS, record);
            let end = captures.read_u8(ALLOC_END_BUS, record);
            if let (Some(start), Some(end)) = (start, end) {
                if start > end {
                    ctx.error(
                        ErrorKind::Value,
                        format_args!("MCFG: start bus 0x{start:X} is above end bus 0x{end:X} in allocation [{index}]"),
                    );
                }
            }
        }

        offset += ALLOCATION_LEN;
        index += 1;
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use scroll::{Pwrite, LE};

    use super::*;
    use crate::config::ViewConfig;
    use crate::report::StringSink;
    use crate::tables::test_support::test_header;
    use tarnish_acpi::signature;

    fn mcfg(allocs: &[(u64, u16, u8, u8)]) -> alloc::vec::Vec<u8> {
        let length = 44 + allocs.len() * ALLOCATION_LEN;
        let mut buf = test_header(signature::MCFG, length as u32, 1);
        buf.resize(length, 0);
        let mut offset = 44;
        for (base, segment, start, end) in allocs {
            buf.gwrite_with(*base, &mut offset, LE).unwrap();
            buf.gwrite_with(*segment, &mut offset, LE).unwrap();
            buf.gwrite_with(*start, &mut offset, LE).unwrap();
            buf.gwrite_with(*end, &mut offset, LE).unwrap();
            offset += 4;
        }
        tarnish_acpi::checksum::finalize(&mut buf, 9);
        buf
    }

    #[test]
    fn test_allocations_traced() {
        let buf = mcfg(&[(0xE000_0000, 0, 0, 0xFF), (0xD000_0000, 1, 0x10, 0x2F)]);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, ViewConfig::default());
        parse(&mut ctx, &buf, 1);
        assert_eq!(ctx.error_count(), 0);
        drop(ctx);
        assert!(sink.output().contains("Configuration Space Allocation[1]"));
        assert!(sink.output().contains("0xE0000000"));
    }

    #[test]
    fn test_bus_range_check() {
        let buf = mcfg(&[(0xE000_0000, 0, 0x20, 0x10)]);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, ViewConfig::default());
        parse(&mut ctx, &buf, 1);
        assert_eq!(ctx.error_count_of(ErrorKind::Value), 1);
    }
}
