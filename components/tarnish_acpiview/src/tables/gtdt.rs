//! GTDT Parser.
//!
//! Generic Timer Description Table, ACPI 6.3 section 5.2.24. A fixed block
//! of per-exception-level timer interrupts, then a counted array of
//! platform timer structures (GT blocks and SBSA watchdogs) whose headers
//! carry a one-byte type and a two-byte length.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use alloc::vec::Vec;

use crate::arch::GIC_ARCHES;
use crate::cross::CrossEntry;
use crate::field::{read_uint, validate_reserved_zero, CaptureId, Captures, FieldDescriptor, FieldFormat};
use crate::parser::parse_fields;
use crate::registry::{Handler, StructDb, StructInfo};
use crate::report::{ErrorKind, ViewContext};
use crate::tables::{read_struct_header, HeaderInfo};

/// Platform timer structure type tags.
const GT_BLOCK: u8 = 0;
const SBSA_WATCHDOG: u8 = 1;

const GT_BLOCK_MIN_LEN: usize = 20;
const GT_FRAME_LEN: usize = 40;
const SBSA_WATCHDOG_LEN: usize = 28;

/// A GT block carries at most eight timer frames.
const GT_BLOCK_MAX_FRAMES: u64 = 8;

const PLATFORM_TIMER_COUNT: CaptureId = 0;
const PLATFORM_TIMER_OFFSET: CaptureId = 1;

// Offsets are relative to the end of the standard header.
const GTDT_BODY: &[FieldDescriptor] = &[
    FieldDescriptor::new("CntControlBase Physical Address", 8, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Reserved", 4, 8, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Secure EL1 Timer GSIV", 4, 12, FieldFormat::UintDec),
    FieldDescriptor::new("Secure EL1 Timer Flags", 4, 16, FieldFormat::UintHex),
    FieldDescriptor::new("Non-Secure EL1 Timer GSIV", 4, 20, FieldFormat::UintDec),
    FieldDescriptor::new("Non-Secure EL1 Timer Flags", 4, 24, FieldFormat::UintHex),
    FieldDescriptor::new("Virtual EL1 Timer GSIV", 4, 28, FieldFormat::UintDec),
    FieldDescriptor::new("Virtual EL1 Timer Flags", 4, 32, FieldFormat::UintHex),
    FieldDescriptor::new("EL2 Timer GSIV", 4, 36, FieldFormat::UintDec),
    FieldDescriptor::new("EL2 Timer Flags", 4, 40, FieldFormat::UintHex),
    FieldDescriptor::new("CntReadBase Physical Address", 8, 44, FieldFormat::UintHex),
    FieldDescriptor::new("Platform Timer Count", 4, 52, FieldFormat::UintDec).with_capture(PLATFORM_TIMER_COUNT),
    FieldDescriptor::new("Platform Timer Offset", 4, 56, FieldFormat::UintHex).with_capture(PLATFORM_TIMER_OFFSET),
    FieldDescriptor::new("Virtual EL2 Timer GSIV", 4, 60, FieldFormat::UintDec),
    FieldDescriptor::new("Virtual EL2 Timer Flags", 4, 64, FieldFormat::UintHex),
];

const STRUCT_KIND: CaptureId = 0;
const STRUCT_LENGTH: CaptureId = 1;

/// Platform timer structures use a one-byte type, a two-byte length, and a
/// reserved byte.
const STRUCT_HEADER: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::Hidden).with_capture(STRUCT_KIND),
    FieldDescriptor::new("Length", 2, 1, FieldFormat::Hidden).with_capture(STRUCT_LENGTH),
    FieldDescriptor::new("Reserved", 1, 3, FieldFormat::Hidden),
];

fn validate_frame_count(ctx: &mut ViewContext, bytes: &[u8], _context: u32) {
    if let Some(count) = read_uint(bytes) {
        if count > GT_BLOCK_MAX_FRAMES {
            ctx.error(ErrorKind::Value, format_args!("GT block timer count {count} exceeds {GT_BLOCK_MAX_FRAMES}"));
        }
    }
}

fn validate_frame_number(ctx: &mut ViewContext, bytes: &[u8], _context: u32) {
    if let Some(number) = read_uint(bytes) {
        if number >= GT_BLOCK_MAX_FRAMES {
            ctx.error(ErrorKind::Value, format_args!("GT frame number {number} must be below {GT_BLOCK_MAX_FRAMES}"));
        }
    }
}

const GT_BLOCK_TIMER_COUNT: CaptureId = 2;
const GT_BLOCK_TIMER_OFFSET: CaptureId = 3;

const GT_BLOCK_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 2, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 1, 3, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("GT Block Physical Address", 8, 4, FieldFormat::UintHex),
    FieldDescriptor::new("GT Block Timer Count", 4, 12, FieldFormat::UintDec)
        .with_capture(GT_BLOCK_TIMER_COUNT)
        .with_validator(validate_frame_count, 0),
    FieldDescriptor::new("GT Block Timer Offset", 4, 16, FieldFormat::UintHex).with_capture(GT_BLOCK_TIMER_OFFSET),
];

const GT_FRAME_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("GT Frame Number", 1, 0, FieldFormat::UintDec).with_validator(validate_frame_number, 0),
    FieldDescriptor::new("Reserved", 3, 1, FieldFormat::HexDump).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("CntBaseX Physical Address", 8, 4, FieldFormat::UintHex),
    FieldDescriptor::new("CntEL0BaseX Physical Address", 8, 12, FieldFormat::UintHex),
    FieldDescriptor::new("Physical Timer GSIV", 4, 20, FieldFormat::UintDec),
    FieldDescriptor::new("Physical Timer Flags", 4, 24, FieldFormat::UintHex),
    FieldDescriptor::new("Virtual Timer GSIV", 4, 28, FieldFormat::UintDec),
    FieldDescriptor::new("Virtual Timer Flags", 4, 32, FieldFormat::UintHex),
    FieldDescriptor::new("Common Flags", 4, 36, FieldFormat::UintHex),
];

const SBSA_WATCHDOG_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 2, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 1, 3, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("RefreshFrame Physical Address", 8, 4, FieldFormat::UintHex),
    FieldDescriptor::new("Watchdog Control Frame Address", 8, 12, FieldFormat::UintHex),
    FieldDescriptor::new("Watchdog Timer GSIV", 4, 20, FieldFormat::UintDec),
    FieldDescriptor::new("Watchdog Timer Flags", 4, 24, FieldFormat::UintHex),
];

/// GT block: fixed fields, then an inline array of timer frames at the
/// block-relative frame offset.
fn parse_gt_block(ctx: &mut ViewContext, bytes: &[u8], offset: usize, _cross: &mut Vec<CrossEntry>) {
    let mut captures = Captures::new();
    ctx.with_indent(|ctx| {
        parse_fields(ctx, "GT Block", bytes, GT_BLOCK_FIELDS, &mut captures, true);

        let count = captures.read_u32(GT_BLOCK_TIMER_COUNT, bytes).unwrap_or(0) as usize;
        let frames = captures.read_u32(GT_BLOCK_TIMER_OFFSET, bytes).unwrap_or(0) as usize;
        if count == 0 {
            return;
        }
        if frames + count * GT_FRAME_LEN > bytes.len() {
            ctx.error(
                ErrorKind::Length,
                format_args!(
                    "GT block at +0x{offset:X}: {count} frames at block offset 0x{frames:X} run past the block length 0x{:X}",
                    bytes.len()
                ),
            );
            return;
        }
        for index in 0..count {
            let frame = frames + index * GT_FRAME_LEN;
            ctx.item(format_args!("GT Block Timer Frame[{index}] (+0x{:X})", offset + frame));
            parse_fields(
                ctx,
                "GT Block Timer Frame",
                &bytes[frame..frame + GT_FRAME_LEN],
                GT_FRAME_FIELDS,
                &mut Captures::new(),
                true,
            );
        }
    });
}

const ENTRIES: &[StructInfo] = &[
    StructInfo { name: "GT Block", kind: GT_BLOCK, arch: GIC_ARCHES, min_len: GT_BLOCK_MIN_LEN, handler: Handler::Custom(parse_gt_block) },
    StructInfo {
        name: "SBSA Generic Watchdog",
        kind: SBSA_WATCHDOG,
        arch: GIC_ARCHES,
        min_len: SBSA_WATCHDOG_LEN,
        handler: Handler::Fields(SBSA_WATCHDOG_FIELDS),
    },
];

pub fn structure_db() -> StructDb {
    StructDb::new("Platform Timer Structure", ENTRIES)
}

pub fn parse(ctx: &mut ViewContext, buf: &[u8], revision: u8) {
    let mut db = structure_db();
    parse_with_db(ctx, buf, revision, &mut db);
}

pub(crate) fn parse_with_db(ctx: &mut ViewContext, buf: &[u8], revision: u8, db: &mut StructDb) {
    if !ctx.trace() {
        return;
    }
    if !super::check_header_fits(ctx, "GTDT", buf) {
        return;
    }
    ctx.revision = revision;
    db.reset_counts();

    let mut header = HeaderInfo::new();
    let body = header.parse(ctx, buf, true);
    let body_buf = &buf[body..];
    let mut body_captures = Captures::new();
    parse_fields(ctx, "GTDT", body_buf, GTDT_BODY, &mut body_captures, true);

    let timer_count = body_captures.read_u32(PLATFORM_TIMER_COUNT, body_buf).unwrap_or(0) as usize;
    let timer_offset = body_captures.read_u32(PLATFORM_TIMER_OFFSET, body_buf).unwrap_or(0) as usize;
    if timer_count == 0 {
        return;
    }
    if timer_offset >= buf.len() {
        if ctx.consistency() {
            ctx.error(
                ErrorKind::Length,
                format_args!("GTDT: platform timer offset 0x{timer_offset:X} is outside the table"),
            );
        }
        return;
    }

    let mut walked = 0usize;
    let mut captures = Captures::new();
    let mut cross: Vec<CrossEntry> = Vec::new();
    let mut offset = timer_offset;
    while walked < timer_count && offset + 4 <= buf.len() {
        let Some((kind, length)) =
            read_struct_header(ctx, &buf[offset..], STRUCT_HEADER, STRUCT_KIND, STRUCT_LENGTH, offset)
        else {
            break;
        };
        if !db.member_integrity(ctx, kind, length, offset, buf.len()) {
            break;
        }

        db.parse_struct(ctx, buf, offset, kind, length, &mut captures, &mut cross);
        offset += length;
        walked += 1;
    }

    if !ctx.consistency() {
        return;
    }
    if walked != timer_count {
        ctx.error(
            ErrorKind::Cross,
            format_args!("GTDT: platform timer count is {timer_count} but {walked} structures were walked"),
        );
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

    fn watchdog() -> alloc::vec::Vec<u8> {
        let mut bytes = alloc::vec![0u8; SBSA_WATCHDOG_LEN];
        bytes[0] = SBSA_WATCHDOG;
        bytes.pwrite_with(SBSA_WATCHDOG_LEN as u16, 1, LE).unwrap();
        bytes.pwrite_with(93u32, 20, LE).unwrap();
        bytes
    }

    fn gt_block(frames: u32) -> alloc::vec::Vec<u8> {
        let length = GT_BLOCK_MIN_LEN + frames as usize * GT_FRAME_LEN;
        let mut bytes = alloc::vec![0u8; length];
        bytes[0] = GT_BLOCK;
        bytes.pwrite_with(length as u16, 1, LE).unwrap();
        bytes.pwrite_with(frames, 12, LE).unwrap();
        bytes.pwrite_with(GT_BLOCK_MIN_LEN as u32, 16, LE).unwrap();
        for index in 0..frames as usize {
            let frame = GT_BLOCK_MIN_LEN + index * GT_FRAME_LEN;
            bytes[frame] = index as u8;
        }
        bytes
    }

    fn gtdt(timers: &[&[u8]]) -> alloc::vec::Vec<u8> {
        let body_len: usize = timers.iter().map(|t| t.len()).sum();
        let length = 104 + body_len;
        let mut buf = test_header(signature::GTDT, length as u32, 3);
        buf.resize(104, 0);
        buf.pwrite_with(timers.len() as u32, 88, LE).unwrap();
        buf.pwrite_with(104u32, 92, LE).unwrap();
        for t in timers {
            buf.extend_from_slice(t);
        }
        tarnish_acpi::checksum::finalize(&mut buf, 9);
        buf
    }

    fn aarch64_config() -> ViewConfig {
        ViewConfig { arch: ArchSet::AARCH64, ..Default::default() }
    }

    #[test]
    fn test_fixed_block_only() {
        let buf = gtdt(&[]);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, aarch64_config());
        parse(&mut ctx, &buf, 3);
        assert_eq!(ctx.error_count(), 0);
        drop(ctx);
        assert!(sink.output().contains("Virtual EL2 Timer GSIV"));
    }

    #[test]
    fn test_gt_block_frames_traced() {
        let buf = gtdt(&[&gt_block(2), &watchdog()]);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, aarch64_config());
        let mut db = structure_db();
        parse_with_db(&mut ctx, &buf, 3, &mut db);
        assert_eq!(db.count(GT_BLOCK), 1);
        assert_eq!(db.count(SBSA_WATCHDOG), 1);
        assert_eq!(ctx.error_count(), 0);
        drop(ctx);
        assert!(sink.output().contains("GT Block Timer Frame[1]"));
        assert!(sink.output().contains("SBSA Generic Watchdog[0]"));
    }

    #[test]
    fn test_timer_count_mismatch() {
        let mut buf = gtdt(&[&watchdog()]);
        buf.pwrite_with(2u32, 88, LE).unwrap(); // claims two timers
        tarnish_acpi::checksum::finalize(&mut buf, 9);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, aarch64_config());
        parse(&mut ctx, &buf, 3);
        assert_eq!(ctx.error_count_of(ErrorKind::Cross), 1);
    }

    #[test]
    fn test_gt_block_frame_overflow() {
        // Block claims 3 frames but only has room for 1.
        let mut block = gt_block(1);
        block.pwrite_with(3u32, 12, LE).unwrap();
        let buf = gtdt(&[&block]);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, aarch64_config());
        parse(&mut ctx, &buf, 3);
        assert_eq!(ctx.error_count_of(ErrorKind::Length), 1);
    }
}
