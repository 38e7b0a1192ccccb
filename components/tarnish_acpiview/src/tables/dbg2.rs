//! DBG2 Parser.
//!
//! Debug Port Table 2, per the Microsoft Debug Port Table specification
//! referenced by ACPI 6.3. The body is a counted list of debug device
//! information structures, each with inline arrays of base address
//! registers and address sizes, plus a namespace string.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use tarnish_acpi::acpi_table::GAS_LEN;

use crate::field::{validate_reserved_zero, CaptureId, Captures, FieldDescriptor, FieldFormat};
use crate::parser::parse_fields;
use crate::report::{ErrorKind, ViewContext};
use crate::tables::{gas, HeaderInfo};

const DEVICE_INFO_MIN_LEN: usize = 22;

const INFO_OFFSET: CaptureId = 0;
const INFO_COUNT: CaptureId = 1;

// Offsets are relative to the end of the standard header.
const DBG2_BODY: &[FieldDescriptor] = &[
    FieldDescriptor::new("Offset to Device Info", 4, 0, FieldFormat::UintHex).with_capture(INFO_OFFSET),
    FieldDescriptor::new("Number of Device Info", 4, 4, FieldFormat::UintDec).with_capture(INFO_COUNT),
];

const DEV_LENGTH: CaptureId = 0;
const DEV_GAS_COUNT: CaptureId = 1;
const DEV_NS_LENGTH: CaptureId = 2;
const DEV_NS_OFFSET: CaptureId = 3;
const DEV_BAR_OFFSET: CaptureId = 4;
const DEV_SIZE_OFFSET: CaptureId = 5;

// Offsets are relative to the start of one device info structure.
const DEVICE_INFO_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Revision", 1, 0, FieldFormat::UintDec),
    FieldDescriptor::new("Length", 2, 1, FieldFormat::UintDec).with_capture(DEV_LENGTH),
    FieldDescriptor::new("Generic Address Registers", 1, 3, FieldFormat::UintDec).with_capture(DEV_GAS_COUNT),
    FieldDescriptor::new("Namespace String Length", 2, 4, FieldFormat::UintDec).with_capture(DEV_NS_LENGTH),
    FieldDescriptor::new("Namespace String Offset", 2, 6, FieldFormat::UintHex).with_capture(DEV_NS_OFFSET),
    FieldDescriptor::new("OEM Data Length", 2, 8, FieldFormat::UintDec),
    FieldDescriptor::new("OEM Data Offset", 2, 10, FieldFormat::UintHex),
    FieldDescriptor::new("Port Type", 2, 12, FieldFormat::UintHex),
    FieldDescriptor::new("Port Subtype", 2, 14, FieldFormat::UintHex),
    FieldDescriptor::new("Reserved", 2, 16, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Base Address Register Offset", 2, 18, FieldFormat::UintHex).with_capture(DEV_BAR_OFFSET),
    FieldDescriptor::new("Address Size Offset", 2, 20, FieldFormat::UintHex).with_capture(DEV_SIZE_OFFSET),
];

fn parse_device_info(ctx: &mut ViewContext, bytes: &[u8], offset: usize) {
    let mut captures = Captures::new();
    parse_fields(ctx, "Debug Device Info", bytes, DEVICE_INFO_FIELDS, &mut captures, true);

    let gas_count = captures.read_u8(DEV_GAS_COUNT, bytes).unwrap_or(0) as usize;
    let bar_offset = captures.read_u16(DEV_BAR_OFFSET, bytes).unwrap_or(0) as usize;
    let size_offset = captures.read_u16(DEV_SIZE_OFFSET, bytes).unwrap_or(0) as usize;

    if bar_offset + gas_count * GAS_LEN > bytes.len() || size_offset + gas_count * 4 > bytes.len() {
        ctx.error(
            ErrorKind::Length,
            format_args!("Debug device at +0x{offset:X}: register arrays exceed the structure length"),
        );
        return;
    }
    ctx.with_indent(|ctx| {
        for index in 0..gas_count {
            let start = bar_offset + index * GAS_LEN;
            gas::render_gas(ctx, "Base Address Register", &bytes[start..start + GAS_LEN]);
        }
        for index in 0..gas_count {
            let start = size_offset + index * 4;
            let size = u32::from_le_bytes([bytes[start], bytes[start + 1], bytes[start + 2], bytes[start + 3]]);
            ctx.info(format_args!("{:<28} : 0x{size:X}", "Address Size"));
        }
    });

    let ns_offset = captures.read_u16(DEV_NS_OFFSET, bytes).unwrap_or(0) as usize;
    let ns_length = captures.read_u16(DEV_NS_LENGTH, bytes).unwrap_or(0) as usize;
    if ns_length > 0 {
        if ns_offset + ns_length > bytes.len() {
            ctx.error(
                ErrorKind::Length,
                format_args!("Debug device at +0x{offset:X}: namespace string exceeds the structure length"),
            );
            return;
        }
        let mut name = alloc::string::String::new();
        for b in &bytes[ns_offset..ns_offset + ns_length] {
            if *b == 0 {
                break;
            }
            name.push(if b.is_ascii_graphic() { *b as char } else { '.' });
        }
        ctx.with_indent(|ctx| {
            ctx.info(format_args!("{:<28} : {name}", "Namespace String"));
        });
    }
}

pub fn parse(ctx: &mut ViewContext, buf: &[u8], revision: u8) {
    if !ctx.trace() {
        return;
    }
    if !super::check_header_fits(ctx, "DBG2", buf) {
        return;
    }
    ctx.revision = revision;

    let mut header = HeaderInfo::new();
    let body = header.parse(ctx, buf, true);
    let body_buf = &buf[body..];
    let mut body_captures = Captures::new();
    parse_fields(ctx, "DBG2", body_buf, DBG2_BODY, &mut body_captures, true);

    let count = body_captures.read_u32(INFO_COUNT, body_buf).unwrap_or(0) as usize;
    let mut offset = body_captures.read_u32(INFO_OFFSET, body_buf).unwrap_or(0) as usize;

    let mut index = 0;
    while index < count && offset + DEVICE_INFO_MIN_LEN <= buf.len() {
        // The device info length lives at bytes 1..3 of the structure.
        let length = u16::from_le_bytes([buf[offset + 1], buf[offset + 2]]) as usize;
        if length < DEVICE_INFO_MIN_LEN || offset + length > buf.len() {
            ctx.error(
                ErrorKind::Length,
                format_args!("DBG2: device info length 0x{length:X} at offset 0x{offset:X} is invalid"),
            );
            return;
        }

        ctx.with_indent(|ctx| {
            ctx.item(format_args!("Debug Device Info[{index}] (+0x{offset:X})"));
        });
        ctx.with_indent(|ctx| {
            parse_device_info(ctx, &buf[offset..offset + length], offset);
        });

        offset += length;
        index += 1;
    }

    if ctx.consistency() && index != count {
        ctx.error(ErrorKind::Value, format_args!("DBG2: device info count is {count} but {index} were walked"));
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

    /// One PL011 debug device with a single base address register and a
    /// namespace string.
    fn device_info(name: &[u8]) -> alloc::vec::Vec<u8> {
        let bar_offset = DEVICE_INFO_MIN_LEN;
        let size_offset = bar_offset + GAS_LEN;
        let ns_offset = size_offset + 4;
        let length = ns_offset + name.len();
        let mut bytes = alloc::vec![0u8; length];
        bytes[0] = 0; // revision
        bytes.pwrite_with(length as u16, 1, LE).unwrap();
        bytes[3] = 1; // one GAS
        bytes.pwrite_with(name.len() as u16, 4, LE).unwrap();
        bytes.pwrite_with(ns_offset as u16, 6, LE).unwrap();
        bytes.pwrite_with(0x8000u16, 12, LE).unwrap(); // serial port
        bytes.pwrite_with(0x0003u16, 14, LE).unwrap(); // PL011
        bytes.pwrite_with(bar_offset as u16, 18, LE).unwrap();
        bytes.pwrite_with(size_offset as u16, 20, LE).unwrap();
        // The GAS itself: system memory, 32-bit access.
        bytes[bar_offset] = 0;
        bytes[bar_offset + 1] = 32;
        bytes.pwrite_with(0x9000_0000u64, bar_offset + 4, LE).unwrap();
        bytes.pwrite_with(0x1000u32, size_offset, LE).unwrap();
        bytes[ns_offset..ns_offset + name.len()].copy_from_slice(name);
        bytes
    }

    fn dbg2(devices: &[&[u8]]) -> alloc::vec::Vec<u8> {
        let body_len: usize = devices.iter().map(|d| d.len()).sum();
        let length = 44 + body_len;
        let mut buf = test_header(signature::DBG2, length as u32, 0);
        buf.resize(44, 0);
        buf.pwrite_with(44u32, 36, LE).unwrap();
        buf.pwrite_with(devices.len() as u32, 40, LE).unwrap();
        for d in devices {
            buf.extend_from_slice(d);
        }
        tarnish_acpi::checksum::finalize(&mut buf, 9);
        buf
    }

    #[test]
    fn test_device_traced() {
        let buf = dbg2(&[&device_info(b"\\_SB.COM0\0")]);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, ViewConfig::default());
        parse(&mut ctx, &buf, 0);
        assert_eq!(ctx.error_count(), 0);
        drop(ctx);
        assert!(sink.output().contains("Debug Device Info[0]"));
        assert!(sink.output().contains("Namespace String"));
        assert!(sink.output().contains("COM0"));
        assert!(sink.output().contains("Base Address Register"));
    }

    #[test]
    fn test_count_mismatch() {
        let mut buf = dbg2(&[&device_info(b"X\0")]);
        buf.pwrite_with(2u32, 40, LE).unwrap();
        tarnish_acpi::checksum::finalize(&mut buf, 9);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, ViewConfig::default());
        parse(&mut ctx, &buf, 0);
        assert_eq!(ctx.error_count_of(ErrorKind::Value), 1);
    }

    #[test]
    fn test_ragged_register_arrays() {
        let mut device = device_info(b"X\0");
        device[3] = 4; // claims four GAS entries
        let buf = dbg2(&[&device]);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, ViewConfig::default());
        parse(&mut ctx, &buf, 0);
        assert_eq!(ctx.error_count_of(ErrorKind::Length), 1);
    }
}
