//! SPCR Parser.
//!
//! Serial Port Console Redirection table, revision 2, per the Microsoft
//! SPCR specification referenced by ACPI 6.3.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use crate::field::{read_uint, validate_equals, validate_reserved_zero, Captures, FieldDescriptor, FieldFormat};
use crate::parser::parse_fields;
use crate::report::{ErrorKind, ViewContext};
use crate::tables::{gas, HeaderInfo};

/// Defined baud-rate encodings: 0 (as-is), 3 (9600), 4 (19200), 6 (57600),
/// 7 (115200).
fn validate_baud_rate(ctx: &mut ViewContext, bytes: &[u8], _context: u32) {
    if let Some(baud) = read_uint(bytes) {
        if !matches!(baud, 0 | 3 | 4 | 6 | 7) {
            ctx.error(ErrorKind::Value, format_args!("Baud rate encoding {baud} is not defined"));
        }
    }
}

// Offsets are relative to the end of the standard header.
const SPCR_BODY: &[FieldDescriptor] = &[
    FieldDescriptor::new("Interface Type", 1, 0, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 3, 1, FieldFormat::HexDump).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Base Address", 12, 4, FieldFormat::Custom(gas::render_gas)),
    FieldDescriptor::new("Interrupt Type", 1, 16, FieldFormat::UintHex),
    FieldDescriptor::new("IRQ", 1, 17, FieldFormat::UintDec),
    FieldDescriptor::new("Global System Interrupt", 4, 18, FieldFormat::UintDec),
    FieldDescriptor::new("Baud Rate", 1, 22, FieldFormat::UintDec).with_validator(validate_baud_rate, 0),
    FieldDescriptor::new("Parity", 1, 23, FieldFormat::UintDec).with_validator(validate_equals, 0),
    FieldDescriptor::new("Stop Bits", 1, 24, FieldFormat::UintDec).with_validator(validate_equals, 1),
    FieldDescriptor::new("Flow Control", 1, 25, FieldFormat::UintHex),
    FieldDescriptor::new("Terminal Type", 1, 26, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 1, 27, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("PCI Device ID", 2, 28, FieldFormat::UintHex),
    FieldDescriptor::new("PCI Vendor ID", 2, 30, FieldFormat::UintHex),
    FieldDescriptor::new("PCI Bus Number", 1, 32, FieldFormat::UintDec),
    FieldDescriptor::new("PCI Device Number", 1, 33, FieldFormat::UintDec),
    FieldDescriptor::new("PCI Function Number", 1, 34, FieldFormat::UintDec),
    FieldDescriptor::new("PCI Flags", 4, 35, FieldFormat::UintHex),
    FieldDescriptor::new("PCI Segment", 1, 39, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 4, 40, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
];

pub fn parse(ctx: &mut ViewContext, buf: &[u8], revision: u8) {
    if !ctx.trace() {
        return;
    }
    if !super::check_header_fits(ctx, "SPCR", buf) {
        return;
    }
    ctx.revision = revision;

    let mut header = HeaderInfo::new();
    let body = header.parse(ctx, buf, true);
    parse_fields(ctx, "SPCR", &buf[body..], SPCR_BODY, &mut Captures::new(), true);
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

    fn spcr(baud: u8, stop_bits: u8) -> alloc::vec::Vec<u8> {
        let mut buf = test_header(signature::SPCR, 80, 2);
        buf.resize(80, 0);
        buf[36] = 3; // ARM PL011
        // Base address GAS: system memory, 32-bit wide.
        buf[40] = 0;
        buf[41] = 32;
        buf.pwrite_with(0x9000_0000u64, 44, LE).unwrap();
        buf[58] = baud;
        buf[60] = stop_bits;
        tarnish_acpi::checksum::finalize(&mut buf, 9);
        buf
    }

    #[test]
    fn test_valid_spcr() {
        let buf = spcr(7, 1);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, ViewConfig::default());
        parse(&mut ctx, &buf, 2);
        assert_eq!(ctx.error_count(), 0);
        drop(ctx);
        assert!(sink.output().contains("Base Address"));
        assert!(sink.output().contains("0x90000000"));
    }

    #[test]
    fn test_bad_baud_and_stop_bits() {
        let buf = spcr(2, 0);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, ViewConfig::default());
        parse(&mut ctx, &buf, 2);
        assert_eq!(ctx.error_count_of(ErrorKind::Value), 2);
    }
}
