//! RSDP Parser.
//!
//! Root System Description Pointer, ACPI 6.3 section 5.2.5. Not a standard
//! table: an 8-byte signature, two checksums (one over the first 20 bytes
//! for ACPI 1.0 compatibility, one over the whole structure), and the XSDT
//! address that roots the table hierarchy.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use tarnish_acpi::checksum;
use tarnish_acpi::signature::{ACPI_RSDP_LEN, ACPI_RSDP_REVISION};

use crate::field::{read_uint, validate_reserved_zero, Captures, FieldDescriptor, FieldFormat};
use crate::parser::parse_fields;
use crate::report::{ErrorKind, ViewContext};

/// Length of the ACPI 1.0 portion covered by the first checksum.
const RSDP_V1_LEN: usize = 20;

fn validate_revision(ctx: &mut ViewContext, bytes: &[u8], _context: u32) {
    if let Some(revision) = read_uint(bytes) {
        if revision < u64::from(ACPI_RSDP_REVISION) {
            ctx.error(
                ErrorKind::Value,
                format_args!("RSDP revision must be >= {ACPI_RSDP_REVISION} for ACPI 2.0+, found {revision}"),
            );
        }
    }
}

fn validate_xsdt_address(ctx: &mut ViewContext, bytes: &[u8], _context: u32) {
    if read_uint(bytes) == Some(0) {
        ctx.error(ErrorKind::Value, format_args!("XSDT address must be set"));
    }
}

const RSDP_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Signature", 8, 0, FieldFormat::Ascii),
    FieldDescriptor::new("Checksum", 1, 8, FieldFormat::UintHex),
    FieldDescriptor::new("Oem ID", 6, 9, FieldFormat::Ascii),
    FieldDescriptor::new("Revision", 1, 15, FieldFormat::UintDec).with_validator(validate_revision, 0),
    FieldDescriptor::new("RSDT Address", 4, 16, FieldFormat::UintHex),
    FieldDescriptor::new("Length", 4, 20, FieldFormat::UintDec),
    FieldDescriptor::new("XSDT Address", 8, 24, FieldFormat::UintHex).with_validator(validate_xsdt_address, 0),
    FieldDescriptor::new("Extended Checksum", 1, 32, FieldFormat::UintHex),
    FieldDescriptor::new("Reserved", 3, 33, FieldFormat::HexDump).with_validator(validate_reserved_zero, 0),
];

pub fn parse(ctx: &mut ViewContext, buf: &[u8], revision: u8) {
    if !ctx.trace() {
        return;
    }
    ctx.revision = revision;

    if ctx.consistency() {
        if buf.len() >= RSDP_V1_LEN && !checksum::verifies(&buf[..RSDP_V1_LEN]) {
            ctx.error(ErrorKind::Checksum, format_args!("RSDP: ACPI 1.0 checksum over the first 20 bytes failed"));
        }
        if buf.len() >= ACPI_RSDP_LEN && !checksum::verifies(&buf[..ACPI_RSDP_LEN]) {
            ctx.error(ErrorKind::Checksum, format_args!("RSDP: extended checksum failed"));
        }
    }

    parse_fields(ctx, "RSDP", buf, RSDP_FIELDS, &mut Captures::new(), true);
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use scroll::{Pwrite, LE};

    use super::*;
    use crate::config::ViewConfig;
    use crate::report::StringSink;
    use tarnish_acpi::signature::ACPI_RSDP_TABLE;

    fn rsdp(revision: u8, xsdt: u64) -> alloc::vec::Vec<u8> {
        let mut buf = vec![0u8; ACPI_RSDP_LEN];
        buf.pwrite_with(ACPI_RSDP_TABLE, 0, LE).unwrap();
        buf[9..15].copy_from_slice(b"TARNSH");
        buf[15] = revision;
        buf.pwrite_with(ACPI_RSDP_LEN as u32, 20, LE).unwrap();
        buf.pwrite_with(xsdt, 24, LE).unwrap();
        // ACPI 1.0 checksum, then the extended checksum over everything.
        buf[8] = checksum::complement(&buf[..RSDP_V1_LEN]);
        buf[32] = checksum::complement(&buf[..ACPI_RSDP_LEN]);
        buf
    }

    #[test]
    fn test_valid_rsdp() {
        let buf = rsdp(2, 0x8000_0000);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, ViewConfig::default());
        parse(&mut ctx, &buf, 2);
        assert_eq!(ctx.error_count(), 0);
        drop(ctx);
        assert!(sink.output().contains("RSD PTR"));
    }

    #[test]
    fn test_rsdp_errors() {
        let mut buf = rsdp(1, 0);
        buf[33] = 0x01; // reserved byte, invalidates the extended checksum too
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, ViewConfig::default());
        parse(&mut ctx, &buf, 1);
        // Old revision, null XSDT address, nonzero reserved byte.
        assert_eq!(ctx.error_count_of(ErrorKind::Value), 3);
        assert_eq!(ctx.error_count_of(ErrorKind::Checksum), 1);
    }
}
