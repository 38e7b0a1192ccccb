//! FACS Parser.
//!
//! Firmware ACPI Control Structure, ACPI 6.3 section 5.2.10. The FACS has
//! no standard description header and carries no checksum.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use tarnish_acpi::signature::FACS_SIZE;

use crate::field::{validate_equals, validate_reserved_zero, Captures, FieldDescriptor, FieldFormat};
use crate::parser::parse_fields;
use crate::report::{ErrorKind, ViewContext};

const FACS_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Signature", 4, 0, FieldFormat::Ascii),
    FieldDescriptor::new("Length", 4, 4, FieldFormat::UintDec).with_validator(validate_equals, FACS_SIZE as u32),
    FieldDescriptor::new("Hardware Signature", 4, 8, FieldFormat::UintHex),
    FieldDescriptor::new("Firmware Waking Vector", 4, 12, FieldFormat::UintHex),
    FieldDescriptor::new("Global Lock", 4, 16, FieldFormat::UintHex),
    FieldDescriptor::new("Flags", 4, 20, FieldFormat::UintHex),
    FieldDescriptor::new("X Firmware Waking Vector", 8, 24, FieldFormat::UintHex),
    FieldDescriptor::new("Version", 1, 32, FieldFormat::UintDec),
    FieldDescriptor::new("Reserved", 3, 33, FieldFormat::HexDump).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("OSPM Flags", 4, 36, FieldFormat::UintHex),
    FieldDescriptor::new("Reserved", 24, 40, FieldFormat::HexDump).with_validator(validate_reserved_zero, 0),
];

pub fn parse(ctx: &mut ViewContext, buf: &[u8], revision: u8) {
    if !ctx.trace() {
        return;
    }
    ctx.revision = revision;

    if buf.len() < FACS_SIZE && ctx.consistency() {
        ctx.error(
            ErrorKind::Length,
            format_args!("FACS: length 0x{:X} is below the required 0x{FACS_SIZE:X}", buf.len()),
        );
    }
    parse_fields(ctx, "FACS", buf, FACS_FIELDS, &mut Captures::new(), true);
}
