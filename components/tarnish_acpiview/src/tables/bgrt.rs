//! BGRT Parser.
//!
//! Boot Graphics Resource Table, ACPI 6.3 section 5.2.22.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use crate::field::{read_uint, validate_equals, Captures, FieldDescriptor, FieldFormat};
use crate::parser::parse_fields;
use crate::report::{ErrorKind, ViewContext};
use crate::tables::HeaderInfo;

/// Bits 3..7 of the status field are reserved.
fn validate_status(ctx: &mut ViewContext, bytes: &[u8], _context: u32) {
    if let Some(status) = read_uint(bytes) {
        if status & !0x07 != 0 {
            ctx.error(ErrorKind::Value, format_args!("Status reserved bits must be zero, found 0x{status:X}"));
        }
    }
}

// Offsets are relative to the end of the standard header.
const BGRT_BODY: &[FieldDescriptor] = &[
    FieldDescriptor::new("Version", 2, 0, FieldFormat::UintDec).with_validator(validate_equals, 1),
    FieldDescriptor::new("Status", 1, 2, FieldFormat::UintHex).with_validator(validate_status, 0),
    FieldDescriptor::new("Image Type", 1, 3, FieldFormat::UintDec).with_validator(validate_equals, 0),
    FieldDescriptor::new("Image Address", 8, 4, FieldFormat::UintHex),
    FieldDescriptor::new("Image Offset X", 4, 12, FieldFormat::UintDec),
    FieldDescriptor::new("Image Offset Y", 4, 16, FieldFormat::UintDec),
];

pub fn parse(ctx: &mut ViewContext, buf: &[u8], revision: u8) {
    if !ctx.trace() {
        return;
    }
    if !super::check_header_fits(ctx, "BGRT", buf) {
        return;
    }
    ctx.revision = revision;

    let mut header = HeaderInfo::new();
    let body = header.parse(ctx, buf, true);
    parse_fields(ctx, "BGRT", &buf[body..], BGRT_BODY, &mut Captures::new(), true);
}
