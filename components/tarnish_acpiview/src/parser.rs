//! Generic Field Parser.
//!
//! Walks a descriptor table over a byte buffer: bounds-checks every field,
//! optionally traces it, publishes capture slots, and runs per-field
//! validators under consistency mode. A field that does not fit is skipped,
//! never fatal; the walk continues so one truncated structure still yields
//! every diagnosable field.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use alloc::string::String;

use crate::field::{read_uint, Captures, FieldDescriptor, FieldFormat};
use crate::report::{ErrorKind, ViewContext};

/// Walk `descriptors` over `buf`.
///
/// Returns the cumulative advance: the sum of declared lengths of the
/// descriptors whose full range lay within the buffer. The declared offset
/// of each descriptor is authoritative for where its field is read; the
/// cumulative value is only compared against it for offset-mismatch
/// detection under consistency mode.
///
/// `name` labels offset-mismatch reports. `trace` gates field rendering and
/// (together with consistency mode) per-field validators; captures are
/// published either way. The context's indent is incremented for the
/// duration of the walk and restored on exit.
pub fn parse_fields(
    ctx: &mut ViewContext,
    name: &str,
    buf: &[u8],
    descriptors: &[FieldDescriptor],
    captures: &mut Captures,
    trace: bool,
) -> usize {
    ctx.with_indent(|ctx| {
        let mut consumed = 0usize;
        let mut malformed_reported = false;

        for d in descriptors {
            let Some(end) = d.offset.checked_add(d.length) else {
                continue;
            };
            if end > buf.len() {
                if let Some(id) = d.capture {
                    captures.clear_slot(id);
                }
                continue;
            }

            if ctx.consistency() && consumed != d.offset {
                ctx.error(
                    ErrorKind::Parse,
                    format_args!(
                        "{name}: offset mismatch for field '{}' (parsed 0x{:x}, declared 0x{:x})",
                        d.name, consumed, d.offset
                    ),
                );
            }

            let bytes = &buf[d.offset..end];
            if trace {
                render_field(ctx, d, bytes, &mut malformed_reported);
            }
            if let Some(id) = d.capture {
                captures.set(id, d.offset..end);
            }
            if trace && ctx.consistency() {
                if let Some(validate) = d.validator {
                    validate(ctx, bytes, d.context);
                }
            }

            consumed = end;
        }

        consumed
    })
}

fn render_field(ctx: &mut ViewContext, d: &FieldDescriptor, bytes: &[u8], malformed_reported: &mut bool) {
    match d.format {
        FieldFormat::Hidden => {}
        FieldFormat::Custom(render) => render(ctx, d.name, bytes),
        FieldFormat::UintHex => match read_uint(bytes) {
            Some(value) => ctx.info(format_args!("{:<28} : 0x{value:X}", d.name)),
            None => report_malformed(ctx, d, malformed_reported),
        },
        FieldFormat::UintDec => match read_uint(bytes) {
            Some(value) => ctx.info(format_args!("{:<28} : {value}", d.name)),
            None => report_malformed(ctx, d, malformed_reported),
        },
        FieldFormat::Ascii => {
            let mut text = String::with_capacity(bytes.len());
            for b in bytes {
                text.push(if b.is_ascii_graphic() || *b == b' ' { *b as char } else { '.' });
            }
            ctx.info(format_args!("{:<28} : {text}", d.name));
        }
        FieldFormat::HexDump => {
            let mut text = String::with_capacity(bytes.len() * 3);
            for (i, b) in bytes.iter().enumerate() {
                if i > 0 {
                    text.push(' ');
                }
                let _ = core::fmt::write(&mut text, format_args!("{b:02X}"));
            }
            ctx.info(format_args!("{:<28} : {text}", d.name));
        }
    }
}

/// A descriptor whose length cannot carry its integer format is a defect of
/// the descriptor table, not of the data; it is reported once per walk.
fn report_malformed(ctx: &mut ViewContext, d: &FieldDescriptor, malformed_reported: &mut bool) {
    if !*malformed_reported {
        ctx.error(
            ErrorKind::Parse,
            format_args!("descriptor for field '{}' has invalid length {}", d.name, d.length),
        );
        *malformed_reported = true;
    }
}
