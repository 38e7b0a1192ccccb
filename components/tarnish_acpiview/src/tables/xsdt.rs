//! XSDT Parser.
//!
//! Extended System Description Table, ACPI 6.3 section 5.2.8: a standard
//! header followed by 64-bit physical addresses of the installed tables.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use core::mem;

use scroll::{Pread, LE};

use crate::report::{ErrorKind, ViewContext};
use crate::tables::HeaderInfo;

pub fn parse(ctx: &mut ViewContext, buf: &[u8], revision: u8) {
    if !ctx.trace() {
        return;
    }
    if !super::check_header_fits(ctx, "XSDT", buf) {
        return;
    }
    ctx.revision = revision;

    let mut header = HeaderInfo::new();
    let body = header.parse(ctx, buf, true);

    let entry_len = mem::size_of::<u64>();
    if ctx.consistency() && (buf.len() - body) % entry_len != 0 {
        ctx.error(
            ErrorKind::Length,
            format_args!("XSDT: entry region size 0x{:X} is not a multiple of 8", buf.len() - body),
        );
    }

    let mut offset = body;
    let mut index = 0;
    while offset + entry_len <= buf.len() {
        let address: u64 = buf.pread_with(offset, LE).unwrap_or(0);
        ctx.with_indent(|ctx| {
            ctx.item(format_args!("Entry[{index}] (+0x{offset:X})"));
            ctx.with_indent(|ctx| {
                ctx.info(format_args!("{:<28} : 0x{address:X}", "Table Address"));
            });
        });
        if ctx.consistency() && address == 0 {
            ctx.error(ErrorKind::Value, format_args!("XSDT entry [{index}] must not be NULL"));
        }
        offset += entry_len;
        index += 1;
    }
}
