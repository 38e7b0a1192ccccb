//! DSDT / SSDT Parser.
//!
//! Both tables are a standard header followed by AML byte code, which this
//! engine does not execute or decode; only the header is traced, plus the
//! byte count of the AML region.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use crate::report::ViewContext;
use crate::tables::HeaderInfo;

pub fn parse(ctx: &mut ViewContext, buf: &[u8], revision: u8) {
    if !ctx.trace() {
        return;
    }
    if !super::check_header_fits(ctx, "DSDT/SSDT", buf) {
        return;
    }
    ctx.revision = revision;

    let mut header = HeaderInfo::new();
    let body = header.parse(ctx, buf, true);
    ctx.with_indent(|ctx| {
        ctx.info(format_args!("{:<28} : {}", "AML byte code length", buf.len() - body));
    });
}
