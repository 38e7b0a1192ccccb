//! SLIT Parser.
//!
//! System Locality Information Table, ACPI 6.3 section 5.2.17: a square
//! matrix of relative distances between system localities. The distance
//! from a locality to itself is defined as 10, and the matrix must be
//! symmetric.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use scroll::{Pread, LE};

use crate::report::{ErrorKind, ViewContext};
use crate::tables::HeaderInfo;

/// Defined distance of a locality to itself.
const LOCAL_DISTANCE: u8 = 10;

pub fn parse(ctx: &mut ViewContext, buf: &[u8], revision: u8) {
    if !ctx.trace() {
        return;
    }
    if !super::check_header_fits(ctx, "SLIT", buf) {
        return;
    }
    ctx.revision = revision;

    let mut header = HeaderInfo::new();
    let body = header.parse(ctx, buf, true);

    let Ok(locality_count) = buf.pread_with::<u64>(body, LE) else {
        ctx.error(ErrorKind::Parse, format_args!("SLIT: locality count could not be read"));
        return;
    };
    ctx.with_indent(|ctx| {
        ctx.info(format_args!("{:<28} : {locality_count}", "Number of System Localities"));
    });

    let n = locality_count as usize;
    let matrix = body + 8;
    let Some(matrix_len) = n.checked_mul(n) else {
        ctx.error(ErrorKind::Length, format_args!("SLIT: locality count {locality_count} overflows"));
        return;
    };
    if matrix + matrix_len > buf.len() {
        ctx.error(
            ErrorKind::Length,
            format_args!("SLIT: {locality_count} localities need 0x{matrix_len:X} matrix bytes past offset 0x{matrix:X}"),
        );
        return;
    }

    let entry = |i: usize, j: usize| buf[matrix + i * n + j];
    ctx.with_indent(|ctx| {
        for i in 0..n {
            for j in 0..n {
                ctx.info(format_args!("Entry[{i}][{j}] : {}", entry(i, j)));
            }
        }
    });

    if !ctx.consistency() {
        return;
    }
    for i in 0..n {
        if entry(i, i) != LOCAL_DISTANCE {
            ctx.error(
                ErrorKind::Value,
                format_args!("SLIT: Entry[{i}][{i}] must be {LOCAL_DISTANCE}, found {}", entry(i, i)),
            );
        }
        for j in i + 1..n {
            if entry(i, j) != entry(j, i) {
                ctx.error(
                    ErrorKind::Cross,
                    format_args!(
                        "SLIT: matrix is not symmetric, Entry[{i}][{j}] = {} but Entry[{j}][{i}] = {}",
                        entry(i, j),
                        entry(j, i)
                    ),
                );
            }
        }
    }
}
