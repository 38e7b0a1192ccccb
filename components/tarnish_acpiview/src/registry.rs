//! Structure Databases.
//!
//! Each table that carries tag-and-length sub-structures owns a registry of
//! the structure kinds ACPI defines for it: display name, architecture
//! compatibility, minimum length, and a handler. The registry is a constant;
//! instance counters live beside it for the duration of one parse.
//!
//! Registry entries are indexed by the ACPI type tag itself: for every `i`,
//! `entries[i].kind == i`, with no gaps.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use alloc::vec;
use alloc::vec::Vec;

use crate::arch::ArchSet;
use crate::cross::CrossEntry;
use crate::field::{Captures, FieldDescriptor};
use crate::parser::parse_fields;
use crate::report::{ErrorKind, ViewContext};

/// Custom dispatcher for structures a flat field table cannot express
/// (inline arrays, conditional regions). Receives the structure's bytes,
/// its offset from the start of the table, and the dispatcher's
/// cross-reference list.
pub type CustomDispatchFn = fn(&mut ViewContext, &[u8], usize, &mut Vec<CrossEntry>);

/// How a registry entry is parsed.
pub enum Handler {
    /// Drive the generic parser over a field-descriptor table.
    Fields(&'static [FieldDescriptor]),
    /// Structure-specific dispatcher.
    Custom(CustomDispatchFn),
    /// Defined by ACPI but not handled by this build.
    Unimplemented,
}

/// One sub-structure kind within a table's registry.
pub struct StructInfo {
    pub name: &'static str,
    /// ACPI-defined type tag; equals this entry's index in the registry.
    pub kind: u8,
    pub arch: ArchSet,
    /// Fixed portion of the structure; declared lengths below this fail
    /// member integrity.
    pub min_len: usize,
    pub handler: Handler,
}

/// A table's registry plus its per-parse instance counters.
pub struct StructDb {
    /// Display name of the structure family, e.g.
    /// "Interrupt Controller Structure".
    pub name: &'static str,
    pub entries: &'static [StructInfo],
    counts: Vec<u32>,
}

impl StructDb {
    pub fn new(name: &'static str, entries: &'static [StructInfo]) -> Self {
        debug_assert!(entries.iter().enumerate().all(|(i, e)| e.kind as usize == i));
        StructDb { name, entries, counts: vec![0; entries.len()] }
    }

    pub fn reset_counts(&mut self) {
        self.counts.fill(0);
    }

    pub fn lookup(&self, kind: u8) -> Option<&StructInfo> {
        self.entries.get(kind as usize)
    }

    pub fn count(&self, kind: u8) -> u32 {
        self.counts.get(kind as usize).copied().unwrap_or(0)
    }

    /// Member integrity for one sub-structure: a declared length of zero,
    /// a length overflowing the table, or a length below the kind's fixed
    /// portion all make further offsets meaningless.
    pub fn member_integrity(
        &self,
        ctx: &mut ViewContext,
        kind: u8,
        length: usize,
        offset: usize,
        table_len: usize,
    ) -> bool {
        if length == 0 {
            ctx.error(
                ErrorKind::Length,
                format_args!("{}: zero length at offset 0x{offset:X}", self.name),
            );
            return false;
        }
        if offset + length > table_len {
            ctx.error(
                ErrorKind::Length,
                format_args!(
                    "{}: length 0x{length:X} at offset 0x{offset:X} runs past the table end (0x{table_len:X})",
                    self.name
                ),
            );
            return false;
        }
        if let Some(entry) = self.lookup(kind) {
            if length < entry.min_len {
                ctx.error(
                    ErrorKind::Length,
                    format_args!(
                        "{}: length 0x{length:X} below the fixed size 0x{:X} of {}",
                        self.name, entry.min_len, entry.name
                    ),
                );
                return false;
            }
        }
        true
    }

    /// Dispatch one sub-structure: log its item line, bump its counter, and
    /// hand it to its registered handler. Unknown type tags are a `value`
    /// error naming the table's structure family.
    pub fn parse_struct(
        &mut self,
        ctx: &mut ViewContext,
        table: &[u8],
        offset: usize,
        kind: u8,
        length: usize,
        captures: &mut Captures,
        cross: &mut Vec<CrossEntry>,
    ) {
        let entries: &'static [StructInfo] = self.entries;
        let Some(entry) = entries.get(kind as usize) else {
            ctx.error(
                ErrorKind::Value,
                format_args!("Unknown {} type 0x{kind:X} at offset 0x{offset:X}", self.name),
            );
            return;
        };

        let index = self.counts[kind as usize];
        ctx.with_indent(|ctx| {
            ctx.item(format_args!("{}[{index}] (+0x{offset:X})", entry.name));
        });
        self.counts[kind as usize] += 1;

        let bytes = &table[offset..offset + length];
        match entry.handler {
            Handler::Fields(descriptors) => {
                ctx.with_indent(|ctx| {
                    parse_fields(ctx, entry.name, bytes, descriptors, captures, true);
                });
            }
            Handler::Custom(dispatch) => dispatch(ctx, bytes, offset, cross),
            Handler::Unimplemented => {
                ctx.fatal(format_args!("no handler for {} ({})", entry.name, self.name));
            }
        }
    }

    /// Per-table instance summary, filtered by architecture compatibility:
    /// compatible kinds always report their count; incompatible kinds are
    /// silent at zero and an error otherwise.
    pub fn report_counts(&self, ctx: &mut ViewContext) {
        let arch = ctx.config().arch;
        for (entry, count) in self.entries.iter().zip(&self.counts) {
            if entry.arch.intersects(arch) {
                ctx.info(format_args!("{:<28} : {count}", entry.name));
            } else if *count != 0 {
                ctx.error(
                    ErrorKind::Value,
                    format_args!("{} structure not valid for the target architecture", entry.name),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::arch::{ArchSet, APIC_ARCHES, GIC_ARCHES};
    use crate::config::ViewConfig;
    use crate::field::FieldFormat;
    use crate::report::StringSink;

    const FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("Type", 1, 0, FieldFormat::UintHex),
        FieldDescriptor::new("Length", 1, 1, FieldFormat::UintDec),
        FieldDescriptor::new("Value", 2, 2, FieldFormat::UintHex),
    ];

    const ENTRIES: &[StructInfo] = &[
        StructInfo { name: "Widget", kind: 0, arch: APIC_ARCHES, min_len: 4, handler: Handler::Fields(FIELDS) },
        StructInfo { name: "Gadget", kind: 1, arch: GIC_ARCHES, min_len: 4, handler: Handler::Unimplemented },
    ];

    fn db() -> StructDb {
        StructDb::new("Test Structure", ENTRIES)
    }

    #[test]
    fn test_registry_index_invariant() {
        for (i, entry) in ENTRIES.iter().enumerate() {
            assert_eq!(entry.kind as usize, i);
        }
    }

    #[test]
    fn test_member_integrity() {
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, ViewConfig::default());
        let db = db();
        assert!(db.member_integrity(&mut ctx, 0, 4, 0, 16));
        assert!(!db.member_integrity(&mut ctx, 0, 0, 0, 16));
        assert!(!db.member_integrity(&mut ctx, 0, 12, 8, 16));
        assert!(!db.member_integrity(&mut ctx, 0, 3, 0, 16));
        // Unknown kinds get no fixed-size check.
        assert!(db.member_integrity(&mut ctx, 9, 2, 0, 16));
        assert_eq!(ctx.error_count_of(ErrorKind::Length), 3);
    }

    #[test]
    fn test_parse_struct_counts_and_unknown() {
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, ViewConfig::default());
        let mut db = db();
        let table = [0u8, 4, 0xAD, 0xDE];
        let mut captures = Captures::new();
        let mut cross = Vec::new();

        db.parse_struct(&mut ctx, &table, 0, 0, 4, &mut captures, &mut cross);
        db.parse_struct(&mut ctx, &table, 0, 0, 4, &mut captures, &mut cross);
        assert_eq!(db.count(0), 2);

        db.parse_struct(&mut ctx, &table, 0, 7, 4, &mut captures, &mut cross);
        assert_eq!(ctx.error_count_of(ErrorKind::Value), 1);

        db.reset_counts();
        assert_eq!(db.count(0), 0);
        drop(ctx);
        assert!(sink.output().contains("Widget[0] (+0x0)"));
        assert!(sink.output().contains("Widget[1] (+0x0)"));
    }

    #[test]
    fn test_unimplemented_is_fatal() {
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, ViewConfig::default());
        let mut db = db();
        let table = [1u8, 4, 0, 0];
        db.parse_struct(&mut ctx, &table, 0, 1, 4, &mut Captures::new(), &mut Vec::new());
        assert_eq!(ctx.error_count(), 1);
        drop(ctx);
        assert!(sink.output().contains("FATAL"));
    }

    #[test]
    fn test_arch_count_reporting() {
        let mut sink = StringSink::new();
        let config = ViewConfig { arch: ArchSet::X64, ..Default::default() };
        let mut ctx = ViewContext::new(&mut sink, config);
        let mut db = db();
        let table = [0u8, 4, 0, 0, 1, 4, 0, 0];
        let mut captures = Captures::new();
        let mut cross = Vec::new();
        db.parse_struct(&mut ctx, &table, 0, 0, 4, &mut captures, &mut cross);

        // Gadget is GIC-only; with a zero count it stays silent.
        db.report_counts(&mut ctx);
        assert_eq!(ctx.error_count_of(ErrorKind::Value), 0);

        // A GIC structure showing up in an X64 image is an error.
        db.parse_struct(&mut ctx, &table, 4, 1, 4, &mut captures, &mut cross);
        let before = ctx.error_count();
        db.report_counts(&mut ctx);
        assert_eq!(ctx.error_count(), before + 1);
        drop(ctx);
        assert!(sink.output().contains("not valid for the target architecture"));
    }
}
