//! Field Descriptors and Capture Slots.
//!
//! A structure's packed layout is described by a constant table of
//! [`FieldDescriptor`] records. Per-field behavior (rendering, validation)
//! rides along as optional function values, so dispatch stays data-driven.
//!
//! Capture slots let a descriptor publish the byte range of its field into
//! a per-dispatcher [`Captures`] sidecar. A captured range is only
//! meaningful against the buffer the parser walked; resolving it through
//! [`Captures::bytes`] re-borrows that buffer, which keeps the aliasing
//! visible to the compiler.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use core::ops::Range;

use scroll::{Pread, LE};

use crate::report::{ErrorKind, ViewContext};

/// Renders one field: receives the display name and the field's bytes.
pub type RenderFn = fn(&mut ViewContext, &str, &[u8]);

/// Validates one field under consistency mode: receives the field's bytes
/// and the descriptor's context word.
pub type ValidateFn = fn(&mut ViewContext, &[u8], u32);

/// Identifies one capture slot within a dispatcher's [`Captures`] sidecar.
pub type CaptureId = usize;

/// How the generic parser renders a field it has bounds-checked.
#[derive(Clone, Copy)]
pub enum FieldFormat {
    /// Little-endian unsigned integer, hexadecimal. Field length must be
    /// 1, 2, 4, or 8.
    UintHex,
    /// Little-endian unsigned integer, decimal. Same length rule.
    UintDec,
    /// Fixed-size ASCII characters; non-printable bytes render as '.'.
    Ascii,
    /// Raw bytes as space-separated hex pairs.
    HexDump,
    /// Custom renderer.
    Custom(RenderFn),
    /// Parsed and bounds-checked but never printed (header-only fields).
    Hidden,
}

/// Immutable description of one packed field within a structure.
pub struct FieldDescriptor {
    pub name: &'static str,
    /// Declared byte length.
    pub length: usize,
    /// Declared byte offset from the start of the enclosing structure.
    /// Within one descriptor table, offsets are strictly increasing.
    pub offset: usize,
    pub format: FieldFormat,
    pub capture: Option<CaptureId>,
    pub validator: Option<ValidateFn>,
    /// Passed to the validator verbatim.
    pub context: u32,
}

impl FieldDescriptor {
    /// Plain field with no capture and no validator.
    pub const fn new(name: &'static str, length: usize, offset: usize, format: FieldFormat) -> Self {
        FieldDescriptor { name, length, offset, format, capture: None, validator: None, context: 0 }
    }

    pub const fn with_capture(mut self, id: CaptureId) -> Self {
        self.capture = Some(id);
        self
    }

    pub const fn with_validator(mut self, validator: ValidateFn, context: u32) -> Self {
        self.validator = Some(validator);
        self.context = context;
        self
    }
}

/// Number of capture slots a sidecar holds; no dispatcher needs more.
pub const MAX_CAPTURE_SLOTS: usize = 16;

/// Per-dispatcher capture sidecar, overwritten on every sub-structure.
pub struct Captures {
    slots: [Option<Range<usize>>; MAX_CAPTURE_SLOTS],
}

impl Default for Captures {
    fn default() -> Self {
        Captures::new()
    }
}

impl Captures {
    pub fn new() -> Self {
        Captures { slots: core::array::from_fn(|_| None) }
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    pub fn clear_slot(&mut self, id: CaptureId) {
        self.slots[id] = None;
    }

    pub fn set(&mut self, id: CaptureId, range: Range<usize>) {
        self.slots[id] = Some(range);
    }

    pub fn range(&self, id: CaptureId) -> Option<Range<usize>> {
        self.slots[id].clone()
    }

    /// Resolve a captured range against the buffer it was parsed from.
    pub fn bytes<'b>(&self, id: CaptureId, buf: &'b [u8]) -> Option<&'b [u8]> {
        let range = self.slots[id].clone()?;
        buf.get(range)
    }

    pub fn read_u8(&self, id: CaptureId, buf: &[u8]) -> Option<u8> {
        self.bytes(id, buf)?.pread_with(0, LE).ok()
    }

    pub fn read_u16(&self, id: CaptureId, buf: &[u8]) -> Option<u16> {
        self.bytes(id, buf)?.pread_with(0, LE).ok()
    }

    pub fn read_u32(&self, id: CaptureId, buf: &[u8]) -> Option<u32> {
        self.bytes(id, buf)?.pread_with(0, LE).ok()
    }

    pub fn read_u64(&self, id: CaptureId, buf: &[u8]) -> Option<u64> {
        self.bytes(id, buf)?.pread_with(0, LE).ok()
    }
}

/// Read a 1/2/4/8-byte little-endian unsigned value. Returns `None` for any
/// other length; the caller reports the descriptor as malformed.
pub fn read_uint(bytes: &[u8]) -> Option<u64> {
    match bytes.len() {
        1 => bytes.pread_with::<u8>(0, LE).ok().map(u64::from),
        2 => bytes.pread_with::<u16>(0, LE).ok().map(u64::from),
        4 => bytes.pread_with::<u32>(0, LE).ok().map(u64::from),
        8 => bytes.pread_with::<u64>(0, LE).ok(),
        _ => None,
    }
}

/// Validator: every byte of the field must be zero.
pub fn validate_reserved_zero(ctx: &mut ViewContext, bytes: &[u8], _context: u32) {
    if bytes.iter().any(|b| *b != 0) {
        ctx.error(ErrorKind::Value, format_args!("Reserved field must be zero"));
    }
}

/// Validator: the field must equal the descriptor's context word.
pub fn validate_equals(ctx: &mut ViewContext, bytes: &[u8], context: u32) {
    match read_uint(bytes) {
        Some(value) if value == u64::from(context) => {}
        Some(value) => {
            ctx.error(ErrorKind::Value, format_args!("Field must be {context}, found {value}"));
        }
        None => ctx.error(ErrorKind::Parse, format_args!("Field has no integer representation")),
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::config::ViewConfig;
    use crate::report::StringSink;

    #[test]
    fn test_read_uint_lengths() {
        assert_eq!(read_uint(&[0xAB]), Some(0xAB));
        assert_eq!(read_uint(&[0x34, 0x12]), Some(0x1234));
        assert_eq!(read_uint(&[0x78, 0x56, 0x34, 0x12]), Some(0x1234_5678));
        assert_eq!(read_uint(&[1, 0, 0, 0, 0, 0, 0, 0x80]), Some(0x8000_0000_0000_0001));
        assert_eq!(read_uint(&[1, 2, 3]), None);
    }

    #[test]
    fn test_captures_resolve() {
        let buf = [0u8, 0x0B, 0x50, 0x00];
        let mut captures = Captures::new();
        captures.set(0, 1..2);
        captures.set(1, 2..4);
        assert_eq!(captures.read_u8(0, &buf), Some(0x0B));
        assert_eq!(captures.read_u16(1, &buf), Some(0x0050));
        captures.clear_slot(0);
        assert_eq!(captures.read_u8(0, &buf), None);

        // A range past the buffer end resolves to nothing.
        captures.set(2, 3..9);
        assert!(captures.bytes(2, &buf).is_none());
    }

    #[test]
    fn test_validate_equals_reports() {
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, ViewConfig::default());
        validate_equals(&mut ctx, &[5, 0, 0, 0], 5);
        assert_eq!(ctx.error_count(), 0);
        validate_equals(&mut ctx, &[6, 0, 0, 0], 5);
        assert_eq!(ctx.error_count_of(ErrorKind::Value), 1);
    }
}
