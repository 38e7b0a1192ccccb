//! FADT Parser.
//!
//! Fixed ACPI Description Table, ACPI 6.3 section 5.2.9. A long fixed
//! layout with no sub-structures; revision 6.3 is 276 bytes.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use tarnish_acpi::signature::FADT_SIZE;

use crate::field::{validate_reserved_zero, CaptureId, Captures, FieldDescriptor, FieldFormat};
use crate::parser::parse_fields;
use crate::report::{ErrorKind, ViewContext};
use crate::tables::{gas, HeaderInfo};

const FADT_DSDT: CaptureId = 0;
const FADT_X_DSDT: CaptureId = 1;
const FADT_FIRMWARE_CTRL: CaptureId = 2;
const FADT_X_FIRMWARE_CTRL: CaptureId = 3;

// Offsets are relative to the end of the standard header.
const FADT_BODY: &[FieldDescriptor] = &[
    FieldDescriptor::new("FIRMWARE_CTRL", 4, 0, FieldFormat::UintHex).with_capture(FADT_FIRMWARE_CTRL),
    FieldDescriptor::new("DSDT", 4, 4, FieldFormat::UintHex).with_capture(FADT_DSDT),
    FieldDescriptor::new("Reserved", 1, 8, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Preferred_PM_Profile", 1, 9, FieldFormat::UintDec),
    FieldDescriptor::new("SCI_INT", 2, 10, FieldFormat::UintDec),
    FieldDescriptor::new("SMI_CMD", 4, 12, FieldFormat::UintHex),
    FieldDescriptor::new("ACPI_ENABLE", 1, 16, FieldFormat::UintHex),
    FieldDescriptor::new("ACPI_DISABLE", 1, 17, FieldFormat::UintHex),
    FieldDescriptor::new("S4BIOS_REQ", 1, 18, FieldFormat::UintHex),
    FieldDescriptor::new("PSTATE_CNT", 1, 19, FieldFormat::UintHex),
    FieldDescriptor::new("PM1a_EVT_BLK", 4, 20, FieldFormat::UintHex),
    FieldDescriptor::new("PM1b_EVT_BLK", 4, 24, FieldFormat::UintHex),
    FieldDescriptor::new("PM1a_CNT_BLK", 4, 28, FieldFormat::UintHex),
    FieldDescriptor::new("PM1b_CNT_BLK", 4, 32, FieldFormat::UintHex),
    FieldDescriptor::new("PM2_CNT_BLK", 4, 36, FieldFormat::UintHex),
    FieldDescriptor::new("PM_TMR_BLK", 4, 40, FieldFormat::UintHex),
    FieldDescriptor::new("GPE0_BLK", 4, 44, FieldFormat::UintHex),
    FieldDescriptor::new("GPE1_BLK", 4, 48, FieldFormat::UintHex),
    FieldDescriptor::new("PM1_EVT_LEN", 1, 52, FieldFormat::UintDec),
    FieldDescriptor::new("PM1_CNT_LEN", 1, 53, FieldFormat::UintDec),
    FieldDescriptor::new("PM2_CNT_LEN", 1, 54, FieldFormat::UintDec),
    FieldDescriptor::new("PM_TMR_LEN", 1, 55, FieldFormat::UintDec),
    FieldDescriptor::new("GPE0_BLK_LEN", 1, 56, FieldFormat::UintDec),
    FieldDescriptor::new("GPE1_BLK_LEN", 1, 57, FieldFormat::UintDec),
    FieldDescriptor::new("GPE1_BASE", 1, 58, FieldFormat::UintDec),
    FieldDescriptor::new("CST_CNT", 1, 59, FieldFormat::UintHex),
    FieldDescriptor::new("P_LVL2_LAT", 2, 60, FieldFormat::UintDec),
    FieldDescriptor::new("P_LVL3_LAT", 2, 62, FieldFormat::UintDec),
    FieldDescriptor::new("FLUSH_SIZE", 2, 64, FieldFormat::UintDec),
    FieldDescriptor::new("FLUSH_STRIDE", 2, 66, FieldFormat::UintDec),
    FieldDescriptor::new("DUTY_OFFSET", 1, 68, FieldFormat::UintDec),
    FieldDescriptor::new("DUTY_WIDTH", 1, 69, FieldFormat::UintDec),
    FieldDescriptor::new("DAY_ALRM", 1, 70, FieldFormat::UintDec),
    FieldDescriptor::new("MON_ALRM", 1, 71, FieldFormat::UintDec),
    FieldDescriptor::new("CENTURY", 1, 72, FieldFormat::UintDec),
    FieldDescriptor::new("IAPC_BOOT_ARCH", 2, 73, FieldFormat::UintHex),
    FieldDescriptor::new("Reserved", 1, 75, FieldFormat::UintHex).with_validator(validate_reserved_zero, 0),
    FieldDescriptor::new("Flags", 4, 76, FieldFormat::UintHex),
    FieldDescriptor::new("RESET_REG", 12, 80, FieldFormat::Custom(gas::render_gas)),
    FieldDescriptor::new("RESET_VALUE", 1, 92, FieldFormat::UintHex),
    FieldDescriptor::new("ARM_BOOT_ARCH", 2, 93, FieldFormat::UintHex),
    FieldDescriptor::new("FADT Minor Version", 1, 95, FieldFormat::UintDec),
    FieldDescriptor::new("X_FIRMWARE_CTRL", 8, 96, FieldFormat::UintHex).with_capture(FADT_X_FIRMWARE_CTRL),
    FieldDescriptor::new("X_DSDT", 8, 104, FieldFormat::UintHex).with_capture(FADT_X_DSDT),
    FieldDescriptor::new("X_PM1a_EVT_BLK", 12, 112, FieldFormat::Custom(gas::render_gas)),
    FieldDescriptor::new("X_PM1b_EVT_BLK", 12, 124, FieldFormat::Custom(gas::render_gas)),
    FieldDescriptor::new("X_PM1a_CNT_BLK", 12, 136, FieldFormat::Custom(gas::render_gas)),
    FieldDescriptor::new("X_PM1b_CNT_BLK", 12, 148, FieldFormat::Custom(gas::render_gas)),
    FieldDescriptor::new("X_PM2_CNT_BLK", 12, 160, FieldFormat::Custom(gas::render_gas)),
    FieldDescriptor::new("X_PM_TMR_BLK", 12, 172, FieldFormat::Custom(gas::render_gas)),
    FieldDescriptor::new("X_GPE0_BLK", 12, 184, FieldFormat::Custom(gas::render_gas)),
    FieldDescriptor::new("X_GPE1_BLK", 12, 196, FieldFormat::Custom(gas::render_gas)),
    FieldDescriptor::new("SLEEP_CONTROL_REG", 12, 208, FieldFormat::Custom(gas::render_gas)),
    FieldDescriptor::new("SLEEP_STATUS_REG", 12, 220, FieldFormat::Custom(gas::render_gas)),
    FieldDescriptor::new("Hypervisor Vendor Identity", 8, 232, FieldFormat::UintHex),
];

pub fn parse(ctx: &mut ViewContext, buf: &[u8], revision: u8) {
    if !ctx.trace() {
        return;
    }
    if !super::check_header_fits(ctx, "FADT", buf) {
        return;
    }
    ctx.revision = revision;

    let mut header = HeaderInfo::new();
    let body = header.parse(ctx, buf, true);

    if ctx.consistency() && revision >= 6 && buf.len() < FADT_SIZE {
        ctx.error(
            ErrorKind::Length,
            format_args!("FADT: revision {revision} requires 0x{FADT_SIZE:X} bytes, table has 0x{:X}", buf.len()),
        );
    }

    let body_buf = &buf[body..];
    let mut captures = Captures::new();
    parse_fields(ctx, "FADT", body_buf, FADT_BODY, &mut captures, true);

    if !ctx.consistency() {
        return;
    }

    // Pointer pair checks: the 64-bit fields supersede the 32-bit ones, and
    // at least one of each pair must be set.
    let dsdt = captures.read_u32(FADT_DSDT, body_buf).unwrap_or(0);
    let x_dsdt = captures.read_u64(FADT_X_DSDT, body_buf).unwrap_or(0);
    if dsdt == 0 && x_dsdt == 0 {
        ctx.error(ErrorKind::Value, format_args!("FADT: neither DSDT nor X_DSDT is set"));
    } else if dsdt != 0 && x_dsdt != 0 {
        ctx.warn(format_args!("FADT: both DSDT and X_DSDT are set, X_DSDT takes precedence"));
    }

    let firmware_ctrl = captures.read_u32(FADT_FIRMWARE_CTRL, body_buf).unwrap_or(0);
    let x_firmware_ctrl = captures.read_u64(FADT_X_FIRMWARE_CTRL, body_buf).unwrap_or(0);
    if firmware_ctrl != 0 && x_firmware_ctrl != 0 {
        ctx.warn(format_args!("FADT: both FIRMWARE_CTRL and X_FIRMWARE_CTRL are set"));
    }
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

    fn fadt(x_dsdt: u64) -> alloc::vec::Vec<u8> {
        let mut buf = test_header(signature::FADT, FADT_SIZE as u32, 6);
        buf.resize(FADT_SIZE, 0);
        buf[95 + 36] = 3; // FADT minor version
        buf.pwrite_with(x_dsdt, 104 + 36, LE).unwrap();
        tarnish_acpi::checksum::finalize(&mut buf, 9);
        buf
    }

    #[test]
    fn test_descriptor_table_is_dense() {
        // The body descriptors tile the 240 bytes after the header without
        // gaps; the generic parser's return value proves it.
        let buf = fadt(0x1000);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, ViewConfig::default());
        let consumed =
            parse_fields(&mut ctx, "FADT", &buf[36..], FADT_BODY, &mut Captures::new(), false);
        assert_eq!(consumed, FADT_SIZE - 36);
        assert_eq!(ctx.error_count(), 0);
    }

    #[test]
    fn test_valid_fadt() {
        let buf = fadt(0x1000);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, ViewConfig::default());
        parse(&mut ctx, &buf, 6);
        assert_eq!(ctx.error_count(), 0);
        drop(ctx);
        assert!(sink.output().contains("X_DSDT"));
        assert!(sink.output().contains("SLEEP_CONTROL_REG"));
    }

    #[test]
    fn test_missing_dsdt_pointers() {
        let buf = fadt(0);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, ViewConfig::default());
        parse(&mut ctx, &buf, 6);
        assert_eq!(ctx.error_count_of(ErrorKind::Value), 1);
        drop(ctx);
        assert!(sink.output().contains("neither DSDT nor X_DSDT"));
    }

    #[test]
    fn test_short_table_for_revision() {
        let mut buf = fadt(0x1000);
        buf.truncate(244);
        buf.pwrite_with(244u32, 4, LE).unwrap();
        tarnish_acpi::checksum::finalize(&mut buf, 9);
        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, ViewConfig::default());
        parse(&mut ctx, &buf, 6);
        assert_eq!(ctx.error_count_of(ErrorKind::Length), 1);
    }
}
