//! Generic Address Structure Rendering.
//!
//! The GAS appears inline in several tables (FADT, SPCR, DBG2). Fields that
//! hold one are rendered through [`render_gas`], which drives the generic
//! parser over the GAS descriptor table one indent level deeper.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use crate::field::{Captures, FieldDescriptor, FieldFormat};
use crate::parser::parse_fields;
use crate::report::ViewContext;

pub const GAS_DESCRIPTORS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Address Space ID", 1, 0, FieldFormat::UintHex),
    FieldDescriptor::new("Register Bit Width", 1, 1, FieldFormat::UintDec),
    FieldDescriptor::new("Register Bit Offset", 1, 2, FieldFormat::UintDec),
    FieldDescriptor::new("Access Size", 1, 3, FieldFormat::UintDec),
    FieldDescriptor::new("Address", 8, 4, FieldFormat::UintHex),
];

/// Custom renderer for a field holding a Generic Address Structure.
pub fn render_gas(ctx: &mut ViewContext, name: &str, bytes: &[u8]) {
    ctx.info(format_args!("{name:<28} :"));
    parse_fields(ctx, name, bytes, GAS_DESCRIPTORS, &mut Captures::new(), true);
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::config::ViewConfig;
    use crate::report::StringSink;
    use tarnish_acpi::acpi_table::GAS_LEN;

    #[test]
    fn test_descriptor_offsets_match_packed_layout() {
        use memoffset::offset_of;
        use tarnish_acpi::acpi_table::GenericAddressStructure;

        assert_eq!(GAS_DESCRIPTORS[0].offset, offset_of!(GenericAddressStructure, address_space_id));
        assert_eq!(GAS_DESCRIPTORS[1].offset, offset_of!(GenericAddressStructure, register_bit_width));
        assert_eq!(GAS_DESCRIPTORS[2].offset, offset_of!(GenericAddressStructure, register_bit_offset));
        assert_eq!(GAS_DESCRIPTORS[3].offset, offset_of!(GenericAddressStructure, access_size));
        assert_eq!(GAS_DESCRIPTORS[4].offset, offset_of!(GenericAddressStructure, address));
        let total: usize = GAS_DESCRIPTORS.iter().map(|d| d.length).sum();
        assert_eq!(total, GAS_LEN);
    }

    #[test]
    fn test_gas_walk_over_valid_gas() {
        // AddrSpace=0, Width=0x40, Offset=0, Size=4, Address=0xF00.
        let bytes = [0x00u8, 0x40, 0x00, 0x04, 0x00, 0x0F, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];

        let mut sink = StringSink::new();
        let mut ctx = ViewContext::new(&mut sink, ViewConfig::default());
        let consumed = parse_fields(&mut ctx, "GAS", &bytes, GAS_DESCRIPTORS, &mut Captures::new(), true);
        assert_eq!(consumed, GAS_LEN);
        assert_eq!(ctx.error_count(), 0);
        drop(ctx);

        // Five fields traced, in descriptor order.
        let out = sink.output();
        let lines: alloc::vec::Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("Address Space ID"));
        assert!(lines[1].contains("Register Bit Width"));
        assert!(lines[2].contains("Register Bit Offset"));
        assert!(lines[3].contains("Access Size"));
        assert!(lines[4].contains("Address"));
        assert!(lines[1].contains("64"));
        assert!(lines[4].contains("0xF00"));
    }
}
