//! MADT Interrupt Controller Structure Constants.
//!
//! Type tags and fixed lengths for the interrupt controller structures of
//! the Multiple APIC Description Table, ACPI 6.3 section 5.2.12.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

// Interrupt controller structure type tags.
pub const LOCAL_APIC: u8 = 0x00;
pub const IO_APIC: u8 = 0x01;
pub const INTERRUPT_SOURCE_OVERRIDE: u8 = 0x02;
pub const NMI_SOURCE: u8 = 0x03;
pub const LOCAL_APIC_NMI: u8 = 0x04;
pub const LOCAL_APIC_ADDRESS_OVERRIDE: u8 = 0x05;
pub const IO_SAPIC: u8 = 0x06;
pub const LOCAL_SAPIC: u8 = 0x07;
pub const PLATFORM_INTERRUPT_SOURCES: u8 = 0x08;
pub const LOCAL_X2APIC: u8 = 0x09;
pub const LOCAL_X2APIC_NMI: u8 = 0x0A;
pub const GICC: u8 = 0x0B;
pub const GICD: u8 = 0x0C;
pub const GIC_MSI_FRAME: u8 = 0x0D;
pub const GICR: u8 = 0x0E;
pub const GIC_ITS: u8 = 0x0F;

/// Number of interrupt controller structure types defined by ACPI 6.3.
pub const STRUCTURE_TYPE_COUNT: usize = 0x10;

// Fixed structure lengths. LOCAL_SAPIC carries a trailing UID string, so its
// value here is a minimum.
pub const LOCAL_APIC_LEN: usize = 8;
pub const IO_APIC_LEN: usize = 12;
pub const INTERRUPT_SOURCE_OVERRIDE_LEN: usize = 10;
pub const NMI_SOURCE_LEN: usize = 8;
pub const LOCAL_APIC_NMI_LEN: usize = 6;
pub const LOCAL_APIC_ADDRESS_OVERRIDE_LEN: usize = 12;
pub const IO_SAPIC_LEN: usize = 16;
pub const LOCAL_SAPIC_MIN_LEN: usize = 16;
pub const PLATFORM_INTERRUPT_SOURCES_LEN: usize = 16;
pub const LOCAL_X2APIC_LEN: usize = 16;
pub const LOCAL_X2APIC_NMI_LEN: usize = 12;
pub const GICC_LEN: usize = 80;
pub const GICD_LEN: usize = 24;
pub const GIC_MSI_FRAME_LEN: usize = 24;
pub const GICR_LEN: usize = 16;
pub const GIC_ITS_LEN: usize = 20;

/// Every interrupt controller structure starts with a one-byte type tag and
/// a one-byte length.
pub const STRUCTURE_HEADER_LEN: usize = 2;

/// GICD system vector base is reserved and must be zero.
pub const GICD_SYSTEM_VECTOR_BASE: u32 = 0;
