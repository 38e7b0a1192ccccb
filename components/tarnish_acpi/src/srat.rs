//! SRAT Resource Allocation Structure Constants.
//!
//! Type tags and fixed lengths for the static resource affinity structures
//! of the System Resource Affinity Table, ACPI 6.3 section 5.2.16.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

// Resource allocation structure type tags.
pub const PROCESSOR_APIC_AFFINITY: u8 = 0x00;
pub const MEMORY_AFFINITY: u8 = 0x01;
pub const X2APIC_AFFINITY: u8 = 0x02;
pub const GICC_AFFINITY: u8 = 0x03;
pub const GIC_ITS_AFFINITY: u8 = 0x04;
pub const GENERIC_INITIATOR_AFFINITY: u8 = 0x05;

/// Number of resource allocation structure types defined by ACPI 6.3.
pub const STRUCTURE_TYPE_COUNT: usize = 0x06;

pub const PROCESSOR_APIC_AFFINITY_LEN: usize = 16;
pub const MEMORY_AFFINITY_LEN: usize = 40;
pub const X2APIC_AFFINITY_LEN: usize = 24;
pub const GICC_AFFINITY_LEN: usize = 18;
pub const GIC_ITS_AFFINITY_LEN: usize = 12;
pub const GENERIC_INITIATOR_AFFINITY_LEN: usize = 32;

/// Every resource allocation structure starts with a one-byte type tag and
/// a one-byte length.
pub const STRUCTURE_HEADER_LEN: usize = 2;

/// The first reserved dword after the header must read 1 for backward
/// compatibility.
pub const SRAT_RESERVED_DWORD: u32 = 1;
