//! MCFG Configuration Space Constants.
//!
//! Layout constants for the PCI Express Memory-mapped Configuration Space
//! base address description table, PCI Firmware Specification 3.2.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

/// One configuration-space allocation: base address, segment group, start
/// and end bus numbers, and a reserved dword.
pub const ALLOCATION_LEN: usize = 16;

/// The 8 reserved bytes between the header and the allocation list.
pub const RESERVED_LEN: usize = 8;
