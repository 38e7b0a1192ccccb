//! MCFG Builder.
//!
//! Assembles the PCI Express memory-mapped configuration-space table from
//! the repository's PCI configuration-space objects.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use alloc::vec;
use alloc::vec::Vec;

use scroll::{Pwrite, LE};

use tarnish_acpi::mcfg::{ALLOCATION_LEN, RESERVED_LEN};
use tarnish_acpi::signature::{self, MCFG_SIZE};

use crate::error::GenError;
use crate::objects::{ObjectId, PlatformObject, StdObjectId};
use crate::repo::PlatformRepository;
use crate::tables::{finalize, typed, write_header, TableInfo};

/// Build an MCFG from the repository's configuration-space allocations.
pub fn build_mcfg(repo: &dyn PlatformRepository, info: &TableInfo) -> Result<Vec<u8>, GenError> {
    let allocations = typed(repo.objects(ObjectId::Std(StdObjectId::PciConfigSpace), None)?, |o| match o {
        PlatformObject::PciConfigSpace(c) => Some(c),
        _ => None,
    })?;

    for allocation in &allocations {
        if allocation.start_bus_number > allocation.end_bus_number {
            log::error!(
                "MCFG: start bus 0x{:X} is above end bus 0x{:X}",
                allocation.start_bus_number,
                allocation.end_bus_number
            );
            return Err(GenError::InvalidParameter);
        }
    }

    let length = MCFG_SIZE + allocations.len() * ALLOCATION_LEN;
    let length_field = u32::try_from(length).map_err(|_| GenError::InvalidParameter)?;

    let mut buf = vec![0u8; length];
    let mut offset = write_header(&mut buf, signature::MCFG, length_field, signature::ACPI_MCFG_REVISION, info)?;
    offset += RESERVED_LEN;

    for allocation in &allocations {
        buf.gwrite_with(allocation.base_address, &mut offset, LE)?;
        buf.gwrite_with(allocation.pci_segment_group_number, &mut offset, LE)?;
        buf.gwrite_with(allocation.start_bus_number, &mut offset, LE)?;
        buf.gwrite_with(allocation.end_bus_number, &mut offset, LE)?;
        buf.gwrite_with(0u32, &mut offset, LE)?;
    }
    debug_assert_eq!(offset, length);

    finalize(&mut buf);
    Ok(buf)
}
