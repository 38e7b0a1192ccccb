//! MADT Builder.
//!
//! Assembles a Multiple APIC Description Table from the GIC object
//! families, ACPI 6.3 section 5.2.12. Structures are emitted per kind:
//! GICC, GICD, GIC MSI frame, GICR, GIC ITS. At most one GICD may exist.
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

use tarnish_acpi::madt;
use tarnish_acpi::signature::{self, MADT_SIZE};

use crate::error::GenError;
use crate::objects::{
    GicItsInfo, GicMsiFrameInfo, GicRedistributorInfo, GiccInfo, GicdInfo, ObjectId, PlatformObject, StdObjectId,
};
use crate::repo::PlatformRepository;
use crate::tables::{finalize, typed, write_header, TableInfo};

/// MADT revision at which the SPE overflow interrupt bytes stopped being
/// reserved space.
const SPE_REVISION: u8 = 5;

fn write_gicc(buf: &mut [u8], offset: &mut usize, info: &GiccInfo, revision: u8) -> Result<(), GenError> {
    buf.gwrite_with(madt::GICC, offset, LE)?;
    buf.gwrite_with(madt::GICC_LEN as u8, offset, LE)?;
    buf.gwrite_with(0u16, offset, LE)?;
    buf.gwrite_with(info.cpu_interface_number, offset, LE)?;
    buf.gwrite_with(info.acpi_processor_uid, offset, LE)?;
    buf.gwrite_with(info.flags, offset, LE)?;
    buf.gwrite_with(info.parking_protocol_version, offset, LE)?;
    buf.gwrite_with(info.performance_interrupt_gsiv, offset, LE)?;
    buf.gwrite_with(info.parked_address, offset, LE)?;
    buf.gwrite_with(info.physical_base_address, offset, LE)?;
    buf.gwrite_with(info.gicv, offset, LE)?;
    buf.gwrite_with(info.gich, offset, LE)?;
    buf.gwrite_with(info.vgic_maintenance_interrupt, offset, LE)?;
    buf.gwrite_with(info.gicr_base_address, offset, LE)?;
    buf.gwrite_with(info.mpidr, offset, LE)?;
    buf.gwrite_with(info.processor_power_efficiency_class, offset, LE)?;
    buf.gwrite_with(0u8, offset, LE)?;
    // Before revision 5 these two bytes are reserved space and stay zero;
    // the 80-byte layout is identical either way.
    let spe = if revision < SPE_REVISION { 0 } else { info.spe_overflow_interrupt };
    buf.gwrite_with(spe, offset, LE)?;
    Ok(())
}

fn write_gicd(buf: &mut [u8], offset: &mut usize, info: &GicdInfo) -> Result<(), GenError> {
    buf.gwrite_with(madt::GICD, offset, LE)?;
    buf.gwrite_with(madt::GICD_LEN as u8, offset, LE)?;
    buf.gwrite_with(0u16, offset, LE)?;
    buf.gwrite_with(0u32, offset, LE)?; // GIC ID; a single distributor is always id 0
    buf.gwrite_with(info.physical_base_address, offset, LE)?;
    buf.gwrite_with(madt::GICD_SYSTEM_VECTOR_BASE, offset, LE)?;
    buf.gwrite_with(info.gic_version, offset, LE)?;
    buf.gwrite_with::<&[u8]>(&[0u8; 3], offset, ())?;
    Ok(())
}

fn write_msi_frame(buf: &mut [u8], offset: &mut usize, info: &GicMsiFrameInfo) -> Result<(), GenError> {
    buf.gwrite_with(madt::GIC_MSI_FRAME, offset, LE)?;
    buf.gwrite_with(madt::GIC_MSI_FRAME_LEN as u8, offset, LE)?;
    buf.gwrite_with(0u16, offset, LE)?;
    buf.gwrite_with(info.gic_msi_frame_id, offset, LE)?;
    buf.gwrite_with(info.physical_base_address, offset, LE)?;
    buf.gwrite_with(info.flags, offset, LE)?;
    buf.gwrite_with(info.spi_count, offset, LE)?;
    buf.gwrite_with(info.spi_base, offset, LE)?;
    Ok(())
}

fn write_gicr(buf: &mut [u8], offset: &mut usize, info: &GicRedistributorInfo) -> Result<(), GenError> {
    buf.gwrite_with(madt::GICR, offset, LE)?;
    buf.gwrite_with(madt::GICR_LEN as u8, offset, LE)?;
    buf.gwrite_with(0u16, offset, LE)?;
    buf.gwrite_with(info.discovery_range_base_address, offset, LE)?;
    buf.gwrite_with(info.discovery_range_length, offset, LE)?;
    Ok(())
}

fn write_gic_its(buf: &mut [u8], offset: &mut usize, info: &GicItsInfo) -> Result<(), GenError> {
    buf.gwrite_with(madt::GIC_ITS, offset, LE)?;
    buf.gwrite_with(madt::GIC_ITS_LEN as u8, offset, LE)?;
    buf.gwrite_with(0u16, offset, LE)?;
    buf.gwrite_with(info.gic_its_id, offset, LE)?;
    buf.gwrite_with(info.physical_base_address, offset, LE)?;
    buf.gwrite_with(0u32, offset, LE)?;
    Ok(())
}

/// Build a MADT from the repository's GIC objects.
pub fn build_madt(repo: &dyn PlatformRepository, info: &TableInfo, revision: u8) -> Result<Vec<u8>, GenError> {
    let giccs = typed(repo.objects(ObjectId::Std(StdObjectId::Gicc), None)?, |o| match o {
        PlatformObject::Gicc(g) => Some(g),
        _ => None,
    })?;
    let gicds = typed(repo.objects(ObjectId::Std(StdObjectId::Gicd), None)?, |o| match o {
        PlatformObject::Gicd(g) => Some(g),
        _ => None,
    })?;
    let msi_frames = typed(repo.objects(ObjectId::Std(StdObjectId::GicMsiFrame), None)?, |o| match o {
        PlatformObject::GicMsiFrame(g) => Some(g),
        _ => None,
    })?;
    let gicrs = typed(repo.objects(ObjectId::Std(StdObjectId::GicRedistributor), None)?, |o| match o {
        PlatformObject::GicRedistributor(g) => Some(g),
        _ => None,
    })?;
    let its_list = typed(repo.objects(ObjectId::Std(StdObjectId::GicIts), None)?, |o| match o {
        PlatformObject::GicIts(g) => Some(g),
        _ => None,
    })?;

    if gicds.len() > 1 {
        log::error!("MADT: {} GICD objects supplied, at most one is allowed", gicds.len());
        return Err(GenError::InvalidParameter);
    }

    let length = MADT_SIZE
        + giccs.len() * madt::GICC_LEN
        + gicds.len() * madt::GICD_LEN
        + msi_frames.len() * madt::GIC_MSI_FRAME_LEN
        + gicrs.len() * madt::GICR_LEN
        + its_list.len() * madt::GIC_ITS_LEN;
    let length_field = u32::try_from(length).map_err(|_| GenError::InvalidParameter)?;

    let mut buf = vec![0u8; length];
    let mut offset = write_header(&mut buf, signature::MADT, length_field, revision, info)?;

    // Local interrupt controller address and flags are zero on GIC
    // platforms.
    buf.gwrite_with(0u32, &mut offset, LE)?;
    buf.gwrite_with(0u32, &mut offset, LE)?;

    for gicc in &giccs {
        write_gicc(&mut buf, &mut offset, gicc, revision)?;
    }
    for gicd in &gicds {
        write_gicd(&mut buf, &mut offset, gicd)?;
    }
    for frame in &msi_frames {
        write_msi_frame(&mut buf, &mut offset, frame)?;
    }
    for gicr in &gicrs {
        write_gicr(&mut buf, &mut offset, gicr)?;
    }
    for its in &its_list {
        write_gic_its(&mut buf, &mut offset, its)?;
    }
    debug_assert_eq!(offset, length);

    finalize(&mut buf);
    Ok(buf)
}
