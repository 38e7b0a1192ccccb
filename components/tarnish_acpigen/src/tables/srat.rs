//! SRAT Builder.
//!
//! Assembles a System Resource Affinity Table from the GICC affinity, GIC
//! ITS affinity, and memory affinity object families, ACPI 6.3 section
//! 5.2.16.
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

use tarnish_acpi::signature::{self, SRAT_SIZE};
use tarnish_acpi::srat;

use crate::error::GenError;
use crate::objects::{GiccAffinityInfo, ItsAffinityInfo, MemoryAffinityInfo, ObjectId, PlatformObject, StdObjectId};
use crate::repo::PlatformRepository;
use crate::tables::{finalize, typed, write_header, TableInfo};

fn write_gicc_affinity(buf: &mut [u8], offset: &mut usize, info: &GiccAffinityInfo) -> Result<(), GenError> {
    buf.gwrite_with(srat::GICC_AFFINITY, offset, LE)?;
    buf.gwrite_with(srat::GICC_AFFINITY_LEN as u8, offset, LE)?;
    buf.gwrite_with(info.proximity_domain, offset, LE)?;
    buf.gwrite_with(info.acpi_processor_uid, offset, LE)?;
    buf.gwrite_with(info.flags, offset, LE)?;
    buf.gwrite_with(info.clock_domain, offset, LE)?;
    Ok(())
}

fn write_its_affinity(buf: &mut [u8], offset: &mut usize, info: &ItsAffinityInfo) -> Result<(), GenError> {
    buf.gwrite_with(srat::GIC_ITS_AFFINITY, offset, LE)?;
    buf.gwrite_with(srat::GIC_ITS_AFFINITY_LEN as u8, offset, LE)?;
    buf.gwrite_with(info.proximity_domain, offset, LE)?;
    buf.gwrite_with(0u16, offset, LE)?;
    buf.gwrite_with(info.its_id, offset, LE)?;
    Ok(())
}

fn write_memory_affinity(buf: &mut [u8], offset: &mut usize, info: &MemoryAffinityInfo) -> Result<(), GenError> {
    buf.gwrite_with(srat::MEMORY_AFFINITY, offset, LE)?;
    buf.gwrite_with(srat::MEMORY_AFFINITY_LEN as u8, offset, LE)?;
    buf.gwrite_with(info.proximity_domain, offset, LE)?;
    buf.gwrite_with(0u16, offset, LE)?;
    buf.gwrite_with(info.base_address as u32, offset, LE)?;
    buf.gwrite_with((info.base_address >> 32) as u32, offset, LE)?;
    buf.gwrite_with(info.length as u32, offset, LE)?;
    buf.gwrite_with((info.length >> 32) as u32, offset, LE)?;
    buf.gwrite_with(0u32, offset, LE)?;
    buf.gwrite_with(info.flags, offset, LE)?;
    buf.gwrite_with(0u64, offset, LE)?;
    Ok(())
}

/// Build an SRAT from the repository's affinity objects.
pub fn build_srat(repo: &dyn PlatformRepository, info: &TableInfo) -> Result<Vec<u8>, GenError> {
    let gicc_affinities = typed(repo.objects(ObjectId::Std(StdObjectId::GiccAffinity), None)?, |o| match o {
        PlatformObject::GiccAffinity(a) => Some(a),
        _ => None,
    })?;
    let its_affinities = typed(repo.objects(ObjectId::Std(StdObjectId::ItsAffinity), None)?, |o| match o {
        PlatformObject::ItsAffinity(a) => Some(a),
        _ => None,
    })?;
    let memory_affinities = typed(repo.objects(ObjectId::Std(StdObjectId::MemoryAffinity), None)?, |o| match o {
        PlatformObject::MemoryAffinity(a) => Some(a),
        _ => None,
    })?;

    let length = SRAT_SIZE
        + gicc_affinities.len() * srat::GICC_AFFINITY_LEN
        + its_affinities.len() * srat::GIC_ITS_AFFINITY_LEN
        + memory_affinities.len() * srat::MEMORY_AFFINITY_LEN;
    let length_field = u32::try_from(length).map_err(|_| GenError::InvalidParameter)?;

    let mut buf = vec![0u8; length];
    let mut offset = write_header(&mut buf, signature::SRAT, length_field, signature::ACPI_6_3_SRAT_REVISION, info)?;

    // Reserved dword reads 1 for backward compatibility, then 8 reserved
    // bytes.
    buf.gwrite_with(srat::SRAT_RESERVED_DWORD, &mut offset, LE)?;
    buf.gwrite_with(0u64, &mut offset, LE)?;

    for affinity in &gicc_affinities {
        write_gicc_affinity(&mut buf, &mut offset, affinity)?;
    }
    for affinity in &its_affinities {
        write_its_affinity(&mut buf, &mut offset, affinity)?;
    }
    for affinity in &memory_affinities {
        write_memory_affinity(&mut buf, &mut offset, affinity)?;
    }
    debug_assert_eq!(offset, length);

    finalize(&mut buf);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::repo::ObjectStore;
    use tarnish_acpi::checksum;
    use tarnish_acpiview::arch::ArchSet;
    use tarnish_acpiview::{tables, StringSink, ViewConfig, ViewContext};

    fn store() -> ObjectStore {
        let mut store = ObjectStore::new();
        store.add_object(
            None,
            PlatformObject::GiccAffinity(GiccAffinityInfo { proximity_domain: 0, acpi_processor_uid: 0, flags: 1, clock_domain: 0 }),
        );
        store.add_object(None, PlatformObject::ItsAffinity(ItsAffinityInfo { proximity_domain: 0, its_id: 1 }));
        store.add_object(
            None,
            PlatformObject::MemoryAffinity(MemoryAffinityInfo {
                proximity_domain: 0,
                base_address: 0x8_0000_0000,
                length: 0x2_0000_0000,
                flags: 1,
            }),
        );
        store
    }

    #[test]
    fn test_layout_and_checksum() {
        let table = build_srat(&store(), &TableInfo::default()).unwrap();
        assert_eq!(table.len(), 48 + 18 + 12 + 40);
        assert_eq!(&table[0..4], b"SRAT");
        assert_eq!(u32::from_le_bytes(table[36..40].try_into().unwrap()), 1);
        assert_eq!(checksum::byte_sum(&table), 0);
        // Region order: GICC affinity, ITS affinity, memory affinity.
        assert_eq!(table[48], srat::GICC_AFFINITY);
        assert_eq!(table[48 + 18], srat::GIC_ITS_AFFINITY);
        assert_eq!(table[48 + 18 + 12], srat::MEMORY_AFFINITY);
        // 64-bit base address split low/high.
        let memory = 48 + 18 + 12;
        assert_eq!(u32::from_le_bytes(table[memory + 8..memory + 12].try_into().unwrap()), 0);
        assert_eq!(u32::from_le_bytes(table[memory + 12..memory + 16].try_into().unwrap()), 8);
    }

    #[test]
    fn test_round_trip_through_inspector() {
        let table = build_srat(&store(), &TableInfo::default()).unwrap();

        let mut sink = StringSink::new();
        let config = ViewConfig { arch: ArchSet::AARCH64, ..Default::default() };
        let mut ctx = ViewContext::new(&mut sink, config);
        tables::parse_table(&mut ctx, tarnish_acpi::signature::SRAT, &table, 3);
        let errors = ctx.error_count();
        drop(ctx);
        assert_eq!(errors, 0, "inspector output:\n{}", sink.output());
    }
}
