//! IORT Builder.
//!
//! Assembles an IO Remapping Table per the IO Remapping Table Platform
//! Design Document, revision D. Nodes are sized and indexed first (token
//! to final offset), then emitted with every cross-reference resolved
//! through the node indexer: id-mapping output references, and the PMCG
//! node reference. Node kinds are laid out in fixed region order: ITS
//! group, named component, root complex, SMMUv1/v2, SMMUv3, PMCG.
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

use tarnish_acpi::iort;
use tarnish_acpi::signature::{self, IORT_SIZE, IORT_TABLE_REVISION};

use crate::error::GenError;
use crate::indexer::NodeIndexer;
use crate::objects::{
    ArmObjectId, IdMapping, ItsGroupInfo, NamedComponentInfo, ObjectId, PlatformObject, PmcgInfo, RootComplexInfo,
    SmmuV1V2Info, SmmuV3Info, Token,
};
use crate::repo::PlatformRepository;
use crate::tables::{finalize, typed, write_header, TableInfo};

fn align4(value: usize) -> usize {
    (value + 3) & !3
}

// Sizing functions; each must match its emission function byte for byte.

fn its_group_size(info: &ItsGroupInfo) -> usize {
    iort::ITS_GROUP_NODE_LEN + info.its_identifiers.len() * 4
}

fn named_component_size(info: &NamedComponentInfo) -> usize {
    iort::NAMED_COMPONENT_NODE_LEN
        + align4(info.object_name.len() + 1)
        + info.id_mapping_count as usize * iort::ID_MAPPING_LEN
}

fn root_complex_size(info: &RootComplexInfo) -> usize {
    iort::ROOT_COMPLEX_NODE_LEN + info.id_mapping_count as usize * iort::ID_MAPPING_LEN
}

fn smmu_v1_v2_size(info: &SmmuV1V2Info) -> usize {
    iort::SMMU_V1_V2_NODE_LEN
        + (info.context_interrupts.len() + info.pmu_interrupts.len()) * iort::SMMU_INTERRUPT_LEN
        + info.id_mapping_count as usize * iort::ID_MAPPING_LEN
}

fn smmu_v3_size(info: &SmmuV3Info) -> usize {
    iort::SMMU_V3_NODE_LEN + info.id_mapping_count as usize * iort::ID_MAPPING_LEN
}

fn pmcg_size(info: &PmcgInfo) -> usize {
    iort::PMCG_NODE_LEN + info.id_mapping_count as usize * iort::ID_MAPPING_LEN
}

/// Fetch the id-mapping array registered under `token` and check it holds
/// exactly the count the node declares.
fn id_mappings_for(
    repo: &dyn PlatformRepository,
    token: Token,
    count: u32,
) -> Result<Vec<IdMapping>, GenError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let mut lists = typed(repo.objects(ObjectId::Arm(ArmObjectId::IdMappingArray), Some(token))?, |o| match o {
        PlatformObject::IdMappingArray(m) => Some(m),
        _ => None,
    })?;
    let Some(mappings) = lists.pop() else {
        return Err(GenError::NotFound);
    };
    if !lists.is_empty() || mappings.len() != count as usize {
        log::error!("IORT: id-mapping array under token {:?} does not match the declared count {count}", token);
        return Err(GenError::InvalidParameter);
    }
    Ok(mappings)
}

fn write_node_header(
    buf: &mut [u8],
    offset: &mut usize,
    kind: u8,
    length: usize,
    revision: u8,
    mapping_count: u32,
    mapping_ref: u32,
) -> Result<(), GenError> {
    let length_field = u16::try_from(length).map_err(|_| GenError::InvalidParameter)?;
    buf.gwrite_with(kind, offset, LE)?;
    buf.gwrite_with(length_field, offset, LE)?;
    buf.gwrite_with(revision, offset, LE)?;
    buf.gwrite_with(0u32, offset, LE)?;
    buf.gwrite_with(mapping_count, offset, LE)?;
    buf.gwrite_with(mapping_ref, offset, LE)?;
    Ok(())
}

fn write_id_mappings(
    buf: &mut [u8],
    offset: &mut usize,
    mappings: &[IdMapping],
    indexer: &NodeIndexer,
) -> Result<(), GenError> {
    for mapping in mappings {
        buf.gwrite_with(mapping.input_base, offset, LE)?;
        buf.gwrite_with(mapping.num_ids, offset, LE)?;
        buf.gwrite_with(mapping.output_base, offset, LE)?;
        buf.gwrite_with(indexer.resolve(mapping.output_reference_token)?, offset, LE)?;
        buf.gwrite_with(mapping.flags, offset, LE)?;
    }
    Ok(())
}

fn emit_its_group(buf: &mut [u8], offset: &mut usize, info: &ItsGroupInfo) -> Result<(), GenError> {
    let size = its_group_size(info);
    write_node_header(buf, offset, iort::ITS_GROUP, size, iort::ITS_GROUP_REVISION, 0, 0)?;
    buf.gwrite_with(info.its_identifiers.len() as u32, offset, LE)?;
    for id in &info.its_identifiers {
        buf.gwrite_with(*id, offset, LE)?;
    }
    Ok(())
}

fn emit_named_component(
    buf: &mut [u8],
    offset: &mut usize,
    info: &NamedComponentInfo,
    indexer: &NodeIndexer,
    repo: &dyn PlatformRepository,
) -> Result<(), GenError> {
    let size = named_component_size(info);
    // The id-mapping array sits after the header and the 4-byte-aligned
    // object name.
    let mapping_ref = iort::NAMED_COMPONENT_NODE_LEN + align4(info.object_name.len() + 1);
    write_node_header(
        buf,
        offset,
        iort::NAMED_COMPONENT,
        size,
        iort::NAMED_COMPONENT_REVISION,
        info.id_mapping_count,
        if info.id_mapping_count == 0 { 0 } else { mapping_ref as u32 },
    )?;
    buf.gwrite_with(info.flags, offset, LE)?;
    buf.gwrite_with(info.cache_coherent, offset, LE)?;
    buf.gwrite_with(info.allocation_hints, offset, LE)?;
    buf.gwrite_with(0u16, offset, LE)?;
    buf.gwrite_with(info.memory_access_flags, offset, LE)?;
    buf.gwrite_with(info.address_size_limit, offset, LE)?;
    // Null-terminated ASCII name; the zeroed buffer provides the padding.
    buf.gwrite_with::<&[u8]>(info.object_name.as_bytes(), offset, ())?;
    *offset += align4(info.object_name.len() + 1) - info.object_name.len();

    let mappings = id_mappings_for(repo, info.id_mapping_token, info.id_mapping_count)?;
    write_id_mappings(buf, offset, &mappings, indexer)
}

fn emit_root_complex(
    buf: &mut [u8],
    offset: &mut usize,
    info: &RootComplexInfo,
    indexer: &NodeIndexer,
    repo: &dyn PlatformRepository,
) -> Result<(), GenError> {
    let size = root_complex_size(info);
    write_node_header(
        buf,
        offset,
        iort::ROOT_COMPLEX,
        size,
        iort::ROOT_COMPLEX_REVISION,
        info.id_mapping_count,
        if info.id_mapping_count == 0 { 0 } else { iort::ROOT_COMPLEX_NODE_LEN as u32 },
    )?;
    buf.gwrite_with(info.cache_coherent, offset, LE)?;
    buf.gwrite_with(info.allocation_hints, offset, LE)?;
    buf.gwrite_with(0u16, offset, LE)?;
    buf.gwrite_with(info.memory_access_flags, offset, LE)?;
    buf.gwrite_with(info.ats_attribute, offset, LE)?;
    buf.gwrite_with(info.pci_segment_number, offset, LE)?;
    buf.gwrite_with(info.memory_address_size_limit, offset, LE)?;
    buf.gwrite_with::<&[u8]>(&[0u8; 3], offset, ())?;

    let mappings = id_mappings_for(repo, info.id_mapping_token, info.id_mapping_count)?;
    write_id_mappings(buf, offset, &mappings, indexer)
}

fn emit_smmu_v1_v2(
    buf: &mut [u8],
    offset: &mut usize,
    info: &SmmuV1V2Info,
    indexer: &NodeIndexer,
    repo: &dyn PlatformRepository,
) -> Result<(), GenError> {
    let size = smmu_v1_v2_size(info);
    let context_count = info.context_interrupts.len();
    let pmu_count = info.pmu_interrupts.len();
    // Interrupt arrays directly follow the fixed fields; id mappings come
    // last. The global interrupt "array" is the pair of NSg fields at
    // offset 60.
    let context_ref = iort::SMMU_V1_V2_NODE_LEN;
    let pmu_ref = context_ref + context_count * iort::SMMU_INTERRUPT_LEN;
    let mapping_ref = pmu_ref + pmu_count * iort::SMMU_INTERRUPT_LEN;

    write_node_header(
        buf,
        offset,
        iort::SMMU_V1_V2,
        size,
        iort::SMMU_V1_V2_REVISION,
        info.id_mapping_count,
        if info.id_mapping_count == 0 { 0 } else { mapping_ref as u32 },
    )?;
    buf.gwrite_with(info.base_address, offset, LE)?;
    buf.gwrite_with(info.span, offset, LE)?;
    buf.gwrite_with(info.model, offset, LE)?;
    buf.gwrite_with(info.flags, offset, LE)?;
    buf.gwrite_with(60u32, offset, LE)?;
    buf.gwrite_with(context_count as u32, offset, LE)?;
    buf.gwrite_with(context_ref as u32, offset, LE)?;
    buf.gwrite_with(pmu_count as u32, offset, LE)?;
    buf.gwrite_with(pmu_ref as u32, offset, LE)?;
    buf.gwrite_with(info.smmu_nsg_irpt, offset, LE)?;
    buf.gwrite_with(info.smmu_nsg_irpt_flags, offset, LE)?;
    buf.gwrite_with(info.smmu_nsg_cfg_irpt, offset, LE)?;
    buf.gwrite_with(info.smmu_nsg_cfg_irpt_flags, offset, LE)?;
    for interrupt in info.context_interrupts.iter().chain(&info.pmu_interrupts) {
        buf.gwrite_with(interrupt.gsiv, offset, LE)?;
        buf.gwrite_with(interrupt.flags, offset, LE)?;
    }

    let mappings = id_mappings_for(repo, info.id_mapping_token, info.id_mapping_count)?;
    write_id_mappings(buf, offset, &mappings, indexer)
}

fn emit_smmu_v3(
    buf: &mut [u8],
    offset: &mut usize,
    info: &SmmuV3Info,
    indexer: &NodeIndexer,
    repo: &dyn PlatformRepository,
) -> Result<(), GenError> {
    let size = smmu_v3_size(info);
    write_node_header(
        buf,
        offset,
        iort::SMMU_V3,
        size,
        iort::SMMU_V3_REVISION,
        info.id_mapping_count,
        if info.id_mapping_count == 0 { 0 } else { iort::SMMU_V3_NODE_LEN as u32 },
    )?;
    buf.gwrite_with(info.base_address, offset, LE)?;
    buf.gwrite_with(info.flags, offset, LE)?;
    buf.gwrite_with(0u32, offset, LE)?;
    buf.gwrite_with(info.vatos_address, offset, LE)?;
    buf.gwrite_with(info.model, offset, LE)?;
    buf.gwrite_with(info.event_gsiv, offset, LE)?;
    buf.gwrite_with(info.pri_gsiv, offset, LE)?;
    buf.gwrite_with(info.gerr_gsiv, offset, LE)?;
    buf.gwrite_with(info.sync_gsiv, offset, LE)?;
    buf.gwrite_with(info.proximity_domain, offset, LE)?;
    buf.gwrite_with(info.device_id_mapping_index, offset, LE)?;

    let mappings = id_mappings_for(repo, info.id_mapping_token, info.id_mapping_count)?;
    write_id_mappings(buf, offset, &mappings, indexer)
}

fn emit_pmcg(
    buf: &mut [u8],
    offset: &mut usize,
    info: &PmcgInfo,
    indexer: &NodeIndexer,
    repo: &dyn PlatformRepository,
) -> Result<(), GenError> {
    let size = pmcg_size(info);
    write_node_header(
        buf,
        offset,
        iort::PMCG,
        size,
        iort::PMCG_REVISION,
        info.id_mapping_count,
        if info.id_mapping_count == 0 { 0 } else { iort::PMCG_NODE_LEN as u32 },
    )?;
    buf.gwrite_with(info.page0_base_address, offset, LE)?;
    buf.gwrite_with(info.overflow_interrupt_gsiv, offset, LE)?;
    buf.gwrite_with(indexer.resolve(info.node_reference_token)?, offset, LE)?;
    buf.gwrite_with(info.page1_base_address, offset, LE)?;

    let mappings = id_mappings_for(repo, info.id_mapping_token, info.id_mapping_count)?;
    write_id_mappings(buf, offset, &mappings, indexer)
}

/// Build an IORT from the repository's ARM namespace objects.
pub fn build_iort(repo: &dyn PlatformRepository, info: &TableInfo) -> Result<Vec<u8>, GenError> {
    let its_groups = typed(repo.objects(ObjectId::Arm(ArmObjectId::ItsGroup), None)?, |o| match o {
        PlatformObject::ItsGroup(n) => Some(n),
        _ => None,
    })?;
    let named_components = typed(repo.objects(ObjectId::Arm(ArmObjectId::NamedComponent), None)?, |o| match o {
        PlatformObject::NamedComponent(n) => Some(n),
        _ => None,
    })?;
    let root_complexes = typed(repo.objects(ObjectId::Arm(ArmObjectId::RootComplex), None)?, |o| match o {
        PlatformObject::RootComplex(n) => Some(n),
        _ => None,
    })?;
    let smmu_v1_v2s = typed(repo.objects(ObjectId::Arm(ArmObjectId::SmmuV1V2), None)?, |o| match o {
        PlatformObject::SmmuV1V2(n) => Some(n),
        _ => None,
    })?;
    let smmu_v3s = typed(repo.objects(ObjectId::Arm(ArmObjectId::SmmuV3), None)?, |o| match o {
        PlatformObject::SmmuV3(n) => Some(n),
        _ => None,
    })?;
    let pmcgs = typed(repo.objects(ObjectId::Arm(ArmObjectId::Pmcg), None)?, |o| match o {
        PlatformObject::Pmcg(n) => Some(n),
        _ => None,
    })?;

    // Sizing pass: per-kind region offsets and the token index. Every node
    // length must fit the 16-bit length field, the table the 32-bit one.
    let mut indexer = NodeIndexer::new();
    let mut offset = IORT_SIZE;
    let mut index_nodes = |tokens_sizes: Vec<(Token, usize)>, indexer: &mut NodeIndexer| -> Result<(), GenError> {
        for (token, size) in tokens_sizes {
            u16::try_from(size).map_err(|_| GenError::InvalidParameter)?;
            indexer.index(token, u32::try_from(offset).map_err(|_| GenError::InvalidParameter)?)?;
            offset = offset.checked_add(size).ok_or(GenError::InvalidParameter)?;
        }
        Ok(())
    };
    index_nodes(its_groups.iter().map(|n| (n.token, its_group_size(n))).collect(), &mut indexer)?;
    index_nodes(named_components.iter().map(|n| (n.token, named_component_size(n))).collect(), &mut indexer)?;
    index_nodes(root_complexes.iter().map(|n| (n.token, root_complex_size(n))).collect(), &mut indexer)?;
    index_nodes(smmu_v1_v2s.iter().map(|n| (n.token, smmu_v1_v2_size(n))).collect(), &mut indexer)?;
    index_nodes(smmu_v3s.iter().map(|n| (n.token, smmu_v3_size(n))).collect(), &mut indexer)?;
    index_nodes(pmcgs.iter().map(|n| (n.token, pmcg_size(n))).collect(), &mut indexer)?;

    let length = offset;
    let length_field = u32::try_from(length).map_err(|_| GenError::InvalidParameter)?;
    let node_count = indexer.len();

    let mut buf = vec![0u8; length];
    let mut cursor = write_header(&mut buf, signature::IORT, length_field, IORT_TABLE_REVISION, info)?;
    buf.gwrite_with(node_count as u32, &mut cursor, LE)?;
    buf.gwrite_with(IORT_SIZE as u32, &mut cursor, LE)?;
    buf.gwrite_with(0u32, &mut cursor, LE)?;

    // Emission pass, same region order as sizing. Offsets are never
    // recomputed; the cursor must land exactly on each indexed offset.
    for node in &its_groups {
        debug_assert_eq!(cursor as u32, indexer.resolve(node.token)?);
        emit_its_group(&mut buf, &mut cursor, node)?;
    }
    for node in &named_components {
        debug_assert_eq!(cursor as u32, indexer.resolve(node.token)?);
        emit_named_component(&mut buf, &mut cursor, node, &indexer, repo)?;
    }
    for node in &root_complexes {
        debug_assert_eq!(cursor as u32, indexer.resolve(node.token)?);
        emit_root_complex(&mut buf, &mut cursor, node, &indexer, repo)?;
    }
    for node in &smmu_v1_v2s {
        debug_assert_eq!(cursor as u32, indexer.resolve(node.token)?);
        emit_smmu_v1_v2(&mut buf, &mut cursor, node, &indexer, repo)?;
    }
    for node in &smmu_v3s {
        debug_assert_eq!(cursor as u32, indexer.resolve(node.token)?);
        emit_smmu_v3(&mut buf, &mut cursor, node, &indexer, repo)?;
    }
    for node in &pmcgs {
        debug_assert_eq!(cursor as u32, indexer.resolve(node.token)?);
        emit_pmcg(&mut buf, &mut cursor, node, &indexer, repo)?;
    }
    debug_assert_eq!(cursor, length);

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

    fn read_u32(buf: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(buf[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn test_its_group_and_root_complex() {
        let mut store = ObjectStore::new();
        let its_token = store.next_token();
        let map_token = store.next_token();
        let rc_token = store.next_token();

        store.add_object(
            None,
            PlatformObject::ItsGroup(ItsGroupInfo { token: its_token, its_identifiers: alloc::vec![1, 2] }),
        );
        store.add_objects(
            Some(map_token),
            alloc::vec![PlatformObject::IdMappingArray(alloc::vec![IdMapping {
                input_base: 0,
                num_ids: 0x10000,
                output_base: 0,
                output_reference_token: its_token,
                flags: 0,
            }])],
        );
        store.add_object(
            None,
            PlatformObject::RootComplex(RootComplexInfo {
                token: rc_token,
                cache_coherent: 1,
                pci_segment_number: 0,
                id_mapping_count: 1,
                id_mapping_token: map_token,
                ..Default::default()
            }),
        );

        let table = build_iort(&store, &TableInfo::default()).unwrap();

        // Header + ITS group (20 + 2*4) + root complex (36 + 20).
        let its_size = iort::ITS_GROUP_NODE_LEN + 2 * 4;
        let rc_offset = 48 + its_size;
        assert_eq!(table.len(), 48 + its_size + iort::ROOT_COMPLEX_NODE_LEN + iort::ID_MAPPING_LEN);
        assert_eq!(checksum::byte_sum(&table), 0);
        assert_eq!(read_u32(&table, 36), 2); // node count

        // The root complex's single id mapping routes to the ITS group
        // node's offset.
        let mapping = rc_offset + iort::ROOT_COMPLEX_NODE_LEN;
        assert_eq!(read_u32(&table, mapping + 12), 48);
    }

    #[test]
    fn test_unknown_output_reference_aborts() {
        let mut store = ObjectStore::new();
        let rc_token = store.next_token();
        let map_token = store.next_token();
        store.add_objects(
            Some(map_token),
            alloc::vec![PlatformObject::IdMappingArray(alloc::vec![IdMapping {
                output_reference_token: Token(0xDEAD),
                ..Default::default()
            }])],
        );
        store.add_object(
            None,
            PlatformObject::RootComplex(RootComplexInfo {
                token: rc_token,
                id_mapping_count: 1,
                id_mapping_token: map_token,
                ..Default::default()
            }),
        );
        assert_eq!(build_iort(&store, &TableInfo::default()), Err(GenError::NotFound));
    }

    #[test]
    fn test_mapping_count_mismatch_aborts() {
        let mut store = ObjectStore::new();
        let rc_token = store.next_token();
        let map_token = store.next_token();
        store.add_objects(
            Some(map_token),
            alloc::vec![PlatformObject::IdMappingArray(alloc::vec![IdMapping::default(), IdMapping::default()])],
        );
        store.add_object(
            None,
            PlatformObject::RootComplex(RootComplexInfo {
                token: rc_token,
                id_mapping_count: 1,
                id_mapping_token: map_token,
                ..Default::default()
            }),
        );
        assert_eq!(build_iort(&store, &TableInfo::default()), Err(GenError::InvalidParameter));
    }

    #[test]
    fn test_named_component_name_padding() {
        let mut store = ObjectStore::new();
        let token = store.next_token();
        store.add_object(
            None,
            PlatformObject::NamedComponent(NamedComponentInfo {
                token,
                object_name: alloc::string::String::from("\\_SB_.USB0"),
                ..Default::default()
            }),
        );
        let table = build_iort(&store, &TableInfo::default()).unwrap();
        // 10-character name + terminator, aligned up to 12.
        assert_eq!(table.len(), 48 + iort::NAMED_COMPONENT_NODE_LEN + 12);
        // Name bytes start after the fixed fields.
        let name_at = 48 + iort::NAMED_COMPONENT_NODE_LEN;
        assert_eq!(&table[name_at..name_at + 10], b"\\_SB_.USB0");
        assert_eq!(table[name_at + 10], 0);
    }

    #[test]
    fn test_full_topology_round_trip() {
        let mut store = ObjectStore::new();
        let its_token = store.next_token();
        let smmu_token = store.next_token();
        let rc_map_token = store.next_token();
        let smmu_map_token = store.next_token();
        let pmcg_map_token = store.next_token();

        store.add_object(
            None,
            PlatformObject::ItsGroup(ItsGroupInfo { token: its_token, its_identifiers: alloc::vec![0] }),
        );
        // Root complex routes into the SMMU.
        store.add_objects(
            Some(rc_map_token),
            alloc::vec![PlatformObject::IdMappingArray(alloc::vec![IdMapping {
                input_base: 0,
                num_ids: 0x10000,
                output_base: 0,
                output_reference_token: smmu_token,
                flags: 0,
            }])],
        );
        let rc_token = store.next_token();
        store.add_object(
            None,
            PlatformObject::RootComplex(RootComplexInfo {
                token: rc_token,
                cache_coherent: 1,
                id_mapping_count: 1,
                id_mapping_token: rc_map_token,
                ..Default::default()
            }),
        );
        // The SMMU routes into the ITS group.
        store.add_objects(
            Some(smmu_map_token),
            alloc::vec![PlatformObject::IdMappingArray(alloc::vec![IdMapping {
                input_base: 0,
                num_ids: 0x10000,
                output_base: 0,
                output_reference_token: its_token,
                flags: 0,
            }])],
        );
        store.add_object(
            None,
            PlatformObject::SmmuV3(SmmuV3Info {
                token: smmu_token,
                base_address: 0x3000_0000,
                event_gsiv: 100,
                id_mapping_count: 1,
                id_mapping_token: smmu_map_token,
                ..Default::default()
            }),
        );
        // A PMCG observing the SMMU.
        store.add_objects(
            Some(pmcg_map_token),
            alloc::vec![PlatformObject::IdMappingArray(alloc::vec![IdMapping {
                input_base: 0,
                num_ids: 1,
                output_base: 0,
                output_reference_token: its_token,
                flags: 0,
            }])],
        );
        let pmcg_token = store.next_token();
        store.add_object(
            None,
            PlatformObject::Pmcg(PmcgInfo {
                token: pmcg_token,
                page0_base_address: 0x4000_0000,
                overflow_interrupt_gsiv: 200,
                node_reference_token: smmu_token,
                id_mapping_count: 1,
                id_mapping_token: pmcg_map_token,
                ..Default::default()
            }),
        );

        let table = build_iort(&store, &TableInfo::default()).unwrap();
        assert_eq!(checksum::byte_sum(&table), 0);

        let mut sink = StringSink::new();
        let config = ViewConfig { arch: ArchSet::AARCH64, ..Default::default() };
        let mut ctx = ViewContext::new(&mut sink, config);
        tables::parse_table(&mut ctx, tarnish_acpi::signature::IORT, &table, IORT_TABLE_REVISION);
        let errors = ctx.error_count();
        drop(ctx);
        assert_eq!(errors, 0, "inspector output:\n{}", sink.output());
    }
}
