//! Abstract Platform-Description Objects.
//!
//! Typed records describing the platform independently of any ACPI layout.
//! Objects refer to one another through opaque [`Token`]s, never through
//! offsets or pointers; the builders translate tokens to byte offsets at
//! emission time. Object ids are namespaced into the standard space (MADT,
//! MCFG, SRAT inputs) and the ARM space (IORT inputs).
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use alloc::string::String;
use alloc::vec::Vec;

/// Opaque cross-reference token. Tokens are assigned monotonically at
/// object creation and carry no meaning beyond identity; zero is reserved
/// for "no reference".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token(pub u64);

impl Default for Token {
    fn default() -> Self {
        crate::indexer::NULL_TOKEN
    }
}

/// Object ids of the standard namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdObjectId {
    Gicc,
    Gicd,
    GicMsiFrame,
    GicRedistributor,
    GicIts,
    PciConfigSpace,
    MemoryAffinity,
    GiccAffinity,
    ItsAffinity,
}

/// Object ids of the ARM namespace (IORT inputs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmObjectId {
    ItsGroup,
    NamedComponent,
    RootComplex,
    SmmuV1V2,
    SmmuV3,
    Pmcg,
    IdMappingArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectId {
    Std(StdObjectId),
    Arm(ArmObjectId),
}

/// GIC CPU interface description (MADT GICC input).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GiccInfo {
    pub cpu_interface_number: u32,
    pub acpi_processor_uid: u32,
    pub flags: u32,
    pub parking_protocol_version: u32,
    pub performance_interrupt_gsiv: u32,
    pub parked_address: u64,
    pub physical_base_address: u64,
    pub gicv: u64,
    pub gich: u64,
    pub vgic_maintenance_interrupt: u32,
    pub gicr_base_address: u64,
    pub mpidr: u64,
    pub processor_power_efficiency_class: u8,
    pub spe_overflow_interrupt: u16,
}

/// GIC distributor description. The system vector base is architecturally
/// zero and is not configurable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GicdInfo {
    pub physical_base_address: u64,
    pub gic_version: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GicMsiFrameInfo {
    pub gic_msi_frame_id: u32,
    pub physical_base_address: u64,
    pub flags: u32,
    pub spi_count: u16,
    pub spi_base: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GicRedistributorInfo {
    pub discovery_range_base_address: u64,
    pub discovery_range_length: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GicItsInfo {
    pub gic_its_id: u32,
    pub physical_base_address: u64,
}

/// PCI configuration-space allocation (MCFG input).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PciConfigSpaceInfo {
    pub base_address: u64,
    pub pci_segment_group_number: u16,
    pub start_bus_number: u8,
    pub end_bus_number: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryAffinityInfo {
    pub proximity_domain: u32,
    pub base_address: u64,
    pub length: u64,
    pub flags: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GiccAffinityInfo {
    pub proximity_domain: u32,
    pub acpi_processor_uid: u32,
    pub flags: u32,
    pub clock_domain: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItsAffinityInfo {
    pub proximity_domain: u32,
    pub its_id: u32,
}

/// One IORT id mapping: a contiguous range of requester ids routed to the
/// node identified by `output_reference_token`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMapping {
    pub input_base: u32,
    pub num_ids: u32,
    pub output_base: u32,
    pub output_reference_token: Token,
    pub flags: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItsGroupInfo {
    pub token: Token,
    pub its_identifiers: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedComponentInfo {
    pub token: Token,
    pub flags: u32,
    pub cache_coherent: u32,
    pub allocation_hints: u8,
    pub memory_access_flags: u8,
    pub address_size_limit: u8,
    /// ACPI namespace path of the device, e.g. "\\_SB_.USB0".
    pub object_name: String,
    pub id_mapping_count: u32,
    pub id_mapping_token: Token,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootComplexInfo {
    pub token: Token,
    pub cache_coherent: u32,
    pub allocation_hints: u8,
    pub memory_access_flags: u8,
    pub ats_attribute: u32,
    pub pci_segment_number: u32,
    pub memory_address_size_limit: u8,
    pub id_mapping_count: u32,
    pub id_mapping_token: Token,
}

/// One SMMU wired interrupt: GSIV plus level/edge flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmmuInterrupt {
    pub gsiv: u32,
    pub flags: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmmuV1V2Info {
    pub token: Token,
    pub base_address: u64,
    pub span: u64,
    pub model: u32,
    pub flags: u32,
    pub context_interrupts: Vec<SmmuInterrupt>,
    pub pmu_interrupts: Vec<SmmuInterrupt>,
    pub smmu_nsg_irpt: u32,
    pub smmu_nsg_irpt_flags: u32,
    pub smmu_nsg_cfg_irpt: u32,
    pub smmu_nsg_cfg_irpt_flags: u32,
    pub id_mapping_count: u32,
    pub id_mapping_token: Token,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmmuV3Info {
    pub token: Token,
    pub base_address: u64,
    pub flags: u32,
    pub vatos_address: u64,
    pub model: u32,
    pub event_gsiv: u32,
    pub pri_gsiv: u32,
    pub gerr_gsiv: u32,
    pub sync_gsiv: u32,
    pub proximity_domain: u32,
    pub device_id_mapping_index: u32,
    pub id_mapping_count: u32,
    pub id_mapping_token: Token,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PmcgInfo {
    pub token: Token,
    pub page0_base_address: u64,
    pub overflow_interrupt_gsiv: u32,
    /// Token of the IORT node this counter group observes.
    pub node_reference_token: Token,
    pub page1_base_address: u64,
    pub id_mapping_count: u32,
    pub id_mapping_token: Token,
}

/// One stored platform object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformObject {
    Gicc(GiccInfo),
    Gicd(GicdInfo),
    GicMsiFrame(GicMsiFrameInfo),
    GicRedistributor(GicRedistributorInfo),
    GicIts(GicItsInfo),
    PciConfigSpace(PciConfigSpaceInfo),
    MemoryAffinity(MemoryAffinityInfo),
    GiccAffinity(GiccAffinityInfo),
    ItsAffinity(ItsAffinityInfo),
    ItsGroup(ItsGroupInfo),
    NamedComponent(NamedComponentInfo),
    RootComplex(RootComplexInfo),
    SmmuV1V2(SmmuV1V2Info),
    SmmuV3(SmmuV3Info),
    Pmcg(PmcgInfo),
    IdMappingArray(Vec<IdMapping>),
}

impl PlatformObject {
    /// The object id this object is stored under.
    pub fn id(&self) -> ObjectId {
        match self {
            PlatformObject::Gicc(_) => ObjectId::Std(StdObjectId::Gicc),
            PlatformObject::Gicd(_) => ObjectId::Std(StdObjectId::Gicd),
            PlatformObject::GicMsiFrame(_) => ObjectId::Std(StdObjectId::GicMsiFrame),
            PlatformObject::GicRedistributor(_) => ObjectId::Std(StdObjectId::GicRedistributor),
            PlatformObject::GicIts(_) => ObjectId::Std(StdObjectId::GicIts),
            PlatformObject::PciConfigSpace(_) => ObjectId::Std(StdObjectId::PciConfigSpace),
            PlatformObject::MemoryAffinity(_) => ObjectId::Std(StdObjectId::MemoryAffinity),
            PlatformObject::GiccAffinity(_) => ObjectId::Std(StdObjectId::GiccAffinity),
            PlatformObject::ItsAffinity(_) => ObjectId::Std(StdObjectId::ItsAffinity),
            PlatformObject::ItsGroup(_) => ObjectId::Arm(ArmObjectId::ItsGroup),
            PlatformObject::NamedComponent(_) => ObjectId::Arm(ArmObjectId::NamedComponent),
            PlatformObject::RootComplex(_) => ObjectId::Arm(ArmObjectId::RootComplex),
            PlatformObject::SmmuV1V2(_) => ObjectId::Arm(ArmObjectId::SmmuV1V2),
            PlatformObject::SmmuV3(_) => ObjectId::Arm(ArmObjectId::SmmuV3),
            PlatformObject::Pmcg(_) => ObjectId::Arm(ArmObjectId::Pmcg),
            PlatformObject::IdMappingArray(_) => ObjectId::Arm(ArmObjectId::IdMappingArray),
        }
    }
}
