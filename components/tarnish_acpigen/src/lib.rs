//! ACPI Table Generator.
//!
//! Assembles byte-exact ACPI 6.3 tables (MADT, MCFG, SRAT, and the ARM
//! profile of the IORT) from a repository of abstract platform-description
//! objects. Objects reference one another through opaque tokens; the
//! builders run a sizing pass that maps every token to its final byte
//! offset, then an emission pass that writes headers and bodies and
//! back-patches every cross-reference through that index.
//!
//! Unlike the inspector, every step here returns a `Result`: a missing
//! token or an oversized node aborts the build and the partially built
//! table is dropped with it.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

#![no_std]

extern crate alloc;
#[cfg(any(test, feature = "mockall"))]
extern crate std;

pub mod error;
pub mod indexer;
pub mod objects;
pub mod repo;
pub mod tables;

pub use error::GenError;
pub use indexer::{NodeIndexer, NULL_TOKEN};
pub use objects::{ArmObjectId, ObjectId, PlatformObject, StdObjectId, Token};
pub use repo::{ObjectStore, PlatformRepository};
pub use tables::TableInfo;
