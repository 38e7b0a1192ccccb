//! ACPI Table Inspector.
//!
//! Decodes an in-memory image of one ACPI table field by field, emits an
//! indented human-readable trace through a caller-supplied report sink, and
//! cross-validates the structural invariants that ACPI 6.3 states for the
//! table: checksums, field constraints, sub-structure cardinalities, and
//! inter-structure references.
//!
//! The engine is table-driven: each structure is described by a constant
//! table of [`field::FieldDescriptor`] records which the generic parser in
//! [`parser`] walks with bounds safety. Per-table dispatchers in [`tables`]
//! iterate the variable-length sub-structure regions and feed the
//! cross-structure validator in [`cross`].
//!
//! Errors are reported, not raised: a malformed field never aborts the walk,
//! and dispatchers always return normally (spec'd stop conditions aside).
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

#![no_std]

extern crate alloc;

pub mod arch;
pub mod config;
pub mod cross;
pub mod field;
pub mod parser;
pub mod registry;
pub mod report;
pub mod tables;

pub use config::ViewConfig;
pub use report::{ErrorKind, ReportSink, Severity, StringSink, ViewContext};
pub use tables::parse_table;
