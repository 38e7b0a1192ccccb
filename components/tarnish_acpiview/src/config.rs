//! Inspector Configuration.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use crate::arch::{ArchSet, BUILD_ARCH};

/// Runtime configuration of one inspector invocation.
///
/// `quiet` suppresses warning and error lines and forces `consistency` off
/// at context construction. `arch` defaults to the build's own architecture
/// and exists so hosted tests can pin the reporting of
/// architecture-restricted structures.
#[derive(Debug, Clone, Copy)]
pub struct ViewConfig {
    /// Emit per-field trace lines. When off, table dispatchers return
    /// without side effects.
    pub trace: bool,
    /// Run per-field validators and cross-structure checks.
    pub consistency: bool,
    /// Suppress warnings and errors; forces `consistency` off.
    pub quiet: bool,
    /// Architecture the inspected firmware targets.
    pub arch: ArchSet,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig { trace: true, consistency: true, quiet: false, arch: BUILD_ARCH }
    }
}
