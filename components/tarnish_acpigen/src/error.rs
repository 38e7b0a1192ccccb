//! Generator Error Definitions.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use r_efi::efi;

/// Errors a table builder can return. The generator is strict where the
/// inspector is tolerant: any of these aborts the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenError {
    /// An input violates a structural constraint: an illegal cardinality
    /// (e.g. two GICDs), a node exceeding its 16-bit length field, or a
    /// table exceeding the 32-bit length field.
    InvalidParameter,
    /// A referenced token has no entry in the node indexer, or a
    /// repository lookup came up empty where an object was required.
    NotFound,
    /// A repository list held an object of a kind other than the one its
    /// object id promises.
    InvalidObjectType,
    /// A write ran past the end of the allocated table buffer.
    BufferTooSmall,
}

impl From<GenError> for efi::Status {
    fn from(err: GenError) -> Self {
        match err {
            GenError::InvalidParameter => efi::Status::INVALID_PARAMETER,
            GenError::NotFound => efi::Status::NOT_FOUND,
            GenError::InvalidObjectType => efi::Status::INVALID_PARAMETER,
            GenError::BufferTooSmall => efi::Status::BUFFER_TOO_SMALL,
        }
    }
}

impl From<scroll::Error> for GenError {
    fn from(_err: scroll::Error) -> Self {
        GenError::BufferTooSmall
    }
}
