//! Node Indexer.
//!
//! The sizing pass records every node's token against its final byte
//! offset within the table being built; the emission pass resolves each
//! cross-reference through this index. The indexer is fully populated
//! before any emission begins, so a failed resolution indicates an
//! inconsistent input, not a sequencing bug.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use alloc::vec::Vec;

use crate::error::GenError;
use crate::objects::Token;

/// Reserved token meaning "no reference"; resolves to offset zero.
pub const NULL_TOKEN: Token = Token(0);

#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    token: Token,
    offset: u32,
}

/// Token-to-offset index, scoped to one generator invocation.
#[derive(Debug, Default)]
pub struct NodeIndexer {
    entries: Vec<IndexEntry>,
}

impl NodeIndexer {
    pub fn new() -> Self {
        NodeIndexer::default()
    }

    /// Record `token` at `offset`. The null token is not indexable, and a
    /// token may only be indexed once.
    pub fn index(&mut self, token: Token, offset: u32) -> Result<(), GenError> {
        if token == NULL_TOKEN || self.entries.iter().any(|e| e.token == token) {
            return Err(GenError::InvalidParameter);
        }
        self.entries.push(IndexEntry { token, offset });
        Ok(())
    }

    /// Resolve a token to its table offset. The null token means "no
    /// reference" and resolves to zero; an unknown token is a `NotFound`
    /// failure that aborts emission.
    pub fn resolve(&self, token: Token) -> Result<u32, GenError> {
        if token == NULL_TOKEN {
            return Ok(0);
        }
        self.entries.iter().find(|e| e.token == token).map(|e| e.offset).ok_or(GenError::NotFound)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
