//! Platform-Object Repository.
//!
//! The generator consumes platform descriptions through the
//! [`PlatformRepository`] trait; [`ObjectStore`] is the in-memory
//! implementation. Objects are stored under their object id, optionally
//! grouped under a token (id-mapping arrays are looked up that way).
//! Lookups hand out owned copies; the store keeps ownership of its lists
//! until they are dropped with it.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use alloc::vec;
use alloc::vec::Vec;

use crate::error::GenError;
use crate::objects::{ObjectId, PlatformObject, Token};

/// Read side of the repository, as the table builders see it.
#[cfg_attr(any(test, feature = "mockall"), mockall::automock)]
pub trait PlatformRepository {
    /// Number of objects stored under `id`, across all token groups. An id
    /// the repository has never seen counts as zero.
    fn count(&self, id: ObjectId) -> usize;

    /// Owned copies of the objects stored under `id`. With a token, only
    /// the group registered under that token is returned; `NotFound` when
    /// that group does not exist.
    fn objects(&self, id: ObjectId, token: Option<Token>) -> Result<Vec<PlatformObject>, GenError>;
}

struct ObjectList {
    id: ObjectId,
    token: Option<Token>,
    objects: Vec<PlatformObject>,
}

/// In-memory repository with token assignment.
#[derive(Default)]
pub struct ObjectStore {
    lists: Vec<ObjectList>,
    next_token: u64,
}

impl ObjectStore {
    pub fn new() -> Self {
        ObjectStore { lists: Vec::new(), next_token: 0 }
    }

    /// Mint a fresh cross-reference token. Tokens are monotone and never
    /// zero (zero is the reserved null token).
    pub fn next_token(&mut self) -> Token {
        self.next_token += 1;
        Token(self.next_token)
    }

    /// Append one object to the list stored under its id and `token`,
    /// creating the list if none matches.
    pub fn add_object(&mut self, token: Option<Token>, object: PlatformObject) {
        self.add_objects(token, vec![object]);
    }

    /// Append objects to the list with a matching id and token, or create
    /// a new list. All objects must share one object id.
    pub fn add_objects(&mut self, token: Option<Token>, mut objects: Vec<PlatformObject>) {
        let Some(id) = objects.first().map(PlatformObject::id) else {
            return;
        };
        debug_assert!(objects.iter().all(|o| o.id() == id));

        if let Some(list) = self.lists.iter_mut().find(|l| l.id == id && l.token == token) {
            list.objects.append(&mut objects);
        } else {
            self.lists.push(ObjectList { id, token, objects });
        }
    }
}

impl PlatformRepository for ObjectStore {
    fn count(&self, id: ObjectId) -> usize {
        self.lists.iter().filter(|l| l.id == id).map(|l| l.objects.len()).sum()
    }

    fn objects(&self, id: ObjectId, token: Option<Token>) -> Result<Vec<PlatformObject>, GenError> {
        match token {
            Some(_) => self
                .lists
                .iter()
                .find(|l| l.id == id && l.token == token)
                .map(|l| l.objects.clone())
                .ok_or(GenError::NotFound),
            None => {
                let objects: Vec<PlatformObject> =
                    self.lists.iter().filter(|l| l.id == id).flat_map(|l| l.objects.iter().cloned()).collect();
                Ok(objects)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::objects::{GicdInfo, IdMapping, MemoryAffinityInfo, StdObjectId};
    use crate::ArmObjectId;

    #[test]
    fn test_count_unknown_id_is_zero() {
        let store = ObjectStore::new();
        assert_eq!(store.count(ObjectId::Std(StdObjectId::Gicc)), 0);
    }

    #[test]
    fn test_add_appends_to_matching_list() {
        let mut store = ObjectStore::new();
        store.add_object(None, PlatformObject::MemoryAffinity(MemoryAffinityInfo::default()));
        store.add_object(
            None,
            PlatformObject::MemoryAffinity(MemoryAffinityInfo { proximity_domain: 1, ..Default::default() }),
        );
        assert_eq!(store.count(ObjectId::Std(StdObjectId::MemoryAffinity)), 2);

        let objects = store.objects(ObjectId::Std(StdObjectId::MemoryAffinity), None).unwrap();
        assert_eq!(objects.len(), 2);
    }

    #[test]
    fn test_token_groups_are_distinct() {
        let mut store = ObjectStore::new();
        let a = store.next_token();
        let b = store.next_token();
        assert_ne!(a, b);

        store.add_objects(Some(a), vec![PlatformObject::IdMappingArray(vec![IdMapping::default()])]);
        store.add_objects(
            Some(b),
            vec![PlatformObject::IdMappingArray(vec![IdMapping::default(), IdMapping::default()])],
        );

        let group_a = store.objects(ObjectId::Arm(ArmObjectId::IdMappingArray), Some(a)).unwrap();
        assert_eq!(group_a.len(), 1);
        assert!(store.objects(ObjectId::Arm(ArmObjectId::IdMappingArray), Some(Token(99))).is_err());
        assert_eq!(store.count(ObjectId::Arm(ArmObjectId::IdMappingArray)), 2);
    }

    #[test]
    fn test_lookups_are_owned_copies() {
        let mut store = ObjectStore::new();
        store.add_object(None, PlatformObject::Gicd(GicdInfo { physical_base_address: 0x1000, gic_version: 3 }));
        let mut copy = store.objects(ObjectId::Std(StdObjectId::Gicd), None).unwrap();
        // Mutating the copy does not touch the store.
        copy.clear();
        assert_eq!(store.count(ObjectId::Std(StdObjectId::Gicd)), 1);
    }

    #[test]
    fn test_mock_repository() {
        let mut mock = MockPlatformRepository::new();
        mock.expect_count().returning(|_| 0);
        mock.expect_objects().returning(|_, _| Ok(Vec::new()));
        assert_eq!(mock.count(ObjectId::Std(StdObjectId::Gicc)), 0);
        assert!(mock.objects(ObjectId::Std(StdObjectId::Gicc), None).unwrap().is_empty());
    }
}
