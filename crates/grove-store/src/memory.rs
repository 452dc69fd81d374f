use std::collections::HashMap;
use std::sync::RwLock;

use grove_types::ObjectId;

use crate::error::StoreResult;
use crate::object::Object;
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. Objects are held as canonical bytes
/// behind a `RwLock` and decoded again on every read, so the in-memory store
/// exercises the same codecs as the on-disk one.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, Vec<u8>>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Total canonical bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .expect("lock poisoned")
            .values()
            .map(|raw| raw.len() as u64)
            .sum()
    }

    /// Return a sorted list of all object IDs in the store.
    pub fn all_ids(&self) -> Vec<ObjectId> {
        let map = self.objects.read().expect("lock poisoned");
        let mut ids: Vec<ObjectId> = map.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Insert raw canonical bytes under an explicit id, bypassing hashing.
    ///
    /// Lets tests plant ids with chosen prefixes or deliberately corrupt
    /// content.
    pub fn insert_raw(&self, id: ObjectId, canonical: Vec<u8>) {
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(id, canonical);
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<Object>> {
        let map = self.objects.read().expect("lock poisoned");
        match map.get(id) {
            Some(raw) => Object::from_canonical(id, raw).map(Some),
            None => Ok(None),
        }
    }

    fn write(&self, object: &Object) -> StoreResult<ObjectId> {
        object.validate()?;
        let canonical = object.canonical_bytes();
        let id = ObjectId::hash(&canonical);
        let mut map = self.objects.write().expect("lock poisoned");
        map.entry(id).or_insert(canonical);
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }

    fn find_by_prefix(&self, prefix: &str) -> StoreResult<Vec<ObjectId>> {
        if prefix.len() < 2 || !ObjectId::is_hex(prefix) {
            return Ok(Vec::new());
        }
        let prefix = prefix.to_ascii_lowercase();
        let map = self.objects.read().expect("lock poisoned");
        let mut ids: Vec<ObjectId> = map
            .keys()
            .filter(|id| id.to_hex().starts_with(&prefix))
            .copied()
            .collect();
        ids.sort();
        Ok(ids)
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &count)
            .finish()
    }
}
