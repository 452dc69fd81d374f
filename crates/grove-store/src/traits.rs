use grove_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::Object;

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. Content-addressing guarantees this:
///   the same canonical bytes always produce the same ID.
/// - Writing an object that is already present is a no-op.
/// - `write` refuses objects that would not read back equal, so
///   `get(write(o)) == o`.
/// - A reader never observes a partially written object.
/// - Every read goes back to the backing storage; there is no cache.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read an object by its content-addressed ID.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    /// Returns `Err` on I/O failure or data corruption.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<Object>>;

    /// Write an object and return its content-addressed ID.
    ///
    /// If the object already exists, this is a no-op (idempotent). Fails
    /// with `MalformedTree` for a tree that [`Object::validate`] rejects.
    fn write(&self, object: &Object) -> StoreResult<ObjectId>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// All stored ids whose hex form starts with `prefix`, sorted.
    ///
    /// `prefix` is matched case-insensitively. Prefixes shorter than two
    /// characters or containing non-hex characters match nothing.
    fn find_by_prefix(&self, prefix: &str) -> StoreResult<Vec<ObjectId>>;

    /// Read an object that must exist.
    fn get(&self, id: &ObjectId) -> StoreResult<Object> {
        self.read(id)?.ok_or(StoreError::NotFound(*id))
    }
}
