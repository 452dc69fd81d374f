//! The [`RefStore`] trait defining the reference storage interface.
//!
//! Any backend (filesystem, in-memory) implements this trait to provide
//! named reference management for a repository.

use std::collections::HashSet;

use grove_types::ObjectId;
use tracing::debug;

use crate::error::{RefError, Result};
use crate::types::RefTarget;

/// Storage backend for named references.
///
/// Implementations must be thread-safe (`Send + Sync`). Names are full ref
/// paths relative to the metadata directory and follow a hierarchical
/// layout:
///
/// - `HEAD` for the current checkout, usually symbolic
/// - `refs/heads/*` for branches
/// - `refs/tags/*` for tags
/// - `refs/remotes/{remote}/*` for remote tracking refs
pub trait RefStore: Send + Sync {
    /// Read a ref by its full name (e.g. "refs/heads/main").
    ///
    /// Returns `Ok(None)` if the ref does not exist.
    fn read_ref(&self, name: &str) -> Result<Option<RefTarget>>;

    /// Write (create or update) a ref. The new value becomes visible
    /// atomically.
    fn write_ref(&self, name: &str, target: &RefTarget) -> Result<()>;

    /// Delete a ref by full name.
    ///
    /// Returns `Ok(true)` if the ref existed and was deleted, `Ok(false)` if
    /// it did not exist.
    fn delete_ref(&self, name: &str) -> Result<bool>;

    /// List the full names of all refs under the namespace `prefix`, sorted.
    ///
    /// `prefix` is a directory-style path such as `"refs"` or
    /// `"refs/tags"`; it must itself be a valid ref name. A missing
    /// namespace yields an empty list.
    fn list_names(&self, prefix: &str) -> Result<Vec<String>>;

    /// Returns `true` if a ref with this name exists.
    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.read_ref(name)?.is_some())
    }

    /// Follow symbolic indirections from `name` until a direct id.
    ///
    /// A name seen twice is a cycle; a symbolic ref naming a missing ref is
    /// `NotFound` for the missing name.
    fn peel(&self, name: &str) -> Result<ObjectId> {
        let mut visited = HashSet::new();
        let mut chain = Vec::new();
        let mut current = name.to_string();

        loop {
            if !visited.insert(current.clone()) {
                chain.push(current);
                return Err(RefError::Cycle { chain });
            }
            chain.push(current.clone());

            match self.read_ref(&current)? {
                Some(RefTarget::Direct(id)) => {
                    debug!(name, hops = chain.len() - 1, id = %id.short_hex(), "peeled ref");
                    return Ok(id);
                }
                Some(RefTarget::Symbolic(next)) => current = next,
                None => return Err(RefError::NotFound { name: current }),
            }
        }
    }
}
