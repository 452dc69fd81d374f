//! In-memory reference store for testing and ephemeral use.
//!
//! [`InMemoryRefStore`] stores all refs in a `BTreeMap` protected by a
//! `RwLock`. It implements the full [`RefStore`] trait and is suitable for
//! unit tests and short-lived processes.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::error::Result;
use crate::names::validate_ref_name;
use crate::traits::RefStore;
use crate::types::RefTarget;

/// An in-memory implementation of [`RefStore`].
///
/// Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryRefStore {
    refs: RwLock<BTreeMap<String, RefTarget>>,
}

impl InMemoryRefStore {
    /// Create a new empty ref store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RefStore for InMemoryRefStore {
    fn read_ref(&self, name: &str) -> Result<Option<RefTarget>> {
        validate_ref_name(name)?;
        let refs = self.refs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(refs.get(name).cloned())
    }

    fn write_ref(&self, name: &str, target: &RefTarget) -> Result<()> {
        validate_ref_name(name)?;
        let mut refs = self.refs.write().unwrap_or_else(PoisonError::into_inner);
        refs.insert(name.to_string(), target.clone());
        Ok(())
    }

    fn delete_ref(&self, name: &str) -> Result<bool> {
        validate_ref_name(name)?;
        let mut refs = self.refs.write().unwrap_or_else(PoisonError::into_inner);
        Ok(refs.remove(name).is_some())
    }

    fn list_names(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.trim_end_matches('/');
        validate_ref_name(prefix)?;
        let refs = self.refs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(refs
            .keys()
            .filter(|name| {
                name.strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
            })
            .cloned()
            .collect())
    }
}
