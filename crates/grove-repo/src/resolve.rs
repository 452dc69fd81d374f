//! Name → object id resolution.
//!
//! A name may be `HEAD`, a ref (`main`, `v1.0`, `refs/heads/main`), a full
//! 40-character hex id or a shorter hex prefix. Every interpretation that
//! applies contributes a candidate; exactly one distinct candidate must
//! remain. The result can then be coerced to a desired kind by peeling
//! tags and commits.

use std::collections::HashSet;

use grove_refs::{is_valid_ref_name, RefStore};
use grove_store::{Object, ObjectStore};
use grove_types::{ObjectId, ObjectKind};
use tracing::debug;

use crate::error::{RepoError, RepoResult};

/// Namespaces tried, in order, for a bare ref name.
const REF_FORMS: [&str; 4] = ["refs/", "refs/tags/", "refs/heads/", "refs/remotes/"];

/// Resolves names against an object store and a ref store.
pub struct Resolver<'a> {
    objects: &'a dyn ObjectStore,
    refs: &'a dyn RefStore,
    min_prefix_len: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(objects: &'a dyn ObjectStore, refs: &'a dyn RefStore) -> Self {
        Self {
            objects,
            refs,
            min_prefix_len: 4,
        }
    }

    /// Shortest hex prefix looked up in the object store.
    pub fn with_min_prefix_len(mut self, len: usize) -> Self {
        self.min_prefix_len = len.max(2);
        self
    }

    /// Resolve `name`, optionally coercing it to `desired`.
    ///
    /// Returns `Ok(None)` only when `follow` is false and the named object
    /// is not already of the desired kind.
    pub fn resolve(
        &self,
        name: &str,
        desired: Option<ObjectKind>,
        follow: bool,
    ) -> RepoResult<Option<ObjectId>> {
        let id = self.resolve_id(name)?;
        match desired {
            Some(kind) => self.coerce(id, kind, follow),
            None => Ok(Some(id)),
        }
    }

    /// Resolve `name` to exactly one id, without type coercion.
    pub fn resolve_id(&self, name: &str) -> RepoResult<ObjectId> {
        let mut candidates = self.candidates(name)?;
        candidates.sort();
        candidates.dedup();

        match candidates.as_slice() {
            [] => Err(RepoError::NotFound(name.to_string())),
            [id] => {
                debug!(name, id = %id.short_hex(), "resolved name");
                Ok(*id)
            }
            _ => Err(RepoError::Ambiguous {
                name: name.to_string(),
                candidates,
            }),
        }
    }

    /// Every id `name` could denote, possibly with duplicates.
    pub fn candidates(&self, name: &str) -> RepoResult<Vec<ObjectId>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RepoError::NotFound(String::new()));
        }

        // HEAD is never ambiguous.
        if name == "HEAD" {
            return Ok(vec![self.refs.peel("HEAD")?]);
        }

        let mut candidates = Vec::new();

        if let Some(id) = self.lookup_ref(name)? {
            candidates.push(id);
        }

        if ObjectId::is_hex(name) {
            if name.len() == ObjectId::HEX_LEN {
                candidates.push(ObjectId::from_hex(name).map_err(|e| RepoError::InvalidName {
                    name: name.to_string(),
                    reason: e.to_string(),
                })?);
            } else if (self.min_prefix_len..ObjectId::HEX_LEN).contains(&name.len()) {
                candidates.extend(self.objects.find_by_prefix(name)?);
            }
        }

        debug!(name, count = candidates.len(), "collected candidates");
        Ok(candidates)
    }

    /// Peel the first existing ref form of `name`.
    fn lookup_ref(&self, name: &str) -> RepoResult<Option<ObjectId>> {
        for form in ref_forms(name) {
            if !is_valid_ref_name(&form) {
                continue;
            }
            if self.refs.read_ref(&form)?.is_some() {
                debug!(name, form = %form, "name matches ref");
                return Ok(Some(self.refs.peel(&form)?));
            }
        }
        Ok(None)
    }

    /// Coerce `id` to `desired`: tags are followed through their `object`
    /// field and commits through their `tree` field when a tree is wanted.
    pub fn coerce(
        &self,
        id: ObjectId,
        desired: ObjectKind,
        follow: bool,
    ) -> RepoResult<Option<ObjectId>> {
        let mut visited = HashSet::new();
        let mut current = id;
        visited.insert(current);

        loop {
            let object = self.objects.get(&current)?;
            let actual = object.kind();
            if actual == desired {
                return Ok(Some(current));
            }
            if !follow {
                debug!(id = %current.short_hex(), %actual, %desired, "kind mismatch, not following");
                return Ok(None);
            }

            let next = match &object {
                Object::Tag(tag) => tag.object()?,
                Object::Commit(commit) if desired == ObjectKind::Tree => commit.tree()?,
                _ => {
                    return Err(RepoError::TypeMismatch {
                        id: current,
                        expected: desired,
                        actual,
                    })
                }
            };

            if !visited.insert(next) {
                return Err(RepoError::TypeMismatch {
                    id: next,
                    expected: desired,
                    actual,
                });
            }
            debug!(from = %current.short_hex(), to = %next.short_hex(), %actual, "peeled object");
            current = next;
        }
    }
}

/// `name` as given (only for `refs/...` names and all-caps pseudo refs such
/// as `ORIG_HEAD`), then under each namespace.
fn ref_forms(name: &str) -> Vec<String> {
    let mut forms = Vec::with_capacity(REF_FORMS.len() + 1);
    if name.starts_with("refs/") || name.bytes().all(|b| b.is_ascii_uppercase() || b == b'_') {
        forms.push(name.to_string());
    }
    forms.extend(REF_FORMS.iter().map(|ns| format!("{ns}{name}")));
    forms
}
