use std::path::PathBuf;

use grove_refs::RefError;
use grove_store::StoreError;
use grove_types::{ObjectId, ObjectKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("not a repository (or any parent up to the filesystem root): {0}")]
    NotARepository(PathBuf),

    #[error("name not found: {0}")]
    NotFound(String),

    #[error("ambiguous name {name}: candidates are {}", fmt_ids(candidates))]
    Ambiguous {
        name: String,
        candidates: Vec<ObjectId>,
    },

    #[error("object {id} is a {actual}, expected a {expected}")]
    TypeMismatch {
        id: ObjectId,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    #[error("symbolic ref cycle: {}", chain.join(" -> "))]
    RefCycle { chain: Vec<String> },

    #[error("checkout target is not a directory: {0}")]
    TargetNotDirectory(PathBuf),

    #[error("checkout target is not empty: {0}")]
    TargetNotEmpty(PathBuf),

    #[error("unsafe entry name {name:?} in tree {tree}")]
    UnsafeEntryName { tree: ObjectId, name: String },

    #[error("tree entry {name:?} points at missing object {target}")]
    MissingEntryTarget { name: String, target: ObjectId },

    #[error("tag already exists: {0}")]
    TagExists(String),

    #[error("invalid name {name}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("ref error: {0}")]
    Ref(RefError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn fmt_ids(ids: &[ObjectId]) -> String {
    ids.iter().map(ObjectId::to_hex).collect::<Vec<_>>().join(", ")
}

impl From<StoreError> for RepoError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id.to_hex()),
            StoreError::Io(e) => Self::Io(e),
            other => Self::Store(other),
        }
    }
}

impl From<RefError> for RepoError {
    fn from(err: RefError) -> Self {
        match err {
            RefError::NotFound { name } => Self::NotFound(name),
            RefError::Cycle { chain } => Self::RefCycle { chain },
            RefError::InvalidName { name, reason } => Self::InvalidName { name, reason },
            RefError::Io(e) => Self::Io(e),
            other => Self::Ref(other),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_errors_map_onto_repo_variants() {
        let err: RepoError = RefError::Cycle {
            chain: vec!["HEAD".into(), "HEAD".into()],
        }
        .into();
        assert!(matches!(err, RepoError::RefCycle { .. }));
        assert_eq!(err.to_string(), "symbolic ref cycle: HEAD -> HEAD");

        let err: RepoError = RefError::NotFound { name: "refs/heads/x".into() }.into();
        assert!(matches!(err, RepoError::NotFound(name) if name == "refs/heads/x"));
    }

    #[test]
    fn missing_object_is_not_found() {
        let id = ObjectId::hash(b"gone");
        let err: RepoError = StoreError::NotFound(id).into();
        assert!(matches!(err, RepoError::NotFound(name) if name == id.to_hex()));
    }

    #[test]
    fn ambiguous_lists_candidates() {
        let a = ObjectId::from_raw([0xab; 20]);
        let b = ObjectId::from_raw([0xac; 20]);
        let err = RepoError::Ambiguous {
            name: "ab".into(),
            candidates: vec![a, b],
        };
        let text = err.to_string();
        assert!(text.contains(&a.to_hex()));
        assert!(text.contains(&b.to_hex()));
    }
}
