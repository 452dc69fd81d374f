//! Repository facade for grove.
//!
//! Ties the object store and the ref store of an on-disk repository together
//! and provides the operations built on both: name resolution with type
//! coercion, checkout of a snapshot into a directory, tag creation and the
//! commit ancestry walk.

pub mod checkout;
pub mod config;
pub mod error;
pub mod history;
pub mod repository;
pub mod resolve;

pub use checkout::CheckoutSummary;
pub use config::RepoConfig;
pub use error::{RepoError, RepoResult};
pub use history::HistoryEntry;
pub use repository::{Repository, TagAnnotation};
pub use resolve::Resolver;

// Re-export key types
pub use grove_refs::{RefListing, RefNode, RefTarget};
pub use grove_store::{Blob, Commit, EntryMode, Object, RecordMap, Tag, Tree, TreeEntry};
pub use grove_types::{ObjectId, ObjectKind};
