//! Content-addressed object storage for grove.
//!
//! This crate implements a hash-keyed object store laid out like git's
//! `.git/objects/` directory. Every object (blob, tree, commit, tag) is
//! stored as an immutable, zlib-compressed canonical byte string identified
//! by its SHA-1 hash.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw content (file contents, arbitrary data)
//! - [`Tree`] -- ordered directory listing of [`TreeEntry`] records
//! - [`Commit`] -- change metadata stored as a [`RecordMap`]
//! - [`Tag`] -- annotated tag stored as a [`RecordMap`]
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`LooseObjectStore`] -- one compressed file per object, sharded by the
//!   first two hex characters of the id
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Writes are published atomically: temp file, then rename.
//! 3. Object-type dispatch is an exhaustive match over [`ObjectKind`].
//! 4. All I/O errors are propagated, never silently ignored.
//!
//! [`ObjectKind`]: grove_types::ObjectKind

pub mod error;
pub mod loose;
pub mod memory;
pub mod object;
pub mod record;
pub mod traits;
pub mod tree;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use loose::LooseObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{decode_header, encode_canonical, Blob, Commit, Object, Tag};
pub use record::{RecordField, RecordMap};
pub use traits::ObjectStore;
pub use tree::{EntryMode, Tree, TreeEntry};
