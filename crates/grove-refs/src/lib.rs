//! Reference management for grove.
//!
//! This crate provides named references (branches, tags, HEAD) that point to
//! objects in the store, either directly by id or symbolically through
//! another ref.
//!
//! # Architecture
//!
//! - **Direct refs** hold a 40-character hex object id.
//! - **Symbolic refs** (`ref: refs/heads/main`) name another ref. Following
//!   them always terminates: a revisited name is reported as a cycle.
//! - **Namespaces** (`refs/heads`, `refs/tags`, ...) are directories of refs
//!   and can be listed as a sorted tree.
//!
//! # Modules
//!
//! - [`error`] -- Error types for ref operations
//! - [`types`] -- [`RefTarget`] and the ref file format
//! - [`traits`] -- The [`RefStore`] trait defining the storage interface
//! - [`names`] -- Ref/tag name validation
//! - [`fs`] -- [`FileRefStore`], refs as files under the metadata directory
//! - [`memory`] -- In-memory [`InMemoryRefStore`] for tests
//! - [`listing`] -- Nested [`RefListing`] of a namespace

pub mod error;
pub mod fs;
pub mod listing;
pub mod memory;
pub mod names;
pub mod traits;
pub mod types;

pub use error::{RefError, Result};
pub use fs::FileRefStore;
pub use listing::{flatten, RefListing, RefNode};
pub use memory::InMemoryRefStore;
pub use names::{is_valid_ref_name, validate_ref_name, validate_tag_name};
pub use traits::RefStore;
pub use types::RefTarget;
