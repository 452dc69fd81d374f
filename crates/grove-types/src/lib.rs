//! Foundation types for grove.
//!
//! This crate provides the identifier and type-tag vocabulary shared by the
//! object store, the ref store and the repository layer. Every other grove
//! crate depends on `grove-types`.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Content-addressed identifier (SHA-1 of canonical bytes)
//! - [`ObjectKind`] -- The closed set of object type tags

pub mod error;
pub mod kind;
pub mod object;

pub use error::TypeError;
pub use kind::ObjectKind;
pub use object::ObjectId;
