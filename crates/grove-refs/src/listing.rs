//! Nested, sorted view of a ref namespace.
//!
//! ```text
//! refs/
//!   heads/
//!     main        -> 1f7a...
//!   tags/
//!     v1.0        -> 9dae...
//! ```

use std::collections::BTreeMap;

use grove_types::ObjectId;
use serde::Serialize;

use crate::error::{RefError, Result};
use crate::traits::RefStore;

/// One level of a ref namespace, sorted by name.
pub type RefListing = BTreeMap<String, RefNode>;

/// A node in the namespace tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RefNode {
    /// A ref, already peeled to the id it ultimately names.
    Leaf(ObjectId),
    /// A nested namespace.
    Namespace(RefListing),
}

/// Build the listing of everything under `namespace` (e.g. `"refs"` or
/// `"refs/tags"`). Symbolic refs are followed; a missing namespace yields an
/// empty listing.
pub fn list(store: &dyn RefStore, namespace: &str) -> Result<RefListing> {
    let namespace = namespace.trim_end_matches('/');
    let mut root = RefListing::new();

    for name in store.list_names(namespace)? {
        let id = store.peel(&name)?;
        let relative = name
            .strip_prefix(namespace)
            .map(|rest| rest.trim_start_matches('/'))
            .unwrap_or(&name);

        let mut parts: Vec<&str> = relative.split('/').collect();
        let Some(leaf) = parts.pop() else { continue };

        let mut level = &mut root;
        for part in parts {
            let node = level
                .entry(part.to_string())
                .or_insert_with(|| RefNode::Namespace(RefListing::new()));
            level = match node {
                RefNode::Namespace(children) => children,
                RefNode::Leaf(_) => {
                    return Err(RefError::InvalidName {
                        name: name.clone(),
                        reason: format!("{part:?} is both a ref and a namespace"),
                    })
                }
            };
        }
        level.insert(leaf.to_string(), RefNode::Leaf(id));
    }

    Ok(root)
}

/// Flatten a listing into `(full name, id)` pairs in lexicographic
/// depth-first order, each name prefixed with `prefix`.
pub fn flatten(listing: &RefListing, prefix: &str) -> Vec<(String, ObjectId)> {
    let prefix = prefix.trim_end_matches('/');
    let join = |base: &str, name: &str| {
        if base.is_empty() {
            name.to_string()
        } else {
            format!("{base}/{name}")
        }
    };

    let mut out = Vec::new();
    // Children are pushed in reverse so they pop in sorted order.
    let mut stack: Vec<(String, &RefNode)> = listing
        .iter()
        .rev()
        .map(|(name, node)| (join(prefix, name.as_str()), node))
        .collect();

    while let Some((name, node)) = stack.pop() {
        match node {
            RefNode::Leaf(id) => out.push((name, *id)),
            RefNode::Namespace(children) => {
                stack.extend(
                    children
                        .iter()
                        .rev()
                        .map(|(child, node)| (join(name.as_str(), child.as_str()), node)),
                );
            }
        }
    }
    out
}
