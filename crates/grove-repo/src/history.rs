//! Commit ancestry walk.

use std::collections::HashSet;

use grove_store::{Commit, Object, ObjectStore};
use grove_types::{ObjectId, ObjectKind};
use serde::Serialize;

use crate::error::{RepoError, RepoResult};

/// A commit reached by [`ancestry`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub id: ObjectId,
    /// Parents in recorded order.
    pub parents: Vec<ObjectId>,
    /// First line of the commit message.
    pub summary: String,
}

/// Walk every commit reachable from `start` through `parent` links.
///
/// Depth-first, first parent first; each commit appears once, in discovery
/// order.
pub fn ancestry(store: &dyn ObjectStore, start: ObjectId) -> RepoResult<Vec<HistoryEntry>> {
    let mut visited = HashSet::new();
    let mut stack = vec![start];
    let mut entries = Vec::new();

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let commit = read_commit(store, id)?;
        let parents = commit.parents()?;
        stack.extend(parents.iter().rev().copied());
        entries.push(HistoryEntry {
            id,
            parents,
            summary: summary_line(commit.message()),
        });
    }

    Ok(entries)
}

/// `(child, parent)` pairs for every edge in the walk.
pub fn edges(entries: &[HistoryEntry]) -> Vec<(ObjectId, ObjectId)> {
    entries
        .iter()
        .flat_map(|e| e.parents.iter().map(move |p| (e.id, *p)))
        .collect()
}

fn read_commit(store: &dyn ObjectStore, id: ObjectId) -> RepoResult<Commit> {
    match store.get(&id)? {
        Object::Commit(commit) => Ok(commit),
        other => Err(RepoError::TypeMismatch {
            id,
            expected: ObjectKind::Commit,
            actual: other.kind(),
        }),
    }
}

fn summary_line(message: &[u8]) -> String {
    let line = message.split(|&b| b == b'\n').next().unwrap_or_default();
    String::from_utf8_lossy(line).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_store::{Blob, InMemoryObjectStore, RecordMap, Tree};

    fn commit(store: &InMemoryObjectStore, parents: &[ObjectId], message: &str) -> ObjectId {
        let tree = store.write(&Object::Tree(Tree::empty())).unwrap();
        let mut record = RecordMap::new().with("tree", tree.to_hex());
        for parent in parents {
            record.push("parent", parent.to_hex());
        }
        record.push("author", "A <a@example.com> 0 +0000");
        record.set_message(message);
        store.write(&Object::Commit(Commit::new(record))).unwrap()
    }

    #[test]
    fn linear_history() {
        let store = InMemoryObjectStore::new();
        let root = commit(&store, &[], "root\n");
        let mid = commit(&store, &[root], "mid\n\nbody");
        let tip = commit(&store, &[mid], "tip");

        let walk = ancestry(&store, tip).unwrap();
        let ids: Vec<_> = walk.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![tip, mid, root]);
        assert_eq!(walk[1].summary, "mid");
        assert_eq!(edges(&walk), vec![(tip, mid), (mid, root)]);
    }

    #[test]
    fn merge_visits_shared_ancestor_once() {
        let store = InMemoryObjectStore::new();
        let root = commit(&store, &[], "root");
        let left = commit(&store, &[root], "left");
        let right = commit(&store, &[root], "right");
        let merge = commit(&store, &[left, right], "merge");

        let walk = ancestry(&store, merge).unwrap();
        let ids: Vec<_> = walk.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![merge, left, root, right]);
        assert_eq!(edges(&walk).len(), 4);
    }

    #[test]
    fn long_chain_is_iterative() {
        let store = InMemoryObjectStore::new();
        let mut tip = commit(&store, &[], "0");
        for i in 1..2_000 {
            tip = commit(&store, &[tip], &i.to_string());
        }
        assert_eq!(ancestry(&store, tip).unwrap().len(), 2_000);
    }

    #[test]
    fn non_commit_is_type_mismatch() {
        let store = InMemoryObjectStore::new();
        let blob = store
            .write(&Object::Blob(Blob::new(b"not a commit".to_vec())))
            .unwrap();
        assert!(matches!(
            ancestry(&store, blob),
            Err(RepoError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn missing_parent_is_not_found() {
        let store = InMemoryObjectStore::new();
        let tip = commit(&store, &[ObjectId::hash(b"lost")], "orphan");
        assert!(matches!(
            ancestry(&store, tip),
            Err(RepoError::NotFound(_))
        ));
    }
}
