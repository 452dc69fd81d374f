//! Materialize a stored tree into a directory.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use grove_store::{Object, ObjectStore, Tree, TreeEntry};
use grove_types::{ObjectId, ObjectKind};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{RepoError, RepoResult};

/// What a checkout wrote.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    /// Regular files written.
    pub files: usize,
    /// Directories created below the target.
    pub directories: usize,
    /// Entries skipped (gitlinks, or entries naming commits or tags).
    pub skipped: usize,
}

/// Make sure `target` is usable: absent (then created with parents) or an
/// empty directory.
pub fn prepare_target(target: &Path) -> RepoResult<()> {
    match fs::metadata(target) {
        Ok(meta) if !meta.is_dir() => Err(RepoError::TargetNotDirectory(target.to_path_buf())),
        Ok(_) => {
            if fs::read_dir(target)?.next().is_some() {
                return Err(RepoError::TargetNotEmpty(target.to_path_buf()));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(target)?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Write the tree `root` into `target`, which must already be prepared.
///
/// The walk is depth-first with an explicit stack. A failure midway leaves
/// whatever was already written in place.
pub fn write_tree(
    store: &dyn ObjectStore,
    root: ObjectId,
    target: &Path,
) -> RepoResult<CheckoutSummary> {
    let mut summary = CheckoutSummary::default();
    let mut stack: Vec<(ObjectId, Tree, PathBuf)> =
        vec![(root, read_tree(store, root)?, target.to_path_buf())];

    while let Some((tree_id, tree, dir)) = stack.pop() {
        for entry in &tree.entries {
            let component = entry_component(tree_id, entry)?;
            let path = dir.join(component);

            if entry.mode.is_gitlink() {
                debug!(path = %path.display(), target = %entry.target.short_hex(), "skipping gitlink");
                summary.skipped += 1;
                continue;
            }

            let object = store.read(&entry.target)?.ok_or_else(|| {
                RepoError::MissingEntryTarget {
                    name: entry.name_lossy().into_owned(),
                    target: entry.target,
                }
            })?;

            match object {
                Object::Tree(subtree) => {
                    fs::create_dir(&path)?;
                    summary.directories += 1;
                    stack.push((entry.target, subtree, path));
                }
                Object::Blob(blob) => {
                    fs::write(&path, &blob.data)?;
                    if entry.mode.is_executable() {
                        set_executable(&path)?;
                    }
                    summary.files += 1;
                }
                other => {
                    warn!(
                        path = %path.display(),
                        kind = %other.kind(),
                        "tree entry names neither a blob nor a tree; skipping"
                    );
                    summary.skipped += 1;
                }
            }
        }
    }

    debug!(
        root = %root.short_hex(),
        files = summary.files,
        directories = summary.directories,
        "checkout complete"
    );
    Ok(summary)
}

fn read_tree(store: &dyn ObjectStore, id: ObjectId) -> RepoResult<Tree> {
    match store.get(&id)? {
        Object::Tree(tree) => Ok(tree),
        other => Err(RepoError::TypeMismatch {
            id,
            expected: ObjectKind::Tree,
            actual: other.kind(),
        }),
    }
}

/// The entry name as a single safe path component.
fn entry_component(tree: ObjectId, entry: &TreeEntry) -> RepoResult<&OsStr> {
    let name = entry.name.as_slice();
    let unsafe_name = || RepoError::UnsafeEntryName {
        tree,
        name: entry.name_lossy().into_owned(),
    };

    if name.is_empty()
        || name == b"."
        || name == b".."
        || name.iter().any(|&b| b == b'/' || b == b'\\' || b == 0)
    {
        return Err(unsafe_name());
    }

    os_component(name).ok_or_else(unsafe_name)
}

#[cfg(unix)]
fn os_component(name: &[u8]) -> Option<&OsStr> {
    use std::os::unix::ffi::OsStrExt;
    Some(OsStr::from_bytes(name))
}

#[cfg(not(unix))]
fn os_component(name: &[u8]) -> Option<&OsStr> {
    std::str::from_utf8(name).ok().map(OsStr::new)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o111);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
