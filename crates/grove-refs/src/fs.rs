//! Filesystem reference store.
//!
//! Each ref is a small text file at `<metadata dir>/<ref name>` holding
//! either `<40 hex>\n` or `ref: <name>\n`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::Result;
use crate::names::validate_ref_name;
use crate::traits::RefStore;
use crate::types::RefTarget;

/// [`RefStore`] backed by files under the repository metadata directory.
#[derive(Clone, Debug)]
pub struct FileRefStore {
    root: PathBuf,
    fsync: bool,
}

impl FileRefStore {
    /// Create a store rooted at the metadata directory (the one holding
    /// `HEAD` and `refs/`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fsync: false,
        }
    }

    /// Flush ref files to stable storage before publishing them.
    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a ref file. The name must already be validated.
    fn ref_path(&self, name: &str) -> PathBuf {
        name.split('/').fold(self.root.clone(), |path, part| path.join(part))
    }
}

impl RefStore for FileRefStore {
    fn read_ref(&self, name: &str) -> Result<Option<RefTarget>> {
        validate_ref_name(name)?;
        let path = self.ref_path(name);
        // A namespace directory such as `refs/heads` is not a ref.
        if path.is_dir() {
            return Ok(None);
        }
        match fs::read(&path) {
            Ok(content) => RefTarget::parse(name, &content).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_ref(&self, name: &str, target: &RefTarget) -> Result<()> {
        validate_ref_name(name)?;
        let path = self.ref_path(name);
        let dir = path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "ref path has no parent"))?;
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(target.to_file_contents().as_bytes())?;
        if self.fsync {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(&path).map_err(|e| e.error)?;

        debug!(name, target = %target, "wrote ref");
        Ok(())
    }

    fn delete_ref(&self, name: &str) -> Result<bool> {
        validate_ref_name(name)?;
        match fs::remove_file(self.ref_path(name)) {
            Ok(()) => {
                debug!(name, "deleted ref");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list_names(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.trim_end_matches('/');
        validate_ref_name(prefix)?;

        let start = self.ref_path(prefix);
        if !start.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut stack = vec![(start, prefix.to_string())];
        while let Some((dir, namespace)) = stack.pop() {
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
                    continue;
                };
                let name = format!("{namespace}/{file_name}");
                // Skips temp files, lock files and anything else that could
                // never have been written as a ref.
                if !crate::names::is_valid_ref_name(&name) {
                    continue;
                }
                if entry.file_type()?.is_dir() {
                    stack.push((entry.path(), name));
                } else {
                    names.push(name);
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RefError;
    use grove_types::ObjectId;

    fn direct(seed: &[u8]) -> RefTarget {
        RefTarget::Direct(ObjectId::hash(seed))
    }

    #[test]
    fn write_and_read_direct_ref() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRefStore::new(dir.path());
        let target = direct(b"main");
        store.write_ref("refs/heads/main", &target).unwrap();

        let on_disk = fs::read_to_string(dir.path().join("refs/heads/main")).unwrap();
        assert_eq!(on_disk, format!("{}\n", ObjectId::hash(b"main").to_hex()));
        assert_eq!(store.read_ref("refs/heads/main").unwrap(), Some(target));
    }

    #[test]
    fn symbolic_head_on_disk_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRefStore::new(dir.path()).with_fsync(true);
        store
            .write_ref("HEAD", &RefTarget::Symbolic("refs/heads/main".into()))
            .unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("HEAD")).unwrap(),
            "ref: refs/heads/main\n"
        );
    }

    #[test]
    fn reads_hand_written_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("refs/heads")).unwrap();
        let id = ObjectId::hash(b"tip");
        fs::write(dir.path().join("refs/heads/main"), id.to_hex()).unwrap();
        fs::write(dir.path().join("HEAD"), "ref: refs/heads/main\n").unwrap();

        let store = FileRefStore::new(dir.path());
        assert_eq!(store.peel("HEAD").unwrap(), id);
    }

    #[test]
    fn missing_ref_and_namespace_dir_read_none() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("refs/heads")).unwrap();
        let store = FileRefStore::new(dir.path());
        assert!(store.read_ref("refs/heads/nope").unwrap().is_none());
        assert!(store.read_ref("refs/heads").unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("refs/heads")).unwrap();
        fs::write(dir.path().join("refs/heads/bad"), "not an id\n").unwrap();
        let store = FileRefStore::new(dir.path());
        assert!(matches!(
            store.read_ref("refs/heads/bad"),
            Err(RefError::Malformed { .. })
        ));
    }

    #[test]
    fn delete_ref() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRefStore::new(dir.path());
        store.write_ref("refs/tags/v1", &direct(b"v1")).unwrap();
        assert!(store.delete_ref("refs/tags/v1").unwrap());
        assert!(!store.delete_ref("refs/tags/v1").unwrap());
    }

    #[test]
    fn traversal_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRefStore::new(dir.path());
        assert!(matches!(
            store.write_ref("../escape", &direct(b"x")),
            Err(RefError::InvalidName { .. })
        ));
        assert!(!dir.path().parent().unwrap().join("escape").exists());
    }

    #[test]
    fn list_names_walks_nested_namespaces() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRefStore::new(dir.path());
        for name in [
            "refs/heads/main",
            "refs/heads/feature/auth",
            "refs/heads/feature/ui",
            "refs/tags/v1.0",
            "refs/remotes/origin/main",
        ] {
            store.write_ref(name, &direct(name.as_bytes())).unwrap();
        }
        store
            .write_ref("HEAD", &RefTarget::Symbolic("refs/heads/main".into()))
            .unwrap();
        // Stray temp file left behind by an interrupted write.
        fs::write(dir.path().join("refs/heads/.tmpAbC123"), "").unwrap();

        assert_eq!(
            store.list_names("refs/heads").unwrap(),
            vec![
                "refs/heads/feature/auth",
                "refs/heads/feature/ui",
                "refs/heads/main"
            ]
        );
        assert_eq!(store.list_names("refs").unwrap().len(), 5);
        assert!(store.list_names("refs/notes").unwrap().is_empty());
    }
}
