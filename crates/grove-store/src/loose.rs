//! Loose-object store: one zlib-compressed file per object.
//!
//! Objects live at `<root>/<first 2 hex>/<remaining 38 hex>`. Writes go to a
//! temporary file inside the shard directory and are published by rename,
//! so a concurrent reader sees either nothing or the complete object.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use grove_types::ObjectId;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::Object;
use crate::traits::ObjectStore;

/// Filesystem object store rooted at an `objects/` directory.
#[derive(Clone, Debug)]
pub struct LooseObjectStore {
    root: PathBuf,
    fsync: bool,
}

impl LooseObjectStore {
    /// Open a store rooted at `root`. The directory is created lazily on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fsync: false,
        }
    }

    /// Flush object files to stable storage before publishing them.
    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Address of an object on disk.
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let hex = id.to_hex();
        self.root.join(&hex[..2]).join(&hex[2..])
    }

    fn decompress(&self, id: &ObjectId, path: &Path) -> StoreResult<Option<Vec<u8>>> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut raw = Vec::new();
        match ZlibDecoder::new(file).read_to_end(&mut raw) {
            Ok(_) => Ok(Some(raw)),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::InvalidData
                        | io::ErrorKind::InvalidInput
                        | io::ErrorKind::UnexpectedEof
                ) =>
            {
                Err(StoreError::CorruptObject {
                    id: *id,
                    reason: format!("zlib stream: {e}"),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl ObjectStore for LooseObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<Object>> {
        let path = self.object_path(id);
        match self.decompress(id, &path)? {
            Some(raw) => {
                debug!(id = %id.short_hex(), bytes = raw.len(), "read loose object");
                Object::from_canonical(id, &raw).map(Some)
            }
            None => Ok(None),
        }
    }

    fn write(&self, object: &Object) -> StoreResult<ObjectId> {
        object.validate()?;
        let canonical = object.canonical_bytes();
        let id = ObjectId::hash(&canonical);
        let path = self.object_path(&id);

        if path.try_exists()? {
            debug!(id = %id.short_hex(), "object already stored; skipping write");
            return Ok(id);
        }

        let shard = path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "object path has no shard"))?;
        fs::create_dir_all(shard)?;

        let tmp = NamedTempFile::new_in(shard)?;
        let mut encoder = ZlibEncoder::new(tmp, Compression::default());
        encoder.write_all(&canonical)?;
        let tmp = encoder.finish()?;
        if self.fsync {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(
            id = %id.short_hex(),
            kind = %object.kind(),
            bytes = canonical.len(),
            "wrote loose object"
        );
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).try_exists()?)
    }

    fn find_by_prefix(&self, prefix: &str) -> StoreResult<Vec<ObjectId>> {
        if prefix.len() < 2 || prefix.len() > ObjectId::HEX_LEN || !ObjectId::is_hex(prefix) {
            return Ok(Vec::new());
        }
        let prefix = prefix.to_ascii_lowercase();
        let (shard, rest) = prefix.split_at(2);

        let entries = match fs::read_dir(self.root.join(shard)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.len() != ObjectId::HEX_LEN - 2 || !name.starts_with(rest) {
                continue;
            }
            // Temp files and other strays in the shard are not ids.
            if let Ok(id) = ObjectId::from_hex(&format!("{shard}{name}")) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}
