use std::fs;
use std::path::{Path, PathBuf};

use grove_refs::{listing, validate_tag_name, FileRefStore, RefListing, RefStore, RefTarget};
use grove_store::{LooseObjectStore, Object, ObjectStore, Tag};
use grove_types::{ObjectId, ObjectKind};
use tracing::{debug, info};

use crate::checkout::{self, CheckoutSummary};
use crate::config::RepoConfig;
use crate::error::{RepoError, RepoResult};
use crate::history::{self, HistoryEntry};
use crate::resolve::Resolver;

/// Message and author line of an annotated tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagAnnotation {
    /// `Name <email> <unix seconds> <+hhmm>`.
    pub tagger: String,
    pub message: String,
}

/// An on-disk repository: a metadata directory holding `objects/` and
/// `refs/`, inside a worktree.
pub struct Repository {
    worktree: PathBuf,
    git_dir: PathBuf,
    config: RepoConfig,
    objects: LooseObjectStore,
    refs: FileRefStore,
}

impl Repository {
    /// Open the repository whose metadata directory is `git_dir`.
    ///
    /// Nothing is created: `objects/` and `refs/` must already exist.
    pub fn open(git_dir: impl Into<PathBuf>, config: RepoConfig) -> RepoResult<Self> {
        let git_dir = git_dir.into();
        if !git_dir.join("objects").is_dir() || !git_dir.join("refs").is_dir() {
            return Err(RepoError::NotARepository(git_dir));
        }
        let worktree = git_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| git_dir.clone());

        let objects = LooseObjectStore::new(git_dir.join("objects")).with_fsync(config.fsync);
        let refs = FileRefStore::new(&git_dir).with_fsync(config.fsync);

        debug!(git_dir = %git_dir.display(), "opened repository");
        Ok(Self {
            worktree,
            git_dir,
            config,
            objects,
            refs,
        })
    }

    /// Find the repository containing `start` by walking up towards the
    /// filesystem root.
    pub fn discover(start: &Path, config: RepoConfig) -> RepoResult<Self> {
        let start = fs::canonicalize(start)?;
        for dir in start.ancestors() {
            let candidate = dir.join(&config.metadata_dir);
            if candidate.is_dir() {
                return Self::open(candidate, config);
            }
        }
        Err(RepoError::NotARepository(start))
    }

    // ---- Accessors ----

    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn objects(&self) -> &LooseObjectStore {
        &self.objects
    }

    pub fn refs(&self) -> &FileRefStore {
        &self.refs
    }

    // ---- Object operations ----

    pub fn read_object(&self, id: &ObjectId) -> RepoResult<Object> {
        Ok(self.objects.get(id)?)
    }

    /// Write an object. Trees are only written once every entry target
    /// (other than gitlinks) is present.
    pub fn write_object(&self, object: &Object) -> RepoResult<ObjectId> {
        object.validate()?;
        if let Object::Tree(tree) = object {
            for entry in &tree.entries {
                if !entry.mode.is_gitlink() && !self.objects.exists(&entry.target)? {
                    return Err(RepoError::MissingEntryTarget {
                        name: entry.name_lossy().into_owned(),
                        target: entry.target,
                    });
                }
            }
        }
        Ok(self.objects.write(object)?)
    }

    /// Compute the id of `payload` as an object of `kind`, storing it when
    /// `write` is set. The payload must decode as that kind.
    pub fn hash_object(&self, kind: ObjectKind, payload: &[u8], write: bool) -> RepoResult<ObjectId> {
        let object = Object::from_payload(kind, payload)?;
        if write {
            self.write_object(&object)
        } else {
            Ok(object.id())
        }
    }

    // ---- Name resolution ----

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.objects, &self.refs).with_min_prefix_len(self.config.min_prefix_len)
    }

    pub fn resolve(
        &self,
        name: &str,
        desired: Option<ObjectKind>,
        follow: bool,
    ) -> RepoResult<Option<ObjectId>> {
        self.resolver().resolve(name, desired, follow)
    }

    pub fn resolve_id(&self, name: &str) -> RepoResult<ObjectId> {
        self.resolver().resolve_id(name)
    }

    /// Resolve `name` and peel it to `kind`.
    pub fn resolve_as(&self, name: &str, kind: ObjectKind) -> RepoResult<ObjectId> {
        self.resolve(name, Some(kind), true)?
            .ok_or_else(|| RepoError::NotFound(name.to_string()))
    }

    // ---- Refs ----

    /// Everything under `refs/`, or under `refs/<subpath>`.
    pub fn list_refs(&self, subpath: Option<&str>) -> RepoResult<RefListing> {
        let namespace = match subpath.map(|s| s.trim_matches('/')) {
            Some(sub) if !sub.is_empty() => format!("refs/{sub}"),
            _ => "refs".to_string(),
        };
        Ok(listing::list(&self.refs, &namespace)?)
    }

    pub fn update_ref(&self, name: &str, target: &RefTarget) -> RepoResult<()> {
        self.refs.write_ref(name, target)?;
        Ok(())
    }

    /// Create `refs/tags/<name>` pointing at `target`, or at a new annotated
    /// tag object naming `target`. Returns the id the ref holds.
    pub fn create_tag(
        &self,
        name: &str,
        target: &str,
        annotation: Option<&TagAnnotation>,
    ) -> RepoResult<ObjectId> {
        validate_tag_name(name)?;
        let ref_name = format!("refs/tags/{name}");
        if self.refs.exists(&ref_name)? {
            return Err(RepoError::TagExists(name.to_string()));
        }

        let target_id = self.resolve_id(target)?;
        let ref_id = match annotation {
            Some(annotation) => {
                let kind = self.read_object(&target_id)?.kind();
                let tag = Tag::new(
                    target_id,
                    kind,
                    name,
                    &annotation.tagger,
                    annotation.message.as_bytes(),
                );
                self.write_object(&Object::Tag(tag))?
            }
            None => target_id,
        };

        self.refs.write_ref(&ref_name, &RefTarget::Direct(ref_id))?;
        info!(tag = name, id = %ref_id.short_hex(), annotated = annotation.is_some(), "created tag");
        Ok(ref_id)
    }

    // ---- Worktree ----

    /// Materialize the tree named by `name` (a tree, or a commit or tag that
    /// peels to one) into `target`.
    pub fn checkout(&self, name: &str, target: &Path) -> RepoResult<CheckoutSummary> {
        let tree = self.resolve_as(name, ObjectKind::Tree)?;
        checkout::prepare_target(target)?;
        checkout::write_tree(&self.objects, tree, target)
    }

    // ---- History ----

    pub fn ancestry(&self, name: &str) -> RepoResult<Vec<HistoryEntry>> {
        let start = self.resolve_as(name, ObjectKind::Commit)?;
        history::ancestry(&self.objects, start)
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("git_dir", &self.git_dir)
            .finish()
    }
}
