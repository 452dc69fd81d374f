use grove_types::{ObjectId, ObjectKind};

use crate::error::{StoreError, StoreResult};
use crate::record::RecordMap;
use crate::tree::Tree;

/// Build the canonical bytes `<tag> <len>\0<payload>` whose hash is the id.
pub fn encode_canonical(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let header = format!("{} {}\0", kind.as_str(), payload.len());
    let mut out = Vec::with_capacity(header.len() + payload.len());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(payload);
    out
}

/// Split canonical bytes into the raw type tag and the payload, validating
/// the declared length.
///
/// `id` is only used for error context.
pub fn decode_header<'a>(id: &ObjectId, raw: &'a [u8]) -> StoreResult<(&'a [u8], &'a [u8])> {
    let corrupt = |reason: String| StoreError::CorruptObject { id: *id, reason };

    let space = raw
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| corrupt("header has no type tag".into()))?;
    let nul = raw[space..]
        .iter()
        .position(|&b| b == 0)
        .map(|i| i + space)
        .ok_or_else(|| corrupt("header is not NUL-terminated".into()))?;

    let declared = parse_length(&raw[space + 1..nul])
        .ok_or_else(|| corrupt("header length is not a canonical decimal number".into()))?;
    let payload = &raw[nul + 1..];
    if declared != payload.len() {
        return Err(corrupt(format!(
            "bad length: header declares {declared} bytes, payload has {}",
            payload.len()
        )));
    }

    Ok((&raw[..space], payload))
}

/// `0` or `[1-9][0-9]*`; signs, leading zeros and overflow are rejected.
fn parse_length(text: &[u8]) -> Option<usize> {
    match text {
        [b'0'] => Some(0),
        [b'1'..=b'9', rest @ ..] if rest.iter().all(u8::is_ascii_digit) => {
            std::str::from_utf8(text).ok()?.parse().ok()
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// A stored object, closed over the four kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl Object {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
            Self::Tag(_) => ObjectKind::Tag,
        }
    }

    /// Serialized payload, without the header.
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Self::Blob(blob) => blob.data.clone(),
            Self::Tree(tree) => tree.serialize(),
            Self::Commit(commit) => commit.record.serialize(),
            Self::Tag(tag) => tag.record.serialize(),
        }
    }

    /// Header plus payload: the bytes that are hashed and stored.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        encode_canonical(self.kind(), &self.payload())
    }

    /// Reject objects whose payload would not decode back to `self`.
    pub fn validate(&self) -> StoreResult<()> {
        match self {
            Self::Tree(tree) => tree.validate(),
            Self::Blob(_) | Self::Commit(_) | Self::Tag(_) => Ok(()),
        }
    }

    /// Compute the content-addressed id without storing anything.
    pub fn id(&self) -> ObjectId {
        ObjectId::hash(&self.canonical_bytes())
    }

    /// Decode a payload of a known kind.
    pub fn from_payload(kind: ObjectKind, payload: &[u8]) -> StoreResult<Self> {
        Ok(match kind {
            ObjectKind::Blob => Self::Blob(Blob::new(payload.to_vec())),
            ObjectKind::Tree => Self::Tree(Tree::parse(payload)?),
            ObjectKind::Commit => Self::Commit(Commit::new(RecordMap::parse(payload)?)),
            ObjectKind::Tag => Self::Tag(Tag::from_record(RecordMap::parse(payload)?)),
        })
    }

    /// Decode canonical bytes read from the address of `id`.
    pub fn from_canonical(id: &ObjectId, raw: &[u8]) -> StoreResult<Self> {
        let (tag, payload) = decode_header(id, raw)?;
        let kind = ObjectKind::from_tag(tag).ok_or_else(|| StoreError::UnknownObjectType {
            id: *id,
            tag: String::from_utf8_lossy(tag).into_owned(),
        })?;
        Self::from_payload(kind, payload)
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Self::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Self::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_commit(&self) -> Option<&Commit> {
        match self {
            Self::Commit(commit) => Some(commit),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<&Tag> {
        match self {
            Self::Tag(tag) => Some(tag),
            _ => None,
        }
    }
}

impl From<Blob> for Object {
    fn from(blob: Blob) -> Self {
        Self::Blob(blob)
    }
}

impl From<Tree> for Object {
    fn from(tree: Tree) -> Self {
        Self::Tree(tree)
    }
}

impl From<Commit> for Object {
    fn from(commit: Commit) -> Self {
        Self::Commit(commit)
    }
}

impl From<Tag> for Object {
    fn from(tag: Tag) -> Self {
        Self::Tag(tag)
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

// ---------------------------------------------------------------------------
// Commit / Tag
// ---------------------------------------------------------------------------

/// Read a field holding a hex object id.
fn id_field(record: &RecordMap, key: &str) -> StoreResult<ObjectId> {
    let value = record
        .get(key.as_bytes())
        .ok_or_else(|| StoreError::MalformedRecord(format!("missing `{key}` field")))?;
    parse_id(key, value)
}

fn parse_id(key: &str, value: &[u8]) -> StoreResult<ObjectId> {
    std::str::from_utf8(value)
        .ok()
        .and_then(|s| ObjectId::from_hex(s).ok())
        .ok_or_else(|| {
            StoreError::MalformedRecord(format!(
                "`{key}` is not an object id: {:?}",
                String::from_utf8_lossy(value)
            ))
        })
}

/// Change-metadata object: a record carrying `tree`, `parent`*, `author`,
/// `committer` and a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    pub record: RecordMap,
}

impl Commit {
    pub fn new(record: RecordMap) -> Self {
        Self { record }
    }

    /// The snapshot this commit records.
    pub fn tree(&self) -> StoreResult<ObjectId> {
        id_field(&self.record, "tree")
    }

    /// Parent commits, in recorded order. Empty for a root commit.
    pub fn parents(&self) -> StoreResult<Vec<ObjectId>> {
        self.record
            .get_all(b"parent")
            .iter()
            .map(|v| parse_id("parent", v))
            .collect()
    }

    pub fn author(&self) -> Option<&[u8]> {
        self.record.get(b"author")
    }

    pub fn committer(&self) -> Option<&[u8]> {
        self.record.get(b"committer")
    }

    pub fn message(&self) -> &[u8] {
        self.record.message()
    }
}

/// Annotated tag: a record carrying `object`, `type`, `tag`, `tagger` and a
/// message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub record: RecordMap,
}

impl Tag {
    /// Build an annotated tag with fields in their canonical order.
    pub fn new(
        object: ObjectId,
        kind: ObjectKind,
        name: &str,
        tagger: &str,
        message: impl Into<Vec<u8>>,
    ) -> Self {
        let mut record = RecordMap::new()
            .with("object", object.to_hex())
            .with("type", kind.as_str())
            .with("tag", name)
            .with("tagger", tagger);
        record.set_message(message);
        Self { record }
    }

    pub fn from_record(record: RecordMap) -> Self {
        Self { record }
    }

    /// The object this tag names.
    pub fn object(&self) -> StoreResult<ObjectId> {
        id_field(&self.record, "object")
    }

    /// The declared kind of the tagged object, if present and known.
    pub fn object_type(&self) -> Option<ObjectKind> {
        self.record.get(b"type").and_then(ObjectKind::from_tag)
    }

    pub fn name(&self) -> Option<&[u8]> {
        self.record.get(b"tag")
    }

    pub fn tagger(&self) -> Option<&[u8]> {
        self.record.get(b"tagger")
    }

    pub fn message(&self) -> &[u8] {
        self.record.message()
    }
}
