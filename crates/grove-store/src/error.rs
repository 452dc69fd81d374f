use grove_types::ObjectId;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// The stored bytes do not form a valid canonical object.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    /// The header carries a type tag outside {blob, tree, commit, tag}.
    #[error("unknown object type {tag:?} for object {id}")]
    UnknownObjectType { id: ObjectId, tag: String },

    /// A tree payload violates the entry format.
    #[error("malformed tree: {0}")]
    MalformedTree(String),

    /// A commit/tag payload violates the record grammar, or lacks a
    /// required field.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
