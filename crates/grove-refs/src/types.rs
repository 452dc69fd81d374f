//! Core reference types.
//!
//! A reference is a small named file under the repository metadata
//! directory. It either holds an object id directly or names another ref.

use std::fmt;

use grove_types::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::{RefError, Result};

/// The prefix of a symbolic ref file.
pub const SYMBOLIC_PREFIX: &str = "ref: ";

/// What a reference points at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefTarget {
    /// The ref holds an object id.
    Direct(ObjectId),
    /// The ref names another ref (e.g. `HEAD` → `refs/heads/main`).
    Symbolic(String),
}

impl RefTarget {
    /// Parse the contents of a ref file.
    ///
    /// Accepts `<40 hex>` or `ref: <name>`, each optionally followed by
    /// trailing whitespace. `name` is only used for error context.
    pub fn parse(name: &str, content: &[u8]) -> Result<Self> {
        let malformed = || RefError::Malformed {
            name: name.to_string(),
            content: String::from_utf8_lossy(content).into_owned(),
        };

        let text = std::str::from_utf8(content).map_err(|_| malformed())?;
        let text = text.trim_end();

        if let Some(target) = text.strip_prefix(SYMBOLIC_PREFIX) {
            let target = target.trim();
            if target.is_empty() {
                return Err(malformed());
            }
            return Ok(Self::Symbolic(target.to_string()));
        }

        ObjectId::from_hex(text)
            .map(Self::Direct)
            .map_err(|_| malformed())
    }

    /// Serialize to the ref file format, newline-terminated.
    pub fn to_file_contents(&self) -> String {
        format!("{self}\n")
    }

    /// The id, if this is a direct ref.
    pub fn as_direct(&self) -> Option<&ObjectId> {
        match self {
            Self::Direct(id) => Some(id),
            Self::Symbolic(_) => None,
        }
    }

    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Symbolic(_))
    }
}

impl fmt::Display for RefTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(id) => write!(f, "{id}"),
            Self::Symbolic(name) => write!(f, "{SYMBOLIC_PREFIX}{name}"),
        }
    }
}

impl From<ObjectId> for RefTarget {
    fn from(id: ObjectId) -> Self {
        Self::Direct(id)
    }
}
