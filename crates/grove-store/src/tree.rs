//! Binary tree-entry codec.
//!
//! A tree payload is a flat run of records with no separator:
//!
//! ```text
//! <mode> SP <name> NUL <20 raw id bytes>
//! ```

use std::borrow::Cow;
use std::fmt;

use grove_types::ObjectId;

use crate::error::{StoreError, StoreResult};

/// Permission/type code of a tree entry, kept verbatim.
///
/// The code is 5 or 6 ASCII digits (`"40000"` and `"040000"` are both
/// accepted and re-emitted exactly as written).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryMode {
    raw: [u8; 6],
    len: u8,
}

impl EntryMode {
    /// Normal file.
    pub const REGULAR: Self = Self::literal(b"100644");
    /// Executable file.
    pub const EXECUTABLE: Self = Self::literal(b"100755");
    /// Symbolic link.
    pub const SYMLINK: Self = Self::literal(b"120000");
    /// Subtree / directory.
    pub const DIRECTORY: Self = Self::literal(b"40000");
    /// Commit of another repository (submodule).
    pub const GITLINK: Self = Self::literal(b"160000");

    const fn literal(text: &[u8]) -> Self {
        let mut raw = [0u8; 6];
        let mut i = 0;
        while i < text.len() {
            raw[i] = text[i];
            i += 1;
        }
        Self {
            raw,
            len: text.len() as u8,
        }
    }

    /// Parse a mode field. Returns `None` unless it is 5 or 6 ASCII digits.
    pub fn parse(text: &[u8]) -> Option<Self> {
        if !(5..=6).contains(&text.len()) || !text.iter().all(u8::is_ascii_digit) {
            return None;
        }
        Some(Self::literal(text))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw[..self.len as usize]
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII digits are ever stored.
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    /// Six-character form, left-padded with `0`.
    pub fn padded(&self) -> String {
        format!("{:0>6}", self.as_str())
    }

    pub fn is_tree(&self) -> bool {
        self.padded() == "040000"
    }

    pub fn is_executable(&self) -> bool {
        self.as_bytes() == b"100755"
    }

    pub fn is_gitlink(&self) -> bool {
        self.as_bytes() == b"160000"
    }
}

impl fmt::Debug for EntryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryMode({})", self.as_str())
    }
}

impl fmt::Display for EntryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    /// Permission/type code.
    pub mode: EntryMode,
    /// Entry name as raw bytes.
    pub name: Vec<u8>,
    /// Id of the referenced object.
    pub target: ObjectId,
}

impl TreeEntry {
    pub fn new(mode: EntryMode, name: impl Into<Vec<u8>>, target: ObjectId) -> Self {
        Self {
            mode,
            name: name.into(),
            target,
        }
    }

    /// The name, with invalid UTF-8 replaced.
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }
}

/// Directory listing object.
///
/// Entries keep the order in which they were parsed or supplied. The codec
/// never sorts or deduplicates; producing git-compatible ordering is the
/// writer's responsibility.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }

    /// Create an empty tree.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up the first entry with the given name.
    pub fn get(&self, name: &[u8]) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check that every entry can be serialized and parsed back.
    ///
    /// Names must be non-empty and contain neither NUL nor `/`.
    pub fn validate(&self) -> StoreResult<()> {
        for (index, entry) in self.entries.iter().enumerate() {
            let reason = if entry.name.is_empty() {
                "empty entry name"
            } else if entry.name.contains(&0) {
                "entry name contains NUL"
            } else if entry.name.contains(&b'/') {
                "entry name contains '/'"
            } else {
                continue;
            };
            return Err(StoreError::MalformedTree(format!(
                "entry {index} ({:?}): {reason}",
                entry.name_lossy()
            )));
        }
        Ok(())
    }

    /// Parse a tree payload.
    pub fn parse(raw: &[u8]) -> StoreResult<Self> {
        let mut entries = Vec::new();
        let mut pos = 0;

        while pos < raw.len() {
            let rest = &raw[pos..];

            let space = rest
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| malformed(pos, "missing space after mode"))?;
            let mode = EntryMode::parse(&rest[..space]).ok_or_else(|| {
                malformed(
                    pos,
                    &format!(
                        "mode must be 5 or 6 digits, got {:?}",
                        String::from_utf8_lossy(&rest[..space])
                    ),
                )
            })?;

            let name_start = space + 1;
            let nul = rest[name_start..]
                .iter()
                .position(|&b| b == 0)
                .map(|i| i + name_start)
                .ok_or_else(|| malformed(pos + name_start, "missing NUL after name"))?;

            let id_end = nul + 1 + ObjectId::LEN;
            let id_bytes = rest
                .get(nul + 1..id_end)
                .ok_or_else(|| malformed(pos + nul + 1, "truncated object id"))?;
            let target = ObjectId::from_slice(id_bytes)
                .map_err(|e| malformed(pos + nul + 1, &e.to_string()))?;

            entries.push(TreeEntry {
                mode,
                name: rest[name_start..nul].to_vec(),
                target,
            });
            pos += id_end;
        }

        Ok(Self { entries })
    }

    /// Serialize to the canonical payload.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for entry in &self.entries {
            out.extend_from_slice(entry.mode.as_bytes());
            out.push(b' ');
            out.extend_from_slice(&entry.name);
            out.push(0);
            out.extend_from_slice(entry.target.as_bytes());
        }
        out
    }
}

fn malformed(offset: usize, reason: &str) -> StoreError {
    StoreError::MalformedTree(format!("at byte {offset}: {reason}"))
}
