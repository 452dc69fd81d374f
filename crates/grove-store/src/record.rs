//! Ordered multi-value record format shared by commit and tag payloads.
//!
//! A record is a run of `key value` lines, a blank line, then a free-form
//! message running to the end of input:
//!
//! ```text
//! tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904
//! parent 1111111111111111111111111111111111111111
//! parent 2222222222222222222222222222222222222222
//! gpgsig -----BEGIN PGP SIGNATURE-----
//!  continuation lines start with one space
//!  -----END PGP SIGNATURE-----
//!
//! message bytes, verbatim
//! ```
//!
//! Repeated keys accumulate in order under their first occurrence. For
//! input whose repeated keys are contiguous, `serialize(parse(x)) == x`.

use crate::error::{StoreError, StoreResult};

/// One key and its values, in insertion order. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordField {
    pub key: Vec<u8>,
    pub values: Vec<Vec<u8>>,
}

/// Ordered fields plus a trailing message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordMap {
    fields: Vec<RecordField>,
    message: Vec<u8>,
}

impl RecordMap {
    /// Create an empty record with an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `key`.
    ///
    /// If the key is already present the value is added after its existing
    /// values; otherwise a new field is opened at the end. Keys must be
    /// non-empty and contain neither a space nor a newline.
    pub fn push(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        let key = key.into();
        debug_assert!(
            !key.is_empty() && !key.contains(&b' ') && !key.contains(&b'\n'),
            "invalid record key"
        );
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.key == key) {
            Some(field) => field.values.push(value),
            None => self.fields.push(RecordField {
                key,
                values: vec![value],
            }),
        }
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        self.push(key, value);
        self
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.get_all(key).first().map(Vec::as_slice)
    }

    /// Every value stored under `key`, or an empty slice.
    pub fn get_all(&self, key: &[u8]) -> &[Vec<u8>] {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.values.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.fields.iter().any(|f| f.key == key)
    }

    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    pub fn set_message(&mut self, message: impl Into<Vec<u8>>) {
        self.message = message.into();
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a record payload.
    pub fn parse(raw: &[u8]) -> StoreResult<Self> {
        let mut map = Self::new();
        let mut start = 0;

        loop {
            let nl = find(raw, b'\n', start);

            // A blank line ends the fields; the rest is the message.
            if nl == Some(start) {
                map.message = raw[start + 1..].to_vec();
                return Ok(map);
            }

            let space = match (find(raw, b' ', start), nl) {
                (Some(space), Some(nl)) if space < nl => space,
                (_, None) if start == raw.len() => {
                    return Err(malformed(start, "missing blank line before message"));
                }
                (Some(_), None) => {
                    return Err(malformed(start, "field is not newline-terminated"));
                }
                _ => return Err(malformed(start, "expected `key value` line")),
            };
            if space == start {
                return Err(malformed(start, "empty key"));
            }

            let mut end = nl.unwrap_or(raw.len());
            while raw.get(end + 1) == Some(&b' ') {
                let from = end + 1;
                end = find(raw, b'\n', from).ok_or_else(|| {
                    malformed(from, "continuation line is not newline-terminated")
                })?;
            }

            map.push(&raw[start..space], unfold(&raw[space + 1..end]));
            start = end + 1;
        }
    }

    /// Serialize back to the canonical byte form.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for field in &self.fields {
            for value in &field.values {
                out.extend_from_slice(&field.key);
                out.push(b' ');
                fold_into(&mut out, value);
                out.push(b'\n');
            }
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }
}

fn find(raw: &[u8], byte: u8, from: usize) -> Option<usize> {
    raw.get(from..)?
        .iter()
        .position(|&b| b == byte)
        .map(|i| i + from)
}

fn malformed(offset: usize, reason: &str) -> StoreError {
    StoreError::MalformedRecord(format!("at byte {offset}: {reason}"))
}

/// Drop the single leading space of each continuation line.
fn unfold(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        out.push(raw[i]);
        if raw[i] == b'\n' && raw.get(i + 1) == Some(&b' ') {
            i += 1;
        }
        i += 1;
    }
    out
}

fn fold_into(out: &mut Vec<u8>, value: &[u8]) {
    for &b in value {
        out.push(b);
        if b == b'\n' {
            out.push(b' ');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const COMMIT: &[u8] = b"tree 29ff16c9c14e2652b22f8b78bb08a5a07930c147\n\
parent 206941306e8a8af65b66eaaaea388a7ae24d49a0\n\
author Thibault Polge <thibault@thb.lt> 1527025023 +0200\n\
committer Thibault Polge <thibault@thb.lt> 1527025044 +0200\n\
gpgsig -----BEGIN PGP SIGNATURE-----\n \n iQIzBAABCAAdFiEExwXquOM8bWb4Q2zVGxM2FxoLkGQFAlsEjZQACgkQGxM2FxoL\n -----END PGP SIGNATURE-----\n\
\n\
Create first draft";

    #[test]
    fn parse_commit_fields() {
        let map = RecordMap::parse(COMMIT).unwrap();
        assert_eq!(map.len(), 5);
        assert_eq!(
            map.get(b"tree").unwrap(),
            b"29ff16c9c14e2652b22f8b78bb08a5a07930c147"
        );
        assert_eq!(map.message(), b"Create first draft");
        let sig = map.get(b"gpgsig").unwrap();
        assert!(sig.starts_with(b"-----BEGIN PGP SIGNATURE-----\n\niQIz"));
        assert!(sig.ends_with(b"\n-----END PGP SIGNATURE-----"));
    }

    #[test]
    fn commit_roundtrip_is_exact() {
        let map = RecordMap::parse(COMMIT).unwrap();
        assert_eq!(map.serialize(), COMMIT);
    }

    #[test]
    fn repeated_keys_accumulate_in_order() {
        let raw = b"tree t\nparent p1\nparent p2\nparent p3\n\nmerge\n";
        let map = RecordMap::parse(raw).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get_all(b"parent"),
            &[b"p1".to_vec(), b"p2".to_vec(), b"p3".to_vec()]
        );
        assert_eq!(map.get(b"parent").unwrap(), b"p1");
        assert_eq!(map.serialize(), raw);
    }

    #[test]
    fn interleaved_repeats_are_grouped_on_serialize() {
        let map = RecordMap::parse(b"a 1\nb 2\na 3\n\nmsg").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get_all(b"a"), &[b"1".to_vec(), b"3".to_vec()]);
        assert_eq!(map.serialize(), b"a 1\na 3\nb 2\n\nmsg");
    }

    #[test]
    fn empty_message_is_valid() {
        let raw = b"object abc\ntype commit\n\n";
        let map = RecordMap::parse(raw).unwrap();
        assert!(map.message().is_empty());
        assert_eq!(map.serialize(), raw);
    }

    #[test]
    fn missing_trailing_newline_is_preserved() {
        let with = RecordMap::parse(b"k v\n\nmsg\n").unwrap();
        let without = RecordMap::parse(b"k v\n\nmsg").unwrap();
        assert_eq!(with.message(), b"msg\n");
        assert_eq!(without.message(), b"msg");
        assert_eq!(without.serialize(), b"k v\n\nmsg");
    }

    #[test]
    fn no_fields_only_message() {
        let map = RecordMap::parse(b"\nonly a message").unwrap();
        assert!(map.is_empty());
        assert_eq!(map.message(), b"only a message");
    }

    #[test]
    fn value_may_contain_spaces() {
        let map = RecordMap::parse(b"author A U Thor <a@b.c> 0 +0000\n\n").unwrap();
        assert_eq!(map.get(b"author").unwrap(), b"A U Thor <a@b.c> 0 +0000");
    }

    #[test]
    fn get_missing_key() {
        let map = RecordMap::parse(b"k v\n\n").unwrap();
        assert!(map.get(b"nope").is_none());
        assert!(map.get_all(b"nope").is_empty());
        assert!(!map.contains_key(b"nope"));
    }

    #[test]
    fn builder_matches_parsed_form() {
        let mut built = RecordMap::new()
            .with("object", "abc")
            .with("type", "commit")
            .with("tag", "v1");
        built.set_message("release\n");
        let parsed = RecordMap::parse(&built.serialize()).unwrap();
        assert_eq!(parsed, built);
    }

    #[test]
    fn embedded_newlines_fold_to_continuations() {
        let map = RecordMap::new().with("k", "line1\nline2");
        assert_eq!(map.serialize(), b"k line1\n line2\n\n");
    }

    #[test]
    fn missing_blank_line_is_malformed() {
        let err = RecordMap::parse(b"tree abc\n").unwrap_err();
        assert!(matches!(err, StoreError::MalformedRecord(_)));
        assert!(RecordMap::parse(b"").is_err());
    }

    #[test]
    fn unterminated_field_is_malformed() {
        assert!(matches!(
            RecordMap::parse(b"tree abc"),
            Err(StoreError::MalformedRecord(_))
        ));
    }

    #[test]
    fn line_without_space_is_malformed() {
        assert!(matches!(
            RecordMap::parse(b"novalue\n\n"),
            Err(StoreError::MalformedRecord(_))
        ));
    }

    #[test]
    fn leading_continuation_is_malformed() {
        assert!(matches!(
            RecordMap::parse(b" orphan\n\n"),
            Err(StoreError::MalformedRecord(_))
        ));
    }

    #[test]
    fn unterminated_continuation_is_malformed() {
        assert!(matches!(
            RecordMap::parse(b"k v\n more"),
            Err(StoreError::MalformedRecord(_))
        ));
    }

    #[test]
    fn many_fields_parse_without_recursion() {
        let mut raw = Vec::new();
        for i in 0..5_000 {
            raw.extend_from_slice(format!("k{i} v\n").as_bytes());
        }
        raw.extend_from_slice(b"\nend");
        let map = RecordMap::parse(&raw).unwrap();
        assert_eq!(map.len(), 5_000);
    }

    fn arb_record() -> impl Strategy<Value = RecordMap> {
        let fields = proptest::collection::btree_map(
            "[a-z]{1,8}",
            proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..24), 1..4),
            0..6,
        );
        let message = proptest::collection::vec(any::<u8>(), 0..64);
        (fields, message).prop_map(|(fields, message)| {
            let mut map = RecordMap::new();
            for (key, values) in fields {
                for value in values {
                    map.push(key.as_bytes(), value);
                }
            }
            map.set_message(message);
            map
        })
    }

    proptest! {
        #[test]
        fn serialize_parse_roundtrip(map in arb_record()) {
            let bytes = map.serialize();
            let parsed = RecordMap::parse(&bytes).unwrap();
            prop_assert_eq!(&parsed, &map);
            prop_assert_eq!(parsed.serialize(), bytes);
        }
    }
}
