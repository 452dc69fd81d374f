//! Ref name validation following git-style conventions.
//!
//! A ref name is a `/`-separated path relative to the repository metadata
//! directory (`HEAD`, `refs/heads/main`, `refs/tags/v1.0`). Valid names:
//! - Must be non-empty
//! - Must not contain whitespace, control characters, `~`, `^`, `:`, `?`,
//!   `*`, `[`, `\`
//! - Must not contain `..` (double dot) or `@{`
//! - Must not start or end with `/`
//! - Components between slashes must be non-empty, must not start with `.`
//!   and must not end with `.lock`
//!
//! Since names map directly onto paths, these rules also keep every ref
//! inside the metadata directory.

use crate::error::{RefError, Result};

/// Characters that are forbidden anywhere in a ref name.
const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '~', '^', ':', '?', '*', '[', '\\'];

fn invalid(name: &str, reason: impl Into<String>) -> RefError {
    RefError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Validate a full ref name such as `refs/heads/main` or `HEAD`.
///
/// # Examples
///
/// ```
/// use grove_refs::names::validate_ref_name;
///
/// assert!(validate_ref_name("HEAD").is_ok());
/// assert!(validate_ref_name("refs/heads/feature/auth").is_ok());
/// assert!(validate_ref_name("").is_err());
/// assert!(validate_ref_name("refs/../config").is_err());
/// ```
pub fn validate_ref_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(name, "ref name must not be empty"));
    }

    if let Some(ch) = name
        .chars()
        .find(|c| FORBIDDEN_CHARS.contains(c) || c.is_control())
    {
        return Err(invalid(name, format!("contains forbidden character: {ch:?}")));
    }

    if name.contains("..") {
        return Err(invalid(name, "must not contain '..'"));
    }

    // Reflog syntax.
    if name.contains("@{") {
        return Err(invalid(name, "must not contain '@{'"));
    }

    if name.starts_with('/') || name.ends_with('/') {
        return Err(invalid(name, "must not start or end with '/'"));
    }

    for component in name.split('/') {
        if component.is_empty() {
            return Err(invalid(name, "path components must not be empty"));
        }
        if component.starts_with('.') {
            return Err(invalid(
                name,
                format!("component must not start with '.': {component:?}"),
            ));
        }
        if component.ends_with(".lock") {
            return Err(invalid(
                name,
                format!("component must not end with '.lock': {component:?}"),
            ));
        }
    }

    Ok(())
}

/// Returns `true` if `name` passes [`validate_ref_name`].
pub fn is_valid_ref_name(name: &str) -> bool {
    validate_ref_name(name).is_ok()
}

/// Validate a short tag name (the part after `refs/tags/`). Same rules as
/// full ref names, and additionally must not end with `.`.
pub fn validate_tag_name(name: &str) -> Result<()> {
    validate_ref_name(name).map_err(|e| match e {
        RefError::InvalidName { reason, .. } => invalid(name, format!("invalid tag name: {reason}")),
        other => other,
    })?;
    if name.ends_with('.') {
        return Err(invalid(name, "invalid tag name: must not end with '.'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_simple_names() {
        assert!(validate_ref_name("HEAD").is_ok());
        assert!(validate_ref_name("refs/heads/main").is_ok());
        assert!(validate_ref_name("refs/tags/v1.0").is_ok());
        assert!(validate_ref_name("refs/heads/my-branch").is_ok());
    }

    #[test]
    fn valid_nested_names() {
        assert!(validate_ref_name("refs/heads/feature/auth").is_ok());
        assert!(validate_ref_name("refs/remotes/origin/user/alice/fix-123").is_ok());
    }

    #[test]
    fn reject_empty_name() {
        assert!(validate_ref_name("").is_err());
    }

    #[test]
    fn reject_traversal() {
        assert!(validate_ref_name("refs/../config").is_err());
        assert!(validate_ref_name("../outside").is_err());
        assert!(validate_ref_name("refs/./heads").is_err());
    }

    #[test]
    fn reject_whitespace_and_control() {
        assert!(validate_ref_name("has space").is_err());
        assert!(validate_ref_name("has\ttab").is_err());
        assert!(validate_ref_name("has\nnewline").is_err());
        assert!(validate_ref_name("nul\0byte").is_err());
    }

    #[test]
    fn reject_forbidden_chars() {
        for name in ["a~b", "a^b", "a:b", "a?b", "a*b", "a[b", "a\\b"] {
            assert!(validate_ref_name(name).is_err(), "{name} should be rejected");
        }
    }

    #[test]
    fn reject_slash_boundaries() {
        assert!(validate_ref_name("/leading").is_err());
        assert!(validate_ref_name("trailing/").is_err());
        assert!(validate_ref_name("a//b").is_err());
    }

    #[test]
    fn reject_lock_suffix() {
        assert!(validate_ref_name("refs/heads/main.lock").is_err());
        assert!(validate_ref_name("refs/heads.lock/main").is_err());
    }

    #[test]
    fn reject_at_brace() {
        assert!(validate_ref_name("ref@{0}").is_err());
    }

    #[test]
    fn reject_component_starting_with_dot() {
        assert!(validate_ref_name("refs/heads/.hidden").is_err());
    }

    #[test]
    fn tag_names() {
        assert!(validate_tag_name("v1.0").is_ok());
        assert!(validate_tag_name("release/2024").is_ok());
        assert!(validate_tag_name("trailing.").is_err());
        match validate_tag_name("bad tag") {
            Err(RefError::InvalidName { name, reason }) => {
                assert_eq!(name, "bad tag");
                assert!(reason.starts_with("invalid tag name"));
            }
            other => panic!("expected InvalidName, got {other:?}"),
        }
    }

    #[test]
    fn is_valid_matches_validate() {
        assert!(is_valid_ref_name("HEAD"));
        assert!(!is_valid_ref_name("a..b"));
    }
}
