use serde::{Deserialize, Serialize};

/// Settings for opening and operating on a repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Name of the metadata directory inside a worktree.
    pub metadata_dir: String,
    /// Shortest hex prefix that is looked up in the object store.
    pub min_prefix_len: usize,
    /// Flush objects and refs to stable storage before publishing them.
    pub fsync: bool,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            metadata_dir: ".git".into(),
            min_prefix_len: 4,
            fsync: false,
        }
    }
}

impl RepoConfig {
    /// Defaults with a different metadata directory name.
    pub fn with_metadata_dir(dir: impl Into<String>) -> Self {
        Self {
            metadata_dir: dir.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RepoConfig::default();
        assert_eq!(config.metadata_dir, ".git");
        assert_eq!(config.min_prefix_len, 4);
        assert!(!config.fsync);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: RepoConfig = serde_json::from_str(r#"{"fsync": true}"#).unwrap();
        assert!(config.fsync);
        assert_eq!(config.min_prefix_len, 4);
        assert_eq!(RepoConfig::with_metadata_dir(".grove").metadata_dir, ".grove");
    }
}
