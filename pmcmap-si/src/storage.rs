//! Output payload storage
//!
//! The aggregation core hands its serialized tree to a [`TreeStore`]
//! together with a destination name; placement and format beyond "one JSON
//! document" are the store's concern.

use std::fs;
use std::path::{Path, PathBuf};

use pmcmap_common::{Error, Result};

/// Destination for one serialized subject tree.
pub trait TreeStore {
    /// Persist `payload` under `name`, returning where it landed.
    fn store(&self, payload: &serde_json::Value, name: &str) -> Result<PathBuf>;
}

/// Writes pretty-printed JSON files under a fixed directory, creating it on
/// first use.
pub struct FileTreeStore {
    dir: PathBuf,
}

impl FileTreeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Default destination name, timestamped to keep successive runs apart.
    pub fn timestamped_name() -> String {
        format!(
            "subjects_tree_{}.json",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        )
    }
}

impl TreeStore for FileTreeStore {
    fn store(&self, payload: &serde_json::Value, name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        let body = serde_json::to_string_pretty(payload)
            .map_err(|e| Error::Internal(format!("serialize payload: {e}")))?;
        fs::write(&path, body)?;
        tracing::info!(path = %path.display(), "Wrote subject tree");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileTreeStore::new(dir.path().join("trees"));

        let payload = json!({
            "label": "",
            "count": 2,
            "is_article": false,
            "children": [{"label": "Biology", "count": 2, "is_article": false, "children": []}],
        });

        let path = store.store(&payload, "subjects_tree.json").unwrap();
        assert!(path.ends_with("trees/subjects_tree.json"));

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, payload);
    }

    #[test]
    fn test_timestamped_name_shape() {
        let name = FileTreeStore::timestamped_name();
        assert!(name.starts_with("subjects_tree_"));
        assert!(name.ends_with(".json"));
    }
}
