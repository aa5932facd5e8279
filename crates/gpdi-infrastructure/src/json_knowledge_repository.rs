//! JSON-file KnowledgeRepository implementation.

use crate::storage::{AtomicFile, into_domain_error};
use gpdi_core::Result;
use gpdi_core::knowledge::{KnowledgeBase, KnowledgeRepository};
use std::path::{Path, PathBuf};

/// Stores the knowledge base as a single JSON object.
///
/// ```text
/// {
///     "merhaba": [
///         "selam",
///         "merhaba!"
///     ]
/// }
/// ```
///
/// The file is rewritten in full on every save.
pub struct JsonKnowledgeRepository {
    file: AtomicFile<KnowledgeBase>,
}

impl JsonKnowledgeRepository {
    /// Creates a repository backed by `path`. Nothing is touched on disk yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AtomicFile::json(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl KnowledgeRepository for JsonKnowledgeRepository {
    fn load(&self) -> Result<KnowledgeBase> {
        let base = self
            .file
            .load()
            .map_err(|e| into_domain_error(self.file.path(), e))?
            .unwrap_or_default();

        tracing::debug!(
            path = %self.file.path().display(),
            entries = base.len(),
            "Loaded knowledge base"
        );
        Ok(base)
    }

    fn save(&self, base: &KnowledgeBase) -> Result<()> {
        self.file
            .save(base)
            .map_err(|e| into_domain_error(self.file.path(), e))?;

        tracing::debug!(
            path = %self.file.path().display(),
            entries = base.len(),
            "Saved knowledge base"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_empty_base() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonKnowledgeRepository::new(temp_dir.path().join("database.json"));

        let base = repository.load().unwrap();
        assert!(base.is_empty());
        // loading never creates the file
        assert!(!repository.path().exists());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonKnowledgeRepository::new(temp_dir.path().join("database.json"));

        let mut base = KnowledgeBase::new();
        base.teach("merhaba", "selam");
        base.teach("merhaba", "hi");
        base.teach("merhaba", "selam");
        base.teach("görüşürüz", "hoşça kal");
        repository.save(&base).unwrap();

        let loaded = repository.load().unwrap();
        assert_eq!(loaded, base);
        assert_eq!(
            loaded.responses("merhaba").unwrap(),
            &["selam".to_string(), "hi".to_string(), "selam".to_string()]
        );
    }

    #[test]
    fn test_save_overwrites_previous_contents() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonKnowledgeRepository::new(temp_dir.path().join("database.json"));

        let mut first = KnowledgeBase::new();
        first.teach("a", "1");
        repository.save(&first).unwrap();

        let mut second = KnowledgeBase::new();
        second.teach("b", "2");
        repository.save(&second).unwrap();

        let loaded = repository.load().unwrap();
        assert!(!loaded.contains("a"));
        assert!(loaded.contains("b"));
    }

    #[test]
    fn test_reads_file_written_by_hand() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("database.json");
        fs::write(
            &path,
            r#"{
    "nasılsın": [
        "iyiyim"
    ]
}"#,
        )
        .unwrap();

        let base = JsonKnowledgeRepository::new(&path).load().unwrap();
        assert_eq!(base.responses("nasılsın").unwrap(), &["iyiyim".to_string()]);
    }

    #[test]
    fn test_unparsable_file_is_corrupt_store() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("database.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonKnowledgeRepository::new(&path).load().unwrap_err();
        assert!(err.is_corrupt_store());
    }

    #[test]
    fn test_empty_file_is_corrupt_store() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("database.json");
        fs::write(&path, "").unwrap();

        let err = JsonKnowledgeRepository::new(&path).load().unwrap_err();
        assert!(err.is_corrupt_store());
    }

    #[test]
    fn test_non_utf8_file_is_corrupt_store() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("database.json");
        // "nasılsın" written in a legacy single-byte Turkish code page
        fs::write(&path, b"{\"nas\xfdls\xfdn\": [\"iyi\"]}").unwrap();

        let err = JsonKnowledgeRepository::new(&path).load().unwrap_err();
        assert!(err.is_corrupt_store());
        assert!(fs::read(&path).unwrap().contains(&0xfd));
    }

    #[test]
    fn test_key_without_responses_is_corrupt_store() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("database.json");
        fs::write(&path, r#"{"merhaba": []}"#).unwrap();

        let err = JsonKnowledgeRepository::new(&path).load().unwrap_err();
        assert!(err.is_corrupt_store());
    }
}
