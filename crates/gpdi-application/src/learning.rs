//! Learning updater.
//!
//! Encapsulates the "copy → teach → save → commit" pattern so a failed write
//! never leaves the in-memory knowledge base ahead of what is on disk.

use gpdi_core::Result;
use gpdi_core::knowledge::{KnowledgeBase, KnowledgeRepository, TeachOutcome};

pub struct LearningUpdater {
    repository: Box<dyn KnowledgeRepository>,
}

impl LearningUpdater {
    pub fn new(repository: Box<dyn KnowledgeRepository>) -> Self {
        Self { repository }
    }

    /// Reads the persisted knowledge base.
    pub fn load(&self) -> Result<KnowledgeBase> {
        self.repository.load()
    }

    /// Adds `response` under `query` and persists the whole base.
    ///
    /// # Errors
    ///
    /// Returns the repository error if saving fails; `base` is then unchanged.
    pub fn teach(
        &self,
        base: &mut KnowledgeBase,
        query: &str,
        response: &str,
    ) -> Result<TeachOutcome> {
        let mut updated = base.clone();
        let outcome = updated.teach(query, response);

        self.repository.save(&updated)?;
        *base = updated;

        match outcome {
            TeachOutcome::NewEntry => {
                tracing::info!(query, "Learned new phrase");
            }
            TeachOutcome::Extended { responses } => {
                tracing::info!(query, responses, "Learned another response");
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpdi_core::GpdiError;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MemoryRepository {
        saved: Arc<Mutex<Option<KnowledgeBase>>>,
    }

    impl KnowledgeRepository for MemoryRepository {
        fn load(&self) -> Result<KnowledgeBase> {
            Ok(self.saved.lock().unwrap().clone().unwrap_or_default())
        }

        fn save(&self, base: &KnowledgeBase) -> Result<()> {
            *self.saved.lock().unwrap() = Some(base.clone());
            Ok(())
        }
    }

    struct ReadOnlyRepository;

    impl KnowledgeRepository for ReadOnlyRepository {
        fn load(&self) -> Result<KnowledgeBase> {
            Ok(KnowledgeBase::new())
        }

        fn save(&self, _base: &KnowledgeBase) -> Result<()> {
            Err(GpdiError::io("read-only file system"))
        }
    }

    #[test]
    fn test_teach_new_phrase_is_saved() {
        let repository = MemoryRepository::default();
        let updater = LearningUpdater::new(Box::new(repository.clone()));
        let mut base = KnowledgeBase::new();

        let outcome = updater.teach(&mut base, "hoşça kal", "güle güle").unwrap();

        assert_eq!(outcome, TeachOutcome::NewEntry);
        assert_eq!(base.responses("hoşça kal").unwrap(), &["güle güle".to_string()]);
        assert_eq!(updater.load().unwrap(), base);
    }

    #[test]
    fn test_teach_is_additive() {
        let updater = LearningUpdater::new(Box::new(MemoryRepository::default()));
        let mut base = KnowledgeBase::new();
        updater.teach(&mut base, "merhaba", "selam").unwrap();
        updater.teach(&mut base, "merhaba", "hi").unwrap();

        let outcome = updater.teach(&mut base, "merhaba", "selam").unwrap();

        assert_eq!(outcome, TeachOutcome::Extended { responses: 3 });
        assert_eq!(
            base.responses("merhaba").unwrap(),
            &["selam".to_string(), "hi".to_string(), "selam".to_string()]
        );
    }

    #[test]
    fn test_failed_save_leaves_base_untouched() {
        let updater = LearningUpdater::new(Box::new(ReadOnlyRepository));
        let mut base = KnowledgeBase::new();
        base.teach("merhaba", "selam");
        let before = base.clone();

        let err = updater.teach(&mut base, "merhaba", "hi").unwrap_err();

        assert!(matches!(err, GpdiError::Io { .. }));
        assert_eq!(base, before);
    }
}
