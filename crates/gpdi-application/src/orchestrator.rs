//! Per-turn control flow.
//!
//! A turn runs in one or two phases:
//!
//! 1. [`ChatOrchestrator::handle_turn`] translates the input into the canonical
//!    language, asks the fuzzy matcher, and falls back to the web retriever.
//!    If either produces an answer the turn is recorded and returned as
//!    [`TurnOutcome::Answered`].
//! 2. Otherwise the caller receives [`TurnOutcome::NeedsCorrection`], asks the
//!    user, and finishes the turn with [`ChatOrchestrator::resolve_correction`].
//!
//! A turn that fails with an error is never written to the session.

use std::sync::Arc;

use gpdi_core::config::{MessagesConfig, RootConfig};
use gpdi_core::knowledge::{FuzzyMatcher, KnowledgeBase, KnowledgeRepository};
use gpdi_core::language::{LanguageCode, Translator};
use gpdi_core::retrieval::{FallbackRetriever, NotFound};
use gpdi_core::session::{SessionId, SessionRepository, Turn};
use gpdi_core::{GpdiError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};

use crate::learning::LearningUpdater;

/// Storage and network collaborators the orchestrator drives.
pub struct Collaborators {
    pub knowledge: Box<dyn KnowledgeRepository>,
    pub sessions: Box<dyn SessionRepository>,
    pub translator: Arc<dyn Translator>,
    pub retriever: Arc<dyn FallbackRetriever>,
}

/// Where the response of a completed turn came from.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnSource {
    /// A knowledge-base entry matched.
    Knowledge { key: String, ratio: f64 },
    /// The web retriever produced the answer.
    Fallback,
    /// The user taught a new response.
    Learned,
    /// Nothing answered and the user declined to teach.
    Unanswered,
}

/// A turn that has been written to its session.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRecord {
    pub session_id: SessionId,
    pub user_input: String,
    pub response: String,
    pub source: TurnSource,
}

/// A turn waiting for the user to teach (or decline to teach) an answer.
///
/// Consumed by [`ChatOrchestrator::resolve_correction`], so a pending turn
/// can be taught and recorded at most once. It cannot be cloned:
///
/// ```compile_fail
/// fn duplicate<T: Clone>(value: &T) -> T {
///     value.clone()
/// }
///
/// fn resubmit(pending: &gpdi_application::PendingCorrection) {
///     let _again = duplicate(pending);
/// }
/// ```
#[derive(Debug, PartialEq)]
pub struct PendingCorrection {
    user_input: String,
    reason: NotFound,
    message: String,
}

impl PendingCorrection {
    pub fn user_input(&self) -> &str {
        &self.user_input
    }

    /// Why the fallback retriever came back empty.
    pub fn reason(&self) -> NotFound {
        self.reason
    }

    /// The "please teach me" text to show alongside the reason.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, PartialEq)]
pub enum TurnOutcome {
    Answered(TurnRecord),
    NeedsCorrection(PendingCorrection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageChange {
    Changed,
    /// The requested language was already active.
    Unchanged,
}

/// Owns the knowledge base, the session index and the active session.
///
/// All operations take `&mut self`; turns are processed one at a time.
pub struct ChatOrchestrator {
    knowledge: KnowledgeBase,
    learning: LearningUpdater,
    sessions: Box<dyn SessionRepository>,
    translator: Arc<dyn Translator>,
    retriever: Arc<dyn FallbackRetriever>,
    matcher: FuzzyMatcher,
    rng: Box<dyn RngCore + Send>,
    canonical_language: LanguageCode,
    ui_language: LanguageCode,
    supported_languages: Vec<LanguageCode>,
    messages: MessagesConfig,
    active_session: Option<SessionId>,
}

impl ChatOrchestrator {
    /// Loads the knowledge base and prepares an orchestrator with no active session.
    ///
    /// # Errors
    ///
    /// Fails with `CorruptStore` if the knowledge base exists but cannot be
    /// read, and with `Config` if the matching threshold is out of range.
    pub fn new(config: &RootConfig, collaborators: Collaborators) -> Result<Self> {
        let matcher = FuzzyMatcher::new(config.matching.similarity_threshold)?;
        let learning = LearningUpdater::new(collaborators.knowledge);
        let knowledge = learning.load()?;

        tracing::info!(
            entries = knowledge.len(),
            canonical = %config.canonical_language,
            ui = %config.ui_language,
            "Orchestrator ready"
        );

        Ok(Self {
            knowledge,
            learning,
            sessions: collaborators.sessions,
            translator: collaborators.translator,
            retriever: collaborators.retriever,
            matcher,
            rng: Box::new(StdRng::from_entropy()),
            canonical_language: config.canonical_language.clone(),
            ui_language: config.ui_language.clone(),
            supported_languages: config.supported_languages.clone(),
            messages: config.messages.clone(),
            active_session: None,
        })
    }

    /// Replaces the random source used to pick among several responses.
    pub fn with_rng(mut self, rng: Box<dyn RngCore + Send>) -> Self {
        self.rng = rng;
        self
    }

    // ========================================================================
    // Turns
    // ========================================================================

    /// Runs the first phase of a turn for `user_input` (in the UI language).
    pub async fn handle_turn(&mut self, user_input: &str) -> Result<TurnOutcome> {
        if user_input.trim().is_empty() {
            return Err(GpdiError::invalid_input("message is empty"));
        }

        let canonical_query = self.to_canonical(user_input).await?;

        let hit = self
            .matcher
            .find_closest(&canonical_query, &self.knowledge)
            .and_then(|found| {
                let chosen = self.knowledge.responses(found.key)?.choose(&mut self.rng)?;
                Some((found.key.to_string(), found.ratio, chosen.clone()))
            });

        if let Some((key, ratio, chosen)) = hit {
            tracing::debug!(%key, ratio, "Answering from knowledge base");
            let response = self.from_canonical(&chosen).await?;
            let record =
                self.record_turn(user_input, response, TurnSource::Knowledge { key, ratio })?;
            return Ok(TurnOutcome::Answered(record));
        }

        match self.retriever.retrieve(user_input).await {
            Ok(found) => {
                let response = self.from_canonical(&found).await?;
                let record = self.record_turn(user_input, response, TurnSource::Fallback)?;
                Ok(TurnOutcome::Answered(record))
            }
            Err(reason) => {
                tracing::info!(%reason, "No answer available, asking for a correction");
                Ok(TurnOutcome::NeedsCorrection(PendingCorrection {
                    user_input: user_input.to_string(),
                    reason,
                    message: self.messages.unknown.clone(),
                }))
            }
        }
    }

    /// Finishes a turn that needed a correction.
    ///
    /// `None`, or a correction that is empty after trimming, declines: the
    /// "I don't know" message is recorded and nothing is learned. Otherwise
    /// the input and correction are translated to the canonical language,
    /// learned, and the acknowledgment is recorded.
    pub async fn resolve_correction(
        &mut self,
        pending: PendingCorrection,
        correction: Option<&str>,
    ) -> Result<TurnRecord> {
        let correction = correction.map(str::trim).filter(|text| !text.is_empty());

        let Some(correction) = correction else {
            let response = self.messages.unknown.clone();
            return self.record_turn(&pending.user_input, response, TurnSource::Unanswered);
        };

        let canonical_query = self.to_canonical(&pending.user_input).await?;
        let canonical_response = self.to_canonical(correction).await?;

        self.learning
            .teach(&mut self.knowledge, &canonical_query, &canonical_response)?;

        let response = self.messages.learned.clone();
        self.record_turn(&pending.user_input, response, TurnSource::Learned)
    }

    fn record_turn(
        &mut self,
        user_input: &str,
        response: String,
        source: TurnSource,
    ) -> Result<TurnRecord> {
        let session_id = match self.active_session {
            Some(id) => id,
            None => {
                let id = self.sessions.create()?;
                self.active_session = Some(id);
                id
            }
        };

        self.sessions
            .append(session_id, Turn::new(user_input, response.clone()))?;

        Ok(TurnRecord {
            session_id,
            user_input: user_input.to_string(),
            response,
            source,
        })
    }

    async fn to_canonical(&self, text: &str) -> Result<String> {
        if self.ui_language == self.canonical_language {
            return Ok(text.to_string());
        }
        self.translator
            .translate(text, &self.ui_language, &self.canonical_language)
            .await
    }

    async fn from_canonical(&self, text: &str) -> Result<String> {
        if self.ui_language == self.canonical_language {
            return Ok(text.to_string());
        }
        self.translator
            .translate(text, &self.canonical_language, &self.ui_language)
            .await
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    pub fn active_session(&self) -> Option<SessionId> {
        self.active_session
    }

    /// Deactivates the current session; the next turn starts a new one.
    pub fn new_session(&mut self) {
        if let Some(id) = self.active_session.take() {
            tracing::debug!(session = %id, "Deactivated session");
        }
    }

    /// Makes `id` the active session and returns its turns.
    pub fn select_session(&mut self, id: SessionId) -> Result<Vec<Turn>> {
        let turns = self.sessions.load(id)?;
        self.active_session = Some(id);
        Ok(turns)
    }

    /// Deletes `id`; deleting an unknown session is a no-op.
    pub fn delete_session(&mut self, id: SessionId) -> Result<()> {
        self.sessions.delete(id)?;
        if self.active_session == Some(id) {
            self.active_session = None;
        }
        Ok(())
    }

    pub fn sessions(&self) -> Vec<SessionId> {
        self.sessions.list()
    }

    /// Rescans session storage and returns the refreshed list.
    pub fn refresh_sessions(&mut self) -> Result<Vec<SessionId>> {
        self.sessions.refresh()?;
        Ok(self.sessions.list())
    }

    // ========================================================================
    // Languages
    // ========================================================================

    pub fn ui_language(&self) -> &LanguageCode {
        &self.ui_language
    }

    pub fn canonical_language(&self) -> &LanguageCode {
        &self.canonical_language
    }

    pub fn supported_languages(&self) -> &[LanguageCode] {
        &self.supported_languages
    }

    /// Switches the UI language to `code`, which must be supported.
    pub fn set_ui_language(&mut self, code: &str) -> Result<LanguageChange> {
        let code = LanguageCode::new(code)?;
        if !self.supported_languages.contains(&code) {
            return Err(GpdiError::invalid_input(format!(
                "language '{}' is not supported",
                code
            )));
        }
        if code == self.ui_language {
            return Ok(LanguageChange::Unchanged);
        }

        tracing::info!(from = %self.ui_language, to = %code, "UI language changed");
        self.ui_language = code;
        Ok(LanguageChange::Changed)
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryKnowledge;

    impl KnowledgeRepository for MemoryKnowledge {
        fn load(&self) -> Result<KnowledgeBase> {
            Ok(KnowledgeBase::new())
        }

        fn save(&self, _base: &KnowledgeBase) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemorySessions {
        next: u64,
        turns: BTreeMap<SessionId, Vec<Turn>>,
    }

    impl SessionRepository for MemorySessions {
        fn create(&mut self) -> Result<SessionId> {
            self.next += 1;
            let id = SessionId::new(self.next);
            self.turns.insert(id, Vec::new());
            Ok(id)
        }

        fn append(&mut self, id: SessionId, turn: Turn) -> Result<()> {
            self.turns
                .get_mut(&id)
                .ok_or_else(|| GpdiError::session_not_found(id.to_string()))?
                .push(turn);
            Ok(())
        }

        fn load(&self, id: SessionId) -> Result<Vec<Turn>> {
            self.turns
                .get(&id)
                .cloned()
                .ok_or_else(|| GpdiError::session_not_found(id.to_string()))
        }

        fn list(&self) -> Vec<SessionId> {
            self.turns.keys().copied().collect()
        }

        fn delete(&mut self, id: SessionId) -> Result<()> {
            self.turns.remove(&id);
            Ok(())
        }

        fn refresh(&mut self) -> Result<()> {
            Ok(())
        }
    }

    /// Records every call so tests can assert the service was skipped.
    #[derive(Default)]
    struct CountingTranslator {
        calls: Mutex<usize>,
    }

    #[async_trait::async_trait]
    impl Translator for CountingTranslator {
        async fn translate(
            &self,
            text: &str,
            _source: &LanguageCode,
            _target: &LanguageCode,
        ) -> Result<String> {
            *self.calls.lock().unwrap() += 1;
            Ok(text.to_string())
        }
    }

    struct NoRetriever;

    #[async_trait::async_trait]
    impl FallbackRetriever for NoRetriever {
        async fn retrieve(&self, _query: &str) -> std::result::Result<String, NotFound> {
            Err(NotFound::NoInformation)
        }
    }

    fn orchestrator(config: &RootConfig, translator: Arc<CountingTranslator>) -> ChatOrchestrator {
        ChatOrchestrator::new(
            config,
            Collaborators {
                knowledge: Box::new(MemoryKnowledge),
                sessions: Box::new(MemorySessions::default()),
                translator,
                retriever: Arc::new(NoRetriever),
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected_and_not_recorded() {
        let mut chat = orchestrator(&RootConfig::default(), Arc::default());

        let err = chat.handle_turn("   ").await.unwrap_err();

        assert!(matches!(err, GpdiError::InvalidInput(_)));
        assert!(chat.sessions().is_empty());
        assert_eq!(chat.active_session(), None);
    }

    #[tokio::test]
    async fn test_same_language_skips_translation() {
        let config = RootConfig {
            ui_language: LanguageCode::new("tr").unwrap(),
            ..RootConfig::default()
        };
        let translator = Arc::new(CountingTranslator::default());
        let mut chat = orchestrator(&config, translator.clone());

        let outcome = chat.handle_turn("merhaba").await.unwrap();
        let TurnOutcome::NeedsCorrection(pending) = outcome else {
            panic!("expected a correction request");
        };
        assert_eq!(pending.reason(), NotFound::NoInformation);

        chat.resolve_correction(pending, Some("selam")).await.unwrap();
        assert_eq!(*translator.calls.lock().unwrap(), 0);
        assert_eq!(
            chat.knowledge().responses("merhaba").unwrap(),
            &["selam".to_string()]
        );
    }

    #[test]
    fn test_set_ui_language() {
        let mut chat = orchestrator(&RootConfig::default(), Arc::default());

        assert_eq!(chat.set_ui_language("en").unwrap(), LanguageChange::Unchanged);
        assert_eq!(chat.set_ui_language("DE").unwrap(), LanguageChange::Changed);
        assert_eq!(chat.ui_language().as_str(), "de");

        let err = chat.set_ui_language("ja").unwrap_err();
        assert!(matches!(err, GpdiError::InvalidInput(_)));
        assert_eq!(chat.ui_language().as_str(), "de");
    }

    #[test]
    fn test_delete_active_session_deactivates_it() {
        let mut chat = orchestrator(&RootConfig::default(), Arc::default());
        let id = chat.sessions.create().unwrap();
        chat.select_session(id).unwrap();
        assert_eq!(chat.active_session(), Some(id));

        chat.delete_session(id).unwrap();
        assert_eq!(chat.active_session(), None);
        // second delete is a no-op
        chat.delete_session(id).unwrap();
    }
}
