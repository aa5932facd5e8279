//! Application layer for Gpd-i.
//!
//! Coordinates the domain model with the storage and network collaborators
//! to run one conversational turn at a time.

pub mod learning;
pub mod orchestrator;

pub use learning::LearningUpdater;
pub use orchestrator::{
    ChatOrchestrator, Collaborators, LanguageChange, PendingCorrection, TurnOutcome, TurnRecord,
    TurnSource,
};
