//! Knowledge base domain module.
//!
//! # Module Structure
//!
//! - `model`: The phrase → responses mapping (`KnowledgeBase`)
//! - `matcher`: Single-best fuzzy lookup (`FuzzyMatcher`)
//! - `repository`: Persistence trait (`KnowledgeRepository`)

mod matcher;
mod model;
mod repository;

pub use matcher::{DEFAULT_THRESHOLD, FuzzyMatcher, Match, find_closest, quick_ratio, similarity};
pub use model::{KnowledgeBase, TeachOutcome};
pub use repository::KnowledgeRepository;
