//! Knowledge base repository trait.

use super::model::KnowledgeBase;
use crate::error::Result;

/// Durable storage for the knowledge base.
///
/// The whole mapping is read once at start-up and written back in full after
/// every mutation; there is no partial update.
pub trait KnowledgeRepository: Send + Sync {
    /// Loads the stored knowledge base.
    ///
    /// # Returns
    ///
    /// - `Ok(KnowledgeBase)`: The stored mapping, or an empty one if nothing was stored yet
    /// - `Err(GpdiError::CorruptStore)`: A record exists but cannot be parsed
    fn load(&self) -> Result<KnowledgeBase>;

    /// Replaces the stored knowledge base with `base`.
    ///
    /// Implementations must never leave a truncated record behind that could
    /// later be read back as valid.
    fn save(&self, base: &KnowledgeBase) -> Result<()>;
}
