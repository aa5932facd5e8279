//! Session repository trait.
//!
//! Defines the interface for conversation persistence operations.

use super::model::{SessionId, Turn};
use crate::error::Result;

/// An abstract store of saved conversations.
///
/// The repository owns the session index: the set of identities it knows
/// about. The index is updated in place by `create` and `delete` and only
/// rescanned from storage on `refresh`, so changes made to the storage
/// location by other processes are not noticed until then.
pub trait SessionRepository: Send + Sync {
    /// Allocates a fresh identity and registers it in the index.
    ///
    /// Identities are monotonic and never handed out twice, not even after the
    /// session they named was deleted.
    fn create(&mut self) -> Result<SessionId>;

    /// Appends `turn` to the session and persists the full turn sequence.
    ///
    /// # Errors
    ///
    /// - `GpdiError::SessionNotFound`: `id` is not in the index
    fn append(&mut self, id: SessionId, turn: Turn) -> Result<()>;

    /// Loads every turn of a session in append order.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Turn>)`: The turns (empty for a session with no turns yet)
    /// - `Err(GpdiError::SessionNotFound)`: `id` is not in the index
    fn load(&self, id: SessionId) -> Result<Vec<Turn>>;

    /// Lists known session identities in ascending order.
    fn list(&self) -> Vec<SessionId>;

    /// Removes a session's record and its index entry.
    ///
    /// Deleting an unknown or already deleted identity is a no-op.
    fn delete(&mut self, id: SessionId) -> Result<()>;

    /// Rebuilds the index from storage.
    fn refresh(&mut self) -> Result<()>;
}
