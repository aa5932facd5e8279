//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Session identity and turn types (`SessionId`, `Turn`)
//! - `repository`: Repository trait for conversation persistence

mod model;
mod repository;

pub use model::{SessionId, Turn};
pub use repository::SessionRepository;
