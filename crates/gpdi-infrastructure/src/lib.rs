pub mod config_service;
pub mod dir_session_repository;
pub mod json_knowledge_repository;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::dir_session_repository::DirSessionRepository;
pub use crate::json_knowledge_repository::JsonKnowledgeRepository;
pub use crate::paths::{DataDir, GpdiPaths, PathError};
