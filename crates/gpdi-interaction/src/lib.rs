//! External collaborators behind the core `Translator` and
//! `FallbackRetriever` traits.

pub mod google_translator;
pub mod identity_translator;
pub mod offline_retriever;
pub mod web_search_retriever;

pub use google_translator::GoogleTranslator;
pub use identity_translator::IdentityTranslator;
pub use offline_retriever::OfflineRetriever;
pub use web_search_retriever::WebSearchRetriever;
