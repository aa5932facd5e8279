//! Storage layer for atomic file operations.

mod atomic_file;

pub use atomic_file::{AtomicFile, AtomicFileError, FileFormat};

use gpdi_core::GpdiError;
use std::path::Path;

/// Maps a storage failure on `path` into the domain error taxonomy.
///
/// Decoding failures of an existing record become `CorruptStore`; everything
/// else keeps its I/O or serialization flavour.
pub(crate) fn into_domain_error(path: &Path, err: AtomicFileError) -> GpdiError {
    match err {
        AtomicFileError::ParseError { message, .. } => {
            GpdiError::corrupt_store(path.display().to_string(), message)
        }
        AtomicFileError::SerializeError { format, message } => GpdiError::Serialization {
            format: format.name().to_string(),
            message,
        },
        AtomicFileError::IoError(e) => GpdiError::from(e),
        AtomicFileError::LockError(message) => GpdiError::io(message),
    }
}
