//! Directory-backed SessionRepository implementation.

use crate::storage::{AtomicFile, into_domain_error};
use gpdi_core::session::{SessionId, SessionRepository, Turn};
use gpdi_core::{GpdiError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

const SEQUENCE_FILE: &str = "sequence.toml";

/// Highest session number ever issued, persisted so numbers survive restarts
/// even when the newest sessions were deleted.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SequenceState {
    last_issued: u64,
}

/// Stores each conversation as its own JSON file in one directory.
///
/// ```text
/// chats/
/// ├── chat_1.json      # [["hello", "hi"], ["bye", "see you"]]
/// ├── chat_2.json
/// └── sequence.toml    # last_issued = 2
/// ```
///
/// Sessions are created lazily: `create` only reserves the number and puts it
/// in the index, the file appears with the first `append`. Reserved numbers
/// without a file are remembered for the lifetime of this instance only.
pub struct DirSessionRepository {
    sessions_dir: PathBuf,
    sequence: AtomicFile<SequenceState>,
    /// Identities with a record on disk.
    stored: BTreeSet<SessionId>,
    /// Identities created by this instance that have no record yet.
    reserved: BTreeSet<SessionId>,
    last_issued: u64,
}

impl DirSessionRepository {
    /// Opens (and if needed creates) the session directory and builds the index.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or read, or if the
    /// sequence file is unreadable.
    pub fn new(sessions_dir: impl AsRef<Path>) -> Result<Self> {
        let sessions_dir = sessions_dir.as_ref().to_path_buf();
        fs::create_dir_all(&sessions_dir)?;

        let sequence = AtomicFile::<SequenceState>::toml(sessions_dir.join(SEQUENCE_FILE));
        let last_issued = sequence
            .load()
            .map_err(|e| into_domain_error(sequence.path(), e))?
            .map(|state| state.last_issued)
            .unwrap_or(0);

        let mut repository = Self {
            sessions_dir,
            sequence,
            stored: BTreeSet::new(),
            reserved: BTreeSet::new(),
            last_issued,
        };
        repository.refresh()?;
        Ok(repository)
    }

    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    fn session_file(&self, id: SessionId) -> AtomicFile<Vec<Turn>> {
        AtomicFile::json(self.sessions_dir.join(format!("{}.json", id)))
    }

    fn is_known(&self, id: SessionId) -> bool {
        self.stored.contains(&id) || self.reserved.contains(&id)
    }

    /// Reads the directory and returns every `chat_N.json` identity found.
    ///
    /// Only canonical names count: `chat_007.json` or `chat_+7.json` would
    /// parse to `chat_7` but are not the file `chat_7` reads and deletes.
    fn scan(&self) -> Result<BTreeSet<SessionId>> {
        let mut found = BTreeSet::new();

        for entry in fs::read_dir(&self.sessions_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !stem.starts_with("chat_") {
                continue;
            }
            match stem.parse::<SessionId>() {
                Ok(id) if id.to_string() == stem => {
                    found.insert(id);
                }
                _ => {
                    tracing::warn!("Skipping unrecognised session file: {:?}", path);
                }
            }
        }

        Ok(found)
    }
}

impl SessionRepository for DirSessionRepository {
    fn create(&mut self) -> Result<SessionId> {
        let highest_known = self
            .stored
            .iter()
            .chain(self.reserved.iter())
            .map(SessionId::sequence)
            .max()
            .unwrap_or(0);
        let id = SessionId::new(self.last_issued.max(highest_known)).next();

        self.sequence
            .save(&SequenceState {
                last_issued: id.sequence(),
            })
            .map_err(|e| into_domain_error(self.sequence.path(), e))?;
        self.last_issued = id.sequence();
        self.reserved.insert(id);

        tracing::info!(session = %id, "Created session");
        Ok(id)
    }

    fn append(&mut self, id: SessionId, turn: Turn) -> Result<()> {
        if !self.is_known(id) {
            return Err(GpdiError::session_not_found(id.to_string()));
        }

        let file = self.session_file(id);
        file.update(Vec::new(), |turns| {
            turns.push(turn);
            Ok(())
        })
        .map_err(|e| into_domain_error(file.path(), e))?;

        self.reserved.remove(&id);
        self.stored.insert(id);
        tracing::debug!(session = %id, "Appended turn");
        Ok(())
    }

    fn load(&self, id: SessionId) -> Result<Vec<Turn>> {
        if !self.is_known(id) {
            return Err(GpdiError::session_not_found(id.to_string()));
        }

        let file = self.session_file(id);
        let turns = file
            .load()
            .map_err(|e| into_domain_error(file.path(), e))?
            .unwrap_or_default();
        Ok(turns)
    }

    fn list(&self) -> Vec<SessionId> {
        self.stored.union(&self.reserved).copied().collect()
    }

    fn delete(&mut self, id: SessionId) -> Result<()> {
        let file = self.session_file(id);
        let removed = file
            .remove()
            .map_err(|e| into_domain_error(file.path(), e))?;

        let was_known = self.stored.remove(&id) | self.reserved.remove(&id);
        if removed || was_known {
            tracing::info!(session = %id, "Deleted session");
        }
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        self.stored = self.scan()?;
        let stored = &self.stored;
        self.reserved.retain(|id| !stored.contains(id));
        Ok(())
    }
}
