//! Optional on-disk conversation history
//!
//! One JSON file per session under the configured directory. The in-memory
//! history stays authoritative; this layer only mirrors it so closed
//! sessions leave an inspectable transcript behind.

use std::fs;
use std::path::PathBuf;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::conversation::ConversationTurn;

/// JSON file store for per-session conversation transcripts
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, session_id: Uuid) -> PathBuf {
        self.dir.join(format!("{session_id}.json"))
    }

    /// Write the full transcript for a session, replacing any previous file.
    /// The write goes through a temp file and rename so a crash mid-write
    /// never leaves a truncated transcript.
    pub fn save(&self, session_id: Uuid, history: &[ConversationTurn]) -> Result<()> {
        let json = serde_json::to_vec_pretty(history)
            .map_err(|e| Error::Internal(format!("history serialization failed: {e}")))?;
        let path = self.path_for(session_id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        tracing::debug!(session = %session_id, turns = history.len(), "persisted history");
        Ok(())
    }

    /// Load a session's transcript, `None` when nothing was ever saved
    pub fn load(&self, session_id: Uuid) -> Result<Option<Vec<ConversationTurn>>> {
        let path = self.path_for(session_id);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let history = serde_json::from_slice(&data)
            .map_err(|e| Error::Internal(format!("history file {path:?} is corrupt: {e}")))?;
        Ok(Some(history))
    }

    /// Delete a session's transcript; missing files are not an error
    pub fn remove(&self, session_id: Uuid) -> Result<()> {
        match fs::remove_file(self.path_for(session_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
