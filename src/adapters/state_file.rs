//! Max/min state file adapter
//!
//! This adapter implements the StatePort trait with a small versioned file:
//!
//! ```text
//! ┌────────┬─────────┬──────────────────────────────────────────┐
//! │ "HMTM" │ version │ postcard { written_at: i64, values: [f64] } │
//! │ 4 B    │ 1 B     │ variable                                   │
//! └────────┴─────────┴──────────────────────────────────────────┘
//! ```
//!
//! Saves go to a sibling `.tmp` file which is synced and then renamed over
//! the real one, so a power cut leaves either the previous or the new
//! record.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::PersistenceError;
use crate::ports::storage::{PersistedState, StatePort};

/// File signature
pub const MAGIC: &[u8; 4] = b"HMTM";

/// Current format version
pub const FORMAT_VERSION: u8 = 1;

const HEADER_LEN: usize = MAGIC.len() + 1;

/// File-backed state port
#[derive(Clone, Debug)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Serialize a record into the on-disk layout
pub fn encode(state: &PersistedState) -> Result<Vec<u8>, PersistenceError> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + 9 + state.values.len() * 8);
    bytes.extend_from_slice(MAGIC);
    bytes.push(FORMAT_VERSION);
    let payload = postcard::to_allocvec(state)?;
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Parse the on-disk layout, checking signature and version
pub fn decode(bytes: &[u8]) -> Result<PersistedState, PersistenceError> {
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(PersistenceError::BadMagic);
    }

    match bytes[MAGIC.len()] {
        FORMAT_VERSION => Ok(postcard::from_bytes(&bytes[HEADER_LEN..])?),
        other => Err(PersistenceError::UnsupportedVersion(other)),
    }
}

impl StatePort for StateFile {
    fn load(&mut self) -> Result<Option<PersistedState>, PersistenceError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        decode(&bytes).map(Some)
    }

    fn save(&mut self, state: &PersistedState) -> Result<(), PersistenceError> {
        let bytes = encode(state)?;
        let tmp = self.tmp_path();

        {
            let mut file = File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), values = state.values.len(), "max/min list saved");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PersistenceError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
