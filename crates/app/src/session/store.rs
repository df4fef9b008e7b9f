//! Session persistence.

use std::{fs, io, path::PathBuf};

use tracing::debug;

use super::{ReceiptSession, SessionError};

/// Reads and writes a [`ReceiptSession`] as a JSON file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the saved session. A missing file yields an empty session.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Io`]: the file exists but cannot be read.
    /// - [`SessionError::Decode`]: the file is not a valid session.
    pub fn load(&self) -> Result<ReceiptSession, SessionError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved session, starting fresh");

                return Ok(ReceiptSession::default());
            }
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&contents).map_err(|source| SessionError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Save the session, replacing any previous contents.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Decode`]: the session cannot be serialised.
    /// - [`SessionError::Io`]: the file cannot be written.
    pub fn save(&self, session: &ReceiptSession) -> Result<(), SessionError> {
        let json = serde_json::to_string_pretty(session).map_err(|source| SessionError::Decode {
            path: self.path.clone(),
            source,
        })?;

        fs::write(&self.path, json).map_err(|source| SessionError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), items = session.items().len(), "session saved");

        Ok(())
    }
}
