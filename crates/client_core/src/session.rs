//! Local session storage. The signed-in [`User`] lives in a JSON file between
//! runs; commands receive it explicitly rather than reading ambient state.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use shared::domain::User;
use tracing::info;

use crate::error::SessionError;

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<User, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(SessionError::Missing(self.path.clone()));
            }
            Err(source) => return Err(self.io_error(source)),
        };
        serde_json::from_str(&raw).map_err(|source| SessionError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, user: &User) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let body = serde_json::to_string_pretty(user).map_err(|source| SessionError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, body).map_err(|source| self.io_error(source))?;
        info!(path = %self.path.display(), user_id = %user.id, "session stored");
        Ok(())
    }

    /// Removes the stored session. Clearing an absent session is not an error.
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "session cleared");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
