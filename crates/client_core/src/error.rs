use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{method} {url} failed: {source}")]
    Request {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} returned status {status}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
    },
    #[error("post store unavailable: {0}")]
    Unavailable(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request { source, .. } => source.status().map(|status| status.as_u16()),
            Self::Unavailable(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{0}")]
    Validation(String),
    #[error("missing or invalid identity: {0}")]
    Precondition(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no session stored at {}", .0.display())]
    Missing(PathBuf),
    #[error("session at {} is unreadable: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("session storage failed at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Transport(#[from] TransportError),
}
