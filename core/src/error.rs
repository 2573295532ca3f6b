//! Error types for the Smartling Files API client.
//!
//! # Design
//! Callers branch on the failure kind rather than on message text: a local
//! file that could not be read, a well-formed error envelope from the API, a
//! response that does not match the envelope shape, or a transport that never
//! produced a response at all.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by `FileApiClient` operations and its collaborators.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A file referenced by the request parameters could not be read.
    /// Raised before any network call is made.
    #[error("cannot read local file {}: {source}", path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The API answered with status >= 400 and a well-formed error envelope.
    /// `message` is every `errors[].message` joined by `" || "`.
    #[error("{message}")]
    RemoteApi { status: u16, message: String },

    /// The body was not JSON, or lacked the fields the envelope requires.
    #[error("bad response format: {0}")]
    MalformedResponse(String),

    /// The executor failed before a response was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// Client configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status carried by a `RemoteApi` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RemoteApi { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
