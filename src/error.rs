//! Error types for the drive_client crate.

use std::path::PathBuf;

use thiserror::Error;

/// Underlying causes of a failed Drive operation.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("reading credentials file {path}: {source}")]
    CredentialsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing credentials JSON: {0}")]
    CredentialsParse(#[from] serde_json::Error),

    #[error("invalid URL or ID: {0}")]
    InvalidUrlOrId(String),

    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JWT encoding error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("token refresh failed: {0}")]
    TokenRefresh(String),

    #[error("no upload location in resumable session response")]
    MissingUploadLocation,
}

/// Result type alias for DriveError.
pub type Result<T> = std::result::Result<T, DriveError>;

/// The error returned by every [`DriveClient`](crate::DriveClient) operation.
///
/// Displays as `<context>: <cause>`, where the context names the operation
/// and its key parameters.
#[derive(Error, Debug)]
#[error("{context}: {source}")]
pub struct RemoteOperationError {
    context: String,
    #[source]
    source: DriveError,
}

impl RemoteOperationError {
    pub fn new(context: impl Into<String>, source: DriveError) -> Self {
        Self {
            context: context.into(),
            source,
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn cause(&self) -> &DriveError {
        &self.source
    }

    pub fn into_cause(self) -> DriveError {
        self.source
    }
}

/// Result type alias for client operations.
pub type OperationResult<T> = std::result::Result<T, RemoteOperationError>;

/// Attach operation context to a failed call.
pub trait ResultExt<T> {
    fn context<C: Into<String>>(self, context: C) -> OperationResult<T>;

    fn with_context<C, F>(self, f: F) -> OperationResult<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E: Into<DriveError>> ResultExt<T> for std::result::Result<T, E> {
    fn context<C: Into<String>>(self, context: C) -> OperationResult<T> {
        self.map_err(|e| RemoteOperationError::new(context, e.into()))
    }

    fn with_context<C, F>(self, f: F) -> OperationResult<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| RemoteOperationError::new(f(), e.into()))
    }
}
