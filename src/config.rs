//! Client configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{DriveError, Result};

/// Environment variable holding the service account key path.
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Base URL for Google Drive API v3.
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Upload URL for Google Drive API.
pub const UPLOAD_API_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Remote endpoints the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api_base: String,
    pub upload_base: String,
    /// Overrides the token URI found in the credentials file.
    pub token_uri: Option<String>,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_base: DRIVE_API_BASE.to_string(),
            upload_base: UPLOAD_API_BASE.to_string(),
            token_uri: None,
        }
    }
}

impl Endpoints {
    /// Endpoints rooted at a single base URL, laid out like googleapis.com.
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            api_base: format!("{}/drive/v3", base),
            upload_base: format!("{}/upload/drive/v3", base),
            token_uri: Some(format!("{}/token", base)),
        }
    }
}

/// Configuration needed to construct a [`DriveClient`](crate::DriveClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credentials_path: PathBuf,
    pub endpoints: Endpoints,
    /// Deadline applied to every HTTP request.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            endpoints: Endpoints::default(),
            timeout: None,
        }
    }

    /// Build a config from `GOOGLE_APPLICATION_CREDENTIALS`.
    pub fn from_env() -> Result<Self> {
        env::var_os(CREDENTIALS_ENV)
            .filter(|v| !v.is_empty())
            .map(Self::new)
            .ok_or_else(|| DriveError::MissingEnvVar(CREDENTIALS_ENV.to_string()))
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
