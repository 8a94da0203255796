//! Narrow capability traits over the Drive API.
//!
//! Each trait exposes only the calls [`DriveClient`](crate::DriveClient)
//! makes. Services hand out call objects; a call object is configured
//! (for example with [`Media`]) and then consumed by a terminal step that
//! performs the round trip. Test doubles implement the same traits and
//! return canned results without a network.

use std::fmt;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::Result;
use crate::models::{DriveFile, Permission, PermissionGrant};

/// A readable content stream.
pub type ContentReader = Box<dyn AsyncRead + Send + Unpin>;

/// Content attached to a create or update call.
pub struct Media {
    pub reader: ContentReader,
    pub mime_type: String,
    /// Byte length, when known ahead of time.
    pub length: Option<u64>,
}

impl Media {
    pub fn new(reader: ContentReader, mime_type: impl Into<String>) -> Self {
        Self {
            reader,
            mime_type: mime_type.into(),
            length: None,
        }
    }

    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }
}

impl fmt::Debug for Media {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Media")
            .field("mime_type", &self.mime_type)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait FilesCreateCall: Send {
    /// Attach content to upload with the new file.
    fn media(self, media: Media) -> Self
    where
        Self: Sized;

    async fn execute(self) -> Result<DriveFile>;
}

#[async_trait]
pub trait FilesGetCall: Send {
    /// Fetch the file's metadata.
    async fn execute(self) -> Result<DriveFile>;

    /// Fetch the file's content.
    async fn download(self) -> Result<ContentReader>;
}

#[async_trait]
pub trait FilesDeleteCall: Send {
    async fn execute(self) -> Result<()>;
}

#[async_trait]
pub trait FilesUpdateCall: Send {
    /// Replace the file's content.
    fn media(self, media: Media) -> Self
    where
        Self: Sized;

    async fn execute(self) -> Result<DriveFile>;
}

#[async_trait]
pub trait PermissionsCreateCall: Send {
    async fn execute(self) -> Result<Permission>;
}

/// File operations.
pub trait FileService: Send + Sync {
    type Create: FilesCreateCall;
    type Get: FilesGetCall;
    type Delete: FilesDeleteCall;
    type Update: FilesUpdateCall;

    fn create(&self, file: DriveFile) -> Self::Create;

    fn get(&self, file_id: &str) -> Self::Get;

    fn delete(&self, file_id: &str) -> Self::Delete;

    /// Start an update; `None` leaves the metadata untouched.
    fn update(&self, file_id: &str, file: Option<DriveFile>) -> Self::Update;
}

/// Permission operations.
pub trait PermissionService: Send + Sync {
    type Create: PermissionsCreateCall;

    fn create(&self, file_id: &str, grant: PermissionGrant) -> Self::Create;
}

/// An authenticated Drive service, split into its capability facades.
pub trait DriveService {
    type Files: FileService;
    type Permissions: PermissionService;

    fn into_parts(self) -> (Self::Files, Self::Permissions);
}
