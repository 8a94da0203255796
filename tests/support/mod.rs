//! In-memory doubles for the Drive facades and the local filesystem.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWrite};

use drive_client::error::{DriveError, Result};
use drive_client::facade::{
    ContentReader, DriveService, FileService, FilesCreateCall, FilesDeleteCall, FilesGetCall,
    FilesUpdateCall, Media, PermissionService, PermissionsCreateCall,
};
use drive_client::fs::{ContentWriter, LocalFile, LocalFs};
use drive_client::{DriveClient, DriveFile, Grantee, Permission, PermissionGrant};

/// A failure whose message is exactly `message`.
pub fn failure(message: &str) -> DriveError {
    DriveError::Io(io::Error::other(message.to_string()))
}

/// Content handed to a create or update call, read back in full.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMedia {
    pub mime_type: String,
    pub length: Option<u64>,
    pub content: Vec<u8>,
}

async fn record(media: Option<Media>) -> Option<RecordedMedia> {
    let mut media = media?;
    let mut content = Vec::new();
    media
        .reader
        .read_to_end(&mut content)
        .await
        .expect("reading attached media");
    Some(RecordedMedia {
        mime_type: media.mime_type,
        length: media.length,
        content,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileCall {
    Create {
        file: DriveFile,
        media: Option<RecordedMedia>,
    },
    Get(String),
    Download(String),
    Delete(String),
    Update {
        file_id: String,
        file: Option<DriveFile>,
        media: Option<RecordedMedia>,
    },
}

/// Files facade returning canned results and recording every executed call.
#[derive(Clone)]
pub struct FakeFiles {
    file: std::result::Result<DriveFile, &'static str>,
    content: std::result::Result<Vec<u8>, &'static str>,
    delete_error: Option<&'static str>,
    issued_ids: Arc<Mutex<VecDeque<String>>>,
    calls: Arc<Mutex<Vec<FileCall>>>,
}

impl Default for FakeFiles {
    fn default() -> Self {
        Self {
            file: Ok(DriveFile::default()),
            content: Ok(Vec::new()),
            delete_error: None,
            issued_ids: Arc::default(),
            calls: Arc::default(),
        }
    }
}

impl FakeFiles {
    /// Create, get and update return a file with this id.
    pub fn returning_id(id: &str) -> Self {
        Self::returning(DriveFile {
            id: id.to_string(),
            ..DriveFile::default()
        })
    }

    pub fn returning(file: DriveFile) -> Self {
        Self {
            file: Ok(file),
            ..Self::default()
        }
    }

    /// Create, get and update fail with `message`.
    pub fn failing(message: &'static str) -> Self {
        Self {
            file: Err(message),
            ..Self::default()
        }
    }

    /// Each create hands out the next id, like the remote service would.
    pub fn issuing_ids(ids: &[&str]) -> Self {
        let fake = Self::default();
        fake.issued_ids
            .lock()
            .unwrap()
            .extend(ids.iter().map(|id| id.to_string()));
        fake
    }

    pub fn with_content(mut self, content: &[u8]) -> Self {
        self.content = Ok(content.to_vec());
        self
    }

    pub fn with_download_error(mut self, message: &'static str) -> Self {
        self.content = Err(message);
        self
    }

    pub fn with_delete_error(mut self, message: &'static str) -> Self {
        self.delete_error = Some(message);
        self
    }

    pub fn calls(&self) -> Vec<FileCall> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, call: FileCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn file_result(&self) -> Result<DriveFile> {
        if let Some(id) = self.issued_ids.lock().unwrap().pop_front() {
            return Ok(DriveFile {
                id,
                ..DriveFile::default()
            });
        }
        self.file.clone().map_err(failure)
    }
}

impl FileService for FakeFiles {
    type Create = FakeCreateCall;
    type Get = FakeGetCall;
    type Delete = FakeDeleteCall;
    type Update = FakeUpdateCall;

    fn create(&self, file: DriveFile) -> Self::Create {
        FakeCreateCall {
            files: self.clone(),
            file,
            media: None,
        }
    }

    fn get(&self, file_id: &str) -> Self::Get {
        FakeGetCall {
            files: self.clone(),
            file_id: file_id.to_string(),
        }
    }

    fn delete(&self, file_id: &str) -> Self::Delete {
        FakeDeleteCall {
            files: self.clone(),
            file_id: file_id.to_string(),
        }
    }

    fn update(&self, file_id: &str, file: Option<DriveFile>) -> Self::Update {
        FakeUpdateCall {
            files: self.clone(),
            file_id: file_id.to_string(),
            file,
            media: None,
        }
    }
}

pub struct FakeCreateCall {
    files: FakeFiles,
    file: DriveFile,
    media: Option<Media>,
}

#[async_trait]
impl FilesCreateCall for FakeCreateCall {
    fn media(mut self, media: Media) -> Self {
        self.media = Some(media);
        self
    }

    async fn execute(self) -> Result<DriveFile> {
        let media = record(self.media).await;
        self.files.push(FileCall::Create {
            file: self.file,
            media,
        });
        self.files.file_result()
    }
}

pub struct FakeGetCall {
    files: FakeFiles,
    file_id: String,
}

#[async_trait]
impl FilesGetCall for FakeGetCall {
    async fn execute(self) -> Result<DriveFile> {
        self.files.push(FileCall::Get(self.file_id));
        self.files.file_result()
    }

    async fn download(self) -> Result<ContentReader> {
        self.files.push(FileCall::Download(self.file_id));
        let content = self.files.content.clone().map_err(failure)?;
        Ok(Box::new(io::Cursor::new(content)))
    }
}

pub struct FakeDeleteCall {
    files: FakeFiles,
    file_id: String,
}

#[async_trait]
impl FilesDeleteCall for FakeDeleteCall {
    async fn execute(self) -> Result<()> {
        self.files.push(FileCall::Delete(self.file_id));
        match self.files.delete_error {
            Some(message) => Err(failure(message)),
            None => Ok(()),
        }
    }
}

pub struct FakeUpdateCall {
    files: FakeFiles,
    file_id: String,
    file: Option<DriveFile>,
    media: Option<Media>,
}

#[async_trait]
impl FilesUpdateCall for FakeUpdateCall {
    fn media(mut self, media: Media) -> Self {
        self.media = Some(media);
        self
    }

    async fn execute(self) -> Result<DriveFile> {
        let media = record(self.media).await;
        self.files.push(FileCall::Update {
            file_id: self.file_id,
            file: self.file,
            media,
        });
        self.files.file_result()
    }
}

/// Permissions facade echoing the grant back as the created permission.
#[derive(Clone, Default)]
pub struct FakePermissions {
    error: Option<&'static str>,
    grants: Arc<Mutex<Vec<(String, PermissionGrant)>>>,
}

impl FakePermissions {
    pub fn failing(message: &'static str) -> Self {
        Self {
            error: Some(message),
            ..Self::default()
        }
    }

    pub fn grants(&self) -> Vec<(String, PermissionGrant)> {
        self.grants.lock().unwrap().clone()
    }
}

impl PermissionService for FakePermissions {
    type Create = FakePermissionsCreateCall;

    fn create(&self, file_id: &str, grant: PermissionGrant) -> Self::Create {
        FakePermissionsCreateCall {
            permissions: self.clone(),
            file_id: file_id.to_string(),
            grant,
        }
    }
}

pub struct FakePermissionsCreateCall {
    permissions: FakePermissions,
    file_id: String,
    grant: PermissionGrant,
}

#[async_trait]
impl PermissionsCreateCall for FakePermissionsCreateCall {
    async fn execute(self) -> Result<Permission> {
        self.permissions
            .grants
            .lock()
            .unwrap()
            .push((self.file_id, self.grant.clone()));
        if let Some(message) = self.permissions.error {
            return Err(failure(message));
        }
        let (email_address, domain) = match &self.grant.grantee {
            Grantee::User(email) | Grantee::Group(email) => (Some(email.clone()), None),
            Grantee::Domain(domain) => (None, Some(domain.clone())),
            Grantee::Anyone => (None, None),
        };
        Ok(Permission {
            id: "perm-1".to_string(),
            kind: self.grant.grantee.kind(),
            role: self.grant.role,
            email_address,
            domain,
        })
    }
}

/// A service built from fake facades, for exercising construction.
pub struct FakeService {
    pub files: FakeFiles,
    pub permissions: FakePermissions,
}

impl DriveService for FakeService {
    type Files = FakeFiles;
    type Permissions = FakePermissions;

    fn into_parts(self) -> (Self::Files, Self::Permissions) {
        (self.files, self.permissions)
    }
}

/// Filesystem held in memory.
#[derive(Clone, Default)]
pub struct MemoryFs {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    create_error: Option<&'static str>,
    write_error: Option<&'static str>,
}

impl MemoryFs {
    pub fn with_file(self, path: impl Into<PathBuf>, content: &[u8]) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), content.to_vec());
        self
    }

    pub fn failing_create(mut self, message: &'static str) -> Self {
        self.create_error = Some(message);
        self
    }

    pub fn failing_write(mut self, message: &'static str) -> Self {
        self.write_error = Some(message);
        self
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path.as_ref()).cloned()
    }
}

#[async_trait]
impl LocalFs for MemoryFs {
    async fn open(&self, path: &Path) -> io::Result<LocalFile> {
        let content = self
            .read(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file not found"))?;
        Ok(LocalFile {
            length: Some(content.len() as u64),
            reader: Box::new(io::Cursor::new(content)),
        })
    }

    async fn create(&self, path: &Path) -> io::Result<ContentWriter> {
        if let Some(message) = self.create_error {
            return Err(io::Error::other(message));
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), Vec::new());
        Ok(Box::new(MemoryWriter {
            files: Arc::clone(&self.files),
            path: path.to_path_buf(),
            error: self.write_error,
        }))
    }
}

struct MemoryWriter {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    path: PathBuf,
    error: Option<&'static str>,
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if let Some(message) = self.error {
            return Poll::Ready(Err(io::Error::other(message)));
        }
        if let Some(file) = self.files.lock().unwrap().get_mut(&self.path) {
            file.extend_from_slice(buf);
        }
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

pub type FakeClient = DriveClient<FakeFiles, FakePermissions, MemoryFs>;

pub fn client(files: FakeFiles, permissions: FakePermissions, fs: MemoryFs) -> FakeClient {
    DriveClient::from_parts(files, permissions, fs)
}
