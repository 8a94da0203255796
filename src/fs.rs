//! Local filesystem operations used by uploads and downloads.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncWrite;

use crate::facade::ContentReader;

/// A writable destination for downloaded content.
pub type ContentWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A local file opened for reading.
pub struct LocalFile {
    pub reader: ContentReader,
    pub length: Option<u64>,
}

/// Filesystem access injected into [`DriveClient`](crate::DriveClient).
#[async_trait]
pub trait LocalFs: Send + Sync {
    async fn open(&self, path: &Path) -> io::Result<LocalFile>;

    /// Create the file, truncating it if it exists.
    async fn create(&self, path: &Path) -> io::Result<ContentWriter>;
}

/// The real filesystem, through tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

#[async_trait]
impl LocalFs for TokioFs {
    async fn open(&self, path: &Path) -> io::Result<LocalFile> {
        let file = File::open(path).await?;
        let length = file.metadata().await?.len();
        Ok(LocalFile {
            reader: Box::new(file),
            length: Some(length),
        })
    }

    async fn create(&self, path: &Path) -> io::Result<ContentWriter> {
        Ok(Box::new(File::create(path).await?))
    }
}
