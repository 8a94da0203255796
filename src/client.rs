//! The user-facing Drive client.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::api::{HttpDriveService, HttpFileService, HttpPermissionService};
use crate::config::ClientConfig;
use crate::error::{DriveError, OperationResult, ResultExt};
use crate::facade::{
    DriveService, FileService, FilesCreateCall, FilesDeleteCall, FilesGetCall, FilesUpdateCall,
    Media, PermissionService, PermissionsCreateCall,
};
use crate::fs::{LocalFs, TokioFs};
use crate::models::{DriveFile, Grantee, PermissionGrant, Role};

/// A client wired to the real Drive API and the real filesystem.
pub type HttpDriveClient = DriveClient<HttpFileService, HttpPermissionService, TokioFs>;

/// Client for file and permission operations on Google Drive.
///
/// Holds one facade per remote capability plus the local filesystem access
/// used by uploads and downloads. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct DriveClient<F, P, L = TokioFs> {
    files: F,
    permissions: P,
    fs: L,
}

impl HttpDriveClient {
    /// Load credentials and build a client for the Drive API.
    ///
    /// # Errors
    /// Returns `creating drive service: <cause>` if the credentials cannot
    /// be read or are invalid.
    pub fn new(config: &ClientConfig) -> OperationResult<Self> {
        Self::connect_with(config, HttpDriveService::connect)
    }
}

impl<F, P> DriveClient<F, P, TokioFs>
where
    F: FileService,
    P: PermissionService,
{
    /// Build a client from a caller-supplied service constructor.
    pub fn connect_with<S, C>(config: &ClientConfig, connect: C) -> OperationResult<Self>
    where
        S: DriveService<Files = F, Permissions = P>,
        C: FnOnce(&ClientConfig) -> Result<S, DriveError>,
    {
        let service = connect(config).context("creating drive service")?;
        let (files, permissions) = service.into_parts();
        Ok(Self::from_parts(files, permissions, TokioFs))
    }
}

impl<F, P, L> DriveClient<F, P, L>
where
    F: FileService,
    P: PermissionService,
    L: LocalFs,
{
    /// Assemble a client from its facades.
    pub fn from_parts(files: F, permissions: P, fs: L) -> Self {
        Self {
            files,
            permissions,
            fs,
        }
    }

    /// Create a folder and return its id.
    pub async fn create_folder(&self, name: &str, parents: &[&str]) -> OperationResult<String> {
        let folder = self
            .files
            .create(DriveFile::folder(name, to_owned(parents)))
            .execute()
            .await
            .with_context(|| {
                format!(
                    "creating folder {} under parent folders {}",
                    name,
                    format_ids(parents)
                )
            })?;
        info!(id = %folder.id, name, "created folder");
        Ok(folder.id)
    }

    /// Upload a local file and return the new file's id.
    ///
    /// The remote name is the base name of `path`. Content is streamed.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        parents: &[&str],
    ) -> OperationResult<String> {
        let path = path.as_ref();
        let media = self.open_media(path).await?;
        let name = base_name(path);

        let file = self
            .files
            .create(DriveFile::new(name, to_owned(parents)))
            .media(media)
            .execute()
            .await
            .with_context(|| {
                format!(
                    "creating file {} under parent folders {}",
                    path.display(),
                    format_ids(parents)
                )
            })?;
        info!(id = %file.id, path = %path.display(), "uploaded file");
        Ok(file.id)
    }

    /// Replace a file's content. Name and MIME type are left unchanged.
    pub async fn update_file(
        &self,
        file_id: &str,
        path: impl AsRef<Path>,
    ) -> OperationResult<String> {
        let path = path.as_ref();
        let media = self.open_media(path).await?;

        let file = self
            .files
            .update(file_id, None)
            .media(media)
            .execute()
            .await
            .with_context(|| format!("updating file {}", file_id))?;
        info!(id = %file.id, path = %path.display(), "updated file content");
        Ok(file.id)
    }

    /// Get a file's metadata by ID.
    pub async fn get_file_by_id(&self, file_id: &str) -> OperationResult<DriveFile> {
        self.files
            .get(file_id)
            .execute()
            .await
            .with_context(|| format!("getting file with id {}", file_id))
    }

    /// Delete a file or folder by ID. A missing file is an error.
    pub async fn delete_file(&self, file_id: &str) -> OperationResult<()> {
        self.files
            .delete(file_id)
            .execute()
            .await
            .with_context(|| format!("deleting file with id {}", file_id))?;
        info!(file_id, "deleted file");
        Ok(())
    }

    /// Grant `role` on a file to a single user's email address.
    pub async fn assign_role_to_user_on_file(
        &self,
        role: Role,
        email_address: &str,
        file_id: &str,
    ) -> OperationResult<()> {
        self.assign_permission(file_id, Grantee::User(email_address.to_string()), role)
            .await
            .with_context(|| {
                format!(
                    "assigning role {} on file with id {} to email address {}",
                    role, file_id, email_address
                )
            })
    }

    /// Grant `role` on a file to a group's email address.
    pub async fn assign_role_to_group_on_file(
        &self,
        role: Role,
        email_address: &str,
        file_id: &str,
    ) -> OperationResult<()> {
        self.assign_permission(file_id, Grantee::Group(email_address.to_string()), role)
            .await
            .with_context(|| {
                format!(
                    "assigning role {} on file with id {} to email address {}",
                    role, file_id, email_address
                )
            })
    }

    /// Grant `role` on a file to everyone in `domain`.
    pub async fn assign_role_to_domain_on_file(
        &self,
        role: Role,
        domain: &str,
        file_id: &str,
    ) -> OperationResult<()> {
        self.assign_permission(file_id, Grantee::Domain(domain.to_string()), role)
            .await
            .with_context(|| {
                format!(
                    "assigning role {} on file with id {} to domain {}",
                    role, file_id, domain
                )
            })
    }

    /// Grant `role` on a file to anyone holding the link.
    pub async fn assign_role_to_anyone_on_file(
        &self,
        role: Role,
        file_id: &str,
    ) -> OperationResult<()> {
        self.assign_permission(file_id, Grantee::Anyone, role)
            .await
            .with_context(|| format!("assigning role {} on file with id {} to anyone", role, file_id))
    }

    /// Download a file's content to `destination`, creating or truncating it.
    ///
    /// Returns `destination` unchanged. Remote, create and write failures
    /// carry distinct contexts.
    pub async fn download_file(
        &self,
        file_id: &str,
        destination: impl AsRef<Path>,
    ) -> OperationResult<PathBuf> {
        let destination = destination.as_ref();

        let mut content = self
            .files
            .get(file_id)
            .download()
            .await
            .with_context(|| format!("downloading file with id {}", file_id))?;

        let mut output = self
            .fs
            .create(destination)
            .await
            .with_context(|| format!("creating output file {}", destination.display()))?;

        let written = async {
            let written = tokio::io::copy(&mut content, &mut output).await?;
            output.shutdown().await?;
            Ok::<_, std::io::Error>(written)
        }
        .await
        .with_context(|| format!("writing output file {}", destination.display()))?;

        debug!(file_id, bytes = written, path = %destination.display(), "downloaded file");
        Ok(destination.to_path_buf())
    }

    async fn assign_permission(
        &self,
        file_id: &str,
        grantee: Grantee,
        role: Role,
    ) -> Result<(), DriveError> {
        let permission = self
            .permissions
            .create(file_id, PermissionGrant::new(grantee, role))
            .execute()
            .await?;
        info!(
            file_id,
            permission_id = %permission.id,
            role = %permission.role,
            "assigned role"
        );
        Ok(())
    }

    async fn open_media(&self, path: &Path) -> OperationResult<Media> {
        let local = self
            .fs
            .open(path)
            .await
            .with_context(|| format!("opening file {}", path.display()))?;
        let mime_type = mime_guess::from_path(path).first_or_octet_stream();
        let media = Media::new(local.reader, mime_type.to_string());
        Ok(match local.length {
            Some(length) => media.with_length(length),
            None => media,
        })
    }
}

/// Last component of `path`, or the whole path when it has none.
fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn to_owned(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

/// Render ids as `[a b c]`.
fn format_ids(ids: &[&str]) -> String {
    format!("[{}]", ids.join(" "))
}
