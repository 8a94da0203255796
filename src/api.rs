//! Google Drive v3 REST binding.
//!
//! Production implementation of the [`facade`](crate::facade) traits. Every
//! call object performs exactly one logical API call when executed; uploads
//! open a resumable session and stream the content into it.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use reqwest::{Body, Client, Method, Response};
use tokio_util::io::{ReaderStream, StreamReader};
use tracing::{debug, info};

use crate::auth::Authenticator;
use crate::config::{ClientConfig, Endpoints};
use crate::error::{DriveError, Result};
use crate::facade::{
    ContentReader, DriveService, FileService, FilesCreateCall, FilesDeleteCall, FilesGetCall,
    FilesUpdateCall, Media, PermissionService, PermissionsCreateCall,
};
use crate::models::{ApiErrorResponse, DriveFile, Permission, PermissionGrant};

/// Metadata fields requested for files.
const FILE_FIELDS: &str = "id, name, mimeType, parents, size, webViewLink";

/// Metadata fields requested for permissions.
const PERMISSION_FIELDS: &str = "id, type, role, emailAddress, domain";

/// State shared by every call object: HTTP pool, token source, endpoints.
#[derive(Debug)]
struct Transport {
    http: Client,
    auth: Authenticator,
    endpoints: Endpoints,
}

impl Transport {
    fn file_url(&self, file_id: &str) -> String {
        format!("{}/files/{}", self.endpoints.api_base, file_id)
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        fields: &str,
        body: &impl serde::Serialize,
    ) -> Result<T> {
        let token = self.auth.get_access_token().await?;
        let response = self
            .http
            .request(method, url)
            .bearer_auth(&token)
            .query(&[("supportsAllDrives", "true"), ("fields", fields)])
            .json(body)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    /// Open a resumable session and stream `media` into it.
    async fn upload(
        &self,
        method: Method,
        url: String,
        metadata: &DriveFile,
        media: Media,
    ) -> Result<DriveFile> {
        let token = self.auth.get_access_token().await?;

        let mut init = self
            .http
            .request(method, url)
            .bearer_auth(&token)
            .query(&[("uploadType", "resumable"), ("supportsAllDrives", "true")])
            .header("X-Upload-Content-Type", media.mime_type.as_str());
        if let Some(length) = media.length {
            init = init.header("X-Upload-Content-Length", length);
        }
        let init_response = check_status(init.json(metadata).send().await?).await?;

        let session_url = init_response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(DriveError::MissingUploadLocation)?
            .to_string();
        debug!(length = ?media.length, mime_type = %media.mime_type, "streaming upload content");

        let mut upload = self
            .http
            .put(session_url)
            .header(CONTENT_TYPE, media.mime_type.as_str())
            .query(&[("fields", FILE_FIELDS)]);
        if let Some(length) = media.length {
            upload = upload.header(CONTENT_LENGTH, length);
        }
        let body = Body::wrap_stream(ReaderStream::new(media.reader));
        let response = check_status(upload.body(body).send().await?).await?;
        Ok(response.json().await?)
    }
}

/// Turn a non-success response into an API error.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    Err(match serde_json::from_str::<ApiErrorResponse>(&error_body) {
        Ok(api_error) => DriveError::Api {
            status: api_error.error.code,
            message: api_error.error.message,
        },
        Err(_) => DriveError::Api {
            status: status.as_u16(),
            message: error_body,
        },
    })
}

/// Authenticated connection to the Drive API.
#[derive(Debug, Clone)]
pub struct HttpDriveService {
    transport: Arc<Transport>,
}

impl HttpDriveService {
    /// Load credentials and prepare the HTTP client.
    ///
    /// No request is made here; the first access token is fetched by the
    /// first call.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let mut auth = Authenticator::from_file(&config.credentials_path, http.clone())?;
        if let Some(token_uri) = &config.endpoints.token_uri {
            auth = auth.with_token_uri(token_uri);
        }
        info!(
            client_email = auth.client_email(),
            api_base = %config.endpoints.api_base,
            "connected drive service"
        );

        Ok(Self {
            transport: Arc::new(Transport {
                http,
                auth,
                endpoints: config.endpoints.clone(),
            }),
        })
    }

    pub fn files(&self) -> HttpFileService {
        HttpFileService {
            transport: Arc::clone(&self.transport),
        }
    }

    pub fn permissions(&self) -> HttpPermissionService {
        HttpPermissionService {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl DriveService for HttpDriveService {
    type Files = HttpFileService;
    type Permissions = HttpPermissionService;

    fn into_parts(self) -> (Self::Files, Self::Permissions) {
        (self.files(), self.permissions())
    }
}

#[derive(Debug, Clone)]
pub struct HttpFileService {
    transport: Arc<Transport>,
}

impl FileService for HttpFileService {
    type Create = HttpFilesCreateCall;
    type Get = HttpFilesGetCall;
    type Delete = HttpFilesDeleteCall;
    type Update = HttpFilesUpdateCall;

    fn create(&self, file: DriveFile) -> Self::Create {
        HttpFilesCreateCall {
            transport: Arc::clone(&self.transport),
            file,
            media: None,
        }
    }

    fn get(&self, file_id: &str) -> Self::Get {
        HttpFilesGetCall {
            transport: Arc::clone(&self.transport),
            file_id: file_id.to_string(),
        }
    }

    fn delete(&self, file_id: &str) -> Self::Delete {
        HttpFilesDeleteCall {
            transport: Arc::clone(&self.transport),
            file_id: file_id.to_string(),
        }
    }

    fn update(&self, file_id: &str, file: Option<DriveFile>) -> Self::Update {
        HttpFilesUpdateCall {
            transport: Arc::clone(&self.transport),
            file_id: file_id.to_string(),
            file,
            media: None,
        }
    }
}

pub struct HttpFilesCreateCall {
    transport: Arc<Transport>,
    file: DriveFile,
    media: Option<Media>,
}

#[async_trait]
impl FilesCreateCall for HttpFilesCreateCall {
    fn media(mut self, media: Media) -> Self {
        self.media = Some(media);
        self
    }

    async fn execute(self) -> Result<DriveFile> {
        debug!(name = %self.file.name, parents = ?self.file.parents, "files.create");
        let transport = &self.transport;
        match self.media {
            Some(media) => {
                let url = format!("{}/files", transport.endpoints.upload_base);
                transport.upload(Method::POST, url, &self.file, media).await
            }
            None => {
                let url = format!("{}/files", transport.endpoints.api_base);
                transport
                    .send_json(Method::POST, url, FILE_FIELDS, &self.file)
                    .await
            }
        }
    }
}

pub struct HttpFilesGetCall {
    transport: Arc<Transport>,
    file_id: String,
}

#[async_trait]
impl FilesGetCall for HttpFilesGetCall {
    async fn execute(self) -> Result<DriveFile> {
        debug!(file_id = %self.file_id, "files.get");
        let token = self.transport.auth.get_access_token().await?;
        let response = self
            .transport
            .http
            .get(self.transport.file_url(&self.file_id))
            .bearer_auth(&token)
            .query(&[("supportsAllDrives", "true"), ("fields", FILE_FIELDS)])
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn download(self) -> Result<ContentReader> {
        debug!(file_id = %self.file_id, "files.get media");
        let token = self.transport.auth.get_access_token().await?;
        let response = self
            .transport
            .http
            .get(self.transport.file_url(&self.file_id))
            .bearer_auth(&token)
            .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            .send()
            .await?;
        let stream = check_status(response)
            .await?
            .bytes_stream()
            .map_err(io::Error::other);
        Ok(Box::new(StreamReader::new(Box::pin(stream))))
    }
}

pub struct HttpFilesDeleteCall {
    transport: Arc<Transport>,
    file_id: String,
}

#[async_trait]
impl FilesDeleteCall for HttpFilesDeleteCall {
    async fn execute(self) -> Result<()> {
        debug!(file_id = %self.file_id, "files.delete");
        let token = self.transport.auth.get_access_token().await?;
        let response = self
            .transport
            .http
            .delete(self.transport.file_url(&self.file_id))
            .bearer_auth(&token)
            .query(&[("supportsAllDrives", "true")])
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

pub struct HttpFilesUpdateCall {
    transport: Arc<Transport>,
    file_id: String,
    file: Option<DriveFile>,
    media: Option<Media>,
}

#[async_trait]
impl FilesUpdateCall for HttpFilesUpdateCall {
    fn media(mut self, media: Media) -> Self {
        self.media = Some(media);
        self
    }

    async fn execute(self) -> Result<DriveFile> {
        debug!(file_id = %self.file_id, with_media = self.media.is_some(), "files.update");
        let transport = &self.transport;
        let metadata = self.file.unwrap_or_default();
        match self.media {
            Some(media) => {
                let url = format!("{}/files/{}", transport.endpoints.upload_base, self.file_id);
                transport.upload(Method::PATCH, url, &metadata, media).await
            }
            None => {
                let url = transport.file_url(&self.file_id);
                transport
                    .send_json(Method::PATCH, url, FILE_FIELDS, &metadata)
                    .await
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpPermissionService {
    transport: Arc<Transport>,
}

impl PermissionService for HttpPermissionService {
    type Create = HttpPermissionsCreateCall;

    fn create(&self, file_id: &str, grant: PermissionGrant) -> Self::Create {
        HttpPermissionsCreateCall {
            transport: Arc::clone(&self.transport),
            file_id: file_id.to_string(),
            grant,
        }
    }
}

pub struct HttpPermissionsCreateCall {
    transport: Arc<Transport>,
    file_id: String,
    grant: PermissionGrant,
}

#[async_trait]
impl PermissionsCreateCall for HttpPermissionsCreateCall {
    async fn execute(self) -> Result<Permission> {
        debug!(
            file_id = %self.file_id,
            role = %self.grant.role,
            grantee = %self.grant.grantee.kind(),
            "permissions.create"
        );
        let url = format!("{}/permissions", self.transport.file_url(&self.file_id));
        self.transport
            .send_json(Method::POST, url, PERMISSION_FIELDS, &self.grant)
            .await
    }
}
