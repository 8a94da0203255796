//! drive_client - a small Google Drive client built on narrow, mockable facades.
//!
//! The library provides:
//! - folder creation, file upload and content update
//! - metadata fetch, content download and deletion
//! - role assignment to users, groups, domains or anyone
//!
//! Every remote capability sits behind a trait in [`facade`], so
//! [`DriveClient`] can run against in-memory doubles in tests.
//!
//! # Example
//!
//! ```no_run
//! use drive_client::{ClientConfig, HttpDriveClient, Role};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = HttpDriveClient::new(&ClientConfig::new("service-account.json"))?;
//!
//!     let folder_id = client.create_folder("reports", &[]).await?;
//!     let file_id = client.upload_file("q3.pdf", &[folder_id.as_str()]).await?;
//!     client
//!         .assign_role_to_user_on_file(Role::Reader, "alice@example.com", &file_id)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod facade;
pub mod fs;
pub mod ids;
pub mod models;

// Re-exports for convenience
pub use api::HttpDriveService;
pub use auth::Authenticator;
pub use client::{DriveClient, HttpDriveClient};
pub use config::{ClientConfig, Endpoints};
pub use error::{DriveError, OperationResult, RemoteOperationError, Result};
pub use fs::{LocalFs, TokioFs};
pub use ids::resolve_id;
pub use models::{DriveFile, Grantee, GranteeType, Permission, PermissionGrant, Role};
