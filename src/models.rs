//! Data models for Google Drive API requests and responses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

/// MIME type Drive uses to mark a file as a folder.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// A file or folder in Google Drive.
///
/// Used both as request metadata (empty fields are left out) and as the
/// metadata returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    #[serde(default, skip_serializing)]
    pub web_view_link: Option<String>,
    #[serde(default, skip_serializing, deserialize_with = "deserialize_size")]
    pub size: Option<u64>,
}

impl DriveFile {
    /// Metadata for a new file under the given parents.
    pub fn new(name: impl Into<String>, parents: Vec<String>) -> Self {
        Self {
            name: name.into(),
            parents,
            ..Self::default()
        }
    }

    /// Metadata for a new folder under the given parents.
    pub fn folder(name: impl Into<String>, parents: Vec<String>) -> Self {
        Self {
            mime_type: Some(FOLDER_MIME_TYPE.to_string()),
            ..Self::new(name, parents)
        }
    }

    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) => s.parse::<u64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

impl fmt::Display for DriveFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size_str = self
            .size
            .map(format_size)
            .unwrap_or_else(|| "-".to_string());
        let mime = self.mime_type.as_deref().unwrap_or("-");
        let parents = if self.parents.is_empty() {
            "-".to_string()
        } else {
            self.parents.join(",")
        };
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.id, size_str, mime, parents, self.name
        )
    }
}

/// Format bytes into human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match bytes {
        b if b >= GB => format!("{:.2} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.2} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.2} KB", b as f64 / KB as f64),
        b => format!("{} B", b),
    }
}

/// Access level granted on a file, ordered by increasing privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Reader,
    Commenter,
    Writer,
    FileOrganizer,
    Organizer,
    Owner,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Reader,
        Role::Commenter,
        Role::Writer,
        Role::FileOrganizer,
        Role::Organizer,
        Role::Owner,
    ];

    /// The role name as Drive spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Reader => "reader",
            Role::Commenter => "commenter",
            Role::Writer => "writer",
            Role::FileOrganizer => "fileOrganizer",
            Role::Organizer => "organizer",
            Role::Owner => "owner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Role::ALL.iter().map(|r| r.as_str()).collect();
                format!("unknown role '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// Kind of principal a permission is granted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GranteeType {
    User,
    Group,
    Domain,
    Anyone,
}

impl GranteeType {
    pub fn as_str(self) -> &'static str {
        match self {
            GranteeType::User => "user",
            GranteeType::Group => "group",
            GranteeType::Domain => "domain",
            GranteeType::Anyone => "anyone",
        }
    }
}

impl fmt::Display for GranteeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The principal a permission is granted to.
///
/// Users and groups are addressed by email, domains by domain name;
/// `Anyone` carries no identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grantee {
    User(String),
    Group(String),
    Domain(String),
    Anyone,
}

impl Grantee {
    pub fn kind(&self) -> GranteeType {
        match self {
            Grantee::User(_) => GranteeType::User,
            Grantee::Group(_) => GranteeType::Group,
            Grantee::Domain(_) => GranteeType::Domain,
            Grantee::Anyone => GranteeType::Anyone,
        }
    }

    /// Email address or domain; `None` only for `Anyone`.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Grantee::User(id) | Grantee::Group(id) | Grantee::Domain(id) => Some(id.as_str()),
            Grantee::Anyone => None,
        }
    }
}

/// A role granted to a grantee, sent when creating a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGrant {
    pub grantee: Grantee,
    pub role: Role,
}

impl PermissionGrant {
    pub fn new(grantee: Grantee, role: Role) -> Self {
        Self { grantee, role }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PermissionBody<'a> {
    #[serde(rename = "type")]
    kind: GranteeType,
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    email_address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    domain: Option<&'a str>,
}

impl Serialize for PermissionGrant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (email_address, domain) = match &self.grantee {
            Grantee::User(email) | Grantee::Group(email) => (Some(email.as_str()), None),
            Grantee::Domain(domain) => (None, Some(domain.as_str())),
            Grantee::Anyone => (None, None),
        };
        PermissionBody {
            kind: self.grantee.kind(),
            role: self.role,
            email_address,
            domain,
        }
        .serialize(serializer)
    }
}

/// A permission as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: GranteeType,
    pub role: Role,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

/// Google API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: u16,
    pub message: String,
}

/// Service account credentials from JSON file.
#[derive(Debug, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: Option<String>,
}

/// OAuth2 token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}
