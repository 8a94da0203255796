//! gdrive CLI - file and permission operations on Google Drive.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glob::glob;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use drive_client::{resolve_id, ClientConfig, Grantee, HttpDriveClient, Role};

/// CLI tool for managing files and permissions on Google Drive.
#[derive(Parser, Debug)]
#[command(name = "gdrive")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to service account JSON credentials file.
    #[arg(long, short = 'c', env = "GOOGLE_APPLICATION_CREDENTIALS")]
    credentials: PathBuf,

    /// Per-request timeout in seconds.
    #[arg(long, env = "GDRIVE_TIMEOUT_SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a folder.
    CreateFolder {
        name: String,

        /// Parent folder URL or ID (repeatable).
        #[arg(long = "parent", short = 'p')]
        parents: Vec<String>,
    },

    /// Upload files (glob patterns are expanded).
    Upload {
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Parent folder URL or ID (repeatable).
        #[arg(long = "parent", short = 'p')]
        parents: Vec<String>,
    },

    /// Replace the content of an existing file.
    Update {
        /// File URL or ID.
        file: String,

        /// Local file holding the new content.
        path: PathBuf,
    },

    /// Print a file's metadata.
    Get {
        /// File URL or ID.
        file: String,
    },

    /// Delete a file or folder.
    Delete {
        /// File URL or ID.
        file: String,
    },

    /// Download a file's content.
    Download {
        /// File URL or ID.
        file: String,

        /// Local destination file.
        destination: PathBuf,
    },

    /// Grant a role on a file.
    AssignRole {
        /// File URL or ID.
        file: String,

        /// reader, commenter, writer, fileOrganizer, organizer or owner.
        #[arg(long)]
        role: Role,

        #[command(flatten)]
        grantee: GranteeArgs,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct GranteeArgs {
    /// Grant to a user's email address.
    #[arg(long)]
    user: Option<String>,

    /// Grant to a group's email address.
    #[arg(long)]
    group: Option<String>,

    /// Grant to everyone in a domain.
    #[arg(long)]
    domain: Option<String>,

    /// Grant to anyone with the link.
    #[arg(long)]
    anyone: bool,
}

impl GranteeArgs {
    fn into_grantee(self) -> Grantee {
        match self {
            GranteeArgs { user: Some(email), .. } => Grantee::User(email),
            GranteeArgs { group: Some(email), .. } => Grantee::Group(email),
            GranteeArgs { domain: Some(domain), .. } => Grantee::Domain(domain),
            _ => Grantee::Anyone,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::new(&cli.credentials);
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let client = HttpDriveClient::new(&config)?;

    match cli.command {
        Commands::CreateFolder { name, parents } => {
            let parents = resolve_ids(&parents)?;
            let id = client.create_folder(&name, &as_strs(&parents)).await?;
            println!("{}", id);
        }

        Commands::Upload { patterns, parents } => {
            let parents = resolve_ids(&parents)?;
            let files = collect_uploads(&patterns)?;
            if files.is_empty() {
                anyhow::bail!("No files to upload");
            }

            let total = files.len();
            let mut failed = 0;
            for (idx, path) in files.iter().enumerate() {
                match client.upload_file(path, &as_strs(&parents)).await {
                    Ok(id) => println!("[{}/{}] {} -> {}", idx + 1, total, path.display(), id),
                    Err(e) => {
                        failed += 1;
                        eprintln!("[{}/{}] {}", idx + 1, total, e);
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{} of {} uploads failed", failed, total);
            }
        }

        Commands::Update { file, path } => {
            let file_id = resolve_id(&file)?;
            let id = client.update_file(&file_id, &path).await?;
            println!("{}", id);
        }

        Commands::Get { file } => {
            let file_id = resolve_id(&file)?;
            let metadata = client.get_file_by_id(&file_id).await?;
            println!("{}", metadata);
        }

        Commands::Delete { file } => {
            let file_id = resolve_id(&file)?;
            client.delete_file(&file_id).await?;
            println!("deleted {}", file_id);
        }

        Commands::Download { file, destination } => {
            let file_id = resolve_id(&file)?;
            let path = client.download_file(&file_id, &destination).await?;
            println!("file was downloaded to {}", path.display());
        }

        Commands::AssignRole {
            file,
            role,
            grantee,
        } => {
            let file_id = resolve_id(&file)?;
            match grantee.into_grantee() {
                Grantee::User(email) => {
                    client
                        .assign_role_to_user_on_file(role, &email, &file_id)
                        .await?
                }
                Grantee::Group(email) => {
                    client
                        .assign_role_to_group_on_file(role, &email, &file_id)
                        .await?
                }
                Grantee::Domain(domain) => {
                    client
                        .assign_role_to_domain_on_file(role, &domain, &file_id)
                        .await?
                }
                Grantee::Anyone => client.assign_role_to_anyone_on_file(role, &file_id).await?,
            }
            println!("role {} assigned on {}", role, file_id);
        }
    }

    Ok(())
}

fn resolve_ids(inputs: &[String]) -> Result<Vec<String>> {
    inputs
        .iter()
        .map(|input| resolve_id(input).with_context(|| format!("Invalid folder URL or ID: {}", input)))
        .collect()
}

fn as_strs(ids: &[String]) -> Vec<&str> {
    ids.iter().map(String::as_str).collect()
}

/// Expand glob patterns into a sorted, de-duplicated list of files.
///
/// A pattern that matches nothing is kept when it names an existing file.
fn collect_uploads(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let matches: Vec<PathBuf> = glob(pattern)
            .with_context(|| format!("Invalid glob pattern: {}", pattern))?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect();

        if !matches.is_empty() {
            files.extend(matches);
        } else if PathBuf::from(pattern).is_file() {
            files.push(PathBuf::from(pattern));
        } else {
            eprintln!("Warning: No files matched pattern: {}", pattern);
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}
