use std::io::Write;
use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use bucketfs::fs::{BucketFS, FileSystem};
use bucketfs::model::fs::BucketConfig;

#[derive(Parser)]
#[command(name = "bucketfs")]
#[command(about = "Diagnostic CLI for a bucket-backed virtual file system")]
struct Cli {
    /// Bucket to operate on
    bucket: String,

    /// Key prefix confining all content
    #[arg(long, default_value = "media")]
    prefix: String,

    /// Public host URL used for links; derived from the bucket when omitted
    #[arg(long)]
    host: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List files under a directory
    Ls {
        path: String,

        /// Name/extension glob applied to file names
        #[arg(long, default_value = "*.*")]
        filter: String,

        /// List subdirectories instead of files
        #[arg(long)]
        dirs: bool,
    },
    /// Upload a local file
    Put { path: String, file: PathBuf },
    /// Print an object's content
    Cat { path: String },
    /// Delete a file
    Rm { path: String },
    /// Delete a directory and everything under it
    Rmdir { path: String },
    /// Existence, modification time and URL
    Stat { path: String },
    /// Public URL for a path
    Url { path: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().json().init();

    let cli = Cli::parse();
    let host = cli
        .host
        .clone()
        .unwrap_or_else(|| format!("https://{}.s3.amazonaws.com", cli.bucket));
    info!(bucket = %cli.bucket, prefix = %cli.prefix, host = %host, "args");

    let config = BucketConfig::new(&cli.bucket, &host, &cli.prefix);

    let sdk_config = aws_config::load_from_env().await;
    let client = aws_sdk_s3::Client::new(&sdk_config);
    let fs = BucketFS::new(Box::new(client), config);

    match cli.command {
        Command::Ls { path, filter, dirs } => {
            if dirs {
                for dir in fs.get_directories(&path).await? {
                    println!("{}", dir);
                }
            } else {
                for file in fs.get_files(&path, &filter).await? {
                    println!("{}", file);
                }
            }
        }
        Command::Put { path, file } => {
            let data = std::fs::read(&file)
                .with_context(|| format!("failed to read local file: {}", file.display()))?;
            fs.add_file(&path, data, true).await?;
        }
        Command::Cat { path } => {
            let cursor = fs.open_file(&path).await?;
            std::io::stdout().write_all(cursor.get_ref())?;
        }
        Command::Rm { path } => {
            fs.delete_file(&path).await?;
        }
        Command::Rmdir { path } => {
            fs.delete_directory(&path, true).await?;
        }
        Command::Stat { path } => {
            let exists = fs.file_exists(&path).await?;
            let modified = fs.get_last_modified(&path).await?;
            let secs = modified
                .duration_since(SystemTime::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();
            println!("exists: {}", exists);
            println!("modified: {}", secs);
            println!("url: {}", fs.get_url(&path));
        }
        Command::Url { path } => {
            println!("{}", fs.get_url(&path));
        }
    }

    Ok(())
}
