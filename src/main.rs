//! bucketkit: object storage helper CLI
//!
//! Usage:
//!   bucketkit list     --bucket data --prefix models/
//!   bucketkit download --bucket data --prefix models/ --dest ./models
//!   bucketkit upload   --bucket data --prefix reports --file out.pdf
//!   bucketkit write    --bucket data --key status.json --json '{"ok":true}'
//!
//! Every command runs under the deadline from the `[guard]` config section.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bucketkit::config::Config;
use bucketkit::storage::{Payload, StorageService};

#[derive(Parser)]
#[command(name = "bucketkit", about = "S3-compatible object storage helper", version)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List objects under a prefix.
    List {
        #[arg(long)]
        bucket: String,
        #[arg(long, default_value = "")]
        prefix: String,
    },
    /// Download every object under a prefix, skipping files already present.
    Download {
        #[arg(long)]
        bucket: String,
        #[arg(long, default_value = "")]
        prefix: String,
        /// Local destination directory (created if missing).
        #[arg(long)]
        dest: PathBuf,
    },
    /// Upload one local file under a prefix.
    Upload {
        #[arg(long)]
        bucket: String,
        #[arg(long, default_value = "")]
        prefix: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Write text, JSON or binary content to a key.
    Write {
        #[arg(long)]
        bucket: String,
        #[arg(long)]
        key: String,
        #[command(flatten)]
        content: Content,
        /// Override the inferred content type.
        #[arg(long)]
        content_type: Option<String>,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct Content {
    /// Plain text body.
    #[arg(long)]
    text: Option<String>,
    /// JSON document body.
    #[arg(long)]
    json: Option<String>,
    /// Read the body from a local file and store it as binary.
    #[arg(long, value_name = "FILE")]
    binary: Option<PathBuf>,
}

impl Content {
    async fn into_payload(self) -> anyhow::Result<Payload> {
        if let Some(text) = self.text {
            return Ok(Payload::Text(text));
        }
        if let Some(json) = self.json {
            let value = serde_json::from_str(&json).context("--json is not valid JSON")?;
            return Ok(Payload::Json(value));
        }
        if let Some(path) = self.binary {
            let data = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Cannot read {}", path.display()))?;
            return Ok(Payload::from(data));
        }
        anyhow::bail!("one of --text, --json or --binary is required")
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        let msg = format!("{e:#}");
        error!(error = %msg, "Command failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = Config::from_file(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;
    let deadline = cfg.guard.deadline();
    let service =
        StorageService::connect(&cfg.storage).context("Failed to set up object storage")?;

    info!(
        backend = ?cfg.storage.backend,
        deadline_secs = cfg.guard.deadline_secs,
        "Ready"
    );

    match cli.command {
        Command::List { bucket, prefix } => {
            let objects = deadline.try_run(service.list_objects(&bucket, &prefix)).await?;
            for obj in &objects {
                let size = obj.size.map(|s| s.to_string()).unwrap_or_else(|| "-".into());
                let modified = obj.last_modified.map(|t| t.to_rfc3339()).unwrap_or_default();
                println!("{size:>12}  {modified:<25}  {}", obj.key);
            }
            println!("{} object(s)", objects.len());
        }
        Command::Download { bucket, prefix, dest } => {
            let files = deadline
                .try_run(service.download_files(&bucket, &prefix, &dest))
                .await?;
            for f in &files {
                println!("{}", f.display());
            }
            println!("{} file(s) downloaded", files.len());
        }
        Command::Upload { bucket, prefix, file } => {
            let msg = deadline.try_run(service.upload_file(&bucket, &prefix, &file)).await?;
            println!("{msg}");
        }
        Command::Write { bucket, key, content, content_type } => {
            let payload = content.into_payload().await?;
            let msg = deadline
                .try_run(service.write_file(&bucket, &key, payload, content_type.as_deref()))
                .await?;
            println!("{msg}");
        }
    }
    Ok(())
}
