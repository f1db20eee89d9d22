use anyhow::{Context, Result};
use assetstore::{AssetRecord, AssetStore, FileBackend};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "asset-tool")]
#[command(about = "Operator tooling for an assetstore root directory")]
struct Cli {
    /// Store root directory
    #[arg(long, default_value = "./assetstore")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print store statistics
    Status,
    /// Fetch an asset and write its payload to a file
    Get {
        id: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Store a file as an asset, printing the asset ID
    Put {
        file: PathBuf,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        temporary: bool,
    },
    /// Delete an asset
    Delete { id: String },
    /// Check whether an asset exists
    Exists { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let backend = FileBackend::open(&cli.root)
        .await
        .with_context(|| format!("failed to open store at '{}'", cli.root.display()))?;
    let store = AssetStore::new(Arc::new(backend));

    match cli.command {
        Command::Status => {
            println!("{}", store.statistics().await);
        }
        Command::Get { id, out } => match store.get(&id).await {
            Some(record) => match out {
                Some(path) => {
                    tokio::fs::write(&path, &record.data)
                        .await
                        .with_context(|| format!("failed to write '{}'", path.display()))?;
                }
                None => println!(
                    "{} bytes, created_at={}, accessed_at={}",
                    record.data.len(),
                    record.created_at,
                    record.accessed_at
                ),
            },
            None => println!("not found"),
        },
        Command::Put {
            file,
            id,
            temporary,
        } => {
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read '{}'", file.display()))?;
            let mut record = AssetRecord::new(id.unwrap_or_default(), data);
            if temporary {
                record = record.temporary();
            }

            let id = store.store(record).await;
            // The store is fire-and-forget; wait for the flush to settle
            // before the process exits.
            while store.pending_writes() > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            println!("{id}");
        }
        Command::Delete { id } => {
            store.delete(&id).await;
        }
        Command::Exists { id } => {
            println!("{}", store.exists(&id).await);
        }
    }

    Ok(())
}
