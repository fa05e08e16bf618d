use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use pangbank_cli::output::{format_collections, ingest_summary_lines, metadata_summary_lines};
use pangbank_cli::{Command, Config, MetadataCommand};
use pangbank_core::{AppError, MetadataSourceInput, ReleaseDescriptor};
use pangbank_db::{MetadataRepository, ReleaseRepository};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let config = Config::parse();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<AppError>() {
                Some(app_error) => error!("{}", app_error.user_message()),
                None => error!("{:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!("Opening database {}", config.database_path.display());
    let pool = pangbank_db::connect(&config.db_config()).await?;

    let result = match config.command {
        Command::AddCollectionRelease {
            collection_release_json,
            pangbank_data_dir,
        } => {
            add_collection_release(
                &ReleaseRepository::new(pool.clone()),
                &collection_release_json,
                &pangbank_data_dir,
            )
            .await
        }
        Command::ListCollections => list_collections(&ReleaseRepository::new(pool.clone())).await,
        Command::DeleteCollection {
            collection_name,
            release_version,
        } => {
            delete_collection(
                &ReleaseRepository::new(pool.clone()),
                &collection_name,
                release_version.as_deref(),
            )
            .await
        }
        Command::GenomeMetadata { command } => {
            let repo = MetadataRepository::new(pool.clone());
            match command {
                MetadataCommand::Add {
                    source_json,
                    metadata_table,
                } => add_genome_metadata(&repo, &source_json, &metadata_table).await,
                MetadataCommand::Delete { name, version } => {
                    delete_genome_metadata(&repo, &name, version.as_deref()).await
                }
            }
        }
    };

    pool.close().await;
    result
}

async fn add_collection_release(
    repo: &ReleaseRepository,
    descriptor_path: &Path,
    data_dir: &Path,
) -> anyhow::Result<()> {
    info!("Reading collection release {}", descriptor_path.display());
    let loaded = ReleaseDescriptor::load(descriptor_path, data_dir)?;
    let collection = loaded.descriptor.collection.name.clone();
    let version = loaded.descriptor.release.version.clone();

    info!("Adding collection {} release {}", collection, version);
    let summary = repo.ingest(&loaded).await?;

    info!("════════════════════════════════════════════════════════");
    for line in ingest_summary_lines(&collection, &version, &summary) {
        info!("{}", line);
    }
    info!("════════════════════════════════════════════════════════");
    Ok(())
}

async fn list_collections(repo: &ReleaseRepository) -> anyhow::Result<()> {
    let collections = repo.list_collections().await?;
    print!("{}", format_collections(&collections));
    Ok(())
}

async fn delete_collection(
    repo: &ReleaseRepository,
    name: &str,
    release_version: Option<&str>,
) -> anyhow::Result<()> {
    match release_version {
        Some(version) => {
            repo.delete_release(name, version).await?;
            info!("Deleted release {} of collection {}", version, name);
        }
        None => {
            repo.delete_collection(name).await?;
            info!("Deleted collection {} with all its releases", name);
        }
    }
    Ok(())
}

async fn add_genome_metadata(
    repo: &MetadataRepository,
    source_path: &Path,
    table: &Path,
) -> anyhow::Result<()> {
    let source = MetadataSourceInput::load(source_path)?;
    info!(
        "Loading genome metadata source {} from {}",
        source.name,
        table.display()
    );

    let summary = repo
        .add(&source, table)
        .await
        .with_context(|| format!("Failed to load {}", table.display()))?;

    if summary.unknown_genomes > 0 {
        warn!(
            "{} genome(s) of the table are not part of any pangenome and were skipped",
            summary.unknown_genomes
        );
    }
    for line in metadata_summary_lines(&source.name, &summary) {
        info!("{}", line);
    }
    Ok(())
}

async fn delete_genome_metadata(
    repo: &MetadataRepository,
    name: &str,
    version: Option<&str>,
) -> anyhow::Result<()> {
    let deleted = repo.delete(name, version).await?;
    if deleted > 0 {
        info!("Deleted {} genome metadata source(s) named {}", deleted, name);
    }
    Ok(())
}
