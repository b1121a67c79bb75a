use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use collectives_api::activities::{sanitize_activity, Activity};
use collectives_api::config::Config;
use collectives_api::fixtures::Fixtures;
use collectives_api::graphql::{create_schema, GraphQLSettings};
use collectives_api::observability::{self, metrics};
use collectives_api::server;
use collectives_api::storage::{DatabaseStorage, InMemoryStorage, Storage};

#[derive(Parser)]
#[command(name = "collectives_api")]
#[command(about = "GraphQL API for collectives, their ledger and legal documents")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the GraphQL HTTP server
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
        /// SQLite database file; in-memory storage when omitted
        #[arg(long)]
        database: Option<PathBuf>,
        /// JSON fixtures to load at startup
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },
    /// Create or update the SQLite schema
    Migrate {
        #[arg(long)]
        database: Option<PathBuf>,
    },
    /// Print the webhook projection of an activity (file or stdin)
    Sanitize { input: Option<PathBuf> },
}

fn create_storage(database: Option<&Path>) -> Result<Arc<dyn Storage>> {
    match database {
        Some(path) => {
            info!("Using SQLite storage at {}", path.display());
            Ok(Arc::new(DatabaseStorage::open(path)?))
        }
        None => {
            info!("Using in-memory storage");
            Ok(Arc::new(InMemoryStorage::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    observability::init_logging();

    let cli = Cli::parse();
    let mut config = Config::load_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            database,
            fixtures,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if database.is_some() {
                config.database.path = database;
            }

            if let Err(e) = metrics::init() {
                warn!("Failed to initialize metrics: {}", e);
            }

            let storage = create_storage(config.database.path.as_deref())?;
            if let Some(path) = fixtures {
                let fixtures = Fixtures::from_file(&path)
                    .with_context(|| format!("reading fixtures from {}", path.display()))?;
                fixtures.apply(storage.as_ref()).await?;
            }

            let schema = create_schema(storage, GraphQLSettings::from(&config));
            server::start_server(schema, &config.server.host, config.server.port).await?;
        }
        Commands::Migrate { database } => {
            let path = database
                .or(config.database.path)
                .context("no database path given (use --database or DATABASE_PATH)")?;
            // Opening runs the migrations
            DatabaseStorage::open(&path)?;
            info!("Database at {} is up to date", path.display());
        }
        Commands::Sanitize { input } => {
            let content = match input {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            let activity: Activity = serde_json::from_str(&content)?;
            let sanitized = sanitize_activity(&activity);
            println!("{}", serde_json::to_string_pretty(&sanitized)?);
        }
    }

    Ok(())
}
