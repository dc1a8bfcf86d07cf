use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use audit_tracker::{api, config::ServerConfig, db};

#[derive(Parser)]
#[command(name = "audit-tracker")]
#[command(about = "Track client projects, their requirements, audit tasks and issues")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server (the default)
    Serve {
        /// Port for HTTP API
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Apply pending schema migrations and exit
    Migrate {
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Insert demo data into empty tables and exit
    Seed {
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "audit_tracker=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(path: PathBuf) -> anyhow::Result<db::Database> {
    let database = db::Database::open(path.clone())
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    database.migrate()?;
    Ok(database)
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let database = open_database(config.database_path.clone())?;
    database.seed()?;

    let app = api::create_router_with_config(database, &config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Audit tracker listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = ServerConfig::from_env()?;

    match cli.command {
        Some(Commands::Serve { port, host, db }) => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(db) = db {
                config.database_path = db;
            }
            serve(config).await?;
        }
        Some(Commands::Migrate { db }) => {
            let path = db.unwrap_or(config.database_path);
            open_database(path)?;
            tracing::info!("Migrations applied");
        }
        Some(Commands::Seed { db }) => {
            let path = db.unwrap_or(config.database_path);
            let seeded = open_database(path)?.seed()?;
            println!("Seeded {} table(s)", seeded.len());
        }
        None => serve(config).await?,
    }

    Ok(())
}
