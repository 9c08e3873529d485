mod ingest;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "prodcat-cli")]
#[command(about = "Product catalog ingestion command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Submit a batch of products from a JSON file
    Ingest {
        /// File holding one product object or an array of products
        #[arg(long)]
        file: PathBuf,
        /// Records per INSERT statement (defaults to `PRODCAT_INSERT_CHUNK_SIZE`)
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Plan the batch against the catalog without writing anything
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("prodcat-cli ready; see --help for commands");
        return Ok(());
    };

    let config = prodcat_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = prodcat_db::PoolConfig::from_app_config(&config);
    let pool = prodcat_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            prodcat_db::health_check(&pool).await?;
            println!("database ok");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = prodcat_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Ingest {
            file,
            chunk_size,
            dry_run,
        } => {
            let options = ingest::resolve_options(&config, chunk_size)?;
            ingest::run_ingest(&pool, &file, &options, dry_run).await?;
        }
    }

    Ok(())
}
