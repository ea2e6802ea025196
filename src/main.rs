//! Account API entry point.

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use account_api::config::{parse_listen_addr, Config};
use account_api::metrics;
use account_api::server::{bootstrap, serve};
use account_api::storage::{PostgresStorage, Storage};

/// JSON CRUD API over a PostgreSQL account table.
#[derive(Parser, Debug)]
#[command(name = "account-api")]
#[command(about = "HTTP CRUD service for bank accounts backed by PostgreSQL")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true, env = "VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Log filter: `--verbose`/`VERBOSE` wins over `RUST_LOG`, which wins over `info`.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("account_api=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default).
    Serve {
        /// Override LISTEN_ADDR.
        #[arg(short, long)]
        listen_addr: Option<String>,
    },

    /// Create the account table and exit.
    InitDb,

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env so VERBOSE and RUST_LOG apply before logging starts
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(log_filter(args.verbose))
        .init();

    match args.command {
        Some(Command::InitDb) => cmd_init_db().await,
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::Serve { listen_addr }) => cmd_serve(listen_addr).await,
        None => cmd_serve(None).await,
    }
}

/// Load configuration, logging the failure before returning it.
fn load_config() -> anyhow::Result<Config> {
    info!("Loading configuration...");
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    Ok(config)
}

/// Serve the HTTP API.
async fn cmd_serve(listen_override: Option<String>) -> anyhow::Result<()> {
    let mut config = load_config()?;
    if let Some(addr) = listen_override {
        config.listen_addr = addr;
    }
    let addr = parse_listen_addr(&config.listen_addr).map_err(|e| anyhow::anyhow!(e))?;

    let state = bootstrap(&config).await.map_err(|e| {
        error!("Startup failed: {}", e);
        e
    })?;
    let state = state.with_metrics(metrics::install_recorder()?);

    serve(addr, state).await?;
    Ok(())
}

/// Create the account table and exit.
async fn cmd_init_db() -> anyhow::Result<()> {
    let config = load_config()?;
    let storage = PostgresStorage::connect(&config).await?;
    storage.init_db().await?;
    info!("Database initialized");
    Ok(())
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("ACCOUNT API - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Database URL: {}", config.redacted_database_url());
    println!("  Listen Address: {}", config.listen_addr);
    println!(
        "  Pool: max {} / min {} connections",
        config.db_max_connections, config.db_min_connections
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}
