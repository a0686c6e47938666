//! Mindmap CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "mindmap")]
#[command(about = "Radial mind-map editor for service catalogs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (defaults to mindmap.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Catalog CSV, overriding the configuration
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the editor server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },
    /// Export a saved map to PDF
    Export {
        /// Saved map document (JSON)
        #[arg(short, long)]
        document: PathBuf,

        /// Output file (defaults to mindmap-YYYYMMDD.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate the catalog and optionally a saved map
    Check {
        #[arg(short, long)]
        document: Option<PathBuf>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "mindmap={log_level},mindmap_core={log_level},mindmap_export={log_level},mindmap_server={log_level}"
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(catalog) = cli.catalog {
        config.catalog = catalog;
    }

    match cli.command {
        Commands::Serve { port, host, open } => {
            tracing::info!("Mindmap v{}", env!("CARGO_PKG_VERSION"));
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            commands::serve(config, open).await
        }
        Commands::Export { document, output } => commands::export(config, document, output).await,
        Commands::Check { document } => commands::check(config, document),
        Commands::Version => {
            println!("Mindmap v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
