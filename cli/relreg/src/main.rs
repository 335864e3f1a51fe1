//! relreg — serve and inspect a release registry tree.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use relreg_http::{init_logging, LogFormat, ServerConfig};

#[derive(Parser)]
#[command(name = "relreg", version, about = "Release registry server and tools")]
struct Cli {
    /// Config file (default: relreg.toml in the working directory, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Registry data tree (overrides config and REGISTRY_ROOT)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Log format (pretty, json)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the registry API
    Serve {
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
        /// Enable the response cache
        #[arg(long)]
        enable_cache: bool,
    },
    /// Check that every package and SDK resolves (strict listings)
    Check,
    /// Print the ordered versions of a package
    Versions {
        /// Canonical id (e.g., pypi:sentry-sdk)
        canonical: String,
    },
    /// Resolve a marketing slug
    Slug {
        /// Slug name
        slug: String,
    },
    /// Show an SDK with its packages resolved
    Sdk {
        /// SDK key (e.g., sentry.python)
        id: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    if let Some(root) = cli.root {
        config.root = root;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    init_logging(config.log_format);

    match cli.command {
        Commands::Serve { port, enable_cache } => {
            if let Some(port) = port {
                config.port = port;
            }
            if enable_cache {
                config.cache.enabled = true;
            }
            commands::serve::run(config)
        }
        Commands::Check => commands::check::run(&config.root),
        Commands::Versions { canonical } => commands::inspect::versions(&config.root, &canonical),
        Commands::Slug { slug } => commands::inspect::slug(&config.root, &slug),
        Commands::Sdk { id } => commands::inspect::sdk(&config.root, &id),
    }
}
