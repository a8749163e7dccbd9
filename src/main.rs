use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use oui_lookup::{Config, Resolver};

#[derive(Parser)]
#[command(name = "oui_lookup")]
#[command(about = "Look up MAC address manufacturers from a cached IEEE OUI database")]
struct Cli {
    /// Path to the OUI cache file (default: <config dir>/oui_data.csv, or $OUI_CACHE_PATH)
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// Registry CSV URL (default: IEEE MA-L, or $OUI_REGISTRY_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Download timeout in seconds (default: none, or $OUI_FETCH_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve one or more MAC addresses
    Lookup {
        /// MAC addresses in any of AA:BB:CC, AA-BB-CC or AABBCC form
        #[arg(required = true)]
        macs: Vec<String>,
    },
    /// Download the latest OUI database from the IEEE
    Update,
    /// Show where the cache lives and whether it exists
    Path,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut resolver = Resolver::from_config(&config);

    match cli.command {
        Command::Lookup { macs } => {
            let mut failed = false;
            for mac in &macs {
                match resolver.lookup(mac) {
                    Ok(manufacturer) => println!("{}\t{}", mac, manufacturer),
                    Err(e) => {
                        error!("{}: {}", mac, e);
                        failed = true;
                    }
                }
            }
            if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Command::Update => match resolver.refresh() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Failed to update OUI database: {}", e);
                ExitCode::FAILURE
            }
        },
        Command::Path => {
            let store = resolver.store();
            let state = if store.exists() { "present" } else { "missing" };
            println!("{} ({})", store.path().display(), state);
            ExitCode::SUCCESS
        }
    }
}

fn build_config(cli: &Cli) -> oui_lookup::Result<Config> {
    // CLI flags win over the environment; an explicit --cache also avoids
    // failing on hosts without a config dir
    let mut config = Config::from_env_with_cache_path(cli.cache.clone())?;

    if let Some(url) = &cli.url {
        config.registry_url = url.clone();
    }
    if let Some(secs) = cli.timeout {
        config.fetch_timeout = Some(Duration::from_secs(secs));
    }

    Ok(config)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
