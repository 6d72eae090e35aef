mod cache;
mod lookup;
mod schema;
mod sync;

use clap::{Parser, Subcommand};
use descache_core::ProxyConfig;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "descache",
    version,
    about = "Local cache for reflection-served type descriptors",
    long_about = "descache keeps the descriptor files served by reflection endpoints in a local \
                  cache file, refreshing a host's entry only when it is older than the TTL."
)]
pub struct Cli {
    /// Cache file to operate on. Defaults to $DESCACHE_DB or ~/.descache/descriptors.db
    #[arg(long, global = true, value_name = "PATH")]
    pub cache: Option<PathBuf>,

    /// Freshness window in seconds. Defaults to $DESCACHE_TTL_SECS or 120
    #[arg(long, global = true, value_name = "SECS")]
    pub ttl: Option<u64>,

    /// Also print logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Refresh a host's entry from a reflection snapshot if it is stale
    #[command(
        long_about = "Runs the full cache pass for a host: loads the cache, checks freshness, \
                      replays reflection from the snapshot file when stale, and writes the cache back."
    )]
    Sync {
        /// Host address used as cache key
        #[arg(long)]
        host: String,
        /// JSON reflection snapshot standing in for the endpoint
        #[arg(long, value_name = "FILE")]
        snapshot: PathBuf,
    },
    /// Look up a descriptor file for a host
    Lookup(lookup::LookupArgs),
    #[command(flatten)]
    Cache(cache::CacheCommands),
    /// Print the reflection snapshot format
    Schema,
}

impl Cli {
    fn config(&self) -> ProxyConfig {
        let mut config = ProxyConfig::from_env();
        if let Some(path) = &self.cache {
            config.cache_path = path.clone();
        }
        if let Some(secs) = self.ttl {
            config.ttl = Duration::from_secs(secs);
        }
        config
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = descache_core::logging::init_logging("cli", cli.verbose);

    let config = cli.config();
    tracing::debug!("Using cache file {}", config.cache_path.display());

    match cli.command {
        Commands::Sync { host, snapshot } => sync::run(&config, &host, &snapshot),
        Commands::Lookup(args) => lookup::run(&config, args),
        Commands::Cache(cmd) => cache::run(&config, cmd),
        Commands::Schema => schema::run(),
    }
}
