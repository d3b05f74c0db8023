//! Command-line arguments with environment fallbacks.

use chain_explorer::{
    BlockNumber, ExplorerConfig, RocksDbConfig, DEFAULT_FLOOR_BLOCK, DEFAULT_NETWORK_ID,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Read-only explorer over a client's chain database.
#[derive(Parser, Debug)]
#[command(name = "explorer", version)]
#[command(about = "Summaries, transactions and address statistics from a chain database")]
pub struct Args {
    /// Path to the chain database directory
    #[arg(long, env = "EXPLORER_DB_PATH", default_value = "./chaindata")]
    pub db_path: PathBuf,

    /// Network identifier used for replay-protected signatures
    #[arg(long, env = "EXPLORER_NETWORK_ID", default_value_t = DEFAULT_NETWORK_ID)]
    pub network_id: u64,

    /// Highest block to scan (defaults to the head block recorded in the store)
    #[arg(long, env = "EXPLORER_TIP")]
    pub tip: Option<BlockNumber>,

    /// Lowest block included in full-range scans
    #[arg(long, env = "EXPLORER_FLOOR_BLOCK", default_value_t = DEFAULT_FLOOR_BLOCK)]
    pub floor_block: BlockNumber,

    /// Block cache size in megabytes
    #[arg(long, default_value_t = 256)]
    pub cache_mb: usize,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "EXPLORER_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List blocks from the floor (or the newest `--limit` blocks) up to the tip
    Summary {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List the transactions of one block
    Block { number: BlockNumber },
    /// Per-address send/receive statistics
    Stats,
    /// Per-block transaction counts plus address statistics
    Activity,
    /// Print the head block number recorded in the store
    Head,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

impl Args {
    pub fn explorer_config(&self) -> ExplorerConfig {
        ExplorerConfig::default()
            .with_network_id(self.network_id)
            .with_floor_block(self.floor_block)
    }

    pub fn rocksdb_config(&self) -> RocksDbConfig {
        RocksDbConfig {
            path: self.db_path.to_string_lossy().to_string(),
            block_cache_size: self.cache_mb * 1024 * 1024,
            ..Default::default()
        }
    }
}
