//! explorer: read-only block explorer over a client's chain database.
//!
//! Each invocation opens the database, runs one query and prints the result
//! as JSON (default) or a text table.

mod config;
mod output;

use anyhow::{Context, Result};
use chain_explorer::{ChainExplorerApi, ChainExplorerService, RocksDbStore};
use clap::Parser;
use config::{Args, Command};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    let store = RocksDbStore::open(args.rocksdb_config())
        .with_context(|| format!("cannot open chain database at {}", args.db_path.display()))?;
    let service = ChainExplorerService::new(store, args.explorer_config());
    info!(
        network_id = args.network_id,
        floor_block = args.floor_block,
        "explorer ready"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&service, &args, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Initialize logging to stderr: `RUST_LOG` wins over `--log-level`.
fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log filter")?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let initialized = if args.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    initialized.map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}

/// Execute the selected subcommand against `service`.
fn run<S, W>(service: &S, args: &Args, out: &mut W) -> Result<()>
where
    S: ChainExplorerApi,
    W: Write,
{
    match &args.command {
        Command::Summary { limit } => {
            let tip = service.resolve_tip(args.tip)?;
            let summary = match limit {
                Some(limit) => service.recent_blocks(tip, *limit),
                None => service.chain_summary(tip),
            }
            .with_context(|| format!("cannot summarize chain up to block {tip}"))?;
            output::emit(out, args.format, &summary, output::summary_table)
        }
        Command::Block { number } => {
            let listing = service
                .block_transactions(*number)
                .with_context(|| format!("cannot list transactions of block {number}"))?;
            output::emit(out, args.format, &listing, output::transactions_table)
        }
        Command::Stats => {
            let tip = service.resolve_tip(args.tip)?;
            let stats = service
                .address_statistics(tip)
                .with_context(|| format!("cannot aggregate statistics up to block {tip}"))?;
            output::emit(out, args.format, &stats, output::stats_table)
        }
        Command::Activity => {
            let tip = service.resolve_tip(args.tip)?;
            let activity = service
                .chain_activity(tip)
                .with_context(|| format!("cannot build chain activity up to block {tip}"))?;
            output::emit(out, args.format, &activity, output::activity_table)
        }
        Command::Head => {
            let head = service.head_block_number()?;
            output::emit(out, args.format, &head, output::head_line)
        }
    }
}
