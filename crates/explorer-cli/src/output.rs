//! JSON and text rendering of explorer results.

use crate::config::OutputFormat;
use chain_explorer::{
    checksum_address, short_hex, AddressStats, BlockTransactions, ChainActivity, ChainSummary,
    Hash,
};
use chrono::DateTime;
use serde::Serialize;
use std::io::{self, Write};

/// Write `value` as pretty JSON or through its text renderer.
pub fn emit<T, W>(
    out: &mut W,
    format: OutputFormat,
    value: &T,
    text: fn(&mut dyn Write, &T) -> io::Result<()>,
) -> anyhow::Result<()>
where
    T: Serialize,
    W: Write,
{
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputFormat::Text => text(out, value)?,
    }
    Ok(())
}

pub fn summary_table(out: &mut dyn Write, summary: &ChainSummary) -> io::Result<()> {
    writeln!(
        out,
        "{:<8} {:<25} {:<19} {:>4}  MINER",
        "NUMBER", "TIME", "HASH", "TXS"
    )?;
    for block in &summary.blocks {
        writeln!(
            out,
            "{:<8} {:<25} {:<19} {:>4}  {}",
            block.number,
            format_time(block.timestamp),
            short_hash(&block.hash),
            block.transaction_count,
            short_hex(&checksum_address(&block.miner)),
        )?;
    }
    Ok(())
}

pub fn transactions_table(out: &mut dyn Write, listing: &BlockTransactions) -> io::Result<()> {
    writeln!(out, "block {} {:?}", listing.number, listing.hash)?;
    writeln!(
        out,
        "{:>4}  {:<19} {:<19} {:<19} VALUE",
        "IDX", "HASH", "FROM", "TO"
    )?;
    for tx in &listing.transactions {
        let to = match &tx.to {
            Some(address) => short_hex(&checksum_address(address)),
            None => "(create)".to_string(),
        };
        writeln!(
            out,
            "{:>4}  {:<19} {:<19} {:<19} {}",
            tx.index,
            short_hash(&tx.hash),
            short_hex(&checksum_address(&tx.from)),
            to,
            tx.value,
        )?;
    }
    Ok(())
}

pub fn stats_table(out: &mut dyn Write, stats: &Vec<AddressStats>) -> io::Result<()> {
    writeln!(
        out,
        "{:<42} {:>6} {:>8}  TOTAL RECEIVED",
        "ADDRESS", "SENT", "RECEIVED"
    )?;
    for entry in stats {
        writeln!(
            out,
            "{:<42} {:>6} {:>8}  {}",
            checksum_address(&entry.address),
            entry.send_count,
            entry.receive_count,
            entry.total_received,
        )?;
    }
    Ok(())
}

pub fn activity_table(out: &mut dyn Write, activity: &ChainActivity) -> io::Result<()> {
    writeln!(out, "{:<8} {:<25} {:>4}", "NUMBER", "TIME", "TXS")?;
    for point in &activity.points {
        writeln!(
            out,
            "{:<8} {:<25} {:>4}",
            point.number,
            format_time(point.timestamp),
            point.transaction_count,
        )?;
    }
    writeln!(out)?;
    stats_table(out, &activity.addresses)
}

pub fn head_line(out: &mut dyn Write, head: &Option<u64>) -> io::Result<()> {
    match head {
        Some(number) => writeln!(out, "{number}"),
        None => writeln!(out, "no head block recorded"),
    }
}

/// RFC 3339 rendering of a unix timestamp.
fn format_time(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|time| time.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string())
}

fn short_hash(hash: &Hash) -> String {
    short_hex(&format!("{:?}", hash))
}
