//! # Address Statistics
//!
//! Single-pass aggregation of per-address send/receive activity.
//!
//! Each address owns exactly one `AddressStats` record; the index map points
//! into the record list so first-seen order is kept without a second scan.

use super::entities::AddressStats;
use super::{Address, U256};
use std::collections::HashMap;

/// Accumulates `AddressStats` while transactions stream past.
#[derive(Debug, Default)]
pub struct AddressStatsCollector {
    records: Vec<AddressStats>,
    index: HashMap<Address, usize>,
}

impl AddressStatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one transfer.
    ///
    /// The sender always gains a send. The recipient gains a receive unless it
    /// is the sender, and is credited `value` in either case. Contract
    /// creations have no recipient.
    pub fn record(&mut self, sender: Address, recipient: Option<Address>, value: U256) {
        self.entry(sender).send_count += 1;

        if let Some(recipient) = recipient {
            let stats = self.entry(recipient);
            if recipient != sender {
                stats.receive_count += 1;
            }
            stats.total_received = stats.total_received.saturating_add(value);
        }
    }

    /// Number of distinct addresses seen so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Statistics in first-seen order.
    pub fn finish(self) -> Vec<AddressStats> {
        self.records
    }

    fn entry(&mut self, address: Address) -> &mut AddressStats {
        let records = &mut self.records;
        let slot = *self.index.entry(address).or_insert_with(|| {
            records.push(AddressStats::new(address));
            records.len() - 1
        });
        &mut self.records[slot]
    }
}
