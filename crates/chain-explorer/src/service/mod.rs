//! # Chain Explorer Service
//!
//! The service implementing the explorer query API.
//!
//! ## Architecture
//!
//! This service:
//! 1. Owns the store handle and an `ExplorerConfig` (no global state)
//! 2. Walks the canonical chain lazily, newest block first
//! 3. Implements `ChainExplorerApi` on top of that walk

mod api;
mod walker;
#[cfg(test)]
mod tests;

pub use walker::ChainWalk;

use crate::domain::entities::{Block, Transaction};
use crate::domain::errors::ExplorerError;
use crate::domain::recovery::recover_sender;
use crate::domain::value_objects::ExplorerConfig;
use crate::domain::{Address, BlockNumber};
use crate::ports::outbound::KeyValueStore;

/// The Chain Explorer Service.
pub struct ChainExplorerService<KV: KeyValueStore> {
    /// Read-only chain database.
    store: KV,
    /// Service configuration.
    config: ExplorerConfig,
}

impl<KV: KeyValueStore> ChainExplorerService<KV> {
    /// Create a service reading from `store`.
    pub fn new(store: KV, config: ExplorerConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn store(&self) -> &KV {
        &self.store
    }

    /// Release the store handle.
    pub fn into_store(self) -> KV {
        self.store
    }

    /// Lazily walk blocks `from` down to `to`, both inclusive.
    ///
    /// ## Errors
    ///
    /// - `InvalidRange`: `from < to`
    pub fn walk(
        &self,
        from: BlockNumber,
        to: BlockNumber,
    ) -> Result<ChainWalk<'_, KV>, ExplorerError> {
        if from < to {
            return Err(ExplorerError::InvalidRange { from, to });
        }
        Ok(ChainWalk::new(&self.store, from, to))
    }

    /// Read and assemble a single canonical block.
    pub fn read_block(&self, number: BlockNumber) -> Result<Block, ExplorerError> {
        walker::read_block(&self.store, number)
    }

    /// Recover the sender of `tx`, tagging failures with its position.
    fn sender_of(&self, number: BlockNumber, tx: &Transaction) -> Result<Address, ExplorerError> {
        recover_sender(tx, self.config.network_id).map_err(|source| ExplorerError::Recovery {
            number,
            index: tx.index,
            source,
        })
    }
}
