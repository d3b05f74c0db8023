//! # Value Objects
//!
//! Explorer configuration.

use super::BlockNumber;
use serde::{Deserialize, Serialize};

/// Network identifier of the chain the explorer was written for.
pub const DEFAULT_NETWORK_ID: u64 = 1314;

/// Lowest block scanned by default. Genesis carries no transactions.
pub const DEFAULT_FLOOR_BLOCK: BlockNumber = 1;

/// Explorer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Network identifier folded into replay-protected signatures.
    pub network_id: u64,
    /// Lowest block included in full-range scans.
    pub floor_block: BlockNumber,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            network_id: DEFAULT_NETWORK_ID,
            floor_block: DEFAULT_FLOOR_BLOCK,
        }
    }
}

impl ExplorerConfig {
    /// Set the network identifier.
    pub fn with_network_id(mut self, network_id: u64) -> Self {
        self.network_id = network_id;
        self
    }

    /// Set the lowest scanned block.
    pub fn with_floor_block(mut self, floor_block: BlockNumber) -> Self {
        self.floor_block = floor_block;
        self
    }
}
