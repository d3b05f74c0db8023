//! # Inbound Ports (Driving Ports)
//!
//! The query API of the explorer.
//!
//! Every operation rescans its range from the store; nothing is cached
//! between calls. Any failure aborts the whole operation and no partial
//! result is returned.

use crate::domain::entities::{AddressStats, BlockTransactions, ChainActivity, ChainSummary};
use crate::domain::errors::ExplorerError;
use crate::domain::BlockNumber;

/// Primary API of the explorer.
pub trait ChainExplorerApi {
    /// One summary per block in `[floor_block, tip]`, ascending.
    ///
    /// ## Errors
    ///
    /// - `MissingBlock`: a block in the range is absent
    /// - `Decode` / `Assembly`: a block's stored bytes are unusable
    /// - `InvalidRange`: `tip` is below the configured floor
    fn chain_summary(&self, tip: BlockNumber) -> Result<ChainSummary, ExplorerError>;

    /// At most `limit` newest blocks ending at `tip`, ascending.
    ///
    /// Blocks below the window are never read.
    fn recent_blocks(&self, tip: BlockNumber, limit: usize)
        -> Result<ChainSummary, ExplorerError>;

    /// Sender, recipient and value of each transaction in block `number`.
    ///
    /// ## Errors
    ///
    /// - `MissingBlock` / `Decode` / `Assembly` as for `chain_summary`
    /// - `Recovery`: a sender cannot be recovered
    fn block_transactions(&self, number: BlockNumber)
        -> Result<BlockTransactions, ExplorerError>;

    /// Per-address statistics over `[floor_block, tip]`, in first-seen order.
    fn address_statistics(&self, tip: BlockNumber) -> Result<Vec<AddressStats>, ExplorerError>;

    /// Per-block activity and per-address statistics from a single walk.
    fn chain_activity(&self, tip: BlockNumber) -> Result<ChainActivity, ExplorerError>;

    /// Number of the head block recorded in the store, if any.
    fn head_block_number(&self) -> Result<Option<BlockNumber>, ExplorerError>;

    /// `explicit` if given, otherwise the head block.
    ///
    /// ## Errors
    ///
    /// - `UnknownTip`: no explicit tip and no head block recorded
    fn resolve_tip(&self, explicit: Option<BlockNumber>) -> Result<BlockNumber, ExplorerError>;
}
