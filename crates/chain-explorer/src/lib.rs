//! # Chain Explorer Core
//!
//! Read path of the block explorer: reconstructs blocks and transactions from
//! the key-value store written by an external Ethereum-family client and
//! aggregates per-address statistics over a contiguous block range.
//!
//! ## Data Flow
//!
//! ```text
//! KeyValueStore ──get──→ Key Codec ──bytes──→ Record Decoder ──Block──→ Chain Walker
//!                                                                         │
//!                                              Sender Recovery ←──tx──────┤
//!                                                    │                    │
//!                                                    ↓                    ↓
//!                                              AddressStats          BlockSummary
//! ```
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Pure logic: key codec, RLP decoding, sender recovery, statistics
//! - `ports/` - Inbound API trait, outbound key-value store trait
//! - `adapters/` - In-memory and RocksDB store implementations
//! - `service/` - Chain walker and the public explorer operations
//!
//! ## Usage
//!
//! ```ignore
//! use chain_explorer::{ChainExplorerApi, ChainExplorerService, ExplorerConfig, InMemoryKVStore};
//!
//! let service = ChainExplorerService::new(InMemoryKVStore::new(), ExplorerConfig::default());
//! let summary = service.chain_summary(102)?;
//! let stats = service.address_statistics(102)?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export key types for convenience
pub use adapters::storage::InMemoryKVStore;
#[cfg(feature = "rocksdb")]
pub use adapters::storage::{RocksDbConfig, RocksDbStore};
pub use domain::codec::{assemble_block, decode_body, decode_header, decode_transaction};
pub use domain::entities::{
    ActivityPoint, AddressStats, Block, BlockSummary, BlockTransactions, Body, ChainActivity,
    ChainSummary, Header, Transaction, TransactionRecord, TxKind, TxSignature,
};
pub use domain::errors::{
    AssemblyError, BlockPart, DecodeError, ExplorerError, KVStoreError, RecoveryError,
};
pub use domain::recovery::{checksum_address, keccak256, recover_sender, short_hex, SignatureScheme};
pub use domain::stats::AddressStatsCollector;
pub use domain::value_objects::{ExplorerConfig, DEFAULT_FLOOR_BLOCK, DEFAULT_NETWORK_ID};
pub use domain::{Address, BlockNumber, Hash, U256};
pub use ports::inbound::ChainExplorerApi;
pub use ports::outbound::KeyValueStore;
pub use service::{ChainExplorerService, ChainWalk};
