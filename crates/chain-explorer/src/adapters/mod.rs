//! # Adapters Layer
//!
//! Implementations of the outbound ports.
//!
//! - `storage` - `KeyValueStore` backends (in-memory, RocksDB)

pub mod storage;
