//! Storage Adapters
//!
//! Implementations of the `KeyValueStore` trait.

mod memory;
#[cfg(feature = "rocksdb")]
mod rocksdb_adapter;

pub use memory::InMemoryKVStore;
#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbStore};
