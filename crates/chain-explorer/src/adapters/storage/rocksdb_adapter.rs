//! # RocksDB Storage Adapter
//!
//! Read-only RocksDB implementation of the KeyValueStore trait.
//!
//! The explorer never writes: the database is opened with
//! `open_for_read_only`, so a running client may keep its own handle.
//!
//! ## Configuration
//!
//! - Block cache (256MB default)
//! - Bloom filters (10 bits per key)

use crate::domain::errors::KVStoreError;
use crate::ports::outbound::KeyValueStore;
use rocksdb::{BlockBasedOptions, Cache, Options, DB};
use std::path::Path;
use tracing::info;

/// RocksDB configuration.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: String,
    /// Block cache size in bytes (default: 256MB)
    pub block_cache_size: usize,
    /// Maximum number of open files, -1 for unlimited (default: 512)
    pub max_open_files: i32,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./chaindata".to_string(),
            block_cache_size: 256 * 1024 * 1024, // 256MB
            max_open_files: 512,
        }
    }
}

impl RocksDbConfig {
    /// Create config for testing (small cache)
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 8 * 1024 * 1024, // 8MB
            max_open_files: 64,
        }
    }
}

/// Read-only RocksDB-backed key-value store.
pub struct RocksDbStore {
    db: DB,
    config: RocksDbConfig,
}

impl RocksDbStore {
    /// Open an existing database read-only.
    pub fn open(config: RocksDbConfig) -> Result<Self, KVStoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(false);
        opts.set_max_open_files(config.max_open_files);

        // Bloom filter for faster lookups
        let mut block_opts = BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let db = DB::open_for_read_only(&opts, &config.path, false).map_err(|e| {
            KVStoreError::CorruptionError {
                message: format!("Failed to open RocksDB at {}: {}", config.path, e),
            }
        })?;

        info!(path = %config.path, "opened chain database read-only");
        Ok(Self { db, config })
    }

    /// Open with default tuning.
    pub fn open_default(path: impl AsRef<Path>) -> Result<Self, KVStoreError> {
        let config = RocksDbConfig {
            path: path.as_ref().to_string_lossy().to_string(),
            ..Default::default()
        };
        Self::open(config)
    }

    pub fn config(&self) -> &RocksDbConfig {
        &self.config
    }
}

impl KeyValueStore for RocksDbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.db.get(key).map_err(|e| KVStoreError::IOError {
            message: format!("RocksDB get failed: {}", e),
        })
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        // key_may_exist is a bloom probe; confirm with a read
        if !self.db.key_may_exist(key) {
            return Ok(false);
        }
        Ok(self.get(key)?.is_some())
    }
}
