//! # Domain Layer
//!
//! Pure logic for the explorer. Nothing in here performs I/O; bytes come in,
//! typed records come out.
//!
//! ## Modules
//!
//! - `keys` - Storage key derivation (big-endian block numbers)
//! - `codec` - RLP header/body/transaction decoding and block assembly
//! - `recovery` - secp256k1 sender recovery (homestead, EIP-155, typed)
//! - `entities` - Blocks, transactions and the output records
//! - `stats` - Single-pass per-address aggregation
//! - `value_objects` - Explorer configuration
//! - `errors` - Domain error types

pub mod codec;
pub mod entities;
pub mod errors;
pub mod keys;
pub mod recovery;
pub mod stats;
pub mod value_objects;

pub use primitive_types::U256;

/// Block height, also used as the scan cursor.
pub type BlockNumber = u64;

/// 32-byte block or transaction hash.
pub type Hash = primitive_types::H256;

/// 20-byte account address.
pub type Address = primitive_types::H160;
