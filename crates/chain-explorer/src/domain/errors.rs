//! # Domain Errors
//!
//! Error types for the explorer read path.
//!
//! ## Design Principles
//!
//! - Every failure is fatal for the enclosing request; nothing is retried
//! - Leaf errors (`DecodeError`, `AssemblyError`, `RecoveryError`) carry no
//!   block context; `ExplorerError` adds the block number and part
//! - No panics in domain logic (use Result instead)

use super::{BlockNumber, Hash};
use std::fmt;
use thiserror::Error;

/// Which stored record of a block a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPart {
    /// The canonical number -> hash entry.
    CanonicalHash,
    /// The RLP-encoded header.
    Header,
    /// The RLP-encoded body.
    Body,
}

impl fmt::Display for BlockPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockPart::CanonicalHash => write!(f, "canonical hash"),
            BlockPart::Header => write!(f, "header"),
            BlockPart::Body => write!(f, "body"),
        }
    }
}

/// Key-value store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KVStoreError {
    /// I/O error while reading the store.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    /// The store could not be opened or is damaged.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },
}

/// Malformed stored bytes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Nothing to decode.
    #[error("empty input")]
    Empty,

    /// RLP structure is invalid.
    #[error("RLP error in {context}: {source}")]
    Rlp {
        context: &'static str,
        source: rlp::DecoderError,
    },

    /// A list has the wrong number of items.
    #[error("{context} has {actual} items, expected {expected}")]
    ItemCount {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A fixed-width field has the wrong length.
    #[error("{field} is {actual} bytes, expected {expected}")]
    FieldLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An integer field is wider than its type.
    #[error("{field} is {actual} bytes, exceeds {limit} bytes")]
    IntegerOverflow {
        field: &'static str,
        limit: usize,
        actual: usize,
    },

    /// An integer field carries leading zero bytes.
    #[error("{field} is not a canonical integer (leading zero bytes)")]
    NonCanonicalInteger { field: &'static str },

    /// Typed transaction envelope with an unknown type byte.
    #[error("unsupported transaction type 0x{0:02x}")]
    UnsupportedTransactionType(u8),
}

/// Header and body do not belong together.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssemblyError {
    /// keccak256 of the body's uncle list differs from the header.
    #[error("uncle hash mismatch: header declares {declared:?}, body hashes to {computed:?}")]
    UncleHashMismatch { declared: Hash, computed: Hash },

    /// Empty-trie transaction root with transactions, or the reverse.
    #[error("transaction root {root:?} inconsistent with {transaction_count} body transactions")]
    TransactionRootMismatch { root: Hash, transaction_count: usize },

    /// Header found under a number it does not carry.
    #[error("header number {found} stored under block number {expected}")]
    NumberMismatch {
        expected: BlockNumber,
        found: BlockNumber,
    },
}

/// Sender could not be recovered from a signature.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecoveryError {
    /// `v` selects neither the homestead nor the network-bound scheme.
    #[error("invalid recovery discriminant v = {v}")]
    InvalidRecoveryId { v: u64 },

    /// Signature is bound to another network.
    #[error("chain id mismatch: expected {expected}, signature bound to {found}")]
    ChainIdMismatch { expected: u64, found: u64 },

    /// r or s is zero or not below the curve order.
    #[error("invalid signature scalars")]
    InvalidSignature,

    /// s lies in the upper half of the curve order.
    #[error("malleable signature (high S value)")]
    MalleableSignature,

    /// No public key could be recovered.
    #[error("failed to recover public key")]
    RecoveryFailed,
}

/// Error surfaced by every public explorer operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExplorerError {
    /// A record expected in a contiguous range is absent.
    #[error("missing {part} for block {number}")]
    MissingBlock { number: BlockNumber, part: BlockPart },

    /// Stored bytes could not be decoded.
    #[error("failed to decode {part} of block {number}: {source}")]
    Decode {
        number: BlockNumber,
        part: BlockPart,
        source: DecodeError,
    },

    /// Header and body of a block are inconsistent.
    #[error("block {number} is inconsistent: {source}")]
    Assembly {
        number: BlockNumber,
        source: AssemblyError,
    },

    /// Sender of a transaction could not be recovered.
    #[error("cannot recover sender of transaction {index} in block {number}: {source}")]
    Recovery {
        number: BlockNumber,
        index: usize,
        source: RecoveryError,
    },

    /// Walk bounds are reversed.
    #[error("invalid range: upper bound {from} is below lower bound {to}")]
    InvalidRange { from: BlockNumber, to: BlockNumber },

    /// No tip was configured and the store has no head marker.
    #[error("no tip block configured and no head block recorded in the store")]
    UnknownTip,

    /// Underlying store failure.
    #[error(transparent)]
    Store(#[from] KVStoreError),
}

impl ExplorerError {
    /// Block number the error refers to, if any.
    pub fn block_number(&self) -> Option<BlockNumber> {
        match self {
            ExplorerError::MissingBlock { number, .. }
            | ExplorerError::Decode { number, .. }
            | ExplorerError::Assembly { number, .. }
            | ExplorerError::Recovery { number, .. } => Some(*number),
            ExplorerError::InvalidRange { .. }
            | ExplorerError::UnknownTip
            | ExplorerError::Store(_) => None,
        }
    }
}
