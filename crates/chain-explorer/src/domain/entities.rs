//! # Domain Entities
//!
//! Decoded chain records and the output units handed to presentation layers.
//!
//! Decoded records (`Header`, `Body`, `Transaction`, `Block`) are immutable
//! once built. Output units (`BlockSummary`, `TransactionRecord`,
//! `AddressStats`, ...) derive serde so callers can render them directly.

use super::{Address, BlockNumber, Hash, U256};
use serde::{Deserialize, Serialize};

// =============================================================================
// Decoded records
// =============================================================================

/// Block header as written by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub parent_hash: Hash,
    pub uncle_hash: Hash,
    /// Address credited for producing the block.
    pub coinbase: Address,
    pub state_root: Hash,
    pub transactions_root: Hash,
    pub receipts_root: Hash,
    /// 256-byte logs bloom.
    pub logs_bloom: Vec<u8>,
    pub difficulty: U256,
    pub number: BlockNumber,
    pub gas_limit: u64,
    pub gas_used: u64,
    /// Unix timestamp in seconds.
    pub timestamp: u64,
    pub extra_data: Vec<u8>,
    pub mix_digest: Hash,
    pub nonce: [u8; 8],
    /// Present from the London fork onwards.
    pub base_fee: Option<U256>,
}

/// Block body: transactions plus auxiliary data the explorer does not interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    pub transactions: Vec<Transaction>,
    /// Raw RLP list of uncle headers.
    pub uncles_rlp: Vec<u8>,
    pub uncle_count: usize,
    /// Number of withdrawals, when the body carries the list.
    pub withdrawal_count: Option<usize>,
}

/// Transaction envelope kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    /// Untyped RLP list.
    Legacy,
    /// EIP-2930, type 0x01.
    AccessList,
    /// EIP-1559, type 0x02.
    DynamicFee,
}

impl TxKind {
    /// Envelope type byte (0 for legacy).
    pub fn type_byte(&self) -> u8 {
        match self {
            TxKind::Legacy => 0x00,
            TxKind::AccessList => 0x01,
            TxKind::DynamicFee => 0x02,
        }
    }
}

/// Signature components as stored: `v` is the raw discriminant
/// (27/28, EIP-155 encoded, or y-parity for typed envelopes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxSignature {
    pub v: u64,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

/// A transaction decoded from a block body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Position within the block.
    pub index: usize,
    /// keccak256 of `raw`.
    pub hash: Hash,
    pub kind: TxKind,
    /// Envelope chain id (typed transactions only).
    pub chain_id: Option<u64>,
    pub nonce: u64,
    /// Gas price, or max fee per gas for dynamic-fee transactions.
    pub gas_price: U256,
    /// Max priority fee per gas (dynamic-fee transactions only).
    pub max_priority_fee: Option<U256>,
    pub gas_limit: u64,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub input: Vec<u8>,
    /// Raw RLP access list (typed transactions only, empty otherwise).
    pub access_list_rlp: Vec<u8>,
    pub signature: TxSignature,
    /// Canonical encoding the hash is computed over.
    pub raw: Vec<u8>,
}

impl Transaction {
    /// Whether this transaction deploys a contract.
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }
}

/// Header and body found under one canonical hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub hash: Hash,
    pub header: Header,
    pub body: Body,
}

impl Block {
    pub fn number(&self) -> BlockNumber {
        self.header.number
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.body.transactions
    }

    /// Chain-listing view of this block.
    pub fn summary(&self) -> BlockSummary {
        BlockSummary {
            number: self.header.number,
            timestamp: self.header.timestamp,
            hash: self.hash,
            transaction_count: self.body.transactions.len(),
            miner: self.header.coinbase,
        }
    }
}

// =============================================================================
// Output units
// =============================================================================

/// One row of the chain listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub number: BlockNumber,
    pub timestamp: u64,
    pub hash: Hash,
    pub transaction_count: usize,
    pub miner: Address,
}

/// Chain listing in ascending block order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSummary {
    /// Highest block of the listed range.
    pub tip: BlockNumber,
    pub blocks: Vec<BlockSummary>,
}

/// One row of a block's transaction listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub index: usize,
    pub hash: Hash,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
}

/// Transactions of a single block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTransactions {
    pub number: BlockNumber,
    pub hash: Hash,
    pub transactions: Vec<TransactionRecord>,
}

/// Per-address activity over a block range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressStats {
    pub address: Address,
    pub send_count: u64,
    pub receive_count: u64,
    pub total_received: U256,
}

impl AddressStats {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            send_count: 0,
            receive_count: 0,
            total_received: U256::zero(),
        }
    }
}

/// Timestamp and transaction count of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPoint {
    pub number: BlockNumber,
    pub timestamp: u64,
    pub transaction_count: usize,
}

/// Chart data: per-block activity (ascending) and per-address statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainActivity {
    pub tip: BlockNumber,
    pub points: Vec<ActivityPoint>,
    pub addresses: Vec<AddressStats>,
}
