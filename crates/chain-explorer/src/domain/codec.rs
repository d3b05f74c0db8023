//! # Record Decoder
//!
//! RLP decoding of headers, bodies and transactions, and assembly of the two
//! halves of a block.
//!
//! ## Layouts
//!
//! ```text
//! header: [parent, uncles, coinbase, state, txs, receipts, bloom, difficulty,
//!          number, gas_limit, gas_used, time, extra, mix, nonce, (base_fee, ...)]
//! body:   [[tx, ...], [uncle, ...], ([withdrawal, ...])]
//! tx:     legacy list [nonce, gas_price, gas, to, value, data, v, r, s]
//!         or byte string 0x01 || rlp([chain_id, nonce, gas_price, gas, to, value, data, access_list, y, r, s])
//!         or byte string 0x02 || rlp([chain_id, nonce, tip, max_fee, gas, to, value, data, access_list, y, r, s])
//! ```

use super::entities::{Block, Body, Header, Transaction, TxKind, TxSignature};
use super::errors::{AssemblyError, DecodeError};
use super::recovery::keccak256;
use super::{Address, Hash, U256};
use rlp::{DecoderError, Rlp};

/// Minimum item count of a header list.
const HEADER_MIN_ITEMS: usize = 15;

/// Size of the logs bloom.
const BLOOM_LEN: usize = 256;

const LEGACY_TX_ITEMS: usize = 9;
const ACCESS_LIST_TX_ITEMS: usize = 11;
const DYNAMIC_FEE_TX_ITEMS: usize = 12;

/// First byte of an RLP list; anything below 0x80 opens a typed envelope.
const RLP_LIST_OFFSET: u8 = 0xc0;

/// Root of an empty transaction trie.
pub fn empty_trie_root() -> Hash {
    keccak256(&rlp::NULL_RLP)
}

/// Uncle hash of a block without uncles.
pub fn empty_uncle_hash() -> Hash {
    keccak256(&rlp::EMPTY_LIST_RLP)
}

// =============================================================================
// HEADER
// =============================================================================

/// Decode an RLP-encoded header.
pub fn decode_header(bytes: &[u8]) -> Result<Header, DecodeError> {
    let rlp = open_list(bytes, "header")?;
    let count = item_count(&rlp, "header")?;
    if count < HEADER_MIN_ITEMS {
        return Err(DecodeError::ItemCount {
            context: "header",
            expected: HEADER_MIN_ITEMS,
            actual: count,
        });
    }

    let base_fee = if count > HEADER_MIN_ITEMS {
        Some(decode_u256(&rlp, 15, "base fee")?)
    } else {
        None
    };

    Ok(Header {
        parent_hash: decode_hash(&rlp, 0, "parent hash")?,
        uncle_hash: decode_hash(&rlp, 1, "uncle hash")?,
        coinbase: decode_address(&rlp, 2, "coinbase")?,
        state_root: decode_hash(&rlp, 3, "state root")?,
        transactions_root: decode_hash(&rlp, 4, "transactions root")?,
        receipts_root: decode_hash(&rlp, 5, "receipts root")?,
        logs_bloom: decode_fixed(&rlp, 6, "logs bloom", BLOOM_LEN)?,
        difficulty: decode_u256(&rlp, 7, "difficulty")?,
        number: decode_u64(&rlp, 8, "number")?,
        gas_limit: decode_u64(&rlp, 9, "gas limit")?,
        gas_used: decode_u64(&rlp, 10, "gas used")?,
        timestamp: decode_u64(&rlp, 11, "timestamp")?,
        extra_data: decode_bytes(&rlp, 12, "extra data")?,
        mix_digest: decode_hash(&rlp, 13, "mix digest")?,
        nonce: decode_array::<8>(&rlp, 14, "nonce")?,
        base_fee,
    })
}

// =============================================================================
// BODY
// =============================================================================

/// Decode an RLP-encoded body, including every transaction it carries.
pub fn decode_body(bytes: &[u8]) -> Result<Body, DecodeError> {
    let rlp = open_list(bytes, "body")?;
    let count = item_count(&rlp, "body")?;
    if count < 2 {
        return Err(DecodeError::ItemCount {
            context: "body",
            expected: 2,
            actual: count,
        });
    }

    let txs = nested_list(&rlp, 0, "transactions")?;
    let tx_count = item_count(&txs, "transactions")?;
    let mut transactions = Vec::with_capacity(tx_count);
    for index in 0..tx_count {
        let item = txs.at(index).map_err(rlp_error("transaction"))?;
        // Legacy transactions are inlined lists, typed ones are byte strings
        let raw = if item.is_list() {
            item.as_raw()
        } else {
            item.data().map_err(rlp_error("transaction"))?
        };
        transactions.push(decode_transaction(index, raw)?);
    }

    let uncles = nested_list(&rlp, 1, "uncles")?;
    let uncle_count = item_count(&uncles, "uncles")?;

    let withdrawal_count = if count > 2 {
        let withdrawals = nested_list(&rlp, 2, "withdrawals")?;
        Some(item_count(&withdrawals, "withdrawals")?)
    } else {
        None
    };

    Ok(Body {
        transactions,
        uncles_rlp: uncles.as_raw().to_vec(),
        uncle_count,
        withdrawal_count,
    })
}

// =============================================================================
// TRANSACTION
// =============================================================================

/// Decode one transaction from its canonical encoding.
///
/// `raw` is either a legacy RLP list or `type || rlp(payload)`.
pub fn decode_transaction(index: usize, raw: &[u8]) -> Result<Transaction, DecodeError> {
    let (&first, payload) = raw.split_first().ok_or(DecodeError::Empty)?;

    let kind = if first >= RLP_LIST_OFFSET {
        TxKind::Legacy
    } else {
        match first {
            0x01 => TxKind::AccessList,
            0x02 => TxKind::DynamicFee,
            other => return Err(DecodeError::UnsupportedTransactionType(other)),
        }
    };

    let hash = keccak256(raw);
    let mut tx = match kind {
        TxKind::Legacy => parse_legacy(raw)?,
        TxKind::AccessList => parse_access_list(payload)?,
        TxKind::DynamicFee => parse_dynamic_fee(payload)?,
    };
    tx.index = index;
    tx.hash = hash;
    tx.raw = raw.to_vec();
    Ok(tx)
}

fn parse_legacy(data: &[u8]) -> Result<Transaction, DecodeError> {
    let rlp = open_list(data, "legacy transaction")?;
    expect_items(&rlp, "legacy transaction", LEGACY_TX_ITEMS)?;

    Ok(Transaction {
        index: 0,
        hash: Hash::zero(),
        kind: TxKind::Legacy,
        chain_id: None,
        nonce: decode_u64(&rlp, 0, "nonce")?,
        gas_price: decode_u256(&rlp, 1, "gas price")?,
        max_priority_fee: None,
        gas_limit: decode_u64(&rlp, 2, "gas limit")?,
        to: decode_optional_address(&rlp, 3, "to")?,
        value: decode_u256(&rlp, 4, "value")?,
        input: decode_bytes(&rlp, 5, "input")?,
        access_list_rlp: Vec::new(),
        signature: TxSignature {
            v: decode_u64(&rlp, 6, "v")?,
            r: decode_bytes32(&rlp, 7, "r")?,
            s: decode_bytes32(&rlp, 8, "s")?,
        },
        raw: Vec::new(),
    })
}

fn parse_access_list(data: &[u8]) -> Result<Transaction, DecodeError> {
    let rlp = open_list(data, "access-list transaction")?;
    expect_items(&rlp, "access-list transaction", ACCESS_LIST_TX_ITEMS)?;

    Ok(Transaction {
        index: 0,
        hash: Hash::zero(),
        kind: TxKind::AccessList,
        chain_id: Some(decode_u64(&rlp, 0, "chain id")?),
        nonce: decode_u64(&rlp, 1, "nonce")?,
        gas_price: decode_u256(&rlp, 2, "gas price")?,
        max_priority_fee: None,
        gas_limit: decode_u64(&rlp, 3, "gas limit")?,
        to: decode_optional_address(&rlp, 4, "to")?,
        value: decode_u256(&rlp, 5, "value")?,
        input: decode_bytes(&rlp, 6, "input")?,
        access_list_rlp: nested_list(&rlp, 7, "access list")?.as_raw().to_vec(),
        signature: TxSignature {
            v: decode_u64(&rlp, 8, "y parity")?,
            r: decode_bytes32(&rlp, 9, "r")?,
            s: decode_bytes32(&rlp, 10, "s")?,
        },
        raw: Vec::new(),
    })
}

fn parse_dynamic_fee(data: &[u8]) -> Result<Transaction, DecodeError> {
    let rlp = open_list(data, "dynamic-fee transaction")?;
    expect_items(&rlp, "dynamic-fee transaction", DYNAMIC_FEE_TX_ITEMS)?;

    Ok(Transaction {
        index: 0,
        hash: Hash::zero(),
        kind: TxKind::DynamicFee,
        chain_id: Some(decode_u64(&rlp, 0, "chain id")?),
        nonce: decode_u64(&rlp, 1, "nonce")?,
        max_priority_fee: Some(decode_u256(&rlp, 2, "max priority fee")?),
        gas_price: decode_u256(&rlp, 3, "max fee")?,
        gas_limit: decode_u64(&rlp, 4, "gas limit")?,
        to: decode_optional_address(&rlp, 5, "to")?,
        value: decode_u256(&rlp, 6, "value")?,
        input: decode_bytes(&rlp, 7, "input")?,
        access_list_rlp: nested_list(&rlp, 8, "access list")?.as_raw().to_vec(),
        signature: TxSignature {
            v: decode_u64(&rlp, 9, "y parity")?,
            r: decode_bytes32(&rlp, 10, "r")?,
            s: decode_bytes32(&rlp, 11, "s")?,
        },
        raw: Vec::new(),
    })
}

// =============================================================================
// ASSEMBLY
// =============================================================================

/// Combine a decoded header and body found under `hash`.
///
/// Checks the body's uncle list against the header's uncle hash, and that the
/// transaction root is the empty-trie root exactly when the body is empty.
/// The transaction trie itself is not recomputed.
pub fn assemble_block(hash: Hash, header: Header, body: Body) -> Result<Block, AssemblyError> {
    let computed = keccak256(&body.uncles_rlp);
    if computed != header.uncle_hash {
        return Err(AssemblyError::UncleHashMismatch {
            declared: header.uncle_hash,
            computed,
        });
    }

    let declares_empty = header.transactions_root == empty_trie_root();
    if declares_empty != body.transactions.is_empty() {
        return Err(AssemblyError::TransactionRootMismatch {
            root: header.transactions_root,
            transaction_count: body.transactions.len(),
        });
    }

    Ok(Block { hash, header, body })
}

// =============================================================================
// RLP HELPERS
// =============================================================================

fn rlp_error(context: &'static str) -> impl FnOnce(DecoderError) -> DecodeError {
    move |source| DecodeError::Rlp { context, source }
}

fn open_list<'a>(bytes: &'a [u8], context: &'static str) -> Result<Rlp<'a>, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    let rlp = Rlp::new(bytes);
    if !rlp.is_list() {
        return Err(DecodeError::Rlp {
            context,
            source: DecoderError::RlpExpectedToBeList,
        });
    }
    Ok(rlp)
}

fn nested_list<'a>(
    rlp: &Rlp<'a>,
    index: usize,
    context: &'static str,
) -> Result<Rlp<'a>, DecodeError> {
    let item = rlp.at(index).map_err(rlp_error(context))?;
    if !item.is_list() {
        return Err(DecodeError::Rlp {
            context,
            source: DecoderError::RlpExpectedToBeList,
        });
    }
    Ok(item)
}

fn item_count(rlp: &Rlp, context: &'static str) -> Result<usize, DecodeError> {
    rlp.item_count().map_err(rlp_error(context))
}

fn expect_items(rlp: &Rlp, context: &'static str, expected: usize) -> Result<(), DecodeError> {
    let actual = item_count(rlp, context)?;
    if actual != expected {
        return Err(DecodeError::ItemCount {
            context,
            expected,
            actual,
        });
    }
    Ok(())
}

fn decode_bytes(rlp: &Rlp, index: usize, field: &'static str) -> Result<Vec<u8>, DecodeError> {
    rlp.at(index)
        .and_then(|item| item.data().map(<[u8]>::to_vec))
        .map_err(rlp_error(field))
}

fn decode_fixed(
    rlp: &Rlp,
    index: usize,
    field: &'static str,
    expected: usize,
) -> Result<Vec<u8>, DecodeError> {
    let bytes = decode_bytes(rlp, index, field)?;
    if bytes.len() != expected {
        return Err(DecodeError::FieldLength {
            field,
            expected,
            actual: bytes.len(),
        });
    }
    Ok(bytes)
}

fn decode_array<const N: usize>(
    rlp: &Rlp,
    index: usize,
    field: &'static str,
) -> Result<[u8; N], DecodeError> {
    let bytes = decode_fixed(rlp, index, field, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

fn decode_hash(rlp: &Rlp, index: usize, field: &'static str) -> Result<Hash, DecodeError> {
    decode_array::<32>(rlp, index, field).map(Hash::from)
}

fn decode_address(rlp: &Rlp, index: usize, field: &'static str) -> Result<Address, DecodeError> {
    decode_array::<20>(rlp, index, field).map(Address::from)
}

fn decode_optional_address(
    rlp: &Rlp,
    index: usize,
    field: &'static str,
) -> Result<Option<Address>, DecodeError> {
    let bytes = decode_bytes(rlp, index, field)?;
    match bytes.len() {
        0 => Ok(None),
        20 => Ok(Some(Address::from_slice(&bytes))),
        actual => Err(DecodeError::FieldLength {
            field,
            expected: 20,
            actual,
        }),
    }
}

fn decode_u64(rlp: &Rlp, index: usize, field: &'static str) -> Result<u64, DecodeError> {
    let bytes = decode_scalar(rlp, index, field, 8)?;
    Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

fn decode_u256(rlp: &Rlp, index: usize, field: &'static str) -> Result<U256, DecodeError> {
    let bytes = decode_scalar(rlp, index, field, 32)?;
    Ok(U256::from_big_endian(&bytes))
}

/// Left-pad a scalar of at most 32 bytes.
fn decode_bytes32(rlp: &Rlp, index: usize, field: &'static str) -> Result<[u8; 32], DecodeError> {
    let bytes = decode_scalar(rlp, index, field, 32)?;
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}

/// Big-endian integer bytes: at most `limit` wide, minimal encoding.
fn decode_scalar(
    rlp: &Rlp,
    index: usize,
    field: &'static str,
    limit: usize,
) -> Result<Vec<u8>, DecodeError> {
    let bytes = decode_bytes(rlp, index, field)?;
    if bytes.len() > limit {
        return Err(DecodeError::IntegerOverflow {
            field,
            limit,
            actual: bytes.len(),
        });
    }
    if bytes.first() == Some(&0) {
        return Err(DecodeError::NonCanonicalInteger { field });
    }
    Ok(bytes)
}
