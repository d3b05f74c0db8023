//! Test fixtures: deterministic accounts, signed transactions and a chain
//! builder that writes blocks the way the client lays them out on disk.

use crate::adapters::storage::InMemoryKVStore;
use crate::domain::codec::{empty_trie_root, empty_uncle_hash};
use crate::domain::entities::{Header, Transaction, TxKind, TxSignature};
use crate::domain::errors::KVStoreError;
use crate::domain::keys::{
    body_key, encode_block_number, head_block_key, header_hash_key, header_key,
    header_number_key,
};
use crate::domain::recovery::{address_from_pubkey, keccak256, signing_hash, SignatureScheme};
use crate::domain::value_objects::{ExplorerConfig, DEFAULT_NETWORK_ID};
use crate::domain::{Address, BlockNumber, Hash, U256};
use crate::ports::outbound::KeyValueStore;
use crate::service::ChainExplorerService;
use k256::ecdsa::{RecoveryId, SigningKey};
use rlp::RlpStream;
use std::sync::Mutex;

/// Network id used by fixtures.
pub const TEST_NETWORK_ID: u64 = DEFAULT_NETWORK_ID;

/// Gas price of fixture transactions (1 gwei).
pub const TEST_GAS_PRICE: u64 = 1_000_000_000;

/// Gas limit of fixture transactions.
pub const TEST_GAS_LIMIT: u64 = 21_000;

// =============================================================================
// ACCOUNTS & TRANSACTIONS
// =============================================================================

/// A signing account.
pub struct TestAccount {
    key: SigningKey,
}

impl TestAccount {
    /// Deterministic account derived from `seed` (must be non-zero).
    pub fn new(seed: u8) -> Self {
        let key = SigningKey::from_slice(&[seed; 32]).expect("non-zero seed is a valid key");
        Self { key }
    }

    pub fn from_key(key: SigningKey) -> Self {
        Self { key }
    }

    pub fn address(&self) -> Address {
        address_from_pubkey(self.key.verifying_key())
    }

    /// Signed legacy transaction; EIP-155 bound when `chain_id` is given.
    pub fn sign_legacy(
        &self,
        nonce: u64,
        to: Option<Address>,
        value: U256,
        chain_id: Option<u64>,
    ) -> Vec<u8> {
        let tx = unsigned(TxKind::Legacy, None, nonce, to, value);
        let scheme = match chain_id {
            Some(chain_id) => SignatureScheme::Eip155 { chain_id },
            None => SignatureScheme::Homestead,
        };
        let (recovery_id, r, s) = self.sign(&tx, scheme);
        let v = match chain_id {
            Some(chain_id) => chain_id * 2 + 35 + u64::from(recovery_id),
            None => 27 + u64::from(recovery_id),
        };
        legacy_with_signature(nonce, to, value, v, r, s)
    }

    /// Signed EIP-2930 transaction with an empty access list.
    pub fn sign_access_list(
        &self,
        nonce: u64,
        to: Option<Address>,
        value: U256,
        chain_id: u64,
    ) -> Vec<u8> {
        let tx = unsigned(TxKind::AccessList, Some(chain_id), nonce, to, value);
        let (recovery_id, r, s) = self.sign(&tx, SignatureScheme::Typed { chain_id });

        let mut stream = RlpStream::new_list(11);
        stream.append(&chain_id);
        stream.append(&nonce);
        stream.append(&U256::from(TEST_GAS_PRICE));
        stream.append(&TEST_GAS_LIMIT);
        append_to(&mut stream, to);
        stream.append(&value);
        stream.append(&Vec::<u8>::new());
        stream.begin_list(0);
        append_signature(&mut stream, u64::from(recovery_id), &r, &s);
        envelope(TxKind::AccessList, &stream.out())
    }

    /// Signed EIP-1559 transaction with an empty access list.
    pub fn sign_dynamic_fee(
        &self,
        nonce: u64,
        to: Option<Address>,
        value: U256,
        chain_id: u64,
    ) -> Vec<u8> {
        let tx = unsigned(TxKind::DynamicFee, Some(chain_id), nonce, to, value);
        let (recovery_id, r, s) = self.sign(&tx, SignatureScheme::Typed { chain_id });

        let mut stream = RlpStream::new_list(12);
        stream.append(&chain_id);
        stream.append(&nonce);
        stream.append(&U256::one());
        stream.append(&U256::from(TEST_GAS_PRICE));
        stream.append(&TEST_GAS_LIMIT);
        append_to(&mut stream, to);
        stream.append(&value);
        stream.append(&Vec::<u8>::new());
        stream.begin_list(0);
        append_signature(&mut stream, u64::from(recovery_id), &r, &s);
        envelope(TxKind::DynamicFee, &stream.out())
    }

    fn sign(&self, tx: &Transaction, scheme: SignatureScheme) -> (u8, [u8; 32], [u8; 32]) {
        let hash = signing_hash(tx, scheme);
        let (mut signature, mut recovery_id) = self
            .key
            .sign_prehash_recoverable(hash.as_bytes())
            .expect("signing failed");

        if let Some(normalized) = signature.normalize_s() {
            signature = normalized;
            recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
        }

        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        (recovery_id.to_byte(), r, s)
    }
}

/// EIP-155 value transfer on `TEST_NETWORK_ID`.
pub fn transfer(from: &TestAccount, nonce: u64, to: Address, value: impl Into<U256>) -> Vec<u8> {
    from.sign_legacy(nonce, Some(to), value.into(), Some(TEST_NETWORK_ID))
}

/// EIP-155 contract creation on `TEST_NETWORK_ID`.
pub fn contract_creation(from: &TestAccount, nonce: u64, value: impl Into<U256>) -> Vec<u8> {
    from.sign_legacy(nonce, None, value.into(), Some(TEST_NETWORK_ID))
}

/// Legacy transaction with an arbitrary signature.
pub fn legacy_with_signature(
    nonce: u64,
    to: Option<Address>,
    value: U256,
    v: u64,
    r: [u8; 32],
    s: [u8; 32],
) -> Vec<u8> {
    let mut stream = RlpStream::new_list(9);
    stream.append(&nonce);
    stream.append(&U256::from(TEST_GAS_PRICE));
    stream.append(&TEST_GAS_LIMIT);
    append_to(&mut stream, to);
    stream.append(&value);
    stream.append(&Vec::<u8>::new());
    append_signature(&mut stream, v, &r, &s);
    stream.out().to_vec()
}

fn unsigned(
    kind: TxKind,
    chain_id: Option<u64>,
    nonce: u64,
    to: Option<Address>,
    value: U256,
) -> Transaction {
    Transaction {
        index: 0,
        hash: Hash::zero(),
        kind,
        chain_id,
        nonce,
        gas_price: U256::from(TEST_GAS_PRICE),
        max_priority_fee: (kind == TxKind::DynamicFee).then(U256::one),
        gas_limit: TEST_GAS_LIMIT,
        to,
        value,
        input: Vec::new(),
        access_list_rlp: Vec::new(),
        signature: TxSignature {
            v: 0,
            r: [0u8; 32],
            s: [0u8; 32],
        },
        raw: Vec::new(),
    }
}

fn append_to(stream: &mut RlpStream, to: Option<Address>) {
    match to {
        Some(address) => {
            stream.append(&address);
        }
        None => {
            stream.append_empty_data();
        }
    }
}

fn append_signature(stream: &mut RlpStream, v: u64, r: &[u8; 32], s: &[u8; 32]) {
    stream.append(&v);
    stream.append(&U256::from_big_endian(r));
    stream.append(&U256::from_big_endian(s));
}

fn envelope(kind: TxKind, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + payload.len());
    out.push(kind.type_byte());
    out.extend_from_slice(payload);
    out
}

// =============================================================================
// HEADERS & BODIES
// =============================================================================

/// Header of an empty block at `number`.
pub fn header_template(number: BlockNumber) -> Header {
    Header {
        parent_hash: Hash::zero(),
        uncle_hash: empty_uncle_hash(),
        coinbase: Address::repeat_byte(0x11),
        state_root: Hash::repeat_byte(0x22),
        transactions_root: empty_trie_root(),
        receipts_root: empty_trie_root(),
        logs_bloom: vec![0u8; 256],
        difficulty: U256::from(131_072u64),
        number,
        gas_limit: 8_000_000,
        gas_used: 0,
        timestamp: 1_600_000_000 + number * 15,
        extra_data: Vec::new(),
        mix_digest: Hash::zero(),
        nonce: [0u8; 8],
        base_fee: None,
    }
}

/// RLP encoding of `header`.
pub fn encode_header(header: &Header) -> Vec<u8> {
    let mut stream = RlpStream::new_list(if header.base_fee.is_some() { 16 } else { 15 });
    stream.append(&header.parent_hash);
    stream.append(&header.uncle_hash);
    stream.append(&header.coinbase);
    stream.append(&header.state_root);
    stream.append(&header.transactions_root);
    stream.append(&header.receipts_root);
    stream.append(&header.logs_bloom);
    stream.append(&header.difficulty);
    stream.append(&header.number);
    stream.append(&header.gas_limit);
    stream.append(&header.gas_used);
    stream.append(&header.timestamp);
    stream.append(&header.extra_data);
    stream.append(&header.mix_digest);
    stream.append(&header.nonce.to_vec());
    if let Some(base_fee) = &header.base_fee {
        stream.append(base_fee);
    }
    stream.out().to_vec()
}

/// RLP encoding of a body holding canonical transaction encodings and
/// encoded uncle headers.
pub fn encode_body(transactions: &[Vec<u8>], uncles: &[Vec<u8>]) -> Vec<u8> {
    let mut stream = RlpStream::new_list(2);
    stream.begin_list(transactions.len());
    for tx in transactions {
        if tx.first().is_some_and(|&b| b >= 0xc0) {
            stream.append_raw(tx, 1);
        } else {
            stream.append(tx);
        }
    }
    stream.begin_list(uncles.len());
    for uncle in uncles {
        stream.append_raw(uncle, 1);
    }
    stream.out().to_vec()
}

/// Non-empty transaction root for a body. The trie root is not checked, only
/// whether it is the empty one.
pub fn transactions_root(transactions: &[Vec<u8>]) -> Hash {
    if transactions.is_empty() {
        empty_trie_root()
    } else {
        keccak256(&transactions.concat())
    }
}

// =============================================================================
// CHAIN FIXTURE
// =============================================================================

/// Builds a canonical chain in an `InMemoryKVStore`.
///
/// `new()` writes an empty genesis block; every pushed block links to the
/// previous one and becomes the head.
pub struct ChainFixture {
    store: InMemoryKVStore,
    parent: Hash,
    next_number: BlockNumber,
}

impl Default for ChainFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainFixture {
    pub fn new() -> Self {
        let mut fixture = Self {
            store: InMemoryKVStore::new(),
            parent: Hash::zero(),
            next_number: 0,
        };
        fixture.push_block(Vec::new());
        fixture
    }

    /// Append a block carrying `transactions` (canonical encodings).
    pub fn push_block(&mut self, transactions: Vec<Vec<u8>>) -> Hash {
        let mut header = header_template(self.next_number);
        header.parent_hash = self.parent;
        header.transactions_root = transactions_root(&transactions);
        self.push_encoded(&header, encode_body(&transactions, &[]))
    }

    /// Append a block from a prepared header and raw body bytes.
    pub fn push_encoded(&mut self, header: &Header, body: Vec<u8>) -> Hash {
        let number = header.number;
        let encoded = encode_header(header);
        let hash = keccak256(&encoded);

        self.store
            .insert(header_hash_key(number), hash.as_bytes().to_vec());
        self.store.insert(header_key(&hash, number), encoded);
        self.store.insert(body_key(&hash, number), body);
        self.store
            .insert(header_number_key(&hash), encode_block_number(number).to_vec());
        self.store.insert(head_block_key(), hash.as_bytes().to_vec());

        self.parent = hash;
        self.next_number = number + 1;
        hash
    }

    /// Highest block written so far.
    pub fn tip(&self) -> BlockNumber {
        self.next_number.saturating_sub(1)
    }

    /// Canonical hash stored for `number`.
    pub fn hash_of(&self, number: BlockNumber) -> Option<Hash> {
        self.store
            .get(&header_hash_key(number))
            .ok()
            .flatten()
            .map(|bytes| Hash::from_slice(&bytes))
    }

    pub fn store(&self) -> &InMemoryKVStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut InMemoryKVStore {
        &mut self.store
    }

    pub fn into_store(self) -> InMemoryKVStore {
        self.store
    }

    /// Service over the fixture with the default configuration.
    pub fn into_service(self) -> ChainExplorerService<InMemoryKVStore> {
        ChainExplorerService::new(self.store, ExplorerConfig::default())
    }
}

// =============================================================================
// RECORDING STORE
// =============================================================================

/// Store wrapper that records every key read.
pub struct RecordingStore<KV> {
    inner: KV,
    reads: Mutex<Vec<Vec<u8>>>,
}

impl<KV: KeyValueStore> RecordingStore<KV> {
    pub fn new(inner: KV) -> Self {
        Self {
            inner,
            reads: Mutex::new(Vec::new()),
        }
    }

    /// Keys read so far, in order.
    pub fn reads(&self) -> Vec<Vec<u8>> {
        self.reads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl<KV: KeyValueStore> KeyValueStore for RecordingStore<KV> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.reads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(key.to_vec());
        self.inner.get(key)
    }
}
