//! # Sender Recovery (secp256k1)
//!
//! Recovers the address that signed a transaction.
//!
//! ## Schemes
//!
//! | Envelope | `v`                         | Signed payload                              |
//! |----------|-----------------------------|---------------------------------------------|
//! | legacy   | 27 / 28                     | rlp[nonce, price, gas, to, value, data]     |
//! | legacy   | 2 * network_id + 35 / + 36  | rlp[..., chain_id, 0, 0]                    |
//! | 0x01     | y-parity 0 / 1              | 0x01 \|\| rlp[chain_id, ..., access_list]     |
//! | 0x02     | y-parity 0 / 1              | 0x02 \|\| rlp[chain_id, ..., access_list]     |
//!
//! High-s signatures are rejected for every scheme (EIP-2).

use super::entities::{Transaction, TxKind};
use super::errors::RecoveryError;
use super::{Address, Hash};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use rlp::RlpStream;
use sha3::{Digest, Keccak256};

/// Offset of EIP-155 recovery discriminants.
const EIP155_V_OFFSET: u64 = 35;

/// First homestead recovery discriminant.
const HOMESTEAD_V_OFFSET: u64 = 27;

/// How a transaction's signature binds (or not) to a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    /// Legacy, replayable across networks.
    Homestead,
    /// Legacy, bound to `chain_id` through `v`.
    Eip155 { chain_id: u64 },
    /// Typed envelope carrying its own chain id.
    Typed { chain_id: u64 },
}

impl SignatureScheme {
    /// Pick the scheme for `tx` and extract its recovery id.
    pub fn resolve(tx: &Transaction, network_id: u64) -> Result<(Self, u8), RecoveryError> {
        let v = tx.signature.v;

        if tx.kind != TxKind::Legacy {
            let chain_id = tx.chain_id.unwrap_or_default();
            if chain_id != network_id {
                return Err(RecoveryError::ChainIdMismatch {
                    expected: network_id,
                    found: chain_id,
                });
            }
            return match v {
                0 | 1 => Ok((SignatureScheme::Typed { chain_id }, v as u8)),
                _ => Err(RecoveryError::InvalidRecoveryId { v }),
            };
        }

        if v == HOMESTEAD_V_OFFSET || v == HOMESTEAD_V_OFFSET + 1 {
            return Ok((SignatureScheme::Homestead, (v - HOMESTEAD_V_OFFSET) as u8));
        }

        let parity = network_id
            .checked_mul(2)
            .and_then(|doubled| doubled.checked_add(EIP155_V_OFFSET))
            .and_then(|base| v.checked_sub(base))
            .filter(|parity| *parity <= 1);
        if let Some(parity) = parity {
            return Ok((
                SignatureScheme::Eip155 {
                    chain_id: network_id,
                },
                parity as u8,
            ));
        }

        if v >= EIP155_V_OFFSET {
            Err(RecoveryError::ChainIdMismatch {
                expected: network_id,
                found: (v - EIP155_V_OFFSET) / 2,
            })
        } else {
            Err(RecoveryError::InvalidRecoveryId { v })
        }
    }
}

/// Recover the address that signed `tx` on network `network_id`.
pub fn recover_sender(tx: &Transaction, network_id: u64) -> Result<Address, RecoveryError> {
    let (scheme, recovery_id) = SignatureScheme::resolve(tx, network_id)?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&tx.signature.r);
    sig_bytes[32..].copy_from_slice(&tx.signature.s);
    let signature =
        Signature::from_slice(&sig_bytes).map_err(|_| RecoveryError::InvalidSignature)?;

    // normalize_s only yields a value when s is in the upper half
    if signature.normalize_s().is_some() {
        return Err(RecoveryError::MalleableSignature);
    }

    let recovery_id = RecoveryId::from_byte(recovery_id).ok_or(RecoveryError::InvalidRecoveryId {
        v: tx.signature.v,
    })?;
    let message_hash = signing_hash(tx, scheme);

    let key = VerifyingKey::recover_from_prehash(message_hash.as_bytes(), &signature, recovery_id)
        .map_err(|_| RecoveryError::RecoveryFailed)?;
    Ok(address_from_pubkey(&key))
}

/// Hash of the payload the sender signed.
pub fn signing_hash(tx: &Transaction, scheme: SignatureScheme) -> Hash {
    match tx.kind {
        TxKind::Legacy => {
            let chain_id = match scheme {
                SignatureScheme::Eip155 { chain_id } => Some(chain_id),
                _ => None,
            };
            let mut stream = RlpStream::new_list(if chain_id.is_some() { 9 } else { 6 });
            stream.append(&tx.nonce);
            stream.append(&tx.gas_price);
            stream.append(&tx.gas_limit);
            append_to(&mut stream, tx.to.as_ref());
            stream.append(&tx.value);
            stream.append(&tx.input);
            if let Some(chain_id) = chain_id {
                stream.append(&chain_id);
                stream.append(&0u8);
                stream.append(&0u8);
            }
            keccak256(&stream.out())
        }
        TxKind::AccessList => {
            let mut stream = RlpStream::new_list(8);
            stream.append(&tx.chain_id.unwrap_or_default());
            stream.append(&tx.nonce);
            stream.append(&tx.gas_price);
            stream.append(&tx.gas_limit);
            append_to(&mut stream, tx.to.as_ref());
            stream.append(&tx.value);
            stream.append(&tx.input);
            append_access_list(&mut stream, &tx.access_list_rlp);
            typed_hash(TxKind::AccessList, &stream.out())
        }
        TxKind::DynamicFee => {
            let mut stream = RlpStream::new_list(9);
            stream.append(&tx.chain_id.unwrap_or_default());
            stream.append(&tx.nonce);
            stream.append(&tx.max_priority_fee.unwrap_or_default());
            stream.append(&tx.gas_price);
            stream.append(&tx.gas_limit);
            append_to(&mut stream, tx.to.as_ref());
            stream.append(&tx.value);
            stream.append(&tx.input);
            append_access_list(&mut stream, &tx.access_list_rlp);
            typed_hash(TxKind::DynamicFee, &stream.out())
        }
    }
}

fn append_to(stream: &mut RlpStream, to: Option<&Address>) {
    match to {
        Some(address) => {
            stream.append(address);
        }
        None => {
            stream.append_empty_data();
        }
    }
}

fn append_access_list(stream: &mut RlpStream, access_list_rlp: &[u8]) {
    if access_list_rlp.is_empty() {
        stream.begin_list(0);
    } else {
        stream.append_raw(access_list_rlp, 1);
    }
}

fn typed_hash(kind: TxKind, payload: &[u8]) -> Hash {
    let mut preimage = Vec::with_capacity(1 + payload.len());
    preimage.push(kind.type_byte());
    preimage.extend_from_slice(payload);
    keccak256(&preimage)
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> Hash {
    Hash::from_slice(&Keccak256::digest(data))
}

/// Derive the account address of a public key.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    // Skip the 0x04 tag of the uncompressed encoding
    let hash = keccak256(&encoded.as_bytes()[1..]);
    Address::from_slice(&hash.as_bytes()[12..])
}

/// Mixed-case checksum rendering of an address (EIP-55).
pub fn checksum_address(address: &Address) -> String {
    let lower = hex::encode(address.as_bytes());
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(2 + lower.len());
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = hash.as_bytes()[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Abbreviate long hex strings as `first8...last8`.
///
/// Strings shorter than 19 characters are returned unchanged.
pub fn short_hex(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < 19 {
        return text.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 8..].iter().collect();
    format!("{head}...{tail}")
}
