//! # Key Codec
//!
//! Storage keys used by the external client's chain database.
//!
//! ```text
//! canonical hash:  "h" || be64(number) || "n"     -> block hash
//! header:          "h" || be64(number) || hash    -> RLP(header)
//! body:            "b" || be64(number) || hash    -> RLP(body)
//! header number:   "H" || hash                    -> be64(number)
//! head block:      "LastBlock"                    -> hash
//! ```
//!
//! Numbers are big-endian over a fixed 8-byte field so lexicographic key
//! order matches numeric order.

use super::{BlockNumber, Hash};

/// Prefix for header and canonical-hash keys.
pub const HEADER_PREFIX: &[u8] = b"h";

/// Suffix marking the canonical-hash key of a number.
pub const HEADER_HASH_SUFFIX: &[u8] = b"n";

/// Prefix for body keys.
pub const BODY_PREFIX: &[u8] = b"b";

/// Prefix for the hash -> number lookup.
pub const HEADER_NUMBER_PREFIX: &[u8] = b"H";

/// Key holding the hash of the current head block.
pub const HEAD_BLOCK_KEY: &[u8] = b"LastBlock";

/// Width of the encoded block number.
pub const BLOCK_NUMBER_LEN: usize = 8;

/// Encode a block number as 8 big-endian bytes.
pub fn encode_block_number(number: BlockNumber) -> [u8; BLOCK_NUMBER_LEN] {
    number.to_be_bytes()
}

/// Decode an 8-byte big-endian block number. Returns `None` on any other length.
pub fn decode_block_number(bytes: &[u8]) -> Option<BlockNumber> {
    let field: [u8; BLOCK_NUMBER_LEN] = bytes.try_into().ok()?;
    Some(BlockNumber::from_be_bytes(field))
}

/// Key of the canonical hash stored for `number`.
pub fn header_hash_key(number: BlockNumber) -> Vec<u8> {
    compose(HEADER_PREFIX, number, HEADER_HASH_SUFFIX)
}

/// Key of the encoded header for (`hash`, `number`).
pub fn header_key(hash: &Hash, number: BlockNumber) -> Vec<u8> {
    compose(HEADER_PREFIX, number, hash.as_bytes())
}

/// Key of the encoded body for (`hash`, `number`).
pub fn body_key(hash: &Hash, number: BlockNumber) -> Vec<u8> {
    compose(BODY_PREFIX, number, hash.as_bytes())
}

/// Key of the block number stored for a header hash.
pub fn header_number_key(hash: &Hash) -> Vec<u8> {
    let mut key = Vec::with_capacity(HEADER_NUMBER_PREFIX.len() + Hash::len_bytes());
    key.extend_from_slice(HEADER_NUMBER_PREFIX);
    key.extend_from_slice(hash.as_bytes());
    key
}

/// Key of the head block hash.
pub fn head_block_key() -> &'static [u8] {
    HEAD_BLOCK_KEY
}

fn compose(prefix: &[u8], number: BlockNumber, suffix: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + BLOCK_NUMBER_LEN + suffix.len());
    key.extend_from_slice(prefix);
    key.extend_from_slice(&encode_block_number(number));
    key.extend_from_slice(suffix);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_number_round_trip() {
        for number in [0, 1, 102, 8767, u32::MAX as u64 + 7, u64::MAX] {
            let encoded = encode_block_number(number);
            assert_eq!(decode_block_number(&encoded), Some(number));
        }
    }

    #[test]
    fn test_decode_block_number_rejects_wrong_width() {
        assert_eq!(decode_block_number(&[]), None);
        assert_eq!(decode_block_number(&[0u8; 7]), None);
        assert_eq!(decode_block_number(&[0u8; 9]), None);
    }

    #[test]
    fn test_header_hash_key_layout() {
        let key = header_hash_key(0x0102);
        assert_eq!(key, b"h\x00\x00\x00\x00\x00\x00\x01\x02n".to_vec());
    }

    #[test]
    fn test_content_keys_embed_hash() {
        let hash = Hash::repeat_byte(0xAB);
        let header = header_key(&hash, 7);
        let body = body_key(&hash, 7);

        assert_eq!(header.len(), 1 + 8 + 32);
        assert_eq!(&header[..1], b"h");
        assert_eq!(&body[..1], b"b");
        assert_eq!(&header[1..9], &7u64.to_be_bytes());
        assert_eq!(&header[9..], hash.as_bytes());
        assert_eq!(header[1..], body[1..]);
    }

    #[test]
    fn test_key_order_matches_numeric_order() {
        let numbers = [0u64, 1, 255, 256, 65_535, 65_536, 1 << 40];
        for pair in numbers.windows(2) {
            assert!(header_hash_key(pair[0]) < header_hash_key(pair[1]));
        }
    }

    #[test]
    fn test_distinct_tuples_do_not_collide() {
        let hash = Hash::repeat_byte(0x11);
        let keys = [
            header_hash_key(5),
            header_key(&hash, 5),
            body_key(&hash, 5),
            header_key(&hash, 6),
            header_number_key(&hash),
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let hash = Hash::repeat_byte(0x42);
        assert_eq!(body_key(&hash, 9), body_key(&hash, 9));
        assert_eq!(head_block_key(), b"LastBlock");
    }
}
