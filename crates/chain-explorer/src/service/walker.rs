//! # Chain Walker
//!
//! Lazy, descending iteration over canonical blocks.

use crate::domain::codec::{assemble_block, decode_body, decode_header};
use crate::domain::entities::Block;
use crate::domain::errors::{AssemblyError, BlockPart, DecodeError, ExplorerError};
use crate::domain::keys::{body_key, header_hash_key, header_key};
use crate::domain::{BlockNumber, Hash};
use crate::ports::outbound::KeyValueStore;
use std::iter::FusedIterator;
use tracing::trace;

/// Blocks from `from` down to `floor`, newest first.
///
/// Each block is read only when the iterator is advanced. The walk ends after
/// the floor block or after the first error.
pub struct ChainWalk<'a, KV: KeyValueStore> {
    store: &'a KV,
    next: Option<BlockNumber>,
    floor: BlockNumber,
}

impl<'a, KV: KeyValueStore> ChainWalk<'a, KV> {
    pub(crate) fn new(store: &'a KV, from: BlockNumber, floor: BlockNumber) -> Self {
        Self {
            store,
            next: Some(from),
            floor,
        }
    }
}

impl<KV: KeyValueStore> Iterator for ChainWalk<'_, KV> {
    type Item = Result<Block, ExplorerError>;

    fn next(&mut self) -> Option<Self::Item> {
        let number = self.next?;
        let result = read_block(self.store, number);
        self.next = match result {
            Ok(_) if number > self.floor => Some(number - 1),
            _ => None,
        };
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            Some(number) => (0, usize::try_from(number - self.floor).ok().map(|n| n + 1)),
            None => (0, Some(0)),
        }
    }
}

impl<KV: KeyValueStore> FusedIterator for ChainWalk<'_, KV> {}

/// Resolve, fetch, decode and assemble canonical block `number`.
pub(crate) fn read_block<KV: KeyValueStore>(
    store: &KV,
    number: BlockNumber,
) -> Result<Block, ExplorerError> {
    let missing = |part| ExplorerError::MissingBlock { number, part };

    let hash_bytes = store
        .get(&header_hash_key(number))?
        .ok_or_else(|| missing(BlockPart::CanonicalHash))?;
    if hash_bytes.len() != Hash::len_bytes() {
        return Err(ExplorerError::Decode {
            number,
            part: BlockPart::CanonicalHash,
            source: DecodeError::FieldLength {
                field: "canonical hash",
                expected: Hash::len_bytes(),
                actual: hash_bytes.len(),
            },
        });
    }
    let hash = Hash::from_slice(&hash_bytes);
    if hash.is_zero() {
        return Err(missing(BlockPart::CanonicalHash));
    }

    let header_bytes = store
        .get(&header_key(&hash, number))?
        .ok_or_else(|| missing(BlockPart::Header))?;
    let header = decode_header(&header_bytes).map_err(|source| ExplorerError::Decode {
        number,
        part: BlockPart::Header,
        source,
    })?;
    if header.number != number {
        return Err(ExplorerError::Assembly {
            number,
            source: AssemblyError::NumberMismatch {
                expected: number,
                found: header.number,
            },
        });
    }

    let body_bytes = store
        .get(&body_key(&hash, number))?
        .ok_or_else(|| missing(BlockPart::Body))?;
    let body = decode_body(&body_bytes).map_err(|source| ExplorerError::Decode {
        number,
        part: BlockPart::Body,
        source,
    })?;

    let block = assemble_block(hash, header, body)
        .map_err(|source| ExplorerError::Assembly { number, source })?;
    trace!(
        number,
        hash = ?block.hash,
        transactions = block.transactions().len(),
        "read block"
    );
    Ok(block)
}
