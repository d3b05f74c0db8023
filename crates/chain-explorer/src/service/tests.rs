//! # Chain Explorer Service Tests

use super::*;
use crate::adapters::storage::InMemoryKVStore;
use crate::domain::errors::{AssemblyError, BlockPart, DecodeError, KVStoreError};
use crate::domain::keys::{body_key, head_block_key, header_hash_key, header_key};
use crate::domain::recovery::keccak256;
use crate::domain::entities::BlockSummary;
use crate::domain::{Address, U256};
use crate::ports::inbound::ChainExplorerApi;
use crate::test_utils::{
    contract_creation, encode_body, encode_header, header_template, transfer, ChainFixture,
    RecordingStore, TestAccount,
};

/// Genesis plus `count` blocks; block `n` carries `n % 3` transfers.
fn make_chain(count: u64) -> (ChainFixture, TestAccount, TestAccount) {
    let alice = TestAccount::new(1);
    let bob = TestAccount::new(2);
    let mut fixture = ChainFixture::new();
    let mut nonce = 0;
    for number in 1..=count {
        let txs = (0..number % 3)
            .map(|_| {
                nonce += 1;
                transfer(&alice, nonce, bob.address(), number)
            })
            .collect();
        fixture.push_block(txs);
    }
    (fixture, alice, bob)
}

fn service_over(fixture: ChainFixture) -> ChainExplorerService<InMemoryKVStore> {
    fixture.into_service()
}

// =============================================================================
// WALKER
// =============================================================================

#[test]
fn test_walk_is_descending_and_inclusive() {
    let (fixture, _, _) = make_chain(6);
    let service = service_over(fixture);

    let numbers: Vec<u64> = service
        .walk(5, 2)
        .unwrap()
        .map(|block| block.unwrap().number())
        .collect();
    assert_eq!(numbers, vec![5, 4, 3, 2]);
}

#[test]
fn test_walk_single_block_and_genesis() {
    let (fixture, _, _) = make_chain(2);
    let service = service_over(fixture);

    assert_eq!(service.walk(1, 1).unwrap().count(), 1);
    let genesis: Vec<_> = service.walk(0, 0).unwrap().collect();
    assert_eq!(genesis.len(), 1);
    assert_eq!(genesis[0].as_ref().unwrap().number(), 0);
}

#[test]
fn test_walk_rejects_reversed_range() {
    let (fixture, _, _) = make_chain(3);
    let service = service_over(fixture);

    assert!(matches!(
        service.walk(1, 2),
        Err(ExplorerError::InvalidRange { from: 1, to: 2 })
    ));
}

#[test]
fn test_walk_stops_after_first_error() {
    let (mut fixture, _, _) = make_chain(5);
    fixture.store_mut().remove(&header_hash_key(3));
    let service = service_over(fixture);

    let mut walk = service.walk(5, 1).unwrap();
    assert_eq!(walk.next().unwrap().unwrap().number(), 5);
    assert_eq!(walk.next().unwrap().unwrap().number(), 4);
    assert_eq!(
        walk.next().unwrap().unwrap_err(),
        ExplorerError::MissingBlock {
            number: 3,
            part: BlockPart::CanonicalHash
        }
    );
    assert!(walk.next().is_none());
    assert!(walk.next().is_none());
}

#[test]
fn test_walk_size_hint_bounds_remaining_blocks() {
    let (fixture, _, _) = make_chain(4);
    let service = service_over(fixture);

    let mut walk = service.walk(4, 1).unwrap();
    assert_eq!(walk.size_hint(), (0, Some(4)));
    walk.next();
    assert_eq!(walk.size_hint(), (0, Some(3)));
    walk.by_ref().for_each(drop);
    assert_eq!(walk.size_hint(), (0, Some(0)));
}

#[test]
fn test_read_block_zero_hash_is_missing() {
    let (mut fixture, _, _) = make_chain(2);
    fixture.store_mut().insert(header_hash_key(2), vec![0u8; 32]);
    let service = service_over(fixture);

    assert_eq!(
        service.read_block(2).unwrap_err(),
        ExplorerError::MissingBlock {
            number: 2,
            part: BlockPart::CanonicalHash
        }
    );
}

#[test]
fn test_read_block_rejects_short_hash() {
    let (mut fixture, _, _) = make_chain(2);
    fixture.store_mut().insert(header_hash_key(2), vec![0xAB; 31]);
    let service = service_over(fixture);

    assert_eq!(
        service.read_block(2).unwrap_err(),
        ExplorerError::Decode {
            number: 2,
            part: BlockPart::CanonicalHash,
            source: DecodeError::FieldLength {
                field: "canonical hash",
                expected: 32,
                actual: 31
            }
        }
    );
}

#[test]
fn test_read_block_missing_header_and_body() {
    let (mut fixture, _, _) = make_chain(3);
    let hash2 = fixture.hash_of(2).unwrap();
    let hash3 = fixture.hash_of(3).unwrap();
    fixture.store_mut().remove(&header_key(&hash2, 2));
    fixture.store_mut().remove(&body_key(&hash3, 3));
    let service = service_over(fixture);

    assert_eq!(
        service.read_block(2).unwrap_err(),
        ExplorerError::MissingBlock {
            number: 2,
            part: BlockPart::Header
        }
    );
    assert_eq!(
        service.read_block(3).unwrap_err(),
        ExplorerError::MissingBlock {
            number: 3,
            part: BlockPart::Body
        }
    );
}

#[test]
fn test_read_block_corrupt_header() {
    let (mut fixture, _, _) = make_chain(1);
    let hash = fixture.hash_of(1).unwrap();
    fixture.store_mut().insert(header_key(&hash, 1), vec![0xf9, 0x02]);
    let service = service_over(fixture);

    let err = service.read_block(1).unwrap_err();
    assert!(matches!(
        err,
        ExplorerError::Decode {
            number: 1,
            part: BlockPart::Header,
            ..
        }
    ));
}

#[test]
fn test_read_block_number_mismatch() {
    let mut store = InMemoryKVStore::new();
    let header = header_template(5);
    let encoded = encode_header(&header);
    let hash = keccak256(&encoded);
    store.insert(header_hash_key(4), hash.as_bytes().to_vec());
    store.insert(header_key(&hash, 4), encoded);
    store.insert(body_key(&hash, 4), encode_body(&[], &[]));
    let service = ChainExplorerService::new(store, ExplorerConfig::default());

    assert_eq!(
        service.read_block(4).unwrap_err(),
        ExplorerError::Assembly {
            number: 4,
            source: AssemblyError::NumberMismatch {
                expected: 4,
                found: 5
            }
        }
    );
}

// =============================================================================
// SUMMARIES
// =============================================================================

#[test]
fn test_chain_summary_ascending_from_floor() {
    let (fixture, _, _) = make_chain(5);
    let hashes: Vec<_> = (1..=5).map(|n| fixture.hash_of(n).unwrap()).collect();
    let service = service_over(fixture);

    let summary = service.chain_summary(5).unwrap();
    assert_eq!(summary.tip, 5);
    let numbers: Vec<u64> = summary.blocks.iter().map(|b| b.number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    let counts: Vec<usize> = summary.blocks.iter().map(|b| b.transaction_count).collect();
    assert_eq!(counts, vec![1, 2, 0, 1, 2]);
    let listed: Vec<_> = summary.blocks.iter().map(|b| b.hash).collect();
    assert_eq!(listed, hashes);
    for block in &summary.blocks {
        let header = header_template(block.number);
        assert_eq!(block.timestamp, header.timestamp);
        assert_eq!(block.miner, header.coinbase);
    }
}

#[test]
fn test_chain_summary_reports_header_miner_and_time() {
    let mut fixture = ChainFixture::new();
    let mut header = header_template(1);
    header.parent_hash = fixture.hash_of(0).unwrap();
    header.coinbase = Address::repeat_byte(0x5E);
    header.timestamp = 1_700_000_123;
    let hash = fixture.push_encoded(&header, encode_body(&[], &[]));
    let service = service_over(fixture);

    let summary = service.chain_summary(1).unwrap();
    assert_eq!(
        summary.blocks,
        vec![BlockSummary {
            number: 1,
            timestamp: 1_700_000_123,
            hash,
            transaction_count: 0,
            miner: Address::repeat_byte(0x5E),
        }]
    );
}

#[test]
fn test_chain_summary_includes_genesis_with_zero_floor() {
    let (fixture, _, _) = make_chain(2);
    let service = ChainExplorerService::new(
        fixture.into_store(),
        ExplorerConfig::default().with_floor_block(0),
    );

    let summary = service.chain_summary(2).unwrap();
    assert_eq!(summary.blocks.first().map(|b| b.number), Some(0));
    assert_eq!(summary.blocks.len(), 3);
}

#[test]
fn test_chain_summary_tip_below_floor() {
    let (fixture, _, _) = make_chain(2);
    let service = service_over(fixture);

    assert_eq!(
        service.chain_summary(0).unwrap_err(),
        ExplorerError::InvalidRange { from: 0, to: 1 }
    );
}

#[test]
fn test_recent_blocks_window() {
    let (fixture, _, _) = make_chain(8);
    let service = service_over(fixture);

    let recent = service.recent_blocks(8, 3).unwrap();
    let numbers: Vec<u64> = recent.blocks.iter().map(|b| b.number).collect();
    assert_eq!(numbers, vec![6, 7, 8]);

    let clamped = service.recent_blocks(2, 10).unwrap();
    let numbers: Vec<u64> = clamped.blocks.iter().map(|b| b.number).collect();
    assert_eq!(numbers, vec![1, 2]);

    assert!(service.recent_blocks(8, 0).unwrap().blocks.is_empty());
}

#[test]
fn test_recent_blocks_never_reads_below_window() {
    let (fixture, _, _) = make_chain(10);
    let store = RecordingStore::new(fixture.into_store());
    let service = ChainExplorerService::new(store, ExplorerConfig::default());

    service.recent_blocks(10, 2).unwrap();

    let read_hash_keys: Vec<Vec<u8>> = service
        .store()
        .reads()
        .into_iter()
        .filter(|key| key.len() == 10 && key.ends_with(b"n"))
        .collect();
    assert_eq!(read_hash_keys, vec![header_hash_key(10), header_hash_key(9)]);
}

// =============================================================================
// TRANSACTIONS & STATISTICS
// =============================================================================

#[test]
fn test_block_transactions_recovers_senders() {
    let (fixture, alice, bob) = make_chain(2);
    let hash = fixture.hash_of(2).unwrap();
    let service = service_over(fixture);

    let listing = service.block_transactions(2).unwrap();
    assert_eq!(listing.number, 2);
    assert_eq!(listing.hash, hash);
    assert_eq!(listing.transactions.len(), 2);
    for (i, record) in listing.transactions.iter().enumerate() {
        assert_eq!(record.index, i);
        assert_eq!(record.from, alice.address());
        assert_eq!(record.to, Some(bob.address()));
        assert_eq!(record.value, U256::from(2u64));
    }
}

#[test]
fn test_block_transactions_empty_block() {
    let (fixture, _, _) = make_chain(3);
    let service = service_over(fixture);

    assert!(service.block_transactions(3).unwrap().transactions.is_empty());
}

#[test]
fn test_address_statistics_first_seen_newest_first() {
    let alice = TestAccount::new(1);
    let bob = TestAccount::new(2);
    let carol = TestAccount::new(3);
    let mut fixture = ChainFixture::new();
    fixture.push_block(vec![transfer(&alice, 0, bob.address(), 5u64)]);
    fixture.push_block(vec![transfer(&carol, 0, alice.address(), 7u64)]);
    let service = service_over(fixture);

    let stats = service.address_statistics(2).unwrap();
    let order: Vec<_> = stats.iter().map(|s| s.address).collect();
    // Block 2 is scanned first: carol sends to alice, then block 1 adds bob
    assert_eq!(order, vec![carol.address(), alice.address(), bob.address()]);
    assert_eq!(stats[1].send_count, 1);
    assert_eq!(stats[1].receive_count, 1);
    assert_eq!(stats[1].total_received, U256::from(7u64));
}

#[test]
fn test_contract_creation_counts_sender_only() {
    let alice = TestAccount::new(1);
    let mut fixture = ChainFixture::new();
    fixture.push_block(vec![contract_creation(&alice, 0, 0u64)]);
    let service = service_over(fixture);

    let stats = service.address_statistics(1).unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].address, alice.address());
    assert_eq!(stats[0].send_count, 1);
    assert_eq!(stats[0].receive_count, 0);
}

#[test]
fn test_chain_activity_single_walk() {
    let (fixture, alice, bob) = make_chain(4);
    let service = service_over(fixture);

    let activity = service.chain_activity(4).unwrap();
    let counts: Vec<usize> = activity.points.iter().map(|p| p.transaction_count).collect();
    assert_eq!(counts, vec![1, 2, 0, 1]);
    assert!(activity
        .points
        .windows(2)
        .all(|w| w[0].number < w[1].number && w[0].timestamp < w[1].timestamp));

    assert_eq!(activity.addresses, service.address_statistics(4).unwrap());
    assert_eq!(activity.addresses[0].address, alice.address());
    assert_eq!(activity.addresses[1].address, bob.address());
    assert_eq!(activity.addresses[1].receive_count, 4);
    assert_eq!(activity.addresses[1].total_received, U256::from(1 + 2 + 2 + 4u64));
}

// =============================================================================
// HEAD RESOLUTION
// =============================================================================

#[test]
fn test_head_block_number_follows_fixture() {
    let (fixture, _, _) = make_chain(7);
    let service = service_over(fixture);

    assert_eq!(service.head_block_number().unwrap(), Some(7));
    assert_eq!(service.resolve_tip(None).unwrap(), 7);
    assert_eq!(service.resolve_tip(Some(3)).unwrap(), 3);
}

#[test]
fn test_unknown_tip_without_head_marker() {
    let service = ChainExplorerService::new(InMemoryKVStore::new(), ExplorerConfig::default());

    assert_eq!(service.head_block_number().unwrap(), None);
    assert_eq!(service.resolve_tip(None).unwrap_err(), ExplorerError::UnknownTip);
    assert_eq!(service.resolve_tip(Some(102)).unwrap(), 102);
}

#[test]
fn test_corrupt_head_marker() {
    let (mut fixture, _, _) = make_chain(1);
    fixture.store_mut().insert(head_block_key(), vec![1, 2, 3]);
    let service = service_over(fixture);

    assert!(matches!(
        service.head_block_number(),
        Err(ExplorerError::Store(KVStoreError::CorruptionError { .. }))
    ));
}
