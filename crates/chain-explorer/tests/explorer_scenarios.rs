//! End-to-end explorer scenarios over fixture chains.

use chain_explorer::test_utils::{
    contract_creation, encode_body, encode_header, header_template, legacy_with_signature,
    transfer, transactions_root, ChainFixture, TestAccount, TEST_NETWORK_ID,
};
use chain_explorer::{
    Address, AddressStats, AssemblyError, BlockPart, ChainExplorerApi, ChainExplorerService,
    ExplorerConfig, ExplorerError, RecoveryError, U256,
};
use std::collections::HashSet;

/// Blocks 1..=3 carrying 0, 1 (A -> B 100) and 2 (A -> B 50, B -> A 30) transfers.
fn three_block_chain() -> (ChainFixture, TestAccount, TestAccount) {
    let a = TestAccount::new(0xA1);
    let b = TestAccount::new(0xB2);
    let mut fixture = ChainFixture::new();
    fixture.push_block(Vec::new());
    fixture.push_block(vec![transfer(&a, 0, b.address(), 100u64)]);
    fixture.push_block(vec![
        transfer(&a, 1, b.address(), 50u64),
        transfer(&b, 0, a.address(), 30u64),
    ]);
    (fixture, a, b)
}

#[test]
fn test_three_block_scenario() {
    let (fixture, a, b) = three_block_chain();
    let service = fixture.into_service();

    let summary = service.chain_summary(3).unwrap();
    let counts: Vec<usize> = summary.blocks.iter().map(|s| s.transaction_count).collect();
    assert_eq!(counts, vec![0, 1, 2]);

    let stats = service.address_statistics(3).unwrap();
    assert_eq!(
        stats,
        vec![
            AddressStats {
                address: a.address(),
                send_count: 2,
                receive_count: 1,
                total_received: U256::from(30u64),
            },
            AddressStats {
                address: b.address(),
                send_count: 1,
                receive_count: 2,
                total_received: U256::from(150u64),
            },
        ]
    );
}

#[test]
fn test_missing_lower_bound_aborts_summary() {
    let (mut fixture, _, _) = three_block_chain();
    let key = chain_explorer::domain::keys::header_hash_key(1);
    fixture.store_mut().remove(&key);
    let service = fixture.into_service();

    assert_eq!(
        service.chain_summary(3).unwrap_err(),
        ExplorerError::MissingBlock {
            number: 1,
            part: BlockPart::CanonicalHash
        }
    );
    assert!(service.address_statistics(3).is_err());
}

#[test]
fn test_bad_discriminant_aborts_statistics() {
    let (mut fixture, a, b) = three_block_chain();
    let mut r = [0u8; 32];
    r[0] = 0x42;
    r[31] = 0x07;
    fixture.push_block(vec![
        transfer(&a, 2, b.address(), 1u64),
        legacy_with_signature(0, Some(a.address()), U256::one(), 5, r, r),
    ]);
    let service = fixture.into_service();

    assert_eq!(
        service.address_statistics(4).unwrap_err(),
        ExplorerError::Recovery {
            number: 4,
            index: 1,
            source: RecoveryError::InvalidRecoveryId { v: 5 }
        }
    );
    assert!(service.chain_activity(4).is_err());
    assert!(service.block_transactions(4).is_err());

    // Listing blocks needs no sender recovery
    assert_eq!(service.chain_summary(4).unwrap().blocks.len(), 4);
}

#[test]
fn test_foreign_network_signature_aborts_statistics() {
    let (mut fixture, a, b) = three_block_chain();
    fixture.push_block(vec![a.sign_legacy(2, Some(b.address()), U256::one(), Some(1))]);
    let service = fixture.into_service();

    assert_eq!(
        service.address_statistics(4).unwrap_err(),
        ExplorerError::Recovery {
            number: 4,
            index: 0,
            source: RecoveryError::ChainIdMismatch {
                expected: TEST_NETWORK_ID,
                found: 1
            }
        }
    );
}

#[test]
fn test_counts_are_conserved() {
    let accounts: Vec<TestAccount> = (1..=5).map(TestAccount::new).collect();
    let mut fixture = ChainFixture::new();
    let mut nonces = vec![0u64; accounts.len()];
    let mut total = 0u64;
    let mut creations = 0u64;

    for block in 0..6usize {
        let mut txs = Vec::new();
        for i in 0..(block % 4) {
            let from = (block + i) % accounts.len();
            let to = (block * 3 + i) % accounts.len();
            let nonce = nonces[from];
            nonces[from] += 1;
            if (block + i) % 5 == 4 {
                txs.push(contract_creation(&accounts[from], nonce, 0u64));
                creations += 1;
            } else {
                txs.push(transfer(&accounts[from], nonce, accounts[to].address(), 10u64));
            }
            total += 1;
        }
        fixture.push_block(txs);
    }
    let tip = fixture.tip();
    let service = fixture.into_service();
    let stats = service.address_statistics(tip).unwrap();

    let sends: u64 = stats.iter().map(|s| s.send_count).sum();
    let receives: u64 = stats.iter().map(|s| s.receive_count).sum();
    assert_eq!(sends, total);
    assert!(receives <= total - creations);
    assert!(creations > 0);

    let unique: HashSet<Address> = stats.iter().map(|s| s.address).collect();
    assert_eq!(unique.len(), stats.len());
    let participants: HashSet<Address> = accounts.iter().map(|a| a.address()).collect();
    assert!(unique.is_subset(&participants));
}

#[test]
fn test_self_transfer_counts_once() {
    let a = TestAccount::new(9);
    let mut fixture = ChainFixture::new();
    fixture.push_block(vec![transfer(&a, 0, a.address(), 25u64)]);
    let service = fixture.into_service();

    let stats = service.address_statistics(1).unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].send_count, 1);
    assert_eq!(stats[0].receive_count, 0);
    assert_eq!(stats[0].total_received, U256::from(25u64));
}

#[test]
fn test_typed_transactions_in_statistics() {
    let a = TestAccount::new(0x21);
    let b = TestAccount::new(0x22);
    let mut fixture = ChainFixture::new();
    fixture.push_block(vec![
        a.sign_access_list(0, Some(b.address()), U256::from(3u64), TEST_NETWORK_ID),
        a.sign_dynamic_fee(1, Some(b.address()), U256::from(4u64), TEST_NETWORK_ID),
        a.sign_legacy(2, Some(b.address()), U256::from(5u64), None),
    ]);
    let service = fixture.into_service();

    let listing = service.block_transactions(1).unwrap();
    assert!(listing.transactions.iter().all(|t| t.from == a.address()));

    let stats = service.address_statistics(1).unwrap();
    assert_eq!(stats[0].send_count, 3);
    assert_eq!(stats[1].receive_count, 3);
    assert_eq!(stats[1].total_received, U256::from(12u64));
}

#[test]
fn test_uncle_mismatch_fails_assembly() {
    let mut fixture = ChainFixture::new();
    let parent = fixture.hash_of(0).unwrap();
    let mut header = header_template(1);
    header.parent_hash = parent;
    let uncle = encode_header(&header_template(0));
    fixture.push_encoded(&header, encode_body(&[], &[uncle]));
    let service = fixture.into_service();

    assert!(matches!(
        service.chain_summary(1),
        Err(ExplorerError::Assembly {
            number: 1,
            source: AssemblyError::UncleHashMismatch { .. }
        })
    ));
}

#[test]
fn test_transaction_root_must_match_body() {
    let a = TestAccount::new(3);
    let mut fixture = ChainFixture::new();
    let txs = vec![transfer(&a, 0, Address::repeat_byte(1), 1u64)];
    // Header claims an empty trie while the body carries a transaction
    let header = header_template(1);
    fixture.push_encoded(&header, encode_body(&txs, &[]));
    let service = fixture.into_service();

    assert!(matches!(
        service.chain_summary(1),
        Err(ExplorerError::Assembly {
            number: 1,
            source: AssemblyError::TransactionRootMismatch {
                transaction_count: 1,
                ..
            }
        })
    ));

    assert_ne!(transactions_root(&txs), header.transactions_root);
}

#[test]
fn test_network_id_is_configurable() {
    let a = TestAccount::new(4);
    let mut fixture = ChainFixture::new();
    fixture.push_block(vec![a.sign_legacy(0, None, U256::zero(), Some(1))]);
    let service = ChainExplorerService::new(
        fixture.into_store(),
        ExplorerConfig::default().with_network_id(1),
    );

    let stats = service.address_statistics(1).unwrap();
    assert_eq!(stats[0].address, a.address());
}

#[test]
fn test_summary_serializes_hex() {
    let (fixture, _, _) = three_block_chain();
    let service = fixture.into_service();

    let json = serde_json::to_value(service.chain_summary(3).unwrap()).unwrap();
    let hash = json["blocks"][0]["hash"].as_str().unwrap();
    assert!(hash.starts_with("0x"));
    assert_eq!(hash.len(), 66);
    assert_eq!(json["blocks"][2]["transaction_count"], 2);

    let stats = serde_json::to_value(service.address_statistics(3).unwrap()).unwrap();
    assert_eq!(stats[1]["total_received"], "0x96");
}
