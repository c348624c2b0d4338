/// Integration tests that wire together all crates end-to-end.
///
/// These tests exercise the full data path:
///   signed Transaction → signature policy → pending pool → mined Block → Ledger
use nc_blockchain::{BlockchainError, IntegrityError, Ledger, SharedLedger};
use nc_node::{ChainReport, Node, NodeConfig, NodeError, NodeEvent, SignaturePolicy};
use nc_transaction::{Ed25519, Keypair, SignatureScheme, Transaction};

// ── Pure data-path tests (no runtime) ───────────────────────────────────────

#[test]
fn community_ledger_scenario() {
    let mut chain = Ledger::new(2).expect("difficulty 2 is valid");

    chain.submit_transaction("A sends 2 to B");
    chain.submit_transaction("C sends 4 to B");
    let first_hash = chain.mine_pending().expect("pool is non-empty").hash().to_string();

    assert_eq!(chain.len(), 2, "genesis + one new block");
    assert_eq!(chain.pending_len(), 0);
    assert!(first_hash.starts_with("00"));

    chain.submit_transaction("D sends 10 to E");
    chain.mine_pending().expect("pool is non-empty");

    assert_eq!(chain.len(), 3);
    assert_eq!(chain.blocks()[2].previous_hash(), first_hash);
    assert!(chain.verify_chain(), "chain should be valid");
}

#[test]
fn mining_before_any_submission_fails() {
    let mut chain = Ledger::new(2).unwrap();
    assert!(matches!(chain.mine_pending(), Err(BlockchainError::EmptyPool)));
    assert_eq!(chain.len(), 1);
    assert!(chain.verify_chain());
}

#[test]
fn signatures_survive_sealing() {
    let anna = Keypair::generate();
    let bob = Keypair::generate();
    let mut chain = Ledger::new(1).unwrap();

    chain.submit_transaction(Transaction::signed("Anna sends 2 NC to Mike", &anna));
    chain.submit_transaction(Transaction::signed("Bob sends 4 NC to Mike", &bob));
    let block = chain.mine_pending().unwrap();

    assert!(block.transactions().iter().all(Transaction::verify_signature));
    assert_eq!(
        block.transactions()[0].public_key.as_deref(),
        Some(&anna.public_key_bytes()[..])
    );
}

#[test]
fn signature_scheme_contract() {
    let scheme = Ed25519;
    let (public_key, private_key) = scheme.generate_keypair();
    let (other_public, _) = scheme.generate_keypair();

    for message in ["Anna sends 2 NC to Mike", "Bob sends 4 NC to Mike", ""] {
        let signature = scheme.sign(&private_key, message.as_bytes());
        assert!(scheme.verify(&public_key, message.as_bytes(), &signature));
        assert!(!scheme.verify(&other_public, message.as_bytes(), &signature));
    }
}

#[test]
fn shared_ledger_across_threads() {
    let ledger = SharedLedger::new(1).unwrap();

    let handles: Vec<_> = (0..3)
        .map(|i| {
            let ledger = ledger.clone();
            std::thread::spawn(move || ledger.submit_transaction(format!("neighbour {i} pays")))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let block = ledger.mine_pending().unwrap();
    assert_eq!(block.transactions().len(), 3);
    assert_eq!(ledger.validate_chain(), Ok(()));
}

#[test]
fn integrity_error_reports_index() {
    let failure = IntegrityError::BrokenLinkage { index: 4 };
    assert_eq!(failure.index(), 4);
    assert_eq!(failure.to_string(), "block 4 does not link to its predecessor");
}

// ── Node tests (tokio runtime) ──────────────────────────────────────────────

#[tokio::test]
async fn node_mines_signed_batches() {
    let config = NodeConfig {
        batch_size: Some(2),
        ..NodeConfig::with_difficulty(2)
    };
    let (node, _events) = Node::new(config).expect("node should start");
    let anna = Keypair::generate();
    let harry = Keypair::generate();

    node.submit(Transaction::signed("Anna sends 2 NC to Mike", &anna))
        .await
        .unwrap();
    let sealed = node
        .submit(Transaction::signed("Anna sends 3 NC to Bob", &anna))
        .await
        .unwrap()
        .expect("batch of two seals a block");
    assert!(sealed.hash().starts_with("00"));

    node.submit(Transaction::signed("Harry sends 10 NC to Charlie", &harry))
        .await
        .unwrap();
    assert_eq!(node.pending_len(), 1);

    let tail = node.flush().await.unwrap().expect("one transaction pending");
    assert_eq!(tail.previous_hash(), sealed.hash());
    assert!(node.verify());

    let report: ChainReport = node.report();
    assert_eq!(report.blocks.len(), 3);
    assert!(report.valid);
    assert!(report.blocks[1..]
        .iter()
        .flat_map(|b| &b.transactions)
        .all(|t| t.signed && t.signature_valid));
}

#[tokio::test]
async fn node_rejects_forged_transaction() {
    let (node, mut events) = Node::new(NodeConfig {
        signature_policy: SignaturePolicy::VerifyIfPresent,
        ..NodeConfig::with_difficulty(1)
    })
    .unwrap();

    let mut forged = Transaction::signed("Bob sends 4 NC to Mike", &Keypair::generate());
    forged.payload = "Bob sends 400 NC to Mike".into();

    let err = node.submit(forged).await.unwrap_err();
    assert!(matches!(err, NodeError::InvalidSignature));
    assert_eq!(node.pending_len(), 0);
    assert!(matches!(
        events.recv().await,
        Some(NodeEvent::TransactionRejected { .. })
    ));

    // Unsigned text is fine under this policy.
    node.submit(Transaction::new("Mike thanks the neighbours"))
        .await
        .unwrap();
    assert_eq!(node.pending_len(), 1);
}

#[test]
fn node_with_impossible_difficulty_fails_to_start() {
    let result = Node::new(NodeConfig::with_difficulty(65));
    assert!(matches!(
        result,
        Err(NodeError::Blockchain(BlockchainError::DifficultyTooHigh { .. }))
    ));
}
