use std::sync::atomic::{AtomicBool, Ordering};

use nc_transaction::Transaction;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::{BlockchainError, GENESIS_PAYLOAD, GENESIS_PREVIOUS_HASH, MAX_DIFFICULTY};

/// A block in the ledger: an ordered batch of transactions bound to the hash
/// of the previous block by a proof-of-work nonce.
///
/// `hash` is always the digest of the block's canonical content followed by
/// `nonce`.  Only [`Block::mine`] and [`Block::mine_until`] change `nonce` and
/// `hash`; once a block is appended to a [`crate::Ledger`] nothing mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Hex hash of the previous block, or `"0"` for genesis.
    previous_hash: String,

    /// Transactions in the order they were pooled.
    transactions: Vec<Transaction>,

    /// Proof-of-work counter.
    nonce: u64,

    /// Cached hex digest of the content and nonce.
    hash: String,
}

impl Block {
    /// Build an unmined block (`nonce = 0`) on top of `previous_hash`.
    pub fn new(previous_hash: impl Into<String>, transactions: Vec<Transaction>) -> Self {
        let mut block = Self {
            previous_hash: previous_hash.into(),
            transactions,
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.recompute_hash();
        block
    }

    /// The fixed first block of every chain.  It is never mined.
    pub fn genesis() -> Self {
        Self::new(
            GENESIS_PREVIOUS_HASH,
            vec![Transaction::new(GENESIS_PAYLOAD)],
        )
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// The cached hex hash.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Digest of the block's current transactions, previous hash and nonce.
    pub fn recompute_hash(&self) -> String {
        hash_with_nonce(&self.content_hasher(), self.nonce)
    }

    /// Returns `true` when the cached hash matches a fresh recomputation.
    pub fn is_hash_consistent(&self) -> bool {
        self.hash == self.recompute_hash()
    }

    /// Returns `true` when the cached hash has `difficulty` leading zeros.
    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        crate::hash::meets_difficulty(&self.hash, difficulty)
    }

    /// Search nonces until the hash has `difficulty` leading `'0'` hex
    /// characters.  The search is unbounded.
    pub fn mine(&mut self, difficulty: u32) -> Result<(), BlockchainError> {
        self.search(difficulty, None)
    }

    /// Like [`Block::mine`] but gives up with
    /// [`BlockchainError::MiningCancelled`] once `cancel` is set.  The block
    /// stays internally consistent (hash matches nonce) either way.
    pub fn mine_until(&mut self, difficulty: u32, cancel: &AtomicBool) -> Result<(), BlockchainError> {
        self.search(difficulty, Some(cancel))
    }

    fn search(&mut self, difficulty: u32, cancel: Option<&AtomicBool>) -> Result<(), BlockchainError> {
        if difficulty > MAX_DIFFICULTY {
            return Err(BlockchainError::DifficultyTooHigh {
                difficulty,
                max: MAX_DIFFICULTY,
            });
        }

        // The content prefix is fixed for the whole search; only the nonce
        // suffix changes between attempts.
        let prefix = self.content_hasher();
        let start = self.nonce;

        while !self.meets_difficulty(difficulty) {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                debug!(attempts = self.nonce.wrapping_sub(start), "mining cancelled");
                return Err(BlockchainError::MiningCancelled);
            }
            self.nonce = self.nonce.wrapping_add(1);
            self.hash = hash_with_nonce(&prefix, self.nonce);
        }

        info!(hash = %self.hash, nonce = self.nonce, difficulty, "Block mined");
        Ok(())
    }

    /// Hasher primed with the canonical content.
    ///
    /// Every variable-length field is length-prefixed so that distinct
    /// transaction lists can never produce the same byte stream.  Optional
    /// signature fields carry a presence tag.
    fn content_hasher(&self) -> Sha256 {
        let mut hasher = Sha256::new();
        hasher.update((self.transactions.len() as u64).to_le_bytes());
        for tx in &self.transactions {
            update_field(&mut hasher, tx.payload.as_bytes());
            update_optional(&mut hasher, tx.signature.as_deref());
            update_optional(&mut hasher, tx.public_key.as_deref());
        }
        update_field(&mut hasher, self.previous_hash.as_bytes());
        hasher
    }

    #[cfg(test)]
    pub(crate) fn transactions_mut(&mut self) -> &mut Vec<Transaction> {
        &mut self.transactions
    }

    #[cfg(test)]
    pub(crate) fn set_previous_hash(&mut self, previous_hash: impl Into<String>) {
        self.previous_hash = previous_hash.into();
    }
}

fn hash_with_nonce(prefix: &Sha256, nonce: u64) -> String {
    hex::encode(prefix.clone().chain_update(nonce.to_le_bytes()).finalize())
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn update_optional(hasher: &mut Sha256, bytes: Option<&[u8]>) {
    match bytes {
        Some(bytes) => {
            hasher.update([1u8]);
            update_field(hasher, bytes);
        }
        None => hasher.update([0u8]),
    }
}

#[cfg(test)]
mod tests {
    use nc_transaction::Keypair;

    use super::*;

    fn txs(payloads: &[&str]) -> Vec<Transaction> {
        payloads.iter().map(|p| Transaction::new(*p)).collect()
    }

    #[test]
    fn new_block_starts_at_nonce_zero_with_consistent_hash() {
        let block = Block::new("abc", txs(&["A sends 2 to B"]));
        assert_eq!(block.nonce(), 0);
        assert_eq!(block.hash().len(), 64);
        assert!(block.is_hash_consistent());
    }

    #[test]
    fn recompute_hash_is_pure() {
        let block = Block::new("abc", txs(&["A sends 2 to B", "C sends 4 to B"]));
        assert_eq!(block.recompute_hash(), block.recompute_hash());
        assert_eq!(
            Block::new("abc", txs(&["A sends 2 to B", "C sends 4 to B"])).hash(),
            block.hash()
        );
    }

    #[test]
    fn transaction_order_changes_hash() {
        let a = Block::new("p", txs(&["x", "y"]));
        let b = Block::new("p", txs(&["y", "x"]));
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn payload_boundaries_are_unambiguous() {
        let a = Block::new("p", txs(&["a-b", "c"]));
        let b = Block::new("p", txs(&["a", "b-c"]));
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn signature_is_part_of_the_hash() {
        let keypair = Keypair::generate();
        let unsigned = Block::new("p", txs(&["x"]));
        let signed = Block::new("p", vec![Transaction::signed("x", &keypair)]);
        assert_ne!(unsigned.hash(), signed.hash());
    }

    #[test]
    fn zero_difficulty_keeps_first_hash() {
        let mut block = Block::new("p", txs(&["x"]));
        let before = block.hash().to_string();
        block.mine(0).unwrap();
        assert_eq!(block.nonce(), 0);
        assert_eq!(block.hash(), before);
    }

    #[test]
    fn mined_hash_meets_difficulty_and_is_consistent() {
        for difficulty in 1..=3 {
            let mut block = Block::new("prev", txs(&["A sends 2 to B"]));
            block.mine(difficulty).unwrap();
            assert!(block.hash().starts_with(&"0".repeat(difficulty as usize)));
            assert!(block.is_hash_consistent());
        }
    }

    #[test]
    fn impossible_difficulty_is_rejected() {
        let mut block = Block::new("p", txs(&["x"]));
        assert!(matches!(
            block.mine(MAX_DIFFICULTY + 1),
            Err(BlockchainError::DifficultyTooHigh { .. })
        ));
        assert_eq!(block.nonce(), 0);
    }

    #[test]
    fn preset_cancel_flag_stops_search() {
        let mut block = Block::new("p", txs(&["x"]));
        let cancel = AtomicBool::new(true);
        // Difficulty 64 would never finish without the flag.
        let result = block.mine_until(MAX_DIFFICULTY, &cancel);
        assert!(matches!(result, Err(BlockchainError::MiningCancelled)));
        assert!(block.is_hash_consistent());
    }

    #[test]
    fn editing_a_transaction_is_detected() {
        let mut block = Block::new("p", txs(&["A sends 2 to B"]));
        block.mine(1).unwrap();
        block.transactions_mut()[0].payload = "A sends 200 to B".into();
        assert!(!block.is_hash_consistent());
    }

    #[test]
    fn genesis_is_fixed() {
        let genesis = Block::genesis();
        assert_eq!(genesis.previous_hash(), GENESIS_PREVIOUS_HASH);
        assert_eq!(genesis.transactions().len(), 1);
        assert_eq!(genesis.transactions()[0].payload, GENESIS_PAYLOAD);
        assert_eq!(genesis, Block::genesis());
    }
}
