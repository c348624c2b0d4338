use std::sync::atomic::AtomicBool;

use nc_transaction::Transaction;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    block::Block,
    config::LedgerConfig,
    error::{BlockchainError, IntegrityError},
    pool::TransactionPool,
};

/// The append-only chain of sealed [`Block`]s plus the pool of transactions
/// waiting for the next one.
///
/// Invariants maintained by this type:
/// - Always contains the genesis block at index 0.
/// - Every later block's `previous_hash` equals the hash of the block before.
/// - Every later block's hash meets the ledger difficulty.
/// - Appending a block removes exactly its transactions from the pool.
///
/// The ledger serialises for display but cannot be deserialised: the only
/// way to build one is [`Ledger::with_config`].
#[derive(Debug, Clone, Serialize)]
pub struct Ledger {
    blocks: Vec<Block>,
    pool: TransactionPool,
    difficulty: u32,
}

impl Ledger {
    /// Initialise a chain holding only the genesis block.
    pub fn new(difficulty: u32) -> Result<Self, BlockchainError> {
        Self::with_config(&LedgerConfig::with_difficulty(difficulty))
    }

    pub fn with_config(config: &LedgerConfig) -> Result<Self, BlockchainError> {
        config.validate()?;
        Ok(Self {
            blocks: vec![Block::genesis()],
            pool: TransactionPool::new(),
            difficulty: config.difficulty,
        })
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Number of blocks in the chain (including genesis).
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always `false`: genesis is never removed.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The most recent block.
    pub fn tip(&self) -> &Block {
        // Safety: always at least one block (genesis), and only `with_config`
        // constructs a ledger.
        self.blocks.last().unwrap()
    }

    /// All blocks in the chain, genesis first.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Transactions waiting to be mined.
    pub fn pending(&self) -> &TransactionPool {
        &self.pool
    }

    pub fn pending_len(&self) -> usize {
        self.pool.len()
    }

    /// Queue `tx` for the next block.
    ///
    /// No signature check happens here; callers decide which transactions
    /// are trustworthy before submitting them.
    pub fn submit_transaction(&mut self, tx: impl Into<Transaction>) {
        let tx = tx.into();
        debug!(payload = %tx.payload, signed = tx.is_signed(), "Transaction pooled");
        self.pool.add(tx);
    }

    /// Seal every pending transaction into a new block and append it.
    ///
    /// Fails with [`BlockchainError::EmptyPool`] without touching any state
    /// when nothing is pending.
    pub fn mine_pending(&mut self) -> Result<&Block, BlockchainError> {
        self.mine_pending_cancellable(&AtomicBool::new(false))
    }

    /// Like [`Ledger::mine_pending`], but stops when `cancel` is set.
    ///
    /// A cancelled mine returns [`BlockchainError::MiningCancelled`] and
    /// leaves both the chain and the pool exactly as they were.
    pub fn mine_pending_cancellable(&mut self, cancel: &AtomicBool) -> Result<&Block, BlockchainError> {
        let mut block = self.prepare_block()?;
        block.mine_until(self.difficulty, cancel)?;
        self.append_block(block)
    }

    /// Build an unmined block holding a snapshot of the pool on top of the
    /// current tip.  Nothing is removed from the pool.
    ///
    /// Fails with [`BlockchainError::EmptyPool`] when nothing is pending.
    pub fn prepare_block(&self) -> Result<Block, BlockchainError> {
        if self.pool.is_empty() {
            return Err(BlockchainError::EmptyPool);
        }
        Ok(Block::new(self.tip().hash(), self.pool.transactions().to_vec()))
    }

    /// Append a block sealed from [`Ledger::prepare_block`] and remove its
    /// transactions from the front of the pool.
    ///
    /// The block is refused with [`BlockchainError::StaleBlock`] unless it
    /// still extends the tip and the pool still starts with its
    /// transactions, and with [`BlockchainError::Unsealed`] unless its hash
    /// is consistent and meets the difficulty.  A refused block changes
    /// nothing.
    pub fn append_block(&mut self, block: Block) -> Result<&Block, BlockchainError> {
        if block.previous_hash() != self.tip().hash()
            || !self.pool.transactions().starts_with(block.transactions())
        {
            return Err(BlockchainError::StaleBlock);
        }
        if !block.is_hash_consistent() || !block.meets_difficulty(self.difficulty) {
            return Err(BlockchainError::Unsealed);
        }

        self.pool.take_front(block.transactions().len());
        self.blocks.push(block);

        let index = self.blocks.len() - 1;
        let tip = self.tip();
        info!(
            index,
            hash = %tip.hash(),
            transactions = tip.transactions().len(),
            "Block appended"
        );
        Ok(tip)
    }

    /// Walk the chain and report the first block that fails either check:
    /// - its stored hash matches a recomputation from its own contents,
    ///   including the `previous_hash` it claims;
    /// - its `previous_hash` equals the actual hash of the block before it.
    ///
    /// Genesis has no predecessor and passes by construction.
    pub fn validate_chain(&self) -> Result<(), IntegrityError> {
        for (offset, pair) in self.blocks.windows(2).enumerate() {
            let index = offset + 1;
            let (previous, current) = (&pair[0], &pair[1]);

            if !current.is_hash_consistent() {
                warn!(index, "Block contents do not match stored hash");
                return Err(IntegrityError::TamperedBlock { index });
            }

            if current.previous_hash() != previous.hash() {
                warn!(index, "Block does not link to its predecessor");
                return Err(IntegrityError::BrokenLinkage { index });
            }
        }

        Ok(())
    }

    /// Boolean form of [`Ledger::validate_chain`].
    pub fn verify_chain(&self) -> bool {
        self.validate_chain().is_ok()
    }

    #[cfg(test)]
    pub(crate) fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }
}
