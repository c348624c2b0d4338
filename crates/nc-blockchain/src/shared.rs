use std::sync::{atomic::AtomicBool, Arc, Mutex, MutexGuard, PoisonError};

use nc_transaction::Transaction;

use crate::{Block, BlockchainError, IntegrityError, Ledger};

/// A cloneable, thread-safe handle to a single [`Ledger`].
///
/// The ledger lock is only held for short snapshots and updates, never for
/// the proof-of-work search.  Mining snapshots the pool, searches with the
/// ledger unlocked, then appends under the lock again, removing only the
/// snapshotted transactions.  Miners on this handle take turns through a
/// second mutex, so the tip does not move between snapshot and append.  A transaction submitted
/// during a search lands in a later block: it is never lost and never
/// included twice.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
    miner: Arc<Mutex<()>>,
}

impl SharedLedger {
    pub fn new(difficulty: u32) -> Result<Self, BlockchainError> {
        Ok(Self::from_ledger(Ledger::new(difficulty)?))
    }

    pub fn from_ledger(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
            miner: Arc::new(Mutex::new(())),
        }
    }

    // Every ledger mutation is all-or-nothing, so state behind a poisoned
    // lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn submit_transaction(&self, tx: impl Into<Transaction>) {
        self.lock().submit_transaction(tx);
    }

    /// Mine the pending pool and return a copy of the sealed block.
    pub fn mine_pending(&self) -> Result<Block, BlockchainError> {
        self.mine_pending_cancellable(&AtomicBool::new(false))
    }

    /// Like [`SharedLedger::mine_pending`], but stops when `cancel` is set,
    /// leaving the chain and the pool unchanged.
    pub fn mine_pending_cancellable(&self, cancel: &AtomicBool) -> Result<Block, BlockchainError> {
        self.seal_pending(cancel).map(|(_, block)| block)
    }

    /// Mine the pending pool and return the new block with its chain index.
    pub fn seal_pending(&self, cancel: &AtomicBool) -> Result<(usize, Block), BlockchainError> {
        let _turn = self.miner.lock().unwrap_or_else(PoisonError::into_inner);

        let (mut block, difficulty) = {
            let ledger = self.lock();
            (ledger.prepare_block()?, ledger.difficulty())
        };

        block.mine_until(difficulty, cancel)?;

        let mut ledger = self.lock();
        let sealed = ledger.append_block(block)?.clone();
        Ok((ledger.len() - 1, sealed))
    }

    pub fn verify_chain(&self) -> bool {
        self.lock().verify_chain()
    }

    pub fn validate_chain(&self) -> Result<(), IntegrityError> {
        self.lock().validate_chain()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.lock().pending_len()
    }

    pub fn difficulty(&self) -> u32 {
        self.lock().difficulty()
    }

    pub fn tip(&self) -> Block {
        self.lock().tip().clone()
    }

    /// Snapshot of every block, genesis first.
    pub fn blocks(&self) -> Vec<Block> {
        self.lock().blocks().to_vec()
    }

    /// Run `f` with shared access to the ledger while holding the lock.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.lock())
    }

    /// Run `f` with exclusive access to the ledger while holding the lock.
    pub fn with_ledger_mut<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        f(&mut self.lock())
    }
}
