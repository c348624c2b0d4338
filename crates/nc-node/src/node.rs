use std::sync::{atomic::AtomicBool, Arc};

use nc_blockchain::{Block, BlockchainError, Ledger, SharedLedger};
use nc_transaction::Transaction;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::{config::NodeConfig, error::NodeError, event::NodeEvent, report::ChainReport};

/// The calling layer in front of a [`Ledger`].
///
/// The node:
/// - Applies the configured signature policy before anything reaches the pool
/// - Mines on request, or automatically once a batch is full
/// - Runs the proof-of-work search on tokio's blocking pool
/// - Reports progress as [`NodeEvent`]s
pub struct Node {
    ledger: SharedLedger,
    config: NodeConfig,
    event_tx: mpsc::UnboundedSender<NodeEvent>,
}

impl Node {
    /// Create a node from a [`NodeConfig`].
    ///
    /// Returns the node together with a receiver for [`NodeEvent`]s that the
    /// calling application can process independently.
    pub fn new(config: NodeConfig) -> Result<(Self, mpsc::UnboundedReceiver<NodeEvent>), NodeError> {
        let ledger = SharedLedger::from_ledger(Ledger::with_config(&config.ledger)?);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        info!(
            difficulty = config.ledger.difficulty,
            batch_size = ?config.batch_size,
            policy = ?config.signature_policy,
            "Ledger initialised"
        );

        Ok((
            Self {
                ledger,
                config,
                event_tx,
            },
            event_rx,
        ))
    }

    /// Handle to the underlying ledger.
    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn pending_len(&self) -> usize {
        self.ledger.pending_len()
    }

    /// Snapshot of the chain, genesis first.
    pub fn blocks(&self) -> Vec<Block> {
        self.ledger.blocks()
    }

    /// Check `tx` against the signature policy and pool it.
    ///
    /// When the pool reaches the configured batch size a block is mined
    /// before returning, and that block is returned.  If a concurrent
    /// submission already sealed the batch, the result is `Ok(None)`.
    pub async fn submit(&self, tx: Transaction) -> Result<Option<Block>, NodeError> {
        if let Err(err) = self.config.signature_policy.admit(&tx) {
            warn!(payload = %tx.payload, "Rejected transaction: {err}");
            let _ = self.event_tx.send(NodeEvent::TransactionRejected {
                payload: tx.payload,
                reason: err.to_string(),
            });
            return Err(err);
        }

        let payload = tx.payload.clone();
        let pending = self.ledger.with_ledger_mut(|ledger| {
            ledger.submit_transaction(tx);
            ledger.pending_len()
        });
        info!(%payload, pending, "Transaction accepted");
        let _ = self
            .event_tx
            .send(NodeEvent::TransactionAccepted { payload, pending });

        if self.config.batch_ready(pending) {
            return self.flush().await;
        }

        Ok(None)
    }

    /// Seal every pending transaction into a block.
    ///
    /// The search runs on a blocking thread so async callers stay responsive.
    pub async fn mine(&self) -> Result<Block, NodeError> {
        self.mine_until(Arc::new(AtomicBool::new(false))).await
    }

    /// Like [`Node::mine`], but gives up once `cancel` is set, leaving the
    /// chain and the pool unchanged.
    ///
    /// The ledger stays unlocked during the search, so other tasks can keep
    /// submitting; those transactions go into a later block.
    pub async fn mine_until(&self, cancel: Arc<AtomicBool>) -> Result<Block, NodeError> {
        let ledger = self.ledger.clone();
        let (index, block) =
            tokio::task::spawn_blocking(move || ledger.seal_pending(&cancel)).await??;

        let _ = self.event_tx.send(NodeEvent::BlockMined {
            index,
            hash: block.hash().to_string(),
            nonce: block.nonce(),
            transactions: block.transactions().len(),
        });

        Ok(block)
    }

    /// Mine whatever is pending; `None` when the pool was already empty.
    pub async fn flush(&self) -> Result<Option<Block>, NodeError> {
        match self.mine().await {
            Ok(block) => Ok(Some(block)),
            Err(NodeError::Blockchain(BlockchainError::EmptyPool)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Run the integrity check and publish its outcome.
    pub fn verify(&self) -> bool {
        let failure = self.ledger.validate_chain().err();
        let valid = failure.is_none();
        let _ = self.event_tx.send(NodeEvent::ChainVerified { failure });
        valid
    }

    /// Build a printable view of the current chain.
    pub fn report(&self) -> ChainReport {
        self.ledger.with_ledger(ChainReport::from_ledger)
    }
}
