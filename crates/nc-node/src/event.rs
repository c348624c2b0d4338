use nc_blockchain::IntegrityError;

/// High-level events emitted by a [`crate::Node`] that callers can subscribe
/// to via a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEvent {
    /// A transaction passed the signature policy and is now pending.
    TransactionAccepted { payload: String, pending: usize },

    /// A transaction was refused before reaching the ledger.
    TransactionRejected { payload: String, reason: String },

    /// A block was sealed and appended.
    BlockMined {
        index: usize,
        hash: String,
        nonce: u64,
        transactions: usize,
    },

    /// Result of an integrity check over the whole chain.
    ChainVerified { failure: Option<IntegrityError> },
}
