use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlockchainError {
    #[error("no pending transactions to mine")]
    EmptyPool,

    #[error("difficulty {difficulty} exceeds the maximum of {max}")]
    DifficultyTooHigh { difficulty: u32, max: u32 },

    #[error("mining was cancelled")]
    MiningCancelled,

    #[error("block no longer extends the tip or the pending transactions")]
    StaleBlock,

    #[error("block hash is inconsistent or does not meet the difficulty")]
    Unsealed,

    #[error("integrity check failed: {0}")]
    Integrity(#[from] IntegrityError),
}

/// The first check that failed while walking the chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// The stored hash no longer matches the block's contents.
    #[error("block {index} has been tampered with")]
    TamperedBlock { index: usize },

    /// The block's `previous_hash` differs from its predecessor's hash.
    #[error("block {index} does not link to its predecessor")]
    BrokenLinkage { index: usize },
}

impl IntegrityError {
    /// Chain index of the offending block.
    pub fn index(&self) -> usize {
        match self {
            Self::TamperedBlock { index } | Self::BrokenLinkage { index } => *index,
        }
    }
}
