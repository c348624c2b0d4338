use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("blockchain error: {0}")]
    Blockchain(#[from] nc_blockchain::BlockchainError),

    #[error("transaction is not signed")]
    Unsigned,

    #[error("transaction signature does not verify")]
    InvalidSignature,

    #[error("mining task failed: {0}")]
    MiningTask(#[from] tokio::task::JoinError),

    #[error("serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}
