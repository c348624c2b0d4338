pub mod block;
pub mod config;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod pool;
pub mod shared;

pub use block::Block;
pub use config::LedgerConfig;
pub use error::{BlockchainError, IntegrityError};
pub use ledger::Ledger;
pub use pool::TransactionPool;
pub use shared::SharedLedger;

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// The single sentinel transaction carried by the genesis block.
pub const GENESIS_PAYLOAD: &str = "Genesis Block";

/// Difficulty used when none is configured.
pub const DEFAULT_DIFFICULTY: u32 = 2;

/// Upper bound on difficulty: a hex SHA-256 digest has 64 characters, so no
/// nonce can satisfy a longer zero prefix.
pub const MAX_DIFFICULTY: u32 = hash::HASH_HEX_LEN as u32;
