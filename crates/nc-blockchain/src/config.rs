use serde::{Deserialize, Serialize};

use crate::{BlockchainError, DEFAULT_DIFFICULTY, MAX_DIFFICULTY};

/// Parameters for a new [`crate::Ledger`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Number of leading `'0'` hex characters a mined block hash must have.
    /// Each step multiplies the expected mining work by 16.
    pub difficulty: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
        }
    }
}

impl LedgerConfig {
    pub fn with_difficulty(difficulty: u32) -> Self {
        Self { difficulty }
    }

    /// Reject difficulties no SHA-256 hex digest can satisfy.
    pub fn validate(&self) -> Result<(), BlockchainError> {
        if self.difficulty > MAX_DIFFICULTY {
            return Err(BlockchainError::DifficultyTooHigh {
                difficulty: self.difficulty,
                max: MAX_DIFFICULTY,
            });
        }
        Ok(())
    }
}
