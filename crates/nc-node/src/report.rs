use std::fmt;

use nc_blockchain::{Block, Ledger};
use serde::Serialize;

use crate::error::NodeError;

/// Read-only view of a ledger for display.
#[derive(Debug, Clone, Serialize)]
pub struct ChainReport {
    pub difficulty: u32,
    pub valid: bool,
    /// Description of the first failed integrity check, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    pub pending: usize,
    pub blocks: Vec<BlockReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockReport {
    pub index: usize,
    pub transactions: Vec<TransactionLine>,
    pub nonce: u64,
    pub hash: String,
    pub previous_hash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionLine {
    pub payload: String,
    pub signed: bool,
    pub signature_valid: bool,
}

impl ChainReport {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        let failure = ledger.validate_chain().err();
        Self {
            difficulty: ledger.difficulty(),
            valid: failure.is_none(),
            failure: failure.map(|e| e.to_string()),
            pending: ledger.pending_len(),
            blocks: ledger
                .blocks()
                .iter()
                .enumerate()
                .map(|(index, block)| BlockReport::new(index, block))
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, NodeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl BlockReport {
    fn new(index: usize, block: &Block) -> Self {
        Self {
            index,
            transactions: block
                .transactions()
                .iter()
                .map(|tx| TransactionLine {
                    payload: tx.payload.clone(),
                    signed: tx.is_signed(),
                    signature_valid: tx.verify_signature(),
                })
                .collect(),
            nonce: block.nonce(),
            hash: block.hash().to_string(),
            previous_hash: block.previous_hash().to_string(),
        }
    }
}

impl fmt::Display for ChainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Blockchain (difficulty {}):", self.difficulty)?;
        for block in &self.blocks {
            write!(f, "{block}")?;
        }
        if self.pending > 0 {
            writeln!(f, "Pending transactions: {}", self.pending)?;
        }
        match &self.failure {
            None => writeln!(f, "Is blockchain valid? true"),
            Some(failure) => writeln!(f, "Is blockchain valid? false ({failure})"),
        }
    }
}

impl fmt::Display for BlockReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Block {}:", self.index)?;
        let payloads: Vec<&str> = self.transactions.iter().map(|t| t.payload.as_str()).collect();
        writeln!(f, "Transactions: {payloads:?}")?;
        writeln!(f, "Nonce: {}", self.nonce)?;
        writeln!(f, "Block Hash: {}", self.hash)?;
        writeln!(f, "Previous Hash: {}", self.previous_hash)?;
        writeln!(f, "------")
    }
}
