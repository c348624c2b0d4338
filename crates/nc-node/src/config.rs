use nc_blockchain::LedgerConfig;
use nc_transaction::Transaction;
use tracing_subscriber::EnvFilter;

use crate::error::NodeError;

/// Which transactions the node lets through to the ledger.
///
/// The ledger itself never inspects signatures, so this is the only gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignaturePolicy {
    /// Only signed transactions with a valid signature are accepted (default).
    #[default]
    Require,
    /// Unsigned transactions are accepted; signed ones must verify.
    VerifyIfPresent,
    /// Every transaction is accepted as-is.
    Skip,
}

impl SignaturePolicy {
    /// Decide whether `tx` may be submitted.
    pub fn admit(&self, tx: &Transaction) -> Result<(), NodeError> {
        match self {
            Self::Skip => Ok(()),
            Self::Require if !tx.is_signed() => Err(NodeError::Unsigned),
            Self::VerifyIfPresent if !tx.is_signed() => Ok(()),
            Self::Require | Self::VerifyIfPresent => {
                if tx.verify_signature() {
                    Ok(())
                } else {
                    Err(NodeError::InvalidSignature)
                }
            }
        }
    }
}

/// Full configuration for a [`crate::Node`].
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Difficulty and other ledger parameters.
    pub ledger: LedgerConfig,

    /// When `Some(n)`, a block is mined automatically as soon as `n`
    /// transactions are pending.  `None` (the default) mines only on request.
    pub batch_size: Option<usize>,

    /// Signature gate applied on submission.
    pub signature_policy: SignaturePolicy,

    /// When `true`, [`NodeConfig::log_filter`] turns every log line off.
    /// The library never installs a subscriber itself.
    pub quiet: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            batch_size: None,
            signature_policy: SignaturePolicy::default(),
            quiet: false,
        }
    }
}

impl NodeConfig {
    /// Default config with a specific mining difficulty.
    pub fn with_difficulty(difficulty: u32) -> Self {
        Self {
            ledger: LedgerConfig::with_difficulty(difficulty),
            ..Self::default()
        }
    }

    /// Returns `true` when `pending` transactions should trigger a mine.
    pub fn batch_ready(&self, pending: usize) -> bool {
        matches!(self.batch_size, Some(size) if size > 0 && pending >= size)
    }

    /// Log filter for a host binary's tracing subscriber.
    ///
    /// `RUST_LOG` wins when set; otherwise node and ledger events are logged
    /// at `info`.
    pub fn log_filter(&self) -> EnvFilter {
        if self.quiet {
            return EnvFilter::new("off");
        }
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("nc_node=info,nc_blockchain=info"))
    }
}
