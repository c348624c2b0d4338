use std::collections::HashMap;

use clap::{Parser, ValueEnum};
use nc_blockchain::LedgerConfig;
use nc_node::{Node, NodeConfig, NodeError, SignaturePolicy};
use nc_transaction::{Keypair, Transaction};
use tracing::{info, warn};

/// Transactions recorded when none are given on the command line.
const DEMO_TRANSACTIONS: [&str; 3] = [
    "Anna sends 2 NC to Mike",
    "Bob sends 4 NC to Mike",
    "Harry sends 10 NC to Charlie",
];

/// Neighborhood Coins ledger node.
#[derive(Parser, Debug)]
#[command(
    name = "nc-node",
    version,
    about = "Neighborhood Coins proof-of-work ledger",
    long_about = "Signs and submits transactions, mines them into hash-chained \
                  proof-of-work blocks, then prints the chain and checks its integrity."
)]
struct Cli {
    /// Number of leading zero hex characters required in a block hash.
    #[arg(short, long, default_value_t = nc_blockchain::DEFAULT_DIFFICULTY, env = "NC_DIFFICULTY")]
    difficulty: u32,

    /// Mine automatically whenever this many transactions are pending.
    #[arg(short, long, env = "NC_BATCH_SIZE")]
    batch_size: Option<usize>,

    /// Transaction text to record (repeatable).  Defaults to a demo set.
    #[arg(short, long = "tx", value_name = "TEXT")]
    transactions: Vec<String>,

    /// Submit transactions without signing them.
    #[arg(long, default_value_t = false)]
    unsigned: bool,

    /// Signature check applied before transactions reach the pool.
    #[arg(short, long, default_value = "require", env = "NC_POLICY")]
    policy: CliPolicy,

    /// Print the chain as JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Suppress log output.
    #[arg(short, long, default_value_t = false, env = "NC_QUIET")]
    quiet: bool,
}

#[derive(ValueEnum, Debug, Clone)]
enum CliPolicy {
    /// Reject unsigned or badly signed transactions.
    Require,
    /// Accept unsigned transactions; reject bad signatures.
    #[value(name = "verify-if-present")]
    VerifyIfPresent,
    /// Accept everything.
    Skip,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = NodeConfig {
        ledger: LedgerConfig::with_difficulty(cli.difficulty),
        batch_size: cli.batch_size,
        signature_policy: match cli.policy {
            CliPolicy::Require => SignaturePolicy::Require,
            CliPolicy::VerifyIfPresent => SignaturePolicy::VerifyIfPresent,
            CliPolicy::Skip => SignaturePolicy::Skip,
        },
        quiet: cli.quiet,
    };

    tracing_subscriber::fmt()
        .with_env_filter(config.log_filter())
        .with_writer(std::io::stderr)
        .init();

    let (node, mut events) = Node::new(config)?;

    let logger = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            info!("NodeEvent: {event:?}");
        }
    });

    let payloads = if cli.transactions.is_empty() {
        DEMO_TRANSACTIONS.iter().map(|s| s.to_string()).collect()
    } else {
        cli.transactions
    };

    // One identity per sender, keyed on the first word of the payload.
    let mut wallets: HashMap<String, Keypair> = HashMap::new();

    for payload in payloads {
        let tx = if cli.unsigned {
            Transaction::new(payload)
        } else {
            let sender = payload.split_whitespace().next().unwrap_or_default().to_string();
            let keypair = wallets.entry(sender).or_insert_with_key(|sender| {
                let keypair = Keypair::generate();
                info!(%sender, public_key = %keypair.public_key_hex(), "Generated sender key");
                keypair
            });
            Transaction::signed(payload, keypair)
        };

        match node.submit(tx).await {
            Ok(_) => {}
            Err(err @ (NodeError::Unsigned | NodeError::InvalidSignature)) => {
                warn!("Skipping transaction: {err}");
            }
            Err(err) => return Err(err.into()),
        }
    }

    node.flush().await?;
    let valid = node.verify();
    let report = node.report();

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{report}");
    }

    drop(node);
    logger.await?;

    if !valid {
        anyhow::bail!("chain failed integrity verification");
    }

    Ok(())
}
