pub mod signature;
pub mod transaction;

pub use signature::{Ed25519, Keypair, SignatureScheme};
pub use transaction::Transaction;
