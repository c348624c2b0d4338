pub mod config;
pub mod error;
pub mod event;
pub mod node;
pub mod report;

pub use config::{NodeConfig, SignaturePolicy};
pub use error::NodeError;
pub use event::NodeEvent;
pub use node::Node;
pub use report::{BlockReport, ChainReport, TransactionLine};
