use std::fmt;

use serde::{Deserialize, Serialize};

use crate::signature::{Ed25519, Keypair};

/// A single assertion recorded on the ledger, e.g. `"Anna sends 2 NC to Mike"`.
///
/// The payload is opaque text: nothing in the ledger parses it.  A
/// transaction may carry a detached Ed25519 signature over the payload bytes
/// together with the signer's public key.  Whether unsigned transactions are
/// acceptable is decided by the caller before submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The assertion text.
    pub payload: String,

    /// Detached signature over `payload`.
    #[serde(default, with = "hex_option", skip_serializing_if = "Option::is_none")]
    pub signature: Option<Vec<u8>>,

    /// Public key of the signer.
    #[serde(default, with = "hex_option", skip_serializing_if = "Option::is_none")]
    pub public_key: Option<Vec<u8>>,
}

impl Transaction {
    /// Create a new unsigned transaction.
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            signature: None,
            public_key: None,
        }
    }

    /// Create a transaction signed by `keypair`.
    pub fn signed(payload: impl Into<String>, keypair: &Keypair) -> Self {
        let mut tx = Self::new(payload);
        tx.sign(keypair);
        tx
    }

    /// The bytes covered by the signature.
    pub fn message(&self) -> &[u8] {
        self.payload.as_bytes()
    }

    /// Sign (or re-sign) the payload, replacing any previous signature.
    pub fn sign(&mut self, keypair: &Keypair) {
        self.signature = Some(keypair.sign(self.message()).to_bytes().to_vec());
        self.public_key = Some(keypair.public_key_bytes().to_vec());
    }

    /// True when both a signature and a public key are attached.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some() && self.public_key.is_some()
    }

    /// Check the attached signature against the attached public key.
    ///
    /// Returns `false` for unsigned transactions and for malformed keys or
    /// signatures.
    pub fn verify_signature(&self) -> bool {
        match (&self.public_key, &self.signature) {
            (Some(public_key), Some(signature)) => {
                Ed25519.verify_bytes(public_key, self.message(), signature)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.payload)
    }
}

impl From<&str> for Transaction {
    fn from(payload: &str) -> Self {
        Self::new(payload)
    }
}

impl From<String> for Transaction {
    fn from(payload: String) -> Self {
        Self::new(payload)
    }
}

/// Serialise optional byte fields as lowercase hex strings.
mod hex_option {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_some(&hex::encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| hex::decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
