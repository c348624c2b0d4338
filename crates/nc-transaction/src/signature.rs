use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;

/// Asymmetric signing contract a transaction must satisfy before the calling
/// layer hands it to the ledger.
///
/// `verify` is total: malformed input or a mismatched key yields `false`,
/// never an error.
pub trait SignatureScheme {
    type PublicKey;
    type PrivateKey;
    type Signature;

    fn generate_keypair(&self) -> (Self::PublicKey, Self::PrivateKey);

    fn sign(&self, private_key: &Self::PrivateKey, message: &[u8]) -> Self::Signature;

    fn verify(
        &self,
        public_key: &Self::PublicKey,
        message: &[u8],
        signature: &Self::Signature,
    ) -> bool;
}

/// Ed25519 signatures backed by `ed25519-dalek`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ed25519;

impl SignatureScheme for Ed25519 {
    type PublicKey = VerifyingKey;
    type PrivateKey = SigningKey;
    type Signature = Signature;

    fn generate_keypair(&self) -> (VerifyingKey, SigningKey) {
        let signing_key = SigningKey::generate(&mut OsRng);
        (signing_key.verifying_key(), signing_key)
    }

    fn sign(&self, private_key: &SigningKey, message: &[u8]) -> Signature {
        private_key.sign(message)
    }

    fn verify(&self, public_key: &VerifyingKey, message: &[u8], signature: &Signature) -> bool {
        public_key.verify(message, signature).is_ok()
    }
}

impl Ed25519 {
    /// Verify raw key and signature bytes as carried inside a transaction.
    ///
    /// Wrong lengths or a point that does not decode count as a failed
    /// verification.
    pub fn verify_bytes(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
        let Ok(key_bytes) = <[u8; 32]>::try_from(public_key) else {
            return false;
        };
        let Ok(public_key) = VerifyingKey::from_bytes(&key_bytes) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        self.verify(&public_key, message, &signature)
    }
}

/// A signing identity: an Ed25519 private key and its public half.
#[derive(Debug, Clone)]
pub struct Keypair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl Keypair {
    /// Generate a fresh keypair from the OS random number generator.
    pub fn generate() -> Self {
        let (verifying_key, signing_key) = Ed25519.generate_keypair();
        Self {
            signing_key,
            verifying_key,
        }
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Hex-encoded public key, useful for display and logging.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Ed25519.sign(&self.signing_key, message)
    }
}
