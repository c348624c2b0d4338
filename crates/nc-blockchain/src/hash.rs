//! SHA-256 helpers shared by block hashing and the difficulty predicate.

use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest.
pub const HASH_HEX_LEN: usize = 64;

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Returns `true` when `hash_hex` starts with at least `difficulty` `'0'`
/// characters.
pub fn meets_difficulty(hash_hex: &str, difficulty: u32) -> bool {
    leading_zeros(hash_hex) >= difficulty as usize
}

/// Number of leading `'0'` characters in a hex string.
pub fn leading_zeros(hash_hex: &str) -> usize {
    hash_hex.bytes().take_while(|b| *b == b'0').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_64_lowercase_hex_chars() {
        let h = sha256_hex(b"abc");
        assert_eq!(h.len(), HASH_HEX_LEN);
        assert_eq!(
            h,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn zero_difficulty_always_holds() {
        assert!(meets_difficulty("ffff", 0));
    }

    #[test]
    fn difficulty_counts_prefix_only() {
        assert!(meets_difficulty("00a0", 2));
        assert!(!meets_difficulty("00a0", 3));
        assert!(!meets_difficulty("a000", 1));
        assert_eq!(leading_zeros("000f00"), 3);
    }
}
