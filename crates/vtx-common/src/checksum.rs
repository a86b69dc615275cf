//! Checksum utilities for dataset fingerprints

use sha2::{Digest, Sha256};

/// Compute the SHA-256 of an in-memory buffer as lowercase hex
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Short form used in reports
pub fn short(checksum: &str) -> &str {
    checksum.get(..12).unwrap_or(checksum)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_WORLD: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn test_sha256_hex() {
        assert_eq!(sha256_hex(b"hello world"), HELLO_WORLD);
    }

    #[test]
    fn test_short() {
        assert_eq!(short(HELLO_WORLD), "b94d27b9934d");
        assert_eq!(short("abc"), "abc");
    }
}
