use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `contents`.
///
/// Used for both the fetched state and the stored object so the two can be compared for drift.
pub fn sha256_hex(contents: &[u8]) -> String {
    hex::encode(Sha256::digest(contents))
}
