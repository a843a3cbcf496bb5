//! Content checksums recorded in snapshot metadata
//!
//! Format: `sha256:<lowercase hex>`.

use sha2::{Digest, Sha256};

const PREFIX: &str = "sha256:";

/// Checksum of a note's bytes.
pub fn compute_checksum(content: &[u8]) -> String {
    format!("{PREFIX}{:x}", Sha256::digest(content))
}
