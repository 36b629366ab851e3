//! Digest computation and equality of canonical forms

use crate::canonical::CanonicalForm;
use sha2::{Digest, Sha256};

/// Result of comparing a local and a remote canonical form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub equal: bool,
    pub local_digest: String,
    pub remote_digest: String,
}

/// Compare two canonical forms
///
/// Equality is decided on the canonical strings themselves; the digests are
/// reported alongside for traceability.
pub fn compare(local: &CanonicalForm, remote: &CanonicalForm) -> Comparison {
    Comparison {
        equal: local.as_str() == remote.as_str(),
        local_digest: digest(local),
        remote_digest: digest(remote),
    }
}

/// Lowercase hex SHA-256 of a canonical form's UTF-8 bytes
pub fn digest(canonical: &CanonicalForm) -> String {
    hash_string(canonical.as_str())
}

fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
