//! Password digests for the credential store.
//!
//! The stored digest is produced by a single running SHA-512 state: the
//! plaintext is fed in, the hex digest is read without resetting, and that hex
//! string is fed back into the same state before the final hex digest is taken.
//! The result is `SHA-512(plaintext || hex(SHA-512(plaintext)))`, which is NOT
//! the same as hashing the first hex digest on a fresh state. Existing
//! `auth.json` files depend on this exact feed order.
//!
//! There is no salt and no iteration count. Replacing the scheme requires a
//! store-format version bump.

use sha2::{Digest, Sha512};

/// Digest a plaintext password into its stored form.
pub fn hash_password(plaintext: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(plaintext.as_bytes());
    let first = format!("{:x}", hasher.clone().finalize());
    hasher.update(first.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compare a candidate password against a stored digest.
pub fn verify_password(candidate: &str, stored_digest: &str) -> bool {
    hash_password(candidate) == stored_digest
}
