//! Password hashing and verification.
//!
//! Stored format is `"{salt}:{digest_hex}"` with a random 16-character salt
//! and a SHA-256 digest over password + salt. Digest comparison is
//! constant-time.

use rand::RngExt;
use rand::distr::Alphanumeric;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect();
    let digest_hex = digest_with_salt(password, &salt);
    format!("{}:{}", salt, digest_hex)
}

/// Verify a password against its stored hash.
///
/// Malformed stored values verify as false rather than erroring; they can
/// only come from a corrupted record.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest_hex)) = stored.split_once(':') else {
        return false;
    };
    let computed = digest_with_salt(password, salt);
    constant_time_eq(computed.as_bytes(), digest_hex.as_bytes())
}

fn digest_with_salt(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
