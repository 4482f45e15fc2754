//! Salted one-way password hashing.
//!
//! Encoded form: `pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>`.
//! The round count travels with each hash so raising
//! `hashing.iterations` never invalidates existing records.

use anyhow::{bail, Context, Result};
use sha2::Sha256;

/// Scheme tag at the front of every encoded hash.
const SCHEME: &str = "pbkdf2-sha256";

/// Salt byte length.
const SALT_BYTES: usize = 16;

/// Derived key length (one SHA-256 block).
const HASH_BYTES: usize = 32;

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str, iterations: u32) -> String {
    let salt: [u8; SALT_BYTES] = rand::random();
    encode(password, &salt, iterations)
}

fn encode(password: &str, salt: &[u8], iterations: u32) -> String {
    let derived = derive(password, salt, iterations);
    format!(
        "{SCHEME}${iterations}${}${}",
        hex::encode(salt),
        hex::encode(derived)
    )
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_BYTES] {
    let mut out = [0u8; HASH_BYTES];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

/// Parsed components of an encoded hash.
struct Encoded {
    iterations: u32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

fn parse(encoded: &str) -> Result<Encoded> {
    let mut parts = encoded.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        bail!("Malformed password hash");
    };
    if scheme != SCHEME {
        bail!("Unsupported password hash scheme '{scheme}'");
    }
    let iterations: u32 = iterations
        .parse()
        .context("Malformed password hash iteration count")?;
    if iterations == 0 {
        bail!("Password hash iteration count must be non-zero");
    }
    Ok(Encoded {
        iterations,
        salt: hex::decode(salt).context("Malformed password hash salt")?,
        hash: hex::decode(hash).context("Malformed password hash digest")?,
    })
}

/// Check `password` against an encoded hash.
///
/// A malformed stored hash never verifies.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    match parse(encoded) {
        Ok(stored) => {
            let attempt = derive(password, &stored.salt, stored.iterations);
            constant_time_eq(&attempt, &stored.hash)
        }
        Err(e) => {
            tracing::warn!("Stored password hash rejected: {e}");
            false
        }
    }
}

/// Burn the same work as a real verification so that an unknown email
/// costs as much as a wrong password.
pub fn dummy_verify(password: &str, iterations: u32) {
    let _ = derive(password, &[0u8; SALT_BYTES], iterations);
}

/// Constant-time byte comparison.
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

#[cfg(test)]
mod tests {
    use super::*;

    const ROUNDS: u32 = 1_000;

    #[test]
    fn hash_then_verify() {
        let encoded = hash_password("admin-secret", ROUNDS);
        assert!(encoded.starts_with("pbkdf2-sha256$1000$"));
        assert!(verify_password("admin-secret", &encoded));
        assert!(!verify_password("admin-secreT", &encoded));
        assert!(!verify_password("", &encoded));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("same", ROUNDS);
        let b = hash_password("same", ROUNDS);
        assert_ne!(a, b);
        assert!(verify_password("same", &a));
        assert!(verify_password("same", &b));
    }

    #[test]
    fn encoding_is_deterministic_with_fixed_salt() {
        let salt = [7u8; SALT_BYTES];
        assert_eq!(encode("pw", &salt, ROUNDS), encode("pw", &salt, ROUNDS));
        assert_ne!(encode("pw", &salt, ROUNDS), encode("pw", &salt, ROUNDS + 1));
    }

    #[test]
    fn verification_uses_stored_round_count() {
        let encoded = hash_password("pw", 2_000);
        assert!(verify_password("pw", &encoded));
    }

    #[test]
    fn plaintext_or_garbage_never_verifies() {
        assert!(!verify_password("admin123", "admin123"));
        assert!(!verify_password("pw", "pbkdf2-sha256$abc$00$00"));
        assert!(!verify_password("pw", "bcrypt$10$00$00"));
        assert!(!verify_password("pw", "pbkdf2-sha256$0$00$00"));
        assert!(!verify_password("pw", "pbkdf2-sha256$1000$zz$00"));
        assert!(!verify_password("pw", "pbkdf2-sha256$1000$00$00$extra"));
    }

    #[test]
    fn constant_time_eq_works() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"short", b"longer"));
    }
}
