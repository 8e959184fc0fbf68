//! One-way salted password hashing.
//!
//! Thin wrapper over bcrypt so the cost factor lives in one place.

use bcrypt::BcryptError;

/// Matches the cost the upstream API used; raising it invalidates no
/// existing hashes (the cost is embedded in each hash string).
const BCRYPT_COST: u32 = 10;

/// Hash a plaintext password with a per-call random salt.
pub fn hash_password(plain: &str) -> Result<String, BcryptError> {
    bcrypt::hash(plain, BCRYPT_COST)
}

/// Verify a plaintext password against a stored hash.
///
/// A mismatch is `Ok(false)`, never an error; `Err` only signals a
/// malformed hash string.
pub fn verify_password(plain: &str, hashed: &str) -> Result<bool, BcryptError> {
    bcrypt::verify(plain, hashed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(verify_password("secret1", &hash).unwrap());
    }

    #[test]
    fn wrong_password_verifies_false_without_error() {
        let hash = hash_password("secret1").unwrap();
        assert!(!verify_password("not-the-password", &hash).unwrap());
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
    }
}
