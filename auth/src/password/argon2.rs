use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::Error as PasswordHashError;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::PasswordError;

/// Salted one-way password hashing (Argon2id, PHC string output).
///
/// Each call to [`PasswordHasher::hash`] draws a fresh salt from the OS RNG,
/// so hashing the same password twice yields two different strings that both
/// verify against it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Create a hasher with the Argon2id default cost parameters.
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password.
    ///
    /// # Returns
    /// PHC string (algorithm, parameters, salt and digest)
    ///
    /// # Errors
    /// * `HashingFailed` - The primitive rejected the input or its parameters
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// Never fails: a malformed hash or a backend error counts as a mismatch.
    /// Callers that need to tell the two apart use [`PasswordHasher::check`].
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        self.check(password, hash).unwrap_or(false)
    }

    /// Verify a password, separating a mismatch from an unusable hash.
    ///
    /// # Returns
    /// `Ok(true)` on match, `Ok(false)` on mismatch
    ///
    /// # Errors
    /// * `MalformedHash` - Stored hash is not a parseable PHC string
    /// * `VerificationFailed` - The primitive failed for another reason
    pub fn check(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

        // Comparison of digests is constant time inside password_hash.
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(password, &hash));
        assert!(!hasher.verify("wrong_password", &hash));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let hasher = PasswordHasher::new();

        let first = hasher.hash("hunter2").unwrap();
        let second = hasher.hash("hunter2").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("hunter2", &first));
        assert!(hasher.verify("hunter2", &second));
    }

    #[test]
    fn test_empty_password_is_hashed_and_verifiable() {
        let hasher = PasswordHasher::new();

        let hash = hasher.hash("").expect("Empty password should hash");

        assert!(hasher.verify("", &hash));
        assert!(!hasher.verify("not-empty", &hash));
    }

    #[test]
    fn test_empty_hash_never_verifies() {
        let hasher = PasswordHasher::new();

        assert!(!hasher.verify("", ""));
        assert!(!hasher.verify("password", ""));
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = PasswordHasher::new();

        assert!(!hasher.verify("password", "invalid_hash"));
        assert!(matches!(
            hasher.check("password", "invalid_hash"),
            Err(PasswordError::MalformedHash(_))
        ));
    }

    #[test]
    fn test_check_reports_mismatch_as_false() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("correct horse").unwrap();

        assert!(matches!(hasher.check("battery staple", &hash), Ok(false)));
        assert!(matches!(hasher.check("correct horse", &hash), Ok(true)));
    }
}
