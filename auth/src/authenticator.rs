use chrono::Duration;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Token type reported alongside every issued access token.
pub const BEARER_TOKEN_TYPE: &str = "bearer";

/// Authentication coordinator combining password verification and JWT generation.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    /// Verified against when the subject is unknown, so that path costs one
    /// Argon2 run like a wrong password does.
    decoy_hash: Option<String>,
}

const DECOY_PASSWORD: &str = "decoy-password-never-assigned";

/// Result of successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
    /// Always [`BEARER_TOKEN_TYPE`]
    pub token_type: &'static str,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create an authenticator with HS256 and default token lifetime.
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self::with_handler(JwtHandler::new(jwt_secret))
    }

    /// Create an authenticator around a fully configured token handler.
    pub fn with_handler(jwt_handler: JwtHandler) -> Self {
        let password_hasher = PasswordHasher::new();
        let decoy_hash = match password_hasher.hash(DECOY_PASSWORD) {
            Ok(hash) => Some(hash),
            Err(e) => {
                tracing::warn!(error = %e, "Decoy password hash unavailable");
                None
            }
        };

        Self {
            password_hasher,
            jwt_handler,
            decoy_hash,
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue an access token for `subject`.
    ///
    /// A stored hash that cannot be used is logged and reported as
    /// `InvalidCredentials`, the same outcome as a wrong password.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match or hash is unusable
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &str,
        lifetime: Option<Duration>,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        match self.password_hasher.check(password, stored_hash) {
            Ok(true) => {}
            Ok(false) => return Err(AuthenticationError::InvalidCredentials),
            Err(e) => {
                tracing::warn!(subject = %subject, error = %e, "Stored password hash unusable");
                return Err(AuthenticationError::InvalidCredentials);
            }
        }

        let access_token = self.jwt_handler.issue(subject, lifetime)?;

        Ok(AuthenticationResult {
            access_token,
            token_type: BEARER_TOKEN_TYPE,
        })
    }

    /// Reject a login for a subject with no stored hash.
    ///
    /// The submitted password is still run through Argon2 against a decoy
    /// hash, so response time does not reveal whether the account exists.
    pub fn reject_unknown_subject(&self, password: &str) -> AuthenticationError {
        if let Some(decoy_hash) = &self.decoy_hash {
            let _ = self.password_hasher.check(password, decoy_hash);
        }

        AuthenticationError::InvalidCredentials
    }

    /// Issue a token without password verification.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn generate_token(
        &self,
        subject: &str,
        lifetime: Option<Duration>,
    ) -> Result<String, JwtError> {
        self.jwt_handler.issue(subject, lifetime)
    }

    /// Validate and decode a token.
    ///
    /// # Errors
    /// * `JwtError` - Token validation or decoding failed
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.validate(token)
    }
}
