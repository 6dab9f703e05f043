use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;
use crate::clock::Clock;
use crate::clock::SystemClock;

/// Default access token lifetime when none is configured.
pub const DEFAULT_TOKEN_LIFETIME_MINUTES: i64 = 30;

/// Issues and validates signed, time-bound identity tokens.
///
/// Tokens carry no server-side state: validity depends only on the signature,
/// the pinned algorithm and the current time reported by the clock. There is
/// no revocation; a leaked token stays valid until it expires.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    default_lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// Uses HS256, a 30 minute default lifetime and the system clock.
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            default_lifetime: Duration::minutes(DEFAULT_TOKEN_LIFETIME_MINUTES),
            clock: Arc::new(SystemClock),
        }
    }

    /// Pin the signing algorithm. Only HMAC algorithms fit a shared secret.
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - Algorithm is not HS256, HS384 or HS512
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Result<Self, JwtError> {
        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                self.algorithm = algorithm;
                Ok(self)
            }
            other => Err(JwtError::UnsupportedAlgorithm(format!("{:?}", other))),
        }
    }

    /// Lifetime applied by [`JwtHandler::issue`] when the caller passes none.
    pub fn with_default_lifetime(mut self, lifetime: Duration) -> Self {
        self.default_lifetime = lifetime;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn default_lifetime(&self) -> Duration {
        self.default_lifetime
    }

    /// Issue a token for `subject` expiring at `now + lifetime`.
    ///
    /// # Arguments
    /// * `subject` - Identifier stored in the `sub` claim
    /// * `lifetime` - Validity period, or the configured default when `None`
    ///
    /// # Errors
    /// * `EncodingFailed` - Expiry overflowed or claims could not be signed
    pub fn issue(&self, subject: &str, lifetime: Option<Duration>) -> Result<String, JwtError> {
        let lifetime = lifetime.unwrap_or(self.default_lifetime);
        let claims = Claims::for_subject(subject, self.clock.now(), lifetime).ok_or_else(|| {
            JwtError::EncodingFailed("token expiry is out of range".to_string())
        })?;

        self.encode(&claims)
    }

    /// Sign an explicit claim set.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode a token, verify its signature and algorithm, then check expiry.
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature, unexpected algorithm, malformed token
    /// * `TokenExpired` - Well-formed token whose `exp` is not after now
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        // Expiry is checked below against the injected clock, without leeway.
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                    ErrorKind::InvalidAlgorithm => {
                        JwtError::InvalidToken("unexpected signing algorithm".to_string())
                    }
                    _ => JwtError::InvalidToken(e.to_string()),
                }
            })?;

        let claims = token_data.claims;
        if claims.is_expired(self.clock.now().timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::DateTime;
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn at(now: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(now)))
        }

        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now = *now + by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_issue_and_validate() {
        let handler = JwtHandler::new(SECRET);

        let token = handler
            .issue("alice@example.com", None)
            .expect("Failed to issue token");
        assert_eq!(token.split('.').count(), 3);

        let claims = handler.validate(&token).expect("Failed to validate token");
        assert_eq!(claims.subject(), Some("alice@example.com"));
        assert_eq!(
            claims.exp - claims.iat.unwrap(),
            DEFAULT_TOKEN_LIFETIME_MINUTES * 60
        );
    }

    #[test]
    fn test_token_expires_exactly_at_lifetime() {
        let clock = ManualClock::at(t0());
        let handler = JwtHandler::new(SECRET).with_clock(clock.clone());
        let lifetime = Duration::minutes(30);

        let token = handler.issue("alice@example.com", Some(lifetime)).unwrap();

        clock.advance(lifetime - Duration::seconds(1));
        assert!(handler.validate(&token).is_ok());

        clock.advance(Duration::seconds(2));
        assert_eq!(handler.validate(&token), Err(JwtError::TokenExpired));
    }

    #[test]
    fn test_default_lifetime_is_configurable() {
        let clock = ManualClock::at(t0());
        let handler = JwtHandler::new(SECRET)
            .with_clock(clock.clone())
            .with_default_lifetime(Duration::minutes(5));

        let token = handler.issue("alice@example.com", None).unwrap();

        clock.advance(Duration::minutes(4));
        assert!(handler.validate(&token).is_ok());

        clock.advance(Duration::minutes(2));
        assert_eq!(handler.validate(&token), Err(JwtError::TokenExpired));
    }

    #[test]
    fn test_decode_invalid_token() {
        let handler = JwtHandler::new(SECRET);

        let result = handler.validate("invalid.token.here");
        assert!(matches!(result, Err(JwtError::InvalidToken(_))));

        let result = handler.validate("");
        assert!(matches!(result, Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!");

        let token = handler1.issue("alice@example.com", None).unwrap();

        let result = handler2.validate(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_rejects_other_algorithm_with_same_secret() {
        let hs256 = JwtHandler::new(SECRET);
        let hs512 = JwtHandler::new(SECRET)
            .with_algorithm(Algorithm::HS512)
            .unwrap();

        let token = hs512.issue("alice@example.com", None).unwrap();

        assert!(hs512.validate(&token).is_ok());
        assert!(matches!(
            hs256.validate(&token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_rejects_unsigned_token() {
        let handler = JwtHandler::new(SECRET);

        // {"alg":"none","typ":"JWT"} . {"sub":"alice@example.com","exp":9999999999} .
        let token = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.\
                     eyJzdWIiOiJhbGljZUBleGFtcGxlLmNvbSIsImV4cCI6OTk5OTk5OTk5OX0.";

        assert!(matches!(
            handler.validate(token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_rejects_asymmetric_algorithm() {
        let result = JwtHandler::new(SECRET).with_algorithm(Algorithm::RS256);
        assert!(matches!(result, Err(JwtError::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn test_token_without_exp_is_invalid() {
        let handler = JwtHandler::new(SECRET);
        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "sub": "alice@example.com" }),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(matches!(
            handler.validate(&token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_token_without_subject_still_decodes() {
        let handler = JwtHandler::new(SECRET);
        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "exp": Utc::now().timestamp() + 600 }),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let claims = handler.validate(&token).unwrap();
        assert_eq!(claims.subject(), None);
    }

    #[test]
    fn test_issue_with_unrepresentable_expiry() {
        let clock = ManualClock::at(DateTime::<Utc>::MAX_UTC);
        let handler = JwtHandler::new(SECRET).with_clock(clock);

        let result = handler.issue("alice@example.com", Some(Duration::minutes(1)));
        assert!(matches!(result, Err(JwtError::EncodingFailed(_))));
    }
}
