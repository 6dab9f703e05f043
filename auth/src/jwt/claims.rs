use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Identity token payload.
///
/// `sub` carries the user's email. It is optional at the wire level so that a
/// token without a subject still decodes and can be rejected by the identity
/// resolver rather than by the JSON parser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user email)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,

    /// Issued at (Unix timestamp, seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// Build claims for `subject` issued at `issued_at` and valid for `lifetime`.
    ///
    /// Returns `None` when `issued_at + lifetime` is not representable.
    pub fn for_subject(
        subject: impl ToString,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Option<Self> {
        let expiration = issued_at.checked_add_signed(lifetime)?;

        Some(Self {
            sub: Some(subject.to_string()),
            exp: expiration.timestamp(),
            iat: Some(issued_at.timestamp()),
        })
    }

    /// Subject, if present and non-blank.
    pub fn subject(&self) -> Option<&str> {
        self.sub
            .as_deref()
            .map(str::trim)
            .filter(|sub| !sub.is_empty())
    }

    /// A token is usable strictly before its expiry instant.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}
