use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;

use crate::domain::user::models::User;
use crate::user::errors::IdentityError;
use crate::user::ports::IdentityResolverPort;
use crate::user::ports::UserRepository;

/// Resolves bearer tokens to live user records.
pub struct IdentityResolver<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> IdentityResolver<UR>
where
    UR: UserRepository,
{
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }
}

#[async_trait]
impl<UR> IdentityResolverPort for IdentityResolver<UR>
where
    UR: UserRepository,
{
    async fn resolve(&self, token: &str) -> Result<User, IdentityError> {
        let claims = self.authenticator.validate_token(token)?;
        let email = claims.subject().ok_or(IdentityError::MissingSubject)?;

        self.repository
            .find_by_email(email)
            .await
            .map_err(IdentityError::Repository)?
            .ok_or(IdentityError::UnknownSubject)
    }
}
