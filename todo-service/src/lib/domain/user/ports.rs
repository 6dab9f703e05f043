use async_trait::async_trait;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::User;
use crate::user::errors::IdentityError;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Arguments
    /// * `command` - Validated command containing username, email, and password
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `EmptyPassword` - Password is empty
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `Password` - Hashing backend failed
    /// * `DatabaseError` - Database operation failed
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError>;

    /// Retrieve user by email address (surrounding whitespace ignored).
    ///
    /// # Errors
    /// * `NotFoundByEmail` - No user with this email
    /// * `DatabaseError` - Database operation failed
    async fn get_user_by_email(&self, email: &str) -> Result<User, UserError>;
}

/// Converts a bearer token into the live user it names.
#[async_trait]
pub trait IdentityResolverPort: Send + Sync + 'static {
    /// Validate `token` and load the user named by its subject.
    ///
    /// Performs exactly one repository read and caches nothing, so a user
    /// removed after issuance is rejected on the next request.
    ///
    /// # Errors
    /// * `InvalidToken` / `TokenExpired` - Token rejected by the token service
    /// * `MissingSubject` - Claims carry no usable subject
    /// * `UnknownSubject` - No user with that email exists
    /// * `Repository` - Lookup failed
    async fn resolve(&self, token: &str) -> Result<User, IdentityError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by exact email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
}
