use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: PgRow) -> Result<User, UserError> {
        let map_err = |e: sqlx::Error| UserError::DatabaseError(e.to_string());

        let id: Uuid = row.try_get("id").map_err(map_err)?;
        let username: String = row.try_get("username").map_err(map_err)?;
        let email: String = row.try_get("email").map_err(map_err)?;
        let password_hash: String = row.try_get("password_hash").map_err(map_err)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(map_err)?;

        decode_user(id, username, email, password_hash, created_at)
    }
}

/// Rebuild a user from stored columns. A row that no longer passes value
/// validation is a storage fault, not a client error.
fn decode_user(
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
) -> Result<User, UserError> {
    let corrupt = |field: &str, reason: String| {
        tracing::error!(user_id = %id, field, error = %reason, "Stored user row is invalid");
        UserError::DatabaseError(format!("stored user {} has invalid {}", id, field))
    };

    Ok(User {
        id: UserId(id),
        username: Username::new(username).map_err(|e| corrupt("username", e.to_string()))?,
        email: EmailAddress::new(email).map_err(|e| corrupt("email", e.to_string()))?,
        password_hash,
        created_at,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id.0)
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    if db_err.constraint() == Some("users_username_key") {
                        return UserError::UsernameAlreadyExists(
                            user.username.as_str().to_string(),
                        );
                    }
                    if db_err.constraint() == Some("users_email_key") {
                        return UserError::EmailAlreadyExists(user.email.as_str().to_string());
                    }
                }
            }
            tracing::error!(error = %e, "Failed to insert user");
            UserError::DatabaseError(e.to_string())
        })?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        sqlx::query(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?
        .map(Self::row_to_user)
        .transpose()
    }
}
