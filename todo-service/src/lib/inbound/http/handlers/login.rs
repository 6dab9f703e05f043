use auth::AuthenticationError;
use axum::extract::State;
use axum::Form;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::LOGIN_REJECTED;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Exchange email and password for a bearer token.
///
/// An unknown email and a wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .user_service
        .get_user_by_email(&form.username)
        .await
        .map_err(|e| match e {
            UserError::NotFoundByEmail(_) => {
                tracing::info!("Login rejected: unknown email");
                rejection(state.authenticator.reject_unknown_subject(&form.password))
            }
            _ => ApiError::from(e),
        })?;

    let result = state
        .authenticator
        .authenticate(&form.password, &user.password_hash, user.email.as_str(), None)
        .map_err(|e| {
            if matches!(e, AuthenticationError::InvalidCredentials) {
                tracing::info!(user_id = %user.id, "Login rejected: wrong password");
            }
            rejection(e)
        })?;

    Ok(Json(TokenResponse {
        access_token: result.access_token,
        token_type: result.token_type.to_string(),
    }))
}

fn rejection(err: AuthenticationError) -> ApiError {
    match err {
        AuthenticationError::InvalidCredentials => {
            ApiError::Unauthorized(LOGIN_REJECTED.to_string())
        }
        AuthenticationError::PasswordError(err) => ApiError::internal(err),
        AuthenticationError::JwtError(err) => ApiError::internal(err),
    }
}

/// OAuth2 password-grant style form; `username` holds the email.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}
