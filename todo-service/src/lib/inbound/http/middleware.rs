use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::user::models::User;
use crate::domain::user::ports::IdentityResolverPort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::CREDENTIALS_REJECTED;
use crate::inbound::http::router::AppState;

/// Request extension carrying the user resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Middleware that resolves the bearer token to a live user and stores it in
/// the request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&req)?;
    let user = state.identity_resolver.resolve(&token).await?;

    tracing::debug!(user_id = %user.id, "Request authenticated");
    req.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(req).await)
}

fn extract_bearer_token(req: &Request) -> Result<String, ApiError> {
    let rejected = || ApiError::Unauthorized(CREDENTIALS_REJECTED.to_string());

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| {
            tracing::debug!("Missing Authorization header");
            rejected()
        })?
        .to_str()
        .map_err(|_| rejected())?;

    parse_bearer(header).map(str::to_string).ok_or_else(|| {
        tracing::debug!("Authorization header is not a bearer credential");
        rejected()
    })
}

/// Token part of `Bearer <token>`; the scheme is matched case-insensitively.
fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
