use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_todo::create_todo;
use super::handlers::create_user::create_user;
use super::handlers::delete_todo::delete_todo;
use super::handlers::get_current_user::get_current_user;
use super::handlers::get_todo::get_todo;
use super::handlers::list_todos::list_todos;
use super::handlers::login::login;
use super::handlers::update_todo::update_todo;
use super::middleware::authenticate;
use crate::domain::todo::ports::TodoServicePort;
use crate::domain::user::ports::IdentityResolverPort;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub todo_service: Arc<dyn TodoServicePort>,
    pub identity_resolver: Arc<dyn IdentityResolverPort>,
    pub authenticator: Arc<Authenticator>,
}

pub fn create_router(
    user_service: Arc<dyn UserServicePort>,
    todo_service: Arc<dyn TodoServicePort>,
    identity_resolver: Arc<dyn IdentityResolverPort>,
    authenticator: Arc<Authenticator>,
) -> Router {
    let state = AppState {
        user_service,
        todo_service,
        identity_resolver,
        authenticator,
    };

    let public_routes = Router::new()
        .route("/token", post(login))
        .route("/users", post(create_user))
        .route("/users/", post(create_user));

    let protected_routes = Router::new()
        .route("/users/me", get(get_current_user))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/", get(list_todos).post(create_todo))
        .route(
            "/todos/:todo_id",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    // Headers stay out of the span: Authorization carries the bearer token.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
