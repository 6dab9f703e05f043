use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::TodoData;
use crate::domain::todo::models::Page;
use crate::domain::todo::ports::TodoServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListTodosQuery {
    skip: Option<u32>,
    limit: Option<u32>,
}

pub async fn list_todos(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Query(query): Query<ListTodosQuery>,
) -> Result<ApiSuccess<Vec<TodoData>>, ApiError> {
    let page = Page::new(query.skip, query.limit);

    state
        .todo_service
        .list_todos(&user.id, page)
        .await
        .map_err(ApiError::from)
        .map(|todos| ApiSuccess::new(StatusCode::OK, todos.iter().map(TodoData::from).collect()))
}
