use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::todo::errors::TodoError;
use crate::domain::todo::models::Page;
use crate::domain::todo::models::Todo;
use crate::domain::todo::models::TodoId;
use crate::domain::todo::models::TodoTitle;
use crate::domain::todo::ports::TodoRepository;
use crate::domain::user::models::UserId;

pub struct PostgresTodoRepository {
    pool: PgPool,
}

impl PostgresTodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_todo(row: PgRow) -> Result<Todo, TodoError> {
        let map_err = |e: sqlx::Error| TodoError::DatabaseError(e.to_string());

        let id: Uuid = row.try_get("id").map_err(map_err)?;
        let title: String = row.try_get("title").map_err(map_err)?;
        let description: Option<String> = row.try_get("description").map_err(map_err)?;
        let completed: bool = row.try_get("completed").map_err(map_err)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(map_err)?;
        let owner_id: Uuid = row.try_get("owner_id").map_err(map_err)?;

        Ok(Todo {
            id: TodoId(id),
            title: TodoTitle::new(title).map_err(|e| {
                tracing::error!(todo_id = %id, error = %e, "Stored todo row is invalid");
                TodoError::DatabaseError(format!("stored todo {} has invalid title", id))
            })?,
            description,
            completed,
            created_at,
            owner_id: UserId(owner_id),
        })
    }
}

#[async_trait]
impl TodoRepository for PostgresTodoRepository {
    async fn create(&self, todo: Todo) -> Result<Todo, TodoError> {
        sqlx::query(
            r#"
            INSERT INTO todos (id, title, description, completed, created_at, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(todo.id.0)
        .bind(todo.title.as_str())
        .bind(todo.description.as_deref())
        .bind(todo.completed)
        .bind(todo.created_at)
        .bind(todo.owner_id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, todo_id = %todo.id, "Failed to insert todo");
            TodoError::DatabaseError(e.to_string())
        })?;

        Ok(todo)
    }

    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>, TodoError> {
        sqlx::query(
            r#"
            SELECT id, title, description, completed, created_at, owner_id
            FROM todos
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TodoError::DatabaseError(e.to_string()))?
        .map(Self::row_to_todo)
        .transpose()
    }

    async fn list_by_owner(&self, owner: &UserId, page: Page) -> Result<Vec<Todo>, TodoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, completed, created_at, owner_id
            FROM todos
            WHERE owner_id = $1
            ORDER BY created_at DESC, id
            OFFSET $2
            LIMIT $3
            "#,
        )
        .bind(owner.0)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| TodoError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(Self::row_to_todo).collect()
    }

    async fn update(&self, todo: Todo) -> Result<Todo, TodoError> {
        let result = sqlx::query(
            r#"
            UPDATE todos
            SET title = $2, description = $3, completed = $4
            WHERE id = $1
            "#,
        )
        .bind(todo.id.0)
        .bind(todo.title.as_str())
        .bind(todo.description.as_deref())
        .bind(todo.completed)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, todo_id = %todo.id, "Failed to update todo");
            TodoError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            return Err(TodoError::NotFound(todo.id.to_string()));
        }

        Ok(todo)
    }

    async fn delete(&self, id: &TodoId) -> Result<(), TodoError> {
        let result = sqlx::query(
            r#"
            DELETE FROM todos
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, todo_id = %id, "Failed to delete todo");
            TodoError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            return Err(TodoError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
