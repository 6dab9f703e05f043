use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::todo::errors::TodoError;
use crate::domain::todo::models::CreateTodoCommand;
use crate::domain::todo::models::Page;
use crate::domain::todo::models::Todo;
use crate::domain::todo::models::TodoId;
use crate::domain::todo::models::UpdateTodoCommand;
use crate::domain::todo::ports::TodoRepository;
use crate::domain::todo::ports::TodoServicePort;
use crate::domain::user::models::UserId;

/// Domain service implementation for todo operations.
pub struct TodoService<TR>
where
    TR: TodoRepository,
{
    repository: Arc<TR>,
}

impl<TR> TodoService<TR>
where
    TR: TodoRepository,
{
    pub fn new(repository: Arc<TR>) -> Self {
        Self { repository }
    }

    async fn owned_todo(&self, owner: &UserId, id: &TodoId) -> Result<Todo, TodoError> {
        match self.repository.find_by_id(id).await? {
            Some(todo) if todo.is_owned_by(owner) => Ok(todo),
            Some(_) => {
                tracing::warn!(todo_id = %id, user_id = %owner, "Access to todo owned by another user");
                Err(TodoError::NotFound(id.to_string()))
            }
            None => Err(TodoError::NotFound(id.to_string())),
        }
    }
}

#[async_trait]
impl<TR> TodoServicePort for TodoService<TR>
where
    TR: TodoRepository,
{
    async fn list_todos(&self, owner: &UserId, page: Page) -> Result<Vec<Todo>, TodoError> {
        self.repository.list_by_owner(owner, page).await
    }

    async fn create_todo(
        &self,
        owner: &UserId,
        command: CreateTodoCommand,
    ) -> Result<Todo, TodoError> {
        let todo = Todo {
            id: TodoId::new(),
            title: command.title,
            description: Some(command.description),
            completed: false,
            created_at: Utc::now(),
            owner_id: *owner,
        };

        self.repository.create(todo).await
    }

    async fn get_todo(&self, owner: &UserId, id: &TodoId) -> Result<Todo, TodoError> {
        self.owned_todo(owner, id).await
    }

    async fn update_todo(
        &self,
        owner: &UserId,
        id: &TodoId,
        command: UpdateTodoCommand,
    ) -> Result<Todo, TodoError> {
        let mut todo = self.owned_todo(owner, id).await?;

        todo.title = command.title;
        todo.description = command.description;
        todo.completed = command.completed;

        self.repository.update(todo).await
    }

    async fn delete_todo(&self, owner: &UserId, id: &TodoId) -> Result<Todo, TodoError> {
        let todo = self.owned_todo(owner, id).await?;
        self.repository.delete(id).await?;

        Ok(todo)
    }
}
