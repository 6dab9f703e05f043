use async_trait::async_trait;

use crate::domain::todo::errors::TodoError;
use crate::domain::todo::models::CreateTodoCommand;
use crate::domain::todo::models::Page;
use crate::domain::todo::models::Todo;
use crate::domain::todo::models::TodoId;
use crate::domain::todo::models::UpdateTodoCommand;
use crate::domain::user::models::UserId;

/// Port for todo domain service operations.
///
/// Every operation is scoped to `owner`; a todo belonging to another user is
/// indistinguishable from a missing one.
#[async_trait]
pub trait TodoServicePort: Send + Sync + 'static {
    /// List the owner's todos, newest first.
    async fn list_todos(&self, owner: &UserId, page: Page) -> Result<Vec<Todo>, TodoError>;

    /// Create a todo owned by `owner`.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn create_todo(&self, owner: &UserId, command: CreateTodoCommand)
        -> Result<Todo, TodoError>;

    /// # Errors
    /// * `NotFound` - Todo does not exist or belongs to another user
    async fn get_todo(&self, owner: &UserId, id: &TodoId) -> Result<Todo, TodoError>;

    /// Replace title, description and completion flag.
    ///
    /// # Errors
    /// * `NotFound` - Todo does not exist or belongs to another user
    /// * `DatabaseError` - Database operation failed
    async fn update_todo(
        &self,
        owner: &UserId,
        id: &TodoId,
        command: UpdateTodoCommand,
    ) -> Result<Todo, TodoError>;

    /// Delete a todo and return its last state.
    ///
    /// # Errors
    /// * `NotFound` - Todo does not exist or belongs to another user
    /// * `DatabaseError` - Database operation failed
    async fn delete_todo(&self, owner: &UserId, id: &TodoId) -> Result<Todo, TodoError>;
}

/// Persistence operations for todo aggregate.
#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    async fn create(&self, todo: Todo) -> Result<Todo, TodoError>;

    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>, TodoError>;

    /// Owner's todos ordered by creation time, newest first.
    async fn list_by_owner(&self, owner: &UserId, page: Page) -> Result<Vec<Todo>, TodoError>;

    /// # Errors
    /// * `NotFound` - No row with the todo's ID
    async fn update(&self, todo: Todo) -> Result<Todo, TodoError>;

    /// # Errors
    /// * `NotFound` - No row with this ID
    async fn delete(&self, id: &TodoId) -> Result<(), TodoError>;
}
