use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::todo::errors::TodoError;
use crate::domain::todo::errors::TodoIdError;
use crate::domain::todo::errors::TodoTitleError;
use crate::domain::user::models::UserId;

/// A single todo item, always owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub title: TodoTitle,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub owner_id: UserId,
}

impl Todo {
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.owner_id == *user_id
    }
}

/// Todo unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TodoId(pub Uuid);

impl TodoId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a todo ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, TodoIdError> {
        Uuid::parse_str(s)
            .map(TodoId)
            .map_err(|e| TodoIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Non-blank title of at most 255 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoTitle(String);

impl TodoTitle {
    const MAX_LENGTH: usize = 255;

    pub fn new(title: String) -> Result<Self, TodoTitleError> {
        if title.trim().is_empty() {
            return Err(TodoTitleError::Empty);
        }

        let length = title.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(TodoTitleError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        Ok(Self(title))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

const DESCRIPTION_MAX_LENGTH: usize = 255;

fn check_description(description: Option<String>) -> Result<Option<String>, TodoError> {
    match description {
        Some(text) if text.chars().count() > DESCRIPTION_MAX_LENGTH => {
            Err(TodoError::DescriptionTooLong {
                max: DESCRIPTION_MAX_LENGTH,
                actual: text.chars().count(),
            })
        }
        other => Ok(other),
    }
}

/// Command to create a todo. Both title and description must be present.
#[derive(Debug)]
pub struct CreateTodoCommand {
    pub title: TodoTitle,
    pub description: String,
}

impl CreateTodoCommand {
    /// # Errors
    /// * `MissingTitleOrDescription` - Title or description absent or blank
    /// * `InvalidTitle` - Title too long
    /// * `DescriptionTooLong` - Description longer than 255 characters
    pub fn new(title: String, description: Option<String>) -> Result<Self, TodoError> {
        let description = description
            .filter(|text| !text.trim().is_empty())
            .ok_or(TodoError::MissingTitleOrDescription)?;
        if title.trim().is_empty() {
            return Err(TodoError::MissingTitleOrDescription);
        }

        let title = TodoTitle::new(title)?;
        let description = check_description(Some(description))?.unwrap_or_default();

        Ok(Self { title, description })
    }
}

/// Command replacing every mutable field of a todo.
#[derive(Debug)]
pub struct UpdateTodoCommand {
    pub title: TodoTitle,
    pub description: Option<String>,
    pub completed: bool,
}

impl UpdateTodoCommand {
    /// # Errors
    /// * `InvalidTitle` - Title blank or too long
    /// * `DescriptionTooLong` - Description longer than 255 characters
    pub fn new(
        title: String,
        description: Option<String>,
        completed: bool,
    ) -> Result<Self, TodoError> {
        Ok(Self {
            title: TodoTitle::new(title)?,
            description: check_description(description)?,
            completed,
        })
    }
}

/// Offset pagination window over a user's todos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    /// Defaults to the first 10 items; `limit` is clamped to 1..=100.
    pub fn new(skip: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            skip: skip.map(i64::from).unwrap_or(0),
            limit: limit
                .map(i64::from)
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}
