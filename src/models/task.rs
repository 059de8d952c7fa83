use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Input structure for creating or updating a task.
///
/// There is deliberately no owner field: the owner always comes from the
/// authenticated principal, and any `user_id` a client sends is ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Defaults to `false` when omitted.
    #[serde(default)]
    pub is_completed: bool,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    /// Identifier of the owning user. Never changes after creation.
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query parameters for filtering the caller's own tasks.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Only tasks with this completion flag.
    pub completed: Option<bool>,
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
}

impl Task {
    /// Creates a new `Task` owned by `user_id`, stamped with a fresh id and the current time.
    pub fn new(input: TaskInput, user_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            is_completed: input.is_completed,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this task passes the filters in `query`.
    pub fn matches(&self, query: &TaskQuery) -> bool {
        if let Some(completed) = query.completed {
            if self.is_completed != completed {
                return false;
            }
        }
        match query.search.as_deref() {
            Some(term) => {
                let term = term.to_lowercase();
                self.title.to_lowercase().contains(&term)
                    || self
                        .description
                        .as_deref()
                        .map(|d| d.to_lowercase().contains(&term))
                        .unwrap_or(false)
            }
            None => true,
        }
    }
}
