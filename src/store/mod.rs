//! Persistence seams.
//!
//! Handlers and services talk to these traits only. Every task method takes the
//! owner id explicitly, and implementations must filter on it: a task owned by
//! someone else is indistinguishable from a task that does not exist.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewUser, Task, TaskInput, TaskQuery, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// The credential store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Looks up a user by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError>;

    /// Inserts a user and assigns its id. Fails with `AppError::DuplicateEmail`
    /// when the email is taken, even if a concurrent insert won the race.
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;
}

/// Owner-scoped task storage.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// The owner's tasks matching `query`, newest first.
    async fn list(&self, owner: i32, query: &TaskQuery) -> Result<Vec<Task>, AppError>;

    /// Persists `task` as given. Fails with `AppError::Unauthorized` when
    /// `task.user_id` no longer refers to an existing user.
    async fn create(&self, task: Task) -> Result<Task, AppError>;

    async fn get(&self, owner: i32, id: Uuid) -> Result<Option<Task>, AppError>;

    /// Replaces title, description and completion flag. `None` when not found for this owner.
    async fn update(&self, owner: i32, id: Uuid, input: &TaskInput)
        -> Result<Option<Task>, AppError>;

    /// `false` when not found for this owner.
    async fn delete(&self, owner: i32, id: Uuid) -> Result<bool, AppError>;
}
