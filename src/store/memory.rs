//! In-process store, used by the test suites and by anyone embedding the service
//! without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{NewUser, Task, TaskInput, TaskQuery, User};

#[derive(Default)]
struct Inner {
    users: HashMap<i32, User>,
    // normalized email -> user id
    emails: HashMap<String, i32>,
    last_user_id: i32,
    tasks: HashMap<Uuid, Task>,
}

/// Users and tasks behind one lock, so the email index and the owner check
/// always see a consistent view.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a user and their tasks.
    pub async fn remove_user(&self, id: i32) -> bool {
        let mut inner = self.inner.write().await;
        match inner.users.remove(&id) {
            Some(user) => {
                inner.emails.remove(&user.email);
                inner.tasks.retain(|_, task| task.user_id != id);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .emails
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut inner = self.inner.write().await;
        if inner.emails.contains_key(&new_user.email) {
            return Err(AppError::DuplicateEmail);
        }

        inner.last_user_id += 1;
        let user = User {
            id: inner.last_user_id,
            email: new_user.email,
            name: new_user.name,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        };
        inner.emails.insert(user.email.clone(), user.id);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list(&self, owner: i32, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        let inner = self.inner.read().await;
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|task| task.user_id == owner && task.matches(query))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn create(&self, task: Task) -> Result<Task, AppError> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&task.user_id) {
            return Err(AppError::Unauthorized("Unknown user".into()));
        }
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get(&self, owner: i32, id: Uuid) -> Result<Option<Task>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .get(&id)
            .filter(|task| task.user_id == owner)
            .cloned())
    }

    async fn update(
        &self,
        owner: i32,
        id: Uuid,
        input: &TaskInput,
    ) -> Result<Option<Task>, AppError> {
        let mut inner = self.inner.write().await;
        let Some(task) = inner.tasks.get_mut(&id).filter(|task| task.user_id == owner) else {
            return Ok(None);
        };
        task.title = input.title.clone();
        task.description = input.description.clone();
        task.is_completed = input.is_completed;
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete(&self, owner: i32, id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        let owned = inner
            .tasks
            .get(&id)
            .map(|task| task.user_id == owner)
            .unwrap_or(false);
        if owned {
            inner.tasks.remove(&id);
        }
        Ok(owned)
    }
}
