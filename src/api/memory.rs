//! Process-local user backend with the same contract as the HTTP API.
//!
//! Backs the `--demo` mode and the test suites.
//!
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use super::{User, UserDraft, UserId, UserService};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Default)]
pub struct InMemoryUserService {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a fixed set of records (ids are kept as given).
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }

    /// A few sample records for demo mode.
    pub fn seeded() -> Self {
        let svc = Self::new();
        {
            let mut users = svc.lock();
            for (name, email) in [
                ("Ada Lovelace", "ada@example.com"),
                ("Grace Hopper", "grace@example.com"),
                ("Linus Torvalds", "linus@example.com"),
            ] {
                users.push(User {
                    id: next_id(),
                    name: name.to_string(),
                    email: email.to_string(),
                });
            }
        }
        svc
    }

    /// Current collection, in insertion order.
    pub fn snapshot(&self) -> Vec<User> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<User>> {
        self.users.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn next_id() -> UserId {
    UserId::new(uuid::Uuid::new_v4().to_string())
}

fn validate(draft: &UserDraft) -> ApiResult<()> {
    if draft.name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be empty".to_string()));
    }
    Ok(())
}

#[async_trait]
impl UserService for InMemoryUserService {
    async fn list_users(&self) -> ApiResult<Vec<User>> {
        Ok(self.snapshot())
    }

    async fn get_user(&self, id: &UserId) -> ApiResult<User> {
        self.lock()
            .iter()
            .find(|u| &u.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(id.to_string()))
    }

    async fn create_user(&self, draft: &UserDraft) -> ApiResult<User> {
        validate(draft)?;
        let user = User {
            id: next_id(),
            name: draft.name.clone(),
            email: draft.email.clone(),
        };
        self.lock().push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: &UserId, draft: &UserDraft) -> ApiResult<User> {
        validate(draft)?;
        let mut users = self.lock();
        let slot = users
            .iter_mut()
            .find(|u| &u.id == id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        slot.name = draft.name.clone();
        slot.email = draft.email.clone();
        Ok(slot.clone())
    }

    async fn delete_user(&self, id: &UserId) -> ApiResult<()> {
        let mut users = self.lock();
        let before = users.len();
        users.retain(|u| &u.id != id);
        if users.len() == before {
            return Err(ApiError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
