use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{
    repo::{StoreError, UserRepo},
    repo_types::{NewUser, User},
};

/// Process-local user store keyed by email. The write lock covers the
/// existence check and the insert together, so concurrent signups for one
/// email produce exactly one record.
#[derive(Default)]
pub struct MemoryUserRepo {
    by_email: RwLock<HashMap<String, User>>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.by_email.read().await.len()
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.by_email.read().await.get(email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self
            .by_email
            .read()
            .await
            .values()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        if new_user.full_name.trim().is_empty() {
            return Err(StoreError::Rejected("full_name must not be blank".into()));
        }
        if new_user.password_hash.is_empty() {
            return Err(StoreError::Rejected("password_hash must not be empty".into()));
        }

        let mut users = self.by_email.write().await;
        if users.contains_key(&new_user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            full_name: new_user.full_name,
            email: new_user.email.clone(),
            password_hash: new_user.password_hash,
            profile_pic: String::new(),
            created_at: now,
            updated_at: now,
        };
        users.insert(new_user.email, user.clone());
        Ok(user)
    }
}
