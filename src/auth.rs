//! Admin gating for admin-only commands.
//!
//! A statically configured admin list takes precedence. When it is empty, the persisted
//! `admin` flag of the invoking user decides. Persistence is delegated to a `UserStore`.

use std::collections::HashMap;
use std::sync::Arc;

use serenity::{all::UserId, async_trait};
use tokio::sync::RwLock;
use tracing::error;

use crate::error::Result;

/// A user as known to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotUser {
    pub id: UserId,
    pub admin: bool,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<BotUser>>;

    async fn update(&self, user: BotUser) -> Result<()>;
}

/// `UserStore` kept in memory for the lifetime of the process.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, BotUser>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<BotUser>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn update(&self, user: BotUser) -> Result<()> {
        self.users.write().await.insert(user.id, user);
        Ok(())
    }
}

pub struct AdminGate {
    admins: Vec<UserId>,
    users: Option<Arc<dyn UserStore>>,
}

impl AdminGate {
    pub fn new(admins: Vec<UserId>) -> Self {
        Self {
            admins,
            users: None,
        }
    }

    pub fn with_user_store(mut self, users: Arc<dyn UserStore>) -> Self {
        self.users = Some(users);
        self
    }

    /// Whether `user_id` may run admin-only commands.
    ///
    /// # Returns
    /// - `true` - Listed as a static admin, or, with no static admins configured, the
    ///   persisted user has the admin flag
    /// - `false` - Otherwise, including when the store lookup fails
    pub async fn is_admin(&self, user_id: UserId) -> bool {
        if !self.admins.is_empty() {
            return self.admins.contains(&user_id);
        }

        let Some(users) = &self.users else {
            return false;
        };

        match users.find_by_id(user_id).await {
            Ok(user) => user.is_some_and(|user| user.admin),
            Err(e) => {
                error!("Failed to look up user {}: {}", user_id, e);
                false
            }
        }
    }
}
