use std::collections::HashMap;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::UserAccount;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>>;
    /// Case-insensitive.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>>;
    async fn insert(&self, account: UserAccount) -> Result<()>;
}

#[derive(Default)]
pub struct InMemoryUserDirectory {
    accounts: RwLock<HashMap<Uuid, UserAccount>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the blocked flag; returns false for an unknown user.
    pub async fn set_blocked(&self, id: Uuid, blocked: bool) -> bool {
        match self.accounts.write().await.get_mut(&id) {
            Some(account) => {
                account.user.is_blocked = blocked;
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.accounts.write().await.remove(&id).is_some()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|account| account.user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert(&self, account: UserAccount) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if accounts
            .values()
            .any(|existing| existing.user.email.eq_ignore_ascii_case(&account.user.email))
        {
            return Err(anyhow!("Email {} is already registered", account.user.email));
        }
        if accounts.contains_key(&account.user.id) {
            return Err(anyhow!("User {} already exists", account.user.id));
        }
        accounts.insert(account.user.id, account);
        Ok(())
    }
}
