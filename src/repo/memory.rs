use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use crate::{
    entities::accounts::{self, NewAccount},
    repo::accounts::{AccountsRepo, RepoError},
};

/// Process-local account store.
///
/// Every read and write goes through one lock, so the email uniqueness check
/// and the write that depends on it can never interleave with another write.
#[derive(Default)]
pub struct InMemoryAccountsRepo {
    inner: Mutex<Store>,
}

#[derive(Default)]
struct Store {
    last_id: i64,
    rows: BTreeMap<i64, accounts::Model>,
}

impl Store {
    fn email_owner(&self, email: &str) -> Option<i64> {
        self.rows
            .values()
            .find(|row| row.email == email)
            .map(|row| row.id)
    }
}

impl InMemoryAccountsRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountsRepo for InMemoryAccountsRepo {
    async fn find_all(&self) -> Result<Vec<accounts::Model>, RepoError> {
        let store = self.inner.lock().await;
        Ok(store.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<accounts::Model>, RepoError> {
        let store = self.inner.lock().await;
        Ok(store.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<accounts::Model>, RepoError> {
        let store = self.inner.lock().await;
        Ok(store.rows.values().find(|row| row.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, RepoError> {
        let store = self.inner.lock().await;
        Ok(store.email_owner(email).is_some())
    }

    async fn insert(&self, account: NewAccount) -> Result<accounts::Model, RepoError> {
        let mut store = self.inner.lock().await;
        if store.email_owner(&account.email).is_some() {
            return Err(RepoError::EmailTaken(account.email));
        }

        // Ids only move forward, so a deleted id is never handed out again.
        store.last_id += 1;
        let model = accounts::Model {
            id: store.last_id,
            full_name: account.full_name,
            email: account.email,
            password: account.password,
            phone: account.phone,
            privilege: account.privilege,
        };
        store.rows.insert(model.id, model.clone());
        Ok(model)
    }

    async fn update(&self, account: accounts::Model) -> Result<accounts::Model, RepoError> {
        let mut store = self.inner.lock().await;
        if !store.rows.contains_key(&account.id) {
            return Err(RepoError::Missing(account.id));
        }
        match store.email_owner(&account.email) {
            Some(owner) if owner != account.id => {
                return Err(RepoError::EmailTaken(account.email));
            }
            _ => {}
        }

        store.rows.insert(account.id, account.clone());
        Ok(account)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), RepoError> {
        let mut store = self.inner.lock().await;
        store.rows.remove(&id);
        Ok(())
    }
}
