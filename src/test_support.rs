//! Shared fixtures for unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    entities::accounts::{self, NewAccount},
    repo::{
        accounts::{AccountsRepo, RepoError},
        memory::InMemoryAccountsRepo,
    },
    service::{
        accounts::RegisterAccountInput,
        password::{CredentialHasher, HashError},
    },
};

pub fn registration(full_name: &str, email: &str, password: &str) -> RegisterAccountInput {
    RegisterAccountInput {
        full_name: full_name.to_string(),
        password: password.to_string(),
        email: email.to_string(),
    }
}

/// Deterministic, fast stand-in for a real hasher. Not one-way.
pub struct TaggingHasher;

const TAG: &str = "tagged$";

impl CredentialHasher for TaggingHasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        Ok(format!("{TAG}{plaintext}"))
    }

    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, HashError> {
        Ok(digest.strip_prefix(TAG) == Some(plaintext))
    }
}

/// In-memory repository that counts attempted writes.
#[derive(Default)]
pub struct RecordingAccountsRepo {
    inner: InMemoryAccountsRepo,
    writes: AtomicUsize,
}

impl RecordingAccountsRepo {
    /// Number of insert and update calls since the last reset.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn reset_counts(&self) {
        self.writes.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl AccountsRepo for RecordingAccountsRepo {
    async fn find_all(&self) -> Result<Vec<accounts::Model>, RepoError> {
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<accounts::Model>, RepoError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<accounts::Model>, RepoError> {
        self.inner.find_by_email(email).await
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, RepoError> {
        self.inner.exists_by_email(email).await
    }

    async fn insert(&self, account: NewAccount) -> Result<accounts::Model, RepoError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(account).await
    }

    async fn update(&self, account: accounts::Model) -> Result<accounts::Model, RepoError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update(account).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), RepoError> {
        self.inner.delete_by_id(id).await
    }
}
