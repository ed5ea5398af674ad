use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::{
    entities::accounts::{self, NewAccount, Privilege},
    repo::accounts::{AccountsRepo, RepoError},
    service::password::{CredentialHasher, HashError},
};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("account {0} not found")]
    NotFound(i64),
    #[error("an account with email {0} already exists")]
    Exists(String),
    #[error("current password is incorrect")]
    InvalidPassword,
    #[error("new password and confirmation do not match")]
    PasswordMismatch,
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error("repository error: {0}")]
    Repository(#[source] RepoError),
}

impl AccountError {
    /// Stable machine-readable code for responses and logs.
    pub fn code(&self) -> &'static str {
        match self {
            AccountError::NotFound(_) => "account_not_found",
            AccountError::Exists(_) => "account_exists",
            AccountError::InvalidPassword => "invalid_password",
            AccountError::PasswordMismatch => "password_mismatch",
            AccountError::Hash(_) | AccountError::Repository(_) => "internal_error",
        }
    }
}

impl From<RepoError> for AccountError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::EmailTaken(email) => AccountError::Exists(email),
            RepoError::Missing(id) => AccountError::NotFound(id),
            other => AccountError::Repository(other),
        }
    }
}

pub struct RegisterAccountInput {
    pub full_name: String,
    pub password: String,
    pub email: String,
}

pub struct ReplaceAccountInput {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// `None` keeps the stored privilege.
    pub privilege: Option<Privilege>,
}

/// Partial update: `None` means "leave as is", never "clear".
#[derive(Default)]
pub struct PatchAccountInput {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub privilege: Option<Privilege>,
}

pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[async_trait]
pub trait AccountsService: Send + Sync {
    async fn list_all(&self) -> Result<Vec<accounts::Model>, AccountError>;
    async fn create(&self, input: RegisterAccountInput) -> Result<accounts::Model, AccountError>;
    async fn get_by_id(&self, id: i64) -> Result<accounts::Model, AccountError>;
    async fn full_update(
        &self,
        id: i64,
        input: ReplaceAccountInput,
    ) -> Result<accounts::Model, AccountError>;
    async fn patch(
        &self,
        id: i64,
        input: PatchAccountInput,
    ) -> Result<accounts::Model, AccountError>;
    async fn change_password(
        &self,
        id: i64,
        input: ChangePasswordInput,
    ) -> Result<(), AccountError>;
    async fn change_privilege(
        &self,
        id: i64,
        privilege: Privilege,
    ) -> Result<accounts::Model, AccountError>;
    async fn delete(&self, id: i64) -> Result<(), AccountError>;
}

pub struct AccountsServiceImpl {
    accounts_repo: Arc<dyn AccountsRepo>,
    hasher: Arc<dyn CredentialHasher>,
}

impl AccountsServiceImpl {
    pub fn new(accounts_repo: Arc<dyn AccountsRepo>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            accounts_repo,
            hasher,
        }
    }

    async fn find(&self, id: i64) -> Result<accounts::Model, AccountError> {
        self.accounts_repo
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id))
    }

    async fn ensure_email_available(&self, email: &str) -> Result<(), AccountError> {
        if self.accounts_repo.exists_by_email(email).await? {
            debug!("email already registered");
            return Err(AccountError::Exists(email.to_string()));
        }
        Ok(())
    }

    /// Like [`Self::ensure_email_available`], but the account `id` may keep
    /// its own email.
    async fn ensure_email_available_for(
        &self,
        id: i64,
        email: &str,
    ) -> Result<(), AccountError> {
        match self.accounts_repo.find_by_email(email).await? {
            Some(owner) if owner.id != id => {
                debug!(owner_id = owner.id, "email owned by another account");
                Err(AccountError::Exists(email.to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl AccountsService for AccountsServiceImpl {
    async fn list_all(&self) -> Result<Vec<accounts::Model>, AccountError> {
        Ok(self.accounts_repo.find_all().await?)
    }

    #[instrument(skip(self, input))]
    async fn create(&self, input: RegisterAccountInput) -> Result<accounts::Model, AccountError> {
        self.ensure_email_available(&input.email).await?;

        let password = self.hasher.hash(&input.password)?;
        let account = self
            .accounts_repo
            .insert(NewAccount {
                full_name: input.full_name,
                email: input.email,
                password,
                phone: None,
                privilege: Privilege::User,
            })
            .await?;

        info!(account_id = account.id, "account_created");
        Ok(account)
    }

    async fn get_by_id(&self, id: i64) -> Result<accounts::Model, AccountError> {
        self.find(id).await
    }

    #[instrument(skip(self, input))]
    async fn full_update(
        &self,
        id: i64,
        input: ReplaceAccountInput,
    ) -> Result<accounts::Model, AccountError> {
        let mut account = self.find(id).await?;
        self.ensure_email_available_for(id, &input.email).await?;

        account.full_name = input.full_name;
        account.email = input.email;
        account.phone = input.phone;
        if let Some(privilege) = input.privilege {
            account.privilege = privilege;
        }

        let updated = self.accounts_repo.update(account).await?;
        info!(account_id = updated.id, "account_replaced");
        Ok(updated)
    }

    #[instrument(skip(self, input))]
    async fn patch(
        &self,
        id: i64,
        input: PatchAccountInput,
    ) -> Result<accounts::Model, AccountError> {
        let mut account = self.find(id).await?;

        if let Some(email) = input.email {
            self.ensure_email_available_for(id, &email).await?;
            account.email = email;
        }
        if let Some(full_name) = input.full_name {
            account.full_name = full_name;
        }
        if let Some(phone) = input.phone {
            account.phone = Some(phone);
        }
        if let Some(privilege) = input.privilege {
            account.privilege = privilege;
        }

        let updated = self.accounts_repo.update(account).await?;
        info!(account_id = updated.id, "account_patched");
        Ok(updated)
    }

    #[instrument(skip(self, input))]
    async fn change_password(
        &self,
        id: i64,
        input: ChangePasswordInput,
    ) -> Result<(), AccountError> {
        let mut account = self.find(id).await?;

        // The current password is checked before new and confirm are compared.
        if !self
            .hasher
            .verify(&input.current_password, &account.password)?
        {
            debug!("current password rejected");
            return Err(AccountError::InvalidPassword);
        }
        if input.new_password != input.confirm_password {
            return Err(AccountError::PasswordMismatch);
        }

        account.password = self.hasher.hash(&input.new_password)?;
        self.accounts_repo.update(account).await?;
        info!(account_id = id, "password_changed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn change_privilege(
        &self,
        id: i64,
        privilege: Privilege,
    ) -> Result<accounts::Model, AccountError> {
        let mut account = self.find(id).await?;
        account.privilege = privilege;

        let updated = self.accounts_repo.update(account).await?;
        info!(account_id = updated.id, %privilege, "privilege_changed");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), AccountError> {
        self.accounts_repo.delete_by_id(id).await?;
        info!(account_id = id, "account_deleted");
        Ok(())
    }
}
