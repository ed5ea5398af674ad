use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use thiserror::Error;

use crate::{
    entities::accounts::{self, NewAccount},
    state::DatabaseClient,
};

#[derive(Debug, Error)]
pub enum RepoError {
    /// A write would give a second account the same email.
    #[error("email {0} is already in use")]
    EmailTaken(String),
    /// An update targeted a row that no longer exists.
    #[error("account {0} does not exist")]
    Missing(i64),
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Persistence contract for accounts.
///
/// Implementations must reject an `insert` or `update` that would leave two
/// rows sharing an email with [`RepoError::EmailTaken`], atomically with the
/// write itself.
#[async_trait]
pub trait AccountsRepo: Send + Sync {
    async fn find_all(&self) -> Result<Vec<accounts::Model>, RepoError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<accounts::Model>, RepoError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<accounts::Model>, RepoError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, RepoError>;
    async fn insert(&self, account: NewAccount) -> Result<accounts::Model, RepoError>;
    async fn update(&self, account: accounts::Model) -> Result<accounts::Model, RepoError>;
    /// Deleting an id that does not exist is not an error.
    async fn delete_by_id(&self, id: i64) -> Result<(), RepoError>;
}

pub struct SeaOrmAccountsRepo {
    db: std::sync::Arc<dyn DatabaseClient>,
}

impl SeaOrmAccountsRepo {
    pub fn new(db: std::sync::Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }
}

fn map_write_err(err: DbErr, email: &str) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => RepoError::EmailTaken(email.to_string()),
        _ => RepoError::Db(err),
    }
}

#[async_trait]
impl AccountsRepo for SeaOrmAccountsRepo {
    async fn find_all(&self) -> Result<Vec<accounts::Model>, RepoError> {
        let rows = accounts::Entity::find()
            .order_by_asc(accounts::Column::Id)
            .all(self.db.conn())
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<accounts::Model>, RepoError> {
        let row = accounts::Entity::find_by_id(id).one(self.db.conn()).await?;
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<accounts::Model>, RepoError> {
        let row = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(self.db.conn())
            .await?;
        Ok(row)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, RepoError> {
        let count = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .count(self.db.conn())
            .await?;
        Ok(count > 0)
    }

    async fn insert(&self, account: NewAccount) -> Result<accounts::Model, RepoError> {
        let email = account.email.clone();
        let model = accounts::ActiveModel {
            full_name: Set(account.full_name),
            email: Set(account.email),
            password: Set(account.password),
            phone: Set(account.phone),
            privilege: Set(account.privilege),
            ..Default::default()
        };

        model
            .insert(self.db.conn())
            .await
            .map_err(|err| map_write_err(err, &email))
    }

    async fn update(&self, account: accounts::Model) -> Result<accounts::Model, RepoError> {
        let id = account.id;
        let email = account.email.clone();
        // reset_all marks every column dirty so the row is written as given.
        let active = account.into_active_model().reset_all();

        active
            .update(self.db.conn())
            .await
            .map_err(|err| match err {
                DbErr::RecordNotUpdated => RepoError::Missing(id),
                other => map_write_err(other, &email),
            })
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), RepoError> {
        accounts::Entity::delete_by_id(id)
            .exec(self.db.conn())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::accounts::Privilege;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    struct MockClient(DatabaseConnection);

    impl DatabaseClient for MockClient {
        fn conn(&self) -> &DatabaseConnection {
            &self.0
        }
    }

    fn repo_over(db: MockDatabase) -> SeaOrmAccountsRepo {
        SeaOrmAccountsRepo::new(Arc::new(MockClient(db.into_connection())))
    }

    fn row(id: i64) -> accounts::Model {
        accounts::Model {
            id,
            full_name: "Emilia".to_string(),
            email: "emilia@example.com".to_string(),
            password: "$argon2id$digest".to_string(),
            phone: None,
            privilege: Privilege::User,
        }
    }

    #[tokio::test]
    async fn update_of_vanished_row_is_missing() {
        let repo = repo_over(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<accounts::Model>::new()]),
        );

        let err = repo.update(row(7)).await.unwrap_err();
        assert!(matches!(err, RepoError::Missing(7)));
    }

    #[tokio::test]
    async fn update_returns_written_row() {
        let mut written = row(3);
        written.privilege = Privilege::Admin;
        let repo = repo_over(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![written.clone()]]),
        );

        assert_eq!(repo.update(written.clone()).await.unwrap(), written);
    }

    #[tokio::test]
    async fn insert_returns_row_with_assigned_id() {
        let stored = row(1);
        let repo = repo_over(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![stored.clone()]]),
        );

        let created = repo
            .insert(NewAccount {
                full_name: stored.full_name.clone(),
                email: stored.email.clone(),
                password: stored.password.clone(),
                phone: None,
                privilege: Privilege::User,
            })
            .await
            .unwrap();
        assert_eq!(created, stored);
    }

    #[tokio::test]
    async fn query_failures_surface_as_database_errors() {
        let repo = repo_over(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("connection reset".to_string())]),
        );

        let err = repo.find_by_id(1).await.unwrap_err();
        assert!(matches!(err, RepoError::Db(_)));
    }

    #[test]
    fn non_unique_write_failures_stay_database_errors() {
        let err = map_write_err(
            DbErr::Custom("connection reset".to_string()),
            "emilia@example.com",
        );
        assert!(matches!(err, RepoError::Db(DbErr::Custom(_))));

        let err = map_write_err(DbErr::RecordNotInserted, "emilia@example.com");
        assert!(matches!(err, RepoError::Db(DbErr::RecordNotInserted)));
    }
}
