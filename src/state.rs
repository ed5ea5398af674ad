use sea_orm::{DatabaseConnection, DbErr};
use std::sync::Arc;
use tracing::warn;

use crate::{
    repo::{
        accounts::{AccountsRepo, SeaOrmAccountsRepo},
        memory::InMemoryAccountsRepo,
    },
    service::{
        accounts::{AccountsService, AccountsServiceImpl},
        config::ConfigService,
        password::Argon2Hasher,
    },
};

pub trait DatabaseClient: Send + Sync {
    fn conn(&self) -> &DatabaseConnection;
}

pub struct SeaOrmDatabaseClient {
    conn: DatabaseConnection,
}

impl SeaOrmDatabaseClient {
    pub async fn new(database_url: &str) -> Result<Self, DbErr> {
        let conn = crate::db::connect(database_url).await?;
        crate::schema::apply(&conn).await?;
        Ok(Self { conn })
    }
}

impl DatabaseClient for SeaOrmDatabaseClient {
    fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}

/// Which repository backs the running service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Postgres => "postgres",
            StoreKind::Memory => "memory",
        }
    }
}

pub struct AppState {
    accounts: Arc<dyn AccountsService>,
    config: Arc<dyn ConfigService>,
    store: StoreKind,
}

impl AppState {
    pub async fn new(config: Arc<dyn ConfigService>) -> Result<Arc<Self>, DbErr> {
        let (accounts_repo, store): (Arc<dyn AccountsRepo>, StoreKind) =
            match config.values().database_url.as_deref() {
                Some(url) => {
                    let db = Arc::new(SeaOrmDatabaseClient::new(url).await?);
                    (Arc::new(SeaOrmAccountsRepo::new(db)), StoreKind::Postgres)
                }
                None => {
                    warn!("DATABASE_URL is not set; accounts are kept in memory only");
                    (Arc::new(InMemoryAccountsRepo::new()), StoreKind::Memory)
                }
            };
        let accounts = Arc::new(AccountsServiceImpl::new(
            accounts_repo,
            Arc::new(Argon2Hasher::new()),
        ));

        Ok(Self::from_parts(accounts, config, store))
    }

    pub fn from_parts(
        accounts: Arc<dyn AccountsService>,
        config: Arc<dyn ConfigService>,
        store: StoreKind,
    ) -> Arc<Self> {
        Arc::new(Self {
            accounts,
            config,
            store,
        })
    }

    pub fn accounts(&self) -> &dyn AccountsService {
        self.accounts.as_ref()
    }

    pub fn config(&self) -> &dyn ConfigService {
        self.config.as_ref()
    }

    pub fn store(&self) -> StoreKind {
        self.store
    }
}
