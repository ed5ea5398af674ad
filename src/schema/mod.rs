use sea_orm::{DatabaseConnection, DbErr};
use sea_orm_migration::prelude::SchemaManager;

mod accounts;

/// Create missing tables and constraints. Safe to run on every start.
pub async fn apply(conn: &DatabaseConnection) -> Result<(), DbErr> {
    let manager = SchemaManager::new(conn);

    accounts::apply(&manager, conn).await?;

    Ok(())
}
