use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use sea_orm_migration::prelude::*;

pub async fn apply(
    manager: &SchemaManager<'_>,
    conn: &DatabaseConnection,
) -> Result<(), DbErr> {
    if !manager.has_table("accounts").await? {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::FullName)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Accounts::Email).string().not_null())
                    .col(ColumnDef::new(Accounts::Password).string().not_null())
                    .col(ColumnDef::new(Accounts::Phone).string())
                    .col(
                        ColumnDef::new(Accounts::Privilege)
                            .string_len(16)
                            .not_null()
                            .default("user"),
                    )
                    .to_owned(),
            )
            .await?;

        conn.execute(Statement::from_string(
            DbBackend::Postgres,
            "ALTER TABLE accounts ADD CONSTRAINT accounts_privilege_check \
             CHECK (privilege IN ('user','admin'))"
                .to_string(),
        ))
        .await?;
    }

    // Email uniqueness under concurrent writers rests on this index.
    conn.execute(Statement::from_string(
        DbBackend::Postgres,
        "CREATE UNIQUE INDEX IF NOT EXISTS accounts_email_unique \
         ON accounts (email)"
            .to_string(),
    ))
    .await?;

    Ok(())
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    FullName,
    Email,
    Password,
    Phone,
    Privilege,
}
