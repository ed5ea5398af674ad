use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub full_name: String,
    #[sea_orm(unique)]
    pub email: String,
    /// Credential digest. Never plaintext, never serialized outward.
    pub password: String,
    pub phone: Option<String>,
    pub privilege: Privilege,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Authorization level of an account.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Privilege {
    #[default]
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown privilege {0:?}, expected \"admin\" or \"user\"")]
pub struct UnknownPrivilege(pub String);

impl Privilege {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privilege::User => "user",
            Privilege::Admin => "admin",
        }
    }
}

impl TryFrom<&str> for Privilege {
    type Error = UnknownPrivilege;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Privilege::User),
            "admin" => Ok(Privilege::Admin),
            other => Err(UnknownPrivilege(other.to_string())),
        }
    }
}

impl std::fmt::Display for Privilege {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values for a row that has not been assigned an id yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAccount {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub privilege: Privilege,
}
