use utoipa::OpenApi;

use crate::{
    entities::accounts::Privilege,
    handler::{
        self,
        accounts::{
            AccountResponse, ChangePasswordRequest, ChangePrivilegeRequest, PatchAccountRequest,
            RegisterAccountRequest, ReplaceAccountRequest,
        },
        error::ErrorResponse,
        health::Health,
        validation::FieldError,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handler::health::health,
        handler::accounts::list_accounts,
        handler::accounts::create_account,
        handler::accounts::get_account,
        handler::accounts::replace_account,
        handler::accounts::patch_account,
        handler::accounts::delete_account,
        handler::accounts::change_password,
        handler::accounts::change_privilege
    ),
    components(schemas(
        Health,
        Privilege,
        RegisterAccountRequest,
        ReplaceAccountRequest,
        PatchAccountRequest,
        ChangePasswordRequest,
        ChangePrivilegeRequest,
        AccountResponse,
        ErrorResponse,
        FieldError
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "accounts", description = "Accounts")
    )
)]
pub struct ApiDoc;
