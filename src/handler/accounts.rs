use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    entities::accounts::{self, Privilege},
    handler::{
        error::{ApiError, ErrorResponse},
        validation::Validator,
    },
    service::accounts::{
        ChangePasswordInput, PatchAccountInput, RegisterAccountInput, ReplaceAccountInput,
    },
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAccountRequest {
    #[serde(default)]
    #[schema(example = "Emilia", min_length = 2, max_length = 128)]
    pub full_name: String,
    #[serde(default)]
    #[schema(example = "emiliaBestGirl", min_length = 4)]
    pub password: String,
    #[serde(default)]
    #[schema(example = "emilia@example.com")]
    pub email: String,
}

impl RegisterAccountRequest {
    pub fn into_input(self) -> Result<RegisterAccountInput, ApiError> {
        let mut v = Validator::new();
        if v.required("fullName", &self.full_name, "Full name is required") {
            v.full_name("fullName", &self.full_name);
        }
        if v.required("password", &self.password, "Password is required") {
            v.password("password", &self.password, "Password");
        }
        if v.required("email", &self.email, "Email is required") {
            v.email("email", &self.email);
        }
        v.finish()?;

        Ok(RegisterAccountInput {
            full_name: self.full_name,
            password: self.password,
            email: self.email,
        })
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAccountRequest {
    #[serde(default)]
    #[schema(example = "Emilia", min_length = 2, max_length = 128)]
    pub full_name: String,
    #[serde(default)]
    #[schema(example = "emilia@example.com")]
    pub email: String,
    #[schema(example = "+12345678901")]
    pub phone: Option<String>,
    #[schema(example = "user")]
    pub privilege: Option<String>,
}

impl ReplaceAccountRequest {
    pub fn into_input(self) -> Result<ReplaceAccountInput, ApiError> {
        let mut v = Validator::new();
        if v.required("fullName", &self.full_name, "Full name is required") {
            v.full_name("fullName", &self.full_name);
        }
        if v.required("email", &self.email, "Email is required") {
            v.email("email", &self.email);
        }
        if let Some(phone) = &self.phone {
            v.phone("phone", phone);
        }
        let privilege = self
            .privilege
            .as_deref()
            .and_then(|value| v.privilege("privilege", value));
        v.finish()?;

        Ok(ReplaceAccountInput {
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            privilege,
        })
    }
}

/// Every field is optional; an omitted or `null` field is left unchanged.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatchAccountRequest {
    #[schema(example = "Emilia", min_length = 2, max_length = 128)]
    pub full_name: Option<String>,
    #[schema(example = "emilia@example.com")]
    pub email: Option<String>,
    #[schema(example = "+12345678901")]
    pub phone: Option<String>,
    #[schema(example = "admin")]
    pub privilege: Option<String>,
}

impl PatchAccountRequest {
    pub fn into_input(self) -> Result<PatchAccountInput, ApiError> {
        let mut v = Validator::new();
        if let Some(full_name) = &self.full_name {
            v.full_name("fullName", full_name);
        }
        if let Some(email) = &self.email {
            v.email("email", email);
        }
        if let Some(phone) = &self.phone {
            v.phone("phone", phone);
        }
        let privilege = self
            .privilege
            .as_deref()
            .and_then(|value| v.privilege("privilege", value));
        v.finish()?;

        Ok(PatchAccountInput {
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            privilege,
        })
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    #[schema(min_length = 4)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl ChangePasswordRequest {
    pub fn into_input(self) -> Result<ChangePasswordInput, ApiError> {
        let mut v = Validator::new();
        v.required(
            "currentPassword",
            &self.current_password,
            "Current password is required",
        );
        if v.required("newPassword", &self.new_password, "New password is required") {
            v.password("newPassword", &self.new_password, "New password");
        }
        v.required(
            "confirmPassword",
            &self.confirm_password,
            "Password confirmation is required",
        );
        v.finish()?;

        Ok(ChangePasswordInput {
            current_password: self.current_password,
            new_password: self.new_password,
            confirm_password: self.confirm_password,
        })
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ChangePrivilegeRequest {
    #[serde(default)]
    #[schema(example = "user", pattern = "^(admin|user)$")]
    pub privilege: String,
}

impl ChangePrivilegeRequest {
    pub fn into_privilege(self) -> Result<Privilege, ApiError> {
        let mut v = Validator::new();
        if v.required("privilege", &self.privilege, "Privilege is required") {
            if let Some(privilege) = v.privilege("privilege", &self.privilege) {
                return Ok(privilege);
            }
        }
        Err(v.into_error())
    }
}

/// Outward view of an account. Carries no credential material.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub privilege: Privilege,
}

impl From<accounts::Model> for AccountResponse {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            full_name: model.full_name,
            email: model.email,
            phone: model.phone,
            privilege: model.privilege,
        }
    }
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::InvalidId(raw.to_string()))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    tag = "accounts",
    responses(
        (status = 200, description = "All accounts", body = [AccountResponse])
    )
)]
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let accounts = state.accounts().list_all().await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    tag = "accounts",
    request_body = RegisterAccountRequest,
    responses(
        (status = 201, description = "Created", body = AccountResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let Json(payload) = payload?;
    let input = payload.into_input()?;
    let created = state.accounts().create(input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    tag = "accounts",
    params(
        ("id" = i64, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Account", body = AccountResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let id = parse_id(&id)?;
    let account = state.accounts().get_by_id(id).await?;
    Ok(Json(account.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/accounts/{id}",
    tag = "accounts",
    request_body = ReplaceAccountRequest,
    params(
        ("id" = i64, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Replaced", body = AccountResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn replace_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ReplaceAccountRequest>, JsonRejection>,
) -> Result<Json<AccountResponse>, ApiError> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let input = payload.into_input()?;
    let updated = state.accounts().full_update(id, input).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/accounts/{id}",
    tag = "accounts",
    request_body = PatchAccountRequest,
    params(
        ("id" = i64, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Updated", body = AccountResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn patch_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<PatchAccountRequest>, JsonRejection>,
) -> Result<Json<AccountResponse>, ApiError> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let input = payload.into_input()?;
    let updated = state.accounts().patch(id, input).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{id}",
    tag = "accounts",
    params(
        ("id" = i64, Path, description = "Account id")
    ),
    responses(
        (status = 204, description = "Deleted, or never existed")
    )
)]
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.accounts().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/v1/accounts/{id}/password",
    tag = "accounts",
    request_body = ChangePasswordRequest,
    params(
        ("id" = i64, Path, description = "Account id")
    ),
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid payload or confirmation mismatch", body = ErrorResponse),
        (status = 401, description = "Current password is incorrect", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let input = payload.into_input()?;
    state.accounts().change_password(id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/v1/accounts/{id}/privilege",
    tag = "accounts",
    request_body = ChangePrivilegeRequest,
    params(
        ("id" = i64, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Privilege changed", body = AccountResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn change_privilege(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ChangePrivilegeRequest>, JsonRejection>,
) -> Result<Json<AccountResponse>, ApiError> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let privilege = payload.into_privilege()?;
    let updated = state.accounts().change_privilege(id, privilege).await?;
    Ok(Json(updated.into()))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/v1/accounts",
            get(list_accounts).post(create_account),
        )
        .route(
            "/api/v1/accounts/:id",
            get(get_account)
                .put(replace_account)
                .patch(patch_account)
                .delete(delete_account),
        )
        .route("/api/v1/accounts/:id/password", put(change_password))
        .route("/api/v1/accounts/:id/privilege", put(change_privilege))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation_fields(err: ApiError) -> Vec<String> {
        match err {
            ApiError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn register_request_reports_every_bad_field() {
        let request: RegisterAccountRequest =
            serde_json::from_value(serde_json::json!({ "fullName": "E", "password": "abc" }))
                .unwrap();
        let fields = validation_fields(request.into_input().err().unwrap());
        assert_eq!(fields, vec!["fullName", "password", "email"]);
    }

    #[test]
    fn register_request_maps_to_input() {
        let request: RegisterAccountRequest = serde_json::from_value(serde_json::json!({
            "fullName": "Emilia",
            "password": "emiliaBestGirl",
            "email": "emilia@example.com"
        }))
        .unwrap();
        let input = request.into_input().unwrap();
        assert_eq!(input.full_name, "Emilia");
        assert_eq!(input.email, "emilia@example.com");
        assert_eq!(input.password, "emiliaBestGirl");
    }

    #[test]
    fn patch_request_treats_null_as_absent() {
        let request: PatchAccountRequest = serde_json::from_value(serde_json::json!({
            "fullName": "New Name",
            "email": null
        }))
        .unwrap();
        let input = request.into_input().unwrap();
        assert_eq!(input.full_name.as_deref(), Some("New Name"));
        assert!(input.email.is_none());
        assert!(input.phone.is_none());
        assert!(input.privilege.is_none());
    }

    #[test]
    fn patch_request_validates_present_fields() {
        let request: PatchAccountRequest = serde_json::from_value(serde_json::json!({
            "email": "not-an-email",
            "phone": "12",
            "privilege": "root"
        }))
        .unwrap();
        let fields = validation_fields(request.into_input().err().unwrap());
        assert_eq!(fields, vec!["email", "phone", "privilege"]);
    }

    #[test]
    fn replace_request_requires_name_and_email() {
        let request: ReplaceAccountRequest =
            serde_json::from_value(serde_json::json!({ "privilege": "admin" })).unwrap();
        let fields = validation_fields(request.into_input().err().unwrap());
        assert_eq!(fields, vec!["fullName", "email"]);
    }

    #[test]
    fn privilege_request_accepts_only_known_values() {
        let admin = ChangePrivilegeRequest {
            privilege: "admin".to_string(),
        };
        assert_eq!(admin.into_privilege().unwrap(), Privilege::Admin);

        for bad in ["", "Admin", "owner"] {
            let request = ChangePrivilegeRequest {
                privilege: bad.to_string(),
            };
            assert_eq!(
                validation_fields(request.into_privilege().err().unwrap()),
                vec!["privilege"]
            );
        }
    }

    #[test]
    fn password_request_requires_all_fields() {
        let request: ChangePasswordRequest =
            serde_json::from_value(serde_json::json!({ "newPassword": "abc" })).unwrap();
        let fields = validation_fields(request.into_input().err().unwrap());
        assert_eq!(fields, vec!["currentPassword", "newPassword", "confirmPassword"]);
    }

    #[test]
    fn response_never_contains_the_digest() {
        let response = AccountResponse::from(accounts::Model {
            id: 4,
            full_name: "Emilia".to_string(),
            email: "emilia@example.com".to_string(),
            password: "$argon2id$secret-digest".to_string(),
            phone: None,
            privilege: Privilege::Admin,
        });
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": 4,
                "fullName": "Emilia",
                "email": "emilia@example.com",
                "phone": null,
                "privilege": "admin"
            })
        );
    }

    #[test]
    fn non_numeric_ids_are_rejected() {
        assert_eq!(parse_id("17").unwrap(), 17);
        assert!(matches!(parse_id("abc"), Err(ApiError::InvalidId(_))));
    }
}
