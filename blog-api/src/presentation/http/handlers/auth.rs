use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::identity_service::Session;
use crate::domain::user::Credentials;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;

/// Body of both identity endpoints. Missing fields read as empty and fail
/// the credential rules.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CredentialsDto {
    #[serde(default)]
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AccountDto {
    pub(crate) id: i64,
    pub(crate) username: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionDto {
    pub(crate) access_token: String,
    pub(crate) user: AccountDto,
}

impl From<CredentialsDto> for Credentials {
    fn from(dto: CredentialsDto) -> Self {
        Self {
            username: dto.username,
            password: dto.password,
        }
    }
}

impl From<Session> for SessionDto {
    fn from(session: Session) -> Self {
        Self {
            access_token: session.token,
            user: AccountDto {
                id: session.user.id,
                username: session.user.username,
            },
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = CredentialsDto,
    responses(
        (status = 201, description = "Account created", body = SessionDto),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username already taken")
    )
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsDto>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SessionDto>)> {
    let Json(dto) = payload?;
    let session = state.identity_service.register(dto.into()).await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = CredentialsDto,
    responses(
        (status = 200, description = "Token issued", body = SessionDto),
        (status = 401, description = "Invalid credentials")
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsDto>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SessionDto>)> {
    let Json(dto) = payload?;
    let session = state.identity_service.login(dto.into()).await?;
    Ok((StatusCode::OK, Json(session.into())))
}
