//! Account route handlers.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use shopdemo_core::Role;

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::{BearerToken, RequireAuth};
use crate::models::{MessageResponse, User};
use crate::services::auth::{AuthService, AuthSession, Registration};
use crate::state::AppState;

/// Registration payload.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Login payload.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn auth_service(state: &AppState) -> AuthService<'_> {
    AuthService::new(state.pool(), state.config().token_ttl)
}

/// Create a shopper account and log it in.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, ApiJson<AuthSession>)> {
    let session = auth_service(&state)
        .register(Registration {
            email: &req.email,
            password: &req.password,
            first_name: &req.first_name,
            last_name: &req.last_name,
            role: Role::User,
        })
        .await?;

    tracing::info!(user_id = %session.user.id, "User registered");
    Ok((StatusCode::CREATED, ApiJson(session)))
}

/// Exchange email and password for a bearer token.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<ApiJson<AuthSession>> {
    let session = auth_service(&state).login(&req.email, &req.password).await?;

    tracing::info!(user_id = %session.user.id, "User logged in");
    Ok(ApiJson(session))
}

/// Revoke the token used for this request.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    BearerToken(token): BearerToken,
) -> Result<ApiJson<MessageResponse>> {
    auth_service(&state).logout(&token).await?;

    tracing::info!("User logged out");
    Ok(ApiJson(MessageResponse::new("Logged out")))
}

/// Current user's profile.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiJson<User>> {
    let profile = auth_service(&state).get_user(user.id).await?;
    Ok(ApiJson(profile))
}
