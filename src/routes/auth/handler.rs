use axum::{
    extract::{Json, State, rejection::JsonRejection},
    response::IntoResponse,
};

use crate::{
    AppState,
    error::AppError,
    utils::{generate_token, success_to_api_response},
};

use super::model::{LoginRequest, LoginResponse};

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    if req.username != state.config.auth_username || req.password != state.config.auth_password {
        tracing::info!("Login failed for user: {}", req.username);
        return Err(AppError::Unauthorized);
    }

    let (token, expires_at) = generate_token(&req.username, &state.config)
        .map_err(|e| AppError::Internal(format!("failed to issue token: {}", e)))?;

    Ok(success_to_api_response(LoginResponse { token, expires_at }))
}
