use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::{AppState, database::queries, utils::success_to_api_response};

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub database: &'static str,
    pub cache: &'static str,
}

fn describe(ok: bool) -> &'static str {
    if ok { "healthy" } else { "unhealthy" }
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = match sqlx::query(queries::PING).execute(&state.pool).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Database health check failed: {}", e);
            false
        }
    };

    let cache = match state.redis.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Cache health check failed: {}", e);
            false
        }
    };

    let status = if database && cache {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        success_to_api_response(HealthReport {
            status: describe(database && cache),
            database: describe(database),
            cache: describe(cache),
        }),
    )
}
