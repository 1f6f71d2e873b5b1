//! Admin endpoints.

use axum::{Router, extract::State, response::IntoResponse, routing::post};
use quill_common::{AppError, AppResult};

use crate::{extractors::AuthUser, middleware::AppState, response};

/// Clear the landing feed cache. Admin only.
async fn clear_cache(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    if !user.is_admin {
        return Err(AppError::Forbidden(
            "only admins may clear caches".to_string(),
        ));
    }

    state
        .page_cache
        .clear()
        .await
        .map_err(|e| AppError::Redis(e.to_string()))?;

    tracing::info!(user_id = %user.id, "Cleared landing page cache");

    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/cache/clear", post(clear_cache))
}
