//! Auth endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use quill_common::AppResult;
use quill_core::RegisterInput;
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Registration response. The only place the bearer token appears.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub id: String,
    pub username: String,
    pub token: String,
}

/// Register a new user and return its bearer token.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<impl IntoResponse> {
    let user = state.user_service.register(input).await?;

    let token = user.token.unwrap_or_default();

    Ok(ApiResponse::created(RegisterResponse {
        id: user.id,
        username: user.username,
        token,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/register", post(register))
}
