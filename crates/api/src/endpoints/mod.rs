//! API endpoints.

mod admin;
mod auth;
mod groups;
mod posts;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/posts", posts::router())
        .nest("/groups", groups::router())
        .nest("/users", users::router())
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
}
