//! API middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use quill_common::PageCache;
use quill_core::{CommentService, FollowService, GroupService, PostService, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub group_service: GroupService,
    pub follow_service: FollowService,
    pub page_cache: PageCache,
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token to a user and stashes it in request extensions.
/// Requests without a valid token pass through unauthenticated; endpoints
/// that need identity reject via the `AuthUser` extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
