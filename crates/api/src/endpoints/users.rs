//! User endpoints: profiles and follow relations.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use quill_common::AppResult;
use quill_core::{FollowOutcome, Page};
use quill_db::entities::user;
use serde::Serialize;

use crate::{
    endpoints::posts::{PageQuery, PostResponse},
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// User response. The bearer token is never included here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            display_name: u.display_name,
            is_admin: u.is_admin,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// A profile page: the author, their posts and follow context.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub author: UserResponse,
    pub posts: Page<PostResponse>,
    pub posts_count: u64,
    pub following: bool,
}

/// Follow outcome response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub status: String,
}

/// An author's posts, newest first, with profile context.
async fn posts(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state
        .post_service
        .list_author(&username, viewer.as_ref(), query.page)
        .await?;

    Ok(ApiResponse::ok(ProfileResponse {
        author: profile.author.into(),
        posts: profile.posts.map(Into::into),
        posts_count: profile.posts_count,
        following: profile.following,
    }))
}

/// Follow a user. Idempotent; self-follow changes nothing.
async fn follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<FollowResponse>> {
    let outcome = state.follow_service.follow(&user, &username).await?;

    let status = match outcome {
        FollowOutcome::Created => "following",
        FollowOutcome::Unchanged => "unchanged",
    };

    Ok(ApiResponse::ok(FollowResponse {
        status: status.to_string(),
    }))
}

/// Unfollow a user. Errors if no relation exists.
async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.follow_service.unfollow(&user, &username).await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{username}/posts", get(posts))
        .route("/{username}/follow", post(follow).delete(unfollow))
}
