//! Group endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use quill_common::AppResult;
use quill_core::{CreateGroupInput, Page, UpdateGroupInput};
use quill_db::entities::group;
use serde::Serialize;

use crate::{
    endpoints::posts::{PageQuery, PostResponse},
    extractors::AuthUser,
    middleware::AppState,
    response::ApiResponse,
};

/// Group response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub created_at: String,
}

impl From<group::Model> for GroupResponse {
    fn from(g: group::Model) -> Self {
        Self {
            id: g.id,
            title: g.title,
            slug: g.slug,
            description: g.description,
            created_at: g.created_at.to_rfc3339(),
        }
    }
}

/// A group with its posts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPostsResponse {
    pub group: GroupResponse,
    pub posts: Page<PostResponse>,
}

/// List all groups.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<GroupResponse>>> {
    let groups = state.group_service.list().await?;
    Ok(ApiResponse::ok(groups.into_iter().map(Into::into).collect()))
}

/// Create a group. Admin only.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateGroupInput>,
) -> AppResult<impl IntoResponse> {
    let group = state.group_service.create(&user, input).await?;
    Ok(ApiResponse::created(GroupResponse::from(group)))
}

/// A group's posts, newest first.
async fn posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<GroupPostsResponse>> {
    let (group, page) = state.post_service.list_group(&slug, query.page).await?;

    Ok(ApiResponse::ok(GroupPostsResponse {
        group: group.into(),
        posts: page.map(Into::into),
    }))
}

/// Edit a group's title or description. Admin only.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<UpdateGroupInput>,
) -> AppResult<ApiResponse<GroupResponse>> {
    let group = state.group_service.update(&user, &slug, input).await?;
    Ok(ApiResponse::ok(group.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{slug}", axum::routing::put(update))
        .route("/{slug}/posts", get(posts))
}
