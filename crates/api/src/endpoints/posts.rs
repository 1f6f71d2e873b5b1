//! Post endpoints: the global feed, post detail, creation, editing,
//! comments and the follow feed.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use quill_common::{AppError, AppResult, PageCache};
use quill_core::{
    CreateCommentInput, CreatePostInput, EditOutcome, Page, UpdatePostInput,
};
use quill_db::entities::{comment, post};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Page selection query.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

/// Post response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub author_id: String,
    pub group_id: Option<String>,
    pub text: String,
    pub image: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<post::Model> for PostResponse {
    fn from(p: post::Model) -> Self {
        Self {
            id: p.id,
            author_id: p.author_id,
            group_id: p.group_id,
            text: p.text,
            image: p.image,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Comment response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub text: String,
    pub created_at: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            author_id: c.author_id,
            text: c.text,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// Post detail response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
    pub author_posts_count: u64,
}

/// The global feed, newest first.
///
/// Page 1 is served through the rendered-page cache: a hit returns the
/// stored body unchanged, a miss renders, stores and returns. Cache
/// failures degrade to a plain render.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let is_landing = query.page.is_none_or(|p| p <= 1);

    if is_landing {
        match state.page_cache.get(PageCache::LANDING_KEY).await {
            Ok(Some(body)) => {
                return Ok((
                    [(header::CONTENT_TYPE, "application/json")],
                    body,
                )
                    .into_response());
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Page cache read failed, rendering directly");
            }
        }
    }

    let page = state.post_service.list_all(query.page).await?;
    let page: Page<PostResponse> = page.map(Into::into);

    if is_landing {
        let body = serde_json::to_string(&ApiResponse::ok(page))
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if let Err(e) = state.page_cache.set(PageCache::LANDING_KEY, &body).await {
            tracing::warn!(error = %e, "Page cache write failed");
        }

        return Ok((
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response());
    }

    Ok(ApiResponse::ok(page).into_response())
}

/// Create a post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> AppResult<impl IntoResponse> {
    let post = state.post_service.create_post(&user, input).await?;
    Ok(ApiResponse::created(PostResponse::from(post)))
}

/// A single post with its comments.
async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PostDetailResponse>> {
    let detail = state.post_service.get_post(&id).await?;

    Ok(ApiResponse::ok(PostDetailResponse {
        post: detail.post.into(),
        comments: detail.comments.into_iter().map(Into::into).collect(),
        author_posts_count: detail.author_posts_count,
    }))
}

/// Edit a post. A non-author gets the post back unchanged.
async fn edit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let outcome = state.post_service.edit_post(&user, &id, input).await?;

    let post = match outcome {
        EditOutcome::Updated(p) | EditOutcome::Unchanged(p) => p,
    };

    Ok(ApiResponse::ok(post.into()))
}

/// Add a comment to a post.
async fn add_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CreateCommentInput>,
) -> AppResult<impl IntoResponse> {
    let comment = state.comment_service.add_comment(&user, &id, input).await?;
    Ok(ApiResponse::created(CommentResponse::from(comment)))
}

/// The follow feed: posts by followed authors, newest first.
async fn feed(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Page<PostResponse>>> {
    let page = state.post_service.list_feed(&user, query.page).await?;
    Ok(ApiResponse::ok(page.map(Into::into)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/feed", get(feed))
        .route("/{id}", get(detail).put(edit))
        .route("/{id}/comments", post(add_comment))
}
