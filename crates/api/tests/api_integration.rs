//! API integration tests.
//!
//! These tests drive the router with a mock database and an unconnected
//! Redis client, so the rendered-page cache degrades to a plain render.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use fred::clients::Client as RedisClient;
use fred::interfaces::ClientLike;
use maplit::btreemap;
use quill_api::{middleware::AppState, router as api_router};
use quill_common::PageCache;
use quill_core::{CommentService, FollowService, GroupService, PostService, UserService};
use quill_db::entities::{post, user};
use quill_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Create test app state around a prepared mock connection and cache.
fn create_test_state_with_cache(db: DatabaseConnection, page_cache: PageCache) -> AppState {
    let db = Arc::new(db);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));

    let user_service = UserService::new(user_repo.clone());
    let post_service = PostService::new(
        post_repo.clone(),
        user_repo.clone(),
        group_repo.clone(),
        comment_repo.clone(),
        follow_repo.clone(),
        10,
    );
    let comment_service = CommentService::new(comment_repo, post_repo);
    let group_service = GroupService::new(group_repo);
    let follow_service = FollowService::new(follow_repo, user_repo);

    AppState {
        user_service,
        post_service,
        comment_service,
        group_service,
        follow_service,
        page_cache,
    }
}

/// Create test app state with an unconnected Redis client: cache reads and
/// writes fail and are treated as misses by the handlers.
fn create_test_state(db: DatabaseConnection) -> AppState {
    // A command timeout is required so commands issued on the unconnected
    // client error out instead of queueing until `connect()` is called.
    let perf = fred::types::config::PerformanceConfig {
        default_command_timeout: std::time::Duration::from_millis(50),
        ..Default::default()
    };
    let client = RedisClient::new(
        fred::types::config::Config::default(),
        Some(perf),
        None,
        None,
    );
    create_test_state_with_cache(db, PageCache::new(Arc::new(client)))
}

/// Connect a fred client to the test Redis instance.
async fn connect_test_redis() -> Arc<RedisClient> {
    let url =
        std::env::var("TEST_REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let config = fred::types::config::Config::from_url(&url).expect("Bad test Redis URL");
    let client = RedisClient::new(config, None, None, None);
    client.connect();
    client
        .wait_for_connect()
        .await
        .expect("Failed to connect to test Redis");
    Arc::new(client)
}

fn create_test_router(db: DatabaseConnection) -> Router {
    api_router().with_state(create_test_state(db))
}

fn create_test_post(id: &str, text: &str) -> post::Model {
    post::Model {
        id: id.to_string(),
        author_id: "u1".to_string(),
        group_id: None,
        text: text.to_string(),
        image: None,
        created_at: chrono::Utc::now().into(),
        updated_at: None,
    }
}

#[tokio::test]
async fn test_landing_feed_renders_without_cache() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[btreemap! {
            "num_items" => Into::<Value>::into(2i64),
        }]])
        .append_query_results([vec![
            create_test_post("p2", "second"),
            create_test_post("p1", "first"),
        ]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["page"], 1);
    assert_eq!(json["data"]["totalItems"], 2);
    assert_eq!(json["data"]["items"][0]["id"], "p2");
}

#[tokio::test]
async fn test_create_post_without_auth_is_unauthorized() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"text":"hello"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_post_detail_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts/missing")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_for_unknown_user_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/users/ghost/posts")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_follow_without_auth_is_unauthorized() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/users/mia/follow")
                .method("POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_with_invalid_json_returns_error() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/register")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from("invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_cache_clear_without_auth_is_unauthorized() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/cache/clear")
                .method("POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires running Redis instance"]
async fn test_landing_feed_cache_hit_and_clear() {
    // Two renders are mocked: the first sees one post, the second sees two.
    // The request in between must be served from the cache and never reach
    // the database.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[btreemap! {
            "num_items" => Into::<Value>::into(1i64),
        }]])
        .append_query_results([vec![create_test_post("p1", "first")]])
        .append_query_results([[btreemap! {
            "num_items" => Into::<Value>::into(2i64),
        }]])
        .append_query_results([vec![
            create_test_post("p2", "second"),
            create_test_post("p1", "first"),
        ]])
        .into_connection();

    let page_cache = PageCache::new(connect_test_redis().await);
    page_cache.clear().await.expect("Failed to clear cache");

    let app = api_router().with_state(create_test_state_with_cache(db, page_cache.clone()));

    let fetch_landing = |app: Router| async move {
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/posts")
                    .method("GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
    };

    let first = fetch_landing(app.clone()).await;
    assert!(std::str::from_utf8(&first).unwrap().contains("p1"));

    // Within the TTL window the stored body comes back byte for byte
    let second = fetch_landing(app.clone()).await;
    assert_eq!(first, second);

    // After an explicit clear the feed is re-rendered and picks up the new post
    page_cache.clear().await.expect("Failed to clear cache");

    let third = fetch_landing(app).await;
    assert_ne!(first, third);
    assert!(std::str::from_utf8(&third).unwrap().contains("p2"));
}

#[tokio::test]
async fn test_group_listing_is_public() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<quill_db::entities::group::Model>::new()])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/groups")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
