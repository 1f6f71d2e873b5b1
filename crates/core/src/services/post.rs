//! Post service: the read paths (global feed, group, profile, detail,
//! follow feed) and the post mutations.

use crate::pagination::{Page, resolve_page};
use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::{comment, group, post, user},
    repositories::{
        CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    group_repo: GroupRepository,
    comment_repo: CommentRepository,
    follow_repo: FollowRepository,
    id_gen: IdGenerator,
    page_size: u64,
}

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(max = 10000))]
    pub text: String,

    pub group_id: Option<String>,

    /// Opaque media reference produced by the media store.
    #[validate(length(max = 512))]
    pub image: Option<String>,
}

/// Input for editing a post. `text` replaces the text; `group_id` and
/// `image` replace the current values wholesale (absent clears).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostInput {
    #[validate(length(max = 10000))]
    pub text: String,

    pub group_id: Option<String>,

    #[validate(length(max = 512))]
    pub image: Option<String>,
}

/// Outcome of an edit attempt.
pub enum EditOutcome {
    /// The acting user is the author; fields were updated in place.
    Updated(post::Model),
    /// The acting user is not the author. The post is returned untouched
    /// and the caller is redirected to the read view, not handed an error.
    Unchanged(post::Model),
}

/// A post with its comments and the author's total post count.
pub struct PostDetail {
    pub post: post::Model,
    pub comments: Vec<comment::Model>,
    pub author_posts_count: u64,
}

/// An author's posts plus profile context.
pub struct AuthorPosts {
    pub author: user::Model,
    pub posts: Page<post::Model>,
    pub posts_count: u64,
    /// Whether the (authenticated) viewer follows this author.
    pub following: bool,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        group_repo: GroupRepository,
        comment_repo: CommentRepository,
        follow_repo: FollowRepository,
        page_size: u64,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            group_repo,
            comment_repo,
            follow_repo,
            id_gen: IdGenerator::new(),
            page_size,
        }
    }

    fn validate_text(text: &str) -> AppResult<()> {
        if text.trim().is_empty() {
            return Err(AppError::Validation("text must not be empty".to_string()));
        }
        Ok(())
    }

    async fn check_group(&self, group_id: &str) -> AppResult<()> {
        if self.group_repo.find_by_id(group_id).await?.is_none() {
            return Err(AppError::GroupNotFound(group_id.to_string()));
        }
        Ok(())
    }

    /// Create a post. The author always comes from the authenticated
    /// identity, never from the payload.
    pub async fn create_post(
        &self,
        author: &user::Model,
        input: CreatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;
        Self::validate_text(&input.text)?;

        if let Some(ref group_id) = input.group_id {
            self.check_group(group_id).await?;
        }

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author.id.clone()),
            group_id: Set(input.group_id),
            text: Set(input.text),
            image: Set(input.image),
            ..Default::default()
        };

        let post = self.post_repo.create(model).await?;
        self.user_repo.increment_posts_count(&author.id).await?;

        tracing::info!(post_id = %post.id, author_id = %author.id, "Created post");

        Ok(post)
    }

    /// Edit a post.
    ///
    /// A non-author gets the unchanged post back rather than an error;
    /// `author_id` and `created_at` are immutable either way.
    pub async fn edit_post(
        &self,
        acting_user: &user::Model,
        post_id: &str,
        input: UpdatePostInput,
    ) -> AppResult<EditOutcome> {
        let existing = self.post_repo.get_by_id(post_id).await?;

        if existing.author_id != acting_user.id {
            tracing::debug!(
                post_id = %post_id,
                user_id = %acting_user.id,
                "Non-author edit attempt, returning post unchanged"
            );
            return Ok(EditOutcome::Unchanged(existing));
        }

        input.validate()?;
        Self::validate_text(&input.text)?;

        if let Some(ref group_id) = input.group_id {
            self.check_group(group_id).await?;
        }

        let mut model: post::ActiveModel = existing.into();
        model.text = Set(input.text);
        model.group_id = Set(input.group_id);
        model.image = Set(input.image);
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        let post = self.post_repo.update(model).await?;
        Ok(EditOutcome::Updated(post))
    }

    /// The global feed: all posts, newest first, paginated.
    pub async fn list_all(&self, requested_page: Option<u64>) -> AppResult<Page<post::Model>> {
        let total = self.post_repo.count_all().await?;
        let (page, index) = resolve_page(requested_page, total, self.page_size);
        let items = self.post_repo.fetch_all_page(self.page_size, index).await?;
        Ok(Page::new(items, page, self.page_size, total))
    }

    /// A group's posts, newest first, paginated.
    pub async fn list_group(
        &self,
        slug: &str,
        requested_page: Option<u64>,
    ) -> AppResult<(group::Model, Page<post::Model>)> {
        let group = self.group_repo.get_by_slug(slug).await?;

        let total = self.post_repo.count_by_group(&group.id).await?;
        let (page, index) = resolve_page(requested_page, total, self.page_size);
        let items = self
            .post_repo
            .fetch_group_page(&group.id, self.page_size, index)
            .await?;

        Ok((group, Page::new(items, page, self.page_size, total)))
    }

    /// An author's posts plus profile context (post count, follow state).
    pub async fn list_author(
        &self,
        username: &str,
        viewer: Option<&user::Model>,
        requested_page: Option<u64>,
    ) -> AppResult<AuthorPosts> {
        let author = self.user_repo.get_by_username(username).await?;

        let total = self.post_repo.count_by_author(&author.id).await?;
        let (page, index) = resolve_page(requested_page, total, self.page_size);
        let items = self
            .post_repo
            .fetch_author_page(&author.id, self.page_size, index)
            .await?;

        let following = match viewer {
            Some(viewer) if viewer.id != author.id => {
                self.follow_repo.is_following(&viewer.id, &author.id).await?
            }
            _ => false,
        };

        Ok(AuthorPosts {
            posts: Page::new(items, page, self.page_size, total),
            posts_count: u64::try_from(author.posts_count).unwrap_or_default(),
            following,
            author,
        })
    }

    /// A single post with its comments (insertion order) and the author's
    /// total post count, read from the denormalized counter.
    pub async fn get_post(&self, post_id: &str) -> AppResult<PostDetail> {
        let post = self.post_repo.get_by_id(post_id).await?;
        let comments = self.comment_repo.find_by_post(&post.id).await?;
        let author = self.user_repo.get_by_id(&post.author_id).await?;

        Ok(PostDetail {
            post,
            comments,
            author_posts_count: u64::try_from(author.posts_count).unwrap_or_default(),
        })
    }

    /// The follow feed: posts authored by anyone the viewer follows.
    ///
    /// A viewer who follows nobody gets an empty page, not an error.
    pub async fn list_feed(
        &self,
        viewer: &user::Model,
        requested_page: Option<u64>,
    ) -> AppResult<Page<post::Model>> {
        let followee_ids = self.follow_repo.find_followee_ids(&viewer.id).await?;

        let total = self.post_repo.count_by_authors(&followee_ids).await?;
        let (page, index) = resolve_page(requested_page, total, self.page_size);
        let items = self
            .post_repo
            .fetch_feed_page(&followee_ids, self.page_size, index)
            .await?;

        Ok(Page::new(items, page, self.page_size, total))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            token: None,
            display_name: None,
            is_admin: false,
            posts_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_post(id: &str, author_id: &str, text: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            group_id: None,
            text: text.to_string(),
            image: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(db: Arc<DatabaseConnection>) -> PostService {
        PostService::new(
            PostRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            GroupRepository::new(Arc::clone(&db)),
            CommentRepository::new(Arc::clone(&db)),
            FollowRepository::new(db),
            10,
        )
    }

    #[tokio::test]
    async fn test_create_post_rejects_empty_text() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);
        let author = create_test_user("u1", "leo");

        let result = service
            .create_post(
                &author,
                CreatePostInput {
                    text: "   ".to_string(),
                    group_id: None,
                    image: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_post_rejects_unknown_group() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group::Model>::new()])
                .into_connection(),
        );
        let service = service_with(db);
        let author = create_test_user("u1", "leo");

        let result = service
            .create_post(
                &author,
                CreatePostInput {
                    text: "hello".to_string(),
                    group_id: Some("missing".to_string()),
                    image: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::GroupNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_post_persists_and_counts() {
        let created = create_test_post("p1", "u1", "hello");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[created]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );
        let service = service_with(db);
        let author = create_test_user("u1", "leo");

        let post = service
            .create_post(
                &author,
                CreatePostInput {
                    text: "hello".to_string(),
                    group_id: None,
                    image: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(post.text, "hello");
        assert_eq!(post.author_id, "u1");
    }

    #[tokio::test]
    async fn test_edit_post_by_non_author_is_silent_noop() {
        let existing = create_test_post("p1", "u1", "original");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let service = service_with(db);
        let intruder = create_test_user("u2", "mallory");

        let outcome = service
            .edit_post(
                &intruder,
                "p1",
                UpdatePostInput {
                    text: "hijacked".to_string(),
                    group_id: None,
                    image: None,
                },
            )
            .await
            .unwrap();

        match outcome {
            EditOutcome::Unchanged(post) => assert_eq!(post.text, "original"),
            EditOutcome::Updated(_) => panic!("non-author edit must not update"),
        }
    }

    #[tokio::test]
    async fn test_edit_missing_post_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let service = service_with(db);
        let user = create_test_user("u1", "leo");

        let result = service
            .edit_post(
                &user,
                "missing",
                UpdatePostInput {
                    text: "hello".to_string(),
                    group_id: None,
                    image: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_all_clamps_out_of_range_page() {
        let posts = vec![
            create_test_post("p13", "u1", "m"),
            create_test_post("p12", "u1", "l"),
            create_test_post("p11", "u1", "k"),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! {
                    "num_items" => Into::<Value>::into(13i64),
                }]])
                .append_query_results([posts])
                .into_connection(),
        );
        let service = service_with(db);

        // 13 posts, page size 10: page 3 is out of range, clamps to page 2
        let page = service.list_all(Some(3)).await.unwrap();

        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 3);
        assert!(page.has_previous);
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn test_get_post_detail_reads_author_counter() {
        let post = create_test_post("p1", "u1", "hello");
        let comment = comment::Model {
            id: "c1".to_string(),
            post_id: "p1".to_string(),
            author_id: "u2".to_string(),
            text: "nice".to_string(),
            created_at: Utc::now().into(),
        };
        let mut author = create_test_user("u1", "leo");
        author.posts_count = 5;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .append_query_results([[comment]])
                .append_query_results([[author]])
                .into_connection(),
        );
        let service = service_with(db);

        let detail = service.get_post("p1").await.unwrap();

        assert_eq!(detail.post.id, "p1");
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.author_posts_count, 5);
    }

    #[tokio::test]
    async fn test_list_author_serves_denormalized_counter() {
        let mut author = create_test_user("u1", "leo");
        author.posts_count = 3;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[author]])
                .append_query_results([[btreemap! {
                    "num_items" => Into::<Value>::into(3i64),
                }]])
                .append_query_results([vec![
                    create_test_post("p3", "u1", "c"),
                    create_test_post("p2", "u1", "b"),
                    create_test_post("p1", "u1", "a"),
                ]])
                .into_connection(),
        );
        let service = service_with(db);

        let profile = service.list_author("leo", None, None).await.unwrap();

        assert_eq!(profile.posts_count, 3);
        assert_eq!(profile.posts.items.len(), 3);
        assert!(!profile.following);
    }

    #[tokio::test]
    async fn test_feed_empty_when_following_nobody() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<std::collections::BTreeMap<&str, Value>>::new()])
                .into_connection(),
        );
        let service = service_with(db);
        let viewer = create_test_user("u1", "leo");

        let page = service.list_feed(&viewer, None).await.unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 0);
        assert_eq!(page.page, 1);
    }
}
