//! Comment service.
//!
//! Comments are append-only: there is no edit or delete path, and they are
//! always listed in insertion order under their post.

use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::{comment, user},
    repositories::{CommentRepository, PostRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

/// Input for adding a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    #[validate(length(max = 10000))]
    pub text: String,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(comment_repo: CommentRepository, post_repo: PostRepository) -> Self {
        Self {
            comment_repo,
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a comment to a post. The author always comes from the
    /// authenticated identity.
    pub async fn add_comment(
        &self,
        author: &user::Model,
        post_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        if input.text.trim().is_empty() {
            return Err(AppError::Validation("text must not be empty".to_string()));
        }

        // The post must exist; comments on a deleted post die with it.
        let post = self.post_repo.get_by_id(post_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id.clone()),
            author_id: Set(author.id.clone()),
            text: Set(input.text),
            ..Default::default()
        };

        let comment = self.comment_repo.create(model).await?;
        tracing::info!(comment_id = %comment.id, post_id = %post.id, "Added comment");

        Ok(comment)
    }
}
