//! Follow service.
//!
//! Follow is idempotent and self-follow is a silent no-op. Unfollow is
//! strict: removing a relation that does not exist is an error. The unique
//! (follower, followee) index is what keeps concurrent follows from
//! inserting duplicates; no application-level locking is taken.

use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::{follow, user},
    repositories::{FollowRepository, UserRepository},
};
use sea_orm::Set;

/// Outcome of a follow request.
#[derive(Debug, PartialEq, Eq)]
pub enum FollowOutcome {
    /// A new follow relation was inserted.
    Created,
    /// Nothing changed: self-follow, or the relation already existed.
    Unchanged,
}

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub fn new(follow_repo: FollowRepository, user_repo: UserRepository) -> Self {
        Self {
            follow_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow the user named `username`.
    pub async fn follow(
        &self,
        follower: &user::Model,
        username: &str,
    ) -> AppResult<FollowOutcome> {
        let followee = self.user_repo.get_by_username(username).await?;

        if followee.id == follower.id {
            return Ok(FollowOutcome::Unchanged);
        }

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower.id.clone()),
            followee_id: Set(followee.id.clone()),
            ..Default::default()
        };

        if self.follow_repo.insert_if_absent(model).await? {
            tracing::info!(
                follower_id = %follower.id,
                followee_id = %followee.id,
                "Created follow"
            );
            Ok(FollowOutcome::Created)
        } else {
            Ok(FollowOutcome::Unchanged)
        }
    }

    /// Unfollow the user named `username`. Errors if no relation exists.
    pub async fn unfollow(&self, follower: &user::Model, username: &str) -> AppResult<()> {
        let followee = self.user_repo.get_by_username(username).await?;

        if self
            .follow_repo
            .delete_by_pair(&follower.id, &followee.id)
            .await?
        {
            tracing::info!(
                follower_id = %follower.id,
                followee_id = %followee.id,
                "Removed follow"
            );
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "not following '{username}'"
            )))
        }
    }
}
