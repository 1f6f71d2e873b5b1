//! Follow repository.

use std::sync::Arc;

use crate::entities::{Follow, follow};
use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
    SqlErr,
};

/// Follow repository for database operations.
#[derive(Clone)]
pub struct FollowRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowRepository {
    /// Create a new follow repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a follow relationship by follower and followee.
    pub async fn find_by_pair(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> AppResult<Option<follow::Model>> {
        Follow::find()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FolloweeId.eq(followee_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user is following another user.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(follower_id, followee_id).await?.is_some())
    }

    /// Insert a follow row, treating a duplicate pair as a no-op.
    ///
    /// Returns `true` if the row was inserted, `false` if the unique
    /// `(follower_id, followee_id)` constraint fired. The constraint, not a
    /// check-then-create sequence, is what makes concurrent follow calls
    /// safe.
    pub async fn insert_if_absent(&self, model: follow::ActiveModel) -> AppResult<bool> {
        match model.insert(self.db.as_ref()).await {
            Ok(_) => Ok(true),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Ok(false),
                _ => Err(AppError::Database(e.to_string())),
            },
        }
    }

    /// Delete a follow relationship by pair.
    ///
    /// Returns `true` if a row was deleted, `false` if no row existed.
    pub async fn delete_by_pair(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        let result = Follow::delete_many()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FolloweeId.eq(followee_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Get the IDs of everyone a user follows (for the follow feed).
    pub async fn find_followee_ids(&self, follower_id: &str) -> AppResult<Vec<String>> {
        Follow::find()
            .select_only()
            .column(follow::Column::FolloweeId)
            .filter(follow::Column::FollowerId.eq(follower_id))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
