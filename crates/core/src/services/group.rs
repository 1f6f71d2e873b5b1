//! Group service.
//!
//! Groups are administrative: only admins create or edit them, and they are
//! never deleted in normal flow.

use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::{group, user},
    repositories::GroupRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Group service for business logic.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

/// Input for creating a group.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 100))]
    pub slug: String,

    #[validate(length(max = 10000))]
    #[serde(default)]
    pub description: String,
}

/// Input for editing a group.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupInput {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 10000))]
    pub description: Option<String>,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub fn new(group_repo: GroupRepository) -> Self {
        Self {
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a group. Admin only.
    pub async fn create(
        &self,
        acting_user: &user::Model,
        input: CreateGroupInput,
    ) -> AppResult<group::Model> {
        if !acting_user.is_admin {
            return Err(AppError::Forbidden(
                "only admins may create groups".to_string(),
            ));
        }

        input.validate()?;

        if !input
            .slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(AppError::Validation(
                "slug may only contain lowercase letters, digits and '-'".to_string(),
            ));
        }

        if self.group_repo.find_by_slug(&input.slug).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "slug '{}' is already taken",
                input.slug
            )));
        }

        let model = group::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            slug: Set(input.slug),
            description: Set(input.description),
            ..Default::default()
        };

        let group = self.group_repo.create(model).await?;
        tracing::info!(group_id = %group.id, slug = %group.slug, "Created group");

        Ok(group)
    }

    /// Edit a group's title or description. Admin only.
    pub async fn update(
        &self,
        acting_user: &user::Model,
        slug: &str,
        input: UpdateGroupInput,
    ) -> AppResult<group::Model> {
        if !acting_user.is_admin {
            return Err(AppError::Forbidden(
                "only admins may edit groups".to_string(),
            ));
        }

        input.validate()?;

        let existing = self.group_repo.get_by_slug(slug).await?;

        let mut model: group::ActiveModel = existing.into();
        if let Some(title) = input.title {
            model.title = Set(title);
        }
        if let Some(description) = input.description {
            model.description = Set(description);
        }
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        self.group_repo.update(model).await
    }

    /// List all groups.
    pub async fn list(&self) -> AppResult<Vec<group::Model>> {
        self.group_repo.find_all().await
    }

    /// Look up a group by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<group::Model> {
        self.group_repo.get_by_slug(slug).await
    }
}
