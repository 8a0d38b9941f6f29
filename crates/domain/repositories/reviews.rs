use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::reviews::{InsertReviewEntity, ReviewEntity};

#[async_trait]
#[automock]
pub trait ReviewRepository {
    /// Fails with [`crate::domain::value_objects::reviews::DuplicateReview`] when the
    /// (property, user) pair already has a review.
    async fn create(&self, insert_review_entity: InsertReviewEntity) -> Result<ReviewEntity>;

    async fn find_by_property_and_user(
        &self,
        property_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ReviewEntity>>;

    async fn list_by_property(&self, property_id: Uuid) -> Result<Vec<ReviewEntity>>;
}
