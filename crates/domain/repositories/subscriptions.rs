use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::subscriptions::{
        ActivateSubscriptionEntity, InsertSubscriptionEntity, SubscriptionEntity,
    },
    value_objects::enums::subscription_statuses::SubscriptionStatus,
};

#[async_trait]
#[automock]
pub trait SubscriptionRepository {
    async fn create_pending(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> Result<SubscriptionEntity>;

    async fn find_by_order_id(&self, razorpay_order_id: &str)
    -> Result<Option<SubscriptionEntity>>;

    /// Latest active subscription of the user whose end date is after `now`.
    async fn find_current_active(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<SubscriptionEntity>>;

    async fn activate(
        &self,
        subscription_id: Uuid,
        activate_subscription_entity: ActivateSubscriptionEntity,
    ) -> Result<SubscriptionEntity>;

    async fn update_status(&self, subscription_id: Uuid, status: SubscriptionStatus) -> Result<()>;

    /// Marks every active subscription with `end_date < now` as expired.
    async fn expire_ended(&self, now: DateTime<Utc>) -> Result<usize>;
}
