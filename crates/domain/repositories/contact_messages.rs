use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::contact_messages::InsertContactMessageEntity;

#[async_trait]
#[automock]
pub trait ContactMessageRepository {
    async fn create(
        &self,
        insert_contact_message_entity: InsertContactMessageEntity,
    ) -> Result<Uuid>;
}
