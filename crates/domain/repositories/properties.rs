use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::properties::{InsertPropertyEntity, PropertyEntity, UpdatePropertyEntity},
    value_objects::properties::PropertySearchFilter,
};

#[async_trait]
#[automock]
pub trait PropertyRepository {
    async fn create(&self, insert_property_entity: InsertPropertyEntity) -> Result<PropertyEntity>;

    async fn find_by_id(&self, property_id: Uuid) -> Result<Option<PropertyEntity>>;

    async fn update(
        &self,
        property_id: Uuid,
        update_property_entity: UpdatePropertyEntity,
    ) -> Result<PropertyEntity>;

    async fn search(&self, filter: PropertySearchFilter) -> Result<Vec<PropertyEntity>>;

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<PropertyEntity>>;
}
