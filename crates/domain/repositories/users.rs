use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::users::{InsertUserEntity, UpdateUserProfileEntity, UserEntity},
    value_objects::enums::user_roles::UserRole,
};

#[async_trait]
#[automock]
pub trait UserRepository {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>>;

    async fn create(&self, insert_user_entity: InsertUserEntity) -> Result<UserEntity>;

    async fn link_provider(
        &self,
        user_id: Uuid,
        auth_provider: &str,
        provider_subject: &str,
    ) -> Result<()>;

    async fn update_profile(
        &self,
        user_id: Uuid,
        update_user_profile_entity: UpdateUserProfileEntity,
    ) -> Result<UserEntity>;

    async fn update_role(&self, user_id: Uuid, role: UserRole) -> Result<UserEntity>;
}
