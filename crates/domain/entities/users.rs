use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::app_users;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = app_users)]
pub struct UserEntity {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub avatar_url: Option<String>,
    pub auth_provider: String,
    pub provider_subject: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = app_users)]
pub struct InsertUserEntity {
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub avatar_url: Option<String>,
    pub auth_provider: String,
    pub provider_subject: Option<String>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = app_users)]
pub struct UpdateUserProfileEntity {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
