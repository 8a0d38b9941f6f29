use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::reviews;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = reviews)]
pub struct ReviewEntity {
    pub id: Uuid,
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub user_name: String,
    pub user_email: String,
    pub user_avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = reviews)]
pub struct InsertReviewEntity {
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub user_name: String,
    pub user_email: String,
    pub user_avatar: Option<String>,
}
