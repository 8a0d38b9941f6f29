use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::properties;

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub price_per_night_minor: i64,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw row used for Diesel queries. Amenities and images stay as JSON until converted.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = properties)]
pub struct PropertyRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub price_per_night_minor: i64,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub amenities: serde_json::Value,
    pub images: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PropertyRow> for PropertyEntity {
    fn from(value: PropertyRow) -> Self {
        Self {
            id: value.id,
            owner_id: value.owner_id,
            title: value.title,
            description: value.description,
            address: value.address,
            city: value.city,
            country: value.country,
            price_per_night_minor: value.price_per_night_minor,
            max_guests: value.max_guests,
            bedrooms: value.bedrooms,
            bathrooms: value.bathrooms,
            amenities: serde_json::from_value(value.amenities).unwrap_or_default(),
            images: serde_json::from_value(value.images).unwrap_or_default(),
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = properties)]
pub struct InsertPropertyEntity {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub price_per_night_minor: i64,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub amenities: serde_json::Value,
    pub images: serde_json::Value,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, AsChangeset)]
#[diesel(table_name = properties)]
pub struct UpdatePropertyEntity {
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub price_per_night_minor: Option<i64>,
    pub max_guests: Option<i32>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub amenities: Option<serde_json::Value>,
    pub images: Option<serde_json::Value>,
    pub is_active: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}
