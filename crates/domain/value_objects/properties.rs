use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::properties::PropertyEntity;

pub const MAX_PER_PAGE: i64 = 50;
pub const DEFAULT_PER_PAGE: i64 = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePropertyModel {
    pub title: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub price_per_night_minor: i64,
    pub max_guests: i32,
    #[serde(default)]
    pub bedrooms: i32,
    #[serde(default)]
    pub bathrooms: i32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePropertyModel {
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub price_per_night_minor: Option<i64>,
    pub max_guests: Option<i32>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPropertiesQuery {
    pub city: Option<String>,
    pub guests: Option<i32>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Normalized search parameters handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySearchFilter {
    pub city: Option<String>,
    pub min_guests: Option<i32>,
    pub min_price_minor: Option<i64>,
    pub max_price_minor: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}

impl From<SearchPropertiesQuery> for PropertySearchFilter {
    fn from(value: SearchPropertiesQuery) -> Self {
        let per_page = value
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        let page = value.page.unwrap_or(1).max(1);

        Self {
            city: value
                .city
                .map(|city| city.trim().to_string())
                .filter(|city| !city.is_empty()),
            min_guests: value.guests.filter(|guests| *guests > 0),
            min_price_minor: value.min_price.filter(|price| *price >= 0),
            max_price_minor: value.max_price.filter(|price| *price >= 0),
            limit: per_page,
            offset: (page - 1) * per_page,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PropertyDto {
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

impl From<PropertyEntity> for PropertyDto {
    fn from(value: PropertyEntity) -> Self {
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
            amenities: value.amenities,
            images: value.images,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_filter_clamps_paging() {
        let filter = PropertySearchFilter::from(SearchPropertiesQuery {
            city: Some("  Goa ".to_string()),
            page: Some(3),
            per_page: Some(500),
            ..Default::default()
        });

        assert_eq!(filter.city.as_deref(), Some("Goa"));
        assert_eq!(filter.limit, MAX_PER_PAGE);
        assert_eq!(filter.offset, 2 * MAX_PER_PAGE);
    }

    #[test]
    fn search_filter_drops_blank_and_negative_values() {
        let filter = PropertySearchFilter::from(SearchPropertiesQuery {
            city: Some("   ".to_string()),
            guests: Some(0),
            min_price: Some(-5),
            page: Some(0),
            ..Default::default()
        });

        assert_eq!(filter.city, None);
        assert_eq!(filter.min_guests, None);
        assert_eq!(filter.min_price_minor, None);
        assert_eq!(filter.offset, 0);
        assert_eq!(filter.limit, DEFAULT_PER_PAGE);
    }
}
