use std::sync::Arc;

use chrono::Utc;
use crates::domain::{
    entities::properties::{InsertPropertyEntity, PropertyEntity, UpdatePropertyEntity},
    repositories::properties::PropertyRepository,
    value_objects::{
        bookings::MAX_BOOKING_PRICE_MINOR,
        enums::user_roles::UserRole,
        properties::{
            CreatePropertyModel, PropertyDto, PropertySearchFilter, SearchPropertiesQuery,
            UpdatePropertyModel,
        },
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 5000;
pub const MAX_GUESTS: i32 = 50;
pub const MAX_ROOMS: i32 = 50;
pub const MAX_AMENITIES: usize = 50;
pub const MAX_IMAGES: usize = 20;

#[derive(Debug, Error)]
pub enum PropertyError {
    #[error("property not found")]
    NotFound,
    #[error("only owners can manage listings")]
    NotOwnerRole,
    #[error("you do not own this property")]
    NotPropertyOwner,
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PropertyError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PropertyError::NotFound => StatusCode::NOT_FOUND,
            PropertyError::NotOwnerRole | PropertyError::NotPropertyOwner => StatusCode::FORBIDDEN,
            PropertyError::Invalid(_) => StatusCode::BAD_REQUEST,
            PropertyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PropertyError>;

fn invalid(message: impl Into<String>) -> PropertyError {
    PropertyError::Invalid(message.into())
}

fn required_text(value: &str, field: &str, max_len: usize) -> UseCaseResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid(format!("{field} is required")));
    }
    if value.chars().count() > max_len {
        return Err(invalid(format!("{field} is too long")));
    }
    Ok(value.to_string())
}

fn check_price(price_per_night_minor: i64) -> UseCaseResult<i64> {
    if price_per_night_minor <= 0 || price_per_night_minor > MAX_BOOKING_PRICE_MINOR {
        return Err(invalid("price_per_night_minor must be positive"));
    }
    Ok(price_per_night_minor)
}

fn check_guests(max_guests: i32) -> UseCaseResult<i32> {
    if !(1..=MAX_GUESTS).contains(&max_guests) {
        return Err(invalid(format!("max_guests must be between 1 and {MAX_GUESTS}")));
    }
    Ok(max_guests)
}

fn check_rooms(value: i32, field: &str) -> UseCaseResult<i32> {
    if !(0..=MAX_ROOMS).contains(&value) {
        return Err(invalid(format!("{field} must be between 0 and {MAX_ROOMS}")));
    }
    Ok(value)
}

fn clean_list(
    values: Vec<String>,
    field: &str,
    max_items: usize,
) -> UseCaseResult<serde_json::Value> {
    let values: Vec<String> = values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();
    if values.len() > max_items {
        return Err(invalid(format!("at most {max_items} {field} are allowed")));
    }
    Ok(serde_json::Value::from(values))
}

pub struct PropertyUseCase<P>
where
    P: PropertyRepository + Send + Sync + 'static,
{
    property_repo: Arc<P>,
}

impl<P> PropertyUseCase<P>
where
    P: PropertyRepository + Send + Sync + 'static,
{
    pub fn new(property_repo: Arc<P>) -> Self {
        Self { property_repo }
    }

    pub async fn create_property(
        &self,
        owner_id: Uuid,
        role: UserRole,
        create_property_model: CreatePropertyModel,
    ) -> UseCaseResult<PropertyDto> {
        if role != UserRole::Owner {
            warn!(%owner_id, role = %role, "properties: non-owner tried to create a listing");
            return Err(PropertyError::NotOwnerRole);
        }

        let model = create_property_model;
        let insert_property_entity = InsertPropertyEntity {
            owner_id,
            title: required_text(&model.title, "title", MAX_TITLE_LEN)?,
            description: model.description.trim().to_string(),
            address: required_text(&model.address, "address", MAX_TITLE_LEN)?,
            city: required_text(&model.city, "city", MAX_TITLE_LEN)?,
            country: required_text(&model.country, "country", MAX_TITLE_LEN)?,
            price_per_night_minor: check_price(model.price_per_night_minor)?,
            max_guests: check_guests(model.max_guests)?,
            bedrooms: check_rooms(model.bedrooms, "bedrooms")?,
            bathrooms: check_rooms(model.bathrooms, "bathrooms")?,
            amenities: clean_list(model.amenities, "amenities", MAX_AMENITIES)?,
            images: clean_list(model.images, "images", MAX_IMAGES)?,
            is_active: true,
        };
        if insert_property_entity.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(invalid("description is too long"));
        }

        let property = self
            .property_repo
            .create(insert_property_entity)
            .await
            .map_err(|err| {
                error!(%owner_id, db_error = ?err, "properties: failed to create listing");
                PropertyError::Internal(err)
            })?;

        info!(%owner_id, property_id = %property.id, "properties: listing created");
        Ok(property.into())
    }

    pub async fn update_property(
        &self,
        owner_id: Uuid,
        property_id: Uuid,
        update_property_model: UpdatePropertyModel,
    ) -> UseCaseResult<PropertyDto> {
        self.load_owned(owner_id, property_id).await?;

        let model = update_property_model;
        let description = model
            .description
            .map(|description| description.trim().to_string());
        if description
            .as_ref()
            .is_some_and(|description| description.chars().count() > MAX_DESCRIPTION_LEN)
        {
            return Err(invalid("description is too long"));
        }

        let update_property_entity = UpdatePropertyEntity {
            title: model
                .title
                .map(|title| required_text(&title, "title", MAX_TITLE_LEN))
                .transpose()?,
            description,
            address: model
                .address
                .map(|address| required_text(&address, "address", MAX_TITLE_LEN))
                .transpose()?,
            city: model
                .city
                .map(|city| required_text(&city, "city", MAX_TITLE_LEN))
                .transpose()?,
            country: model
                .country
                .map(|country| required_text(&country, "country", MAX_TITLE_LEN))
                .transpose()?,
            price_per_night_minor: model.price_per_night_minor.map(check_price).transpose()?,
            max_guests: model.max_guests.map(check_guests).transpose()?,
            bedrooms: model
                .bedrooms
                .map(|value| check_rooms(value, "bedrooms"))
                .transpose()?,
            bathrooms: model
                .bathrooms
                .map(|value| check_rooms(value, "bathrooms"))
                .transpose()?,
            amenities: model
                .amenities
                .map(|values| clean_list(values, "amenities", MAX_AMENITIES))
                .transpose()?,
            images: model
                .images
                .map(|values| clean_list(values, "images", MAX_IMAGES))
                .transpose()?,
            is_active: None,
            updated_at: Some(Utc::now()),
        };

        let property = self.write(property_id, update_property_entity).await?;
        info!(%owner_id, %property_id, "properties: listing updated");
        Ok(property.into())
    }

    pub async fn deactivate_property(
        &self,
        owner_id: Uuid,
        property_id: Uuid,
    ) -> UseCaseResult<PropertyDto> {
        self.load_owned(owner_id, property_id).await?;

        let property = self
            .write(
                property_id,
                UpdatePropertyEntity {
                    is_active: Some(false),
                    updated_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;

        info!(%owner_id, %property_id, "properties: listing deactivated");
        Ok(property.into())
    }

    /// Inactive listings are only visible to their owner.
    pub async fn get_property(
        &self,
        viewer_id: Option<Uuid>,
        property_id: Uuid,
    ) -> UseCaseResult<PropertyDto> {
        let property = self.load(property_id).await?;
        if !property.is_active && viewer_id != Some(property.owner_id) {
            return Err(PropertyError::NotFound);
        }
        Ok(property.into())
    }

    pub async fn search_properties(
        &self,
        query: SearchPropertiesQuery,
    ) -> UseCaseResult<Vec<PropertyDto>> {
        let filter = PropertySearchFilter::from(query);
        if let (Some(min), Some(max)) = (filter.min_price_minor, filter.max_price_minor) {
            if min > max {
                return Err(invalid("min_price cannot exceed max_price"));
            }
        }

        let properties = self
            .property_repo
            .search(filter)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "properties: search failed");
                PropertyError::Internal(err)
            })?;

        Ok(properties.into_iter().map(PropertyDto::from).collect())
    }

    pub async fn list_owner_properties(&self, owner_id: Uuid) -> UseCaseResult<Vec<PropertyDto>> {
        let properties = self
            .property_repo
            .list_by_owner(owner_id)
            .await
            .map_err(|err| {
                error!(%owner_id, db_error = ?err, "properties: failed to list owner listings");
                PropertyError::Internal(err)
            })?;

        Ok(properties.into_iter().map(PropertyDto::from).collect())
    }

    async fn load(&self, property_id: Uuid) -> UseCaseResult<PropertyEntity> {
        self.property_repo
            .find_by_id(property_id)
            .await
            .map_err(|err| {
                error!(%property_id, db_error = ?err, "properties: failed to load listing");
                PropertyError::Internal(err)
            })?
            .ok_or(PropertyError::NotFound)
    }

    async fn load_owned(&self, owner_id: Uuid, property_id: Uuid) -> UseCaseResult<PropertyEntity> {
        let property = self.load(property_id).await?;
        if property.owner_id != owner_id {
            warn!(%owner_id, %property_id, "properties: caller does not own listing");
            return Err(PropertyError::NotPropertyOwner);
        }
        Ok(property)
    }

    async fn write(
        &self,
        property_id: Uuid,
        update_property_entity: UpdatePropertyEntity,
    ) -> UseCaseResult<PropertyEntity> {
        self.property_repo
            .update(property_id, update_property_entity)
            .await
            .map_err(|err| {
                error!(%property_id, db_error = ?err, "properties: failed to update listing");
                PropertyError::Internal(err)
            })
    }
}
