use anyhow::Result;
use async_trait::async_trait;
use diesel::{PgTextExpressionMethods, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::properties},
};
use domain::{
    entities::properties::{
        InsertPropertyEntity, PropertyEntity, PropertyRow, UpdatePropertyEntity,
    },
    repositories::properties::PropertyRepository,
    value_objects::properties::PropertySearchFilter,
};

pub struct PropertyPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PropertyPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PropertyRepository for PropertyPostgres {
    async fn create(&self, insert_property_entity: InsertPropertyEntity) -> Result<PropertyEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = insert_into(properties::table)
            .values(&insert_property_entity)
            .returning(PropertyRow::as_returning())
            .get_result::<PropertyRow>(&mut conn)?;

        Ok(row.into())
    }

    async fn find_by_id(&self, property_id: Uuid) -> Result<Option<PropertyEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = properties::table
            .filter(properties::id.eq(property_id))
            .select(PropertyRow::as_select())
            .first::<PropertyRow>(&mut conn)
            .optional()?;

        Ok(row.map(PropertyEntity::from))
    }

    async fn update(
        &self,
        property_id: Uuid,
        update_property_entity: UpdatePropertyEntity,
    ) -> Result<PropertyEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = update(properties::table)
            .filter(properties::id.eq(property_id))
            .set(&update_property_entity)
            .returning(PropertyRow::as_returning())
            .get_result::<PropertyRow>(&mut conn)?;

        Ok(row.into())
    }

    async fn search(&self, filter: PropertySearchFilter) -> Result<Vec<PropertyEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = properties::table
            .filter(properties::is_active.eq(true))
            .select(PropertyRow::as_select())
            .into_boxed();

        if let Some(city) = filter.city.as_deref() {
            query = query.filter(properties::city.ilike(city));
        }
        if let Some(min_guests) = filter.min_guests {
            query = query.filter(properties::max_guests.ge(min_guests));
        }
        if let Some(min_price) = filter.min_price_minor {
            query = query.filter(properties::price_per_night_minor.ge(min_price));
        }
        if let Some(max_price) = filter.max_price_minor {
            query = query.filter(properties::price_per_night_minor.le(max_price));
        }

        let rows = query
            .order(properties::created_at.desc())
            .limit(filter.limit)
            .offset(filter.offset)
            .load::<PropertyRow>(&mut conn)?;

        Ok(rows.into_iter().map(PropertyEntity::from).collect())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<PropertyEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = properties::table
            .filter(properties::owner_id.eq(owner_id))
            .order(properties::created_at.desc())
            .select(PropertyRow::as_select())
            .load::<PropertyRow>(&mut conn)?;

        Ok(rows.into_iter().map(PropertyEntity::from).collect())
    }
}
