use anyhow::Result;
use async_trait::async_trait;
use diesel::{
    RunQueryDsl,
    insert_into,
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::reviews},
};
use domain::{
    entities::reviews::{InsertReviewEntity, ReviewEntity},
    repositories::reviews::ReviewRepository,
    value_objects::reviews::DuplicateReview,
};

pub struct ReviewPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ReviewPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ReviewRepository for ReviewPostgres {
    async fn create(&self, insert_review_entity: InsertReviewEntity) -> Result<ReviewEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(reviews::table)
            .values(&insert_review_entity)
            .returning(ReviewEntity::as_returning())
            .get_result::<ReviewEntity>(&mut conn);

        match result {
            Ok(review) => Ok(review),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(anyhow::Error::new(DuplicateReview))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_property_and_user(
        &self,
        property_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ReviewEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let review = reviews::table
            .filter(reviews::property_id.eq(property_id))
            .filter(reviews::user_id.eq(user_id))
            .select(ReviewEntity::as_select())
            .first::<ReviewEntity>(&mut conn)
            .optional()?;

        Ok(review)
    }

    async fn list_by_property(&self, property_id: Uuid) -> Result<Vec<ReviewEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = reviews::table
            .filter(reviews::property_id.eq(property_id))
            .order(reviews::created_at.desc())
            .select(ReviewEntity::as_select())
            .load::<ReviewEntity>(&mut conn)?;

        Ok(results)
    }
}
