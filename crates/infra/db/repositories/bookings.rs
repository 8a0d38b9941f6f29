use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::bookings},
};
use domain::{
    entities::bookings::{BookingEntity, InsertBookingEntity, UpdateBookingStatusEntity},
    repositories::bookings::BookingRepository,
    value_objects::enums::{booking_statuses::BookingStatus, payment_statuses::PaymentStatus},
};

pub struct BookingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl BookingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl BookingRepository for BookingPostgres {
    async fn create(&self, insert_booking_entity: InsertBookingEntity) -> Result<BookingEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let booking = insert_into(bookings::table)
            .values(&insert_booking_entity)
            .returning(BookingEntity::as_returning())
            .get_result::<BookingEntity>(&mut conn)?;

        Ok(booking)
    }

    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let booking = bookings::table
            .filter(bookings::id.eq(booking_id))
            .select(BookingEntity::as_select())
            .first::<BookingEntity>(&mut conn)
            .optional()?;

        Ok(booking)
    }

    async fn find_by_payment_intent_id(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let booking = bookings::table
            .filter(bookings::payment_intent_id.eq(payment_intent_id))
            .select(BookingEntity::as_select())
            .first::<BookingEntity>(&mut conn)
            .optional()?;

        Ok(booking)
    }

    async fn list_by_traveller(&self, traveller_id: Uuid) -> Result<Vec<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = bookings::table
            .filter(bookings::traveller_id.eq(traveller_id))
            .order(bookings::created_at.desc())
            .select(BookingEntity::as_select())
            .load::<BookingEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = bookings::table
            .filter(bookings::owner_id.eq(owner_id))
            .order(bookings::created_at.desc())
            .select(BookingEntity::as_select())
            .load::<BookingEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_approved_overlapping(
        &self,
        property_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = bookings::table
            .filter(bookings::property_id.eq(property_id))
            .filter(bookings::booking_status.eq(BookingStatus::Approved.as_str()))
            .filter(bookings::start_date.lt(end_date))
            .filter(bookings::end_date.gt(start_date))
            .select(BookingEntity::as_select())
            .load::<BookingEntity>(&mut conn)?;

        Ok(results)
    }

    async fn update_status(
        &self,
        booking_id: Uuid,
        update_booking_status_entity: UpdateBookingStatusEntity,
    ) -> Result<BookingEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let booking = update(bookings::table)
            .filter(bookings::id.eq(booking_id))
            .set(&update_booking_status_entity)
            .returning(BookingEntity::as_returning())
            .get_result::<BookingEntity>(&mut conn)?;

        Ok(booking)
    }

    async fn set_payment_intent(&self, booking_id: Uuid, payment_intent_id: String) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(bookings::table)
            .filter(bookings::id.eq(booking_id))
            .set((
                bookings::payment_intent_id.eq(Some(payment_intent_id)),
                bookings::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn list_completable(&self, today: NaiveDate) -> Result<Vec<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = bookings::table
            .filter(bookings::booking_status.eq(BookingStatus::Approved.as_str()))
            .filter(bookings::payment_status.eq(PaymentStatus::Paid.as_str()))
            .filter(bookings::end_date.lt(today))
            .select(BookingEntity::as_select())
            .load::<BookingEntity>(&mut conn)?;

        Ok(results)
    }
}
