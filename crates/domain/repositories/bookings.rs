use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::bookings::{
    BookingEntity, InsertBookingEntity, UpdateBookingStatusEntity,
};

#[async_trait]
#[automock]
pub trait BookingRepository {
    async fn create(&self, insert_booking_entity: InsertBookingEntity) -> Result<BookingEntity>;

    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<BookingEntity>>;

    async fn find_by_payment_intent_id(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<BookingEntity>>;

    async fn list_by_traveller(&self, traveller_id: Uuid) -> Result<Vec<BookingEntity>>;

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<BookingEntity>>;

    /// Approved bookings of a property whose stay intersects `[start_date, end_date)`.
    async fn list_approved_overlapping(
        &self,
        property_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<BookingEntity>>;

    async fn update_status(
        &self,
        booking_id: Uuid,
        update_booking_status_entity: UpdateBookingStatusEntity,
    ) -> Result<BookingEntity>;

    async fn set_payment_intent(&self, booking_id: Uuid, payment_intent_id: String) -> Result<()>;

    /// Approved and paid bookings whose stay ended before `today`.
    async fn list_completable(&self, today: NaiveDate) -> Result<Vec<BookingEntity>>;
}
