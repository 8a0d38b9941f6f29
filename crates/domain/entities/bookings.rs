use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::bookings;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = bookings)]
pub struct BookingEntity {
    pub id: Uuid,
    pub property_id: Uuid,
    pub owner_id: Uuid,
    pub traveller_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests: i32,
    pub price_minor: i64,
    pub service_charge_minor: i64,
    pub booking_status: String,
    pub owner_approval_status: String,
    pub payment_status: String,
    pub payment_intent_id: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = bookings)]
pub struct InsertBookingEntity {
    pub property_id: Uuid,
    pub owner_id: Uuid,
    pub traveller_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests: i32,
    pub price_minor: i64,
    pub service_charge_minor: i64,
    pub booking_status: String,
    pub owner_approval_status: String,
    pub payment_status: String,
}

/// Status columns written together after a lifecycle transition.
#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = bookings)]
pub struct UpdateBookingStatusEntity {
    pub booking_status: String,
    pub owner_approval_status: String,
    pub payment_status: String,
    pub transaction_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}
