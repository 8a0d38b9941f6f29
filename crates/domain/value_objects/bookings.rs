use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::bookings::BookingEntity,
    value_objects::enums::{
        booking_statuses::BookingStatus, owner_approval_statuses::OwnerApprovalStatus,
        payment_statuses::PaymentStatus,
    },
};

pub const MAX_BOOKING_PRICE_MINOR: i64 = 100_000_000_000;
pub const MAX_STAY_NIGHTS: i64 = 365;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingModel {
    pub property_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests: i32,
    pub price_minor: i64,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingDecisionModel {
    pub action: DecisionAction,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BookingDto {
    pub id: Uuid,
    pub property_id: Uuid,
    pub owner_id: Uuid,
    pub traveller_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub nights: i64,
    pub guests: i32,
    pub price_minor: i64,
    pub service_charge_minor: i64,
    pub total_minor: i64,
    pub booking_status: BookingStatus,
    pub owner_approval_status: OwnerApprovalStatus,
    pub payment_status: PaymentStatus,
    pub payment_intent_id: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookingEntity> for BookingDto {
    fn from(value: BookingEntity) -> Self {
        Self {
            id: value.id,
            property_id: value.property_id,
            owner_id: value.owner_id,
            traveller_id: value.traveller_id,
            start_date: value.start_date,
            end_date: value.end_date,
            nights: (value.end_date - value.start_date).num_days(),
            guests: value.guests,
            price_minor: value.price_minor,
            service_charge_minor: value.service_charge_minor,
            total_minor: value.price_minor + value.service_charge_minor,
            booking_status: BookingStatus::from_str(&value.booking_status).unwrap_or_default(),
            owner_approval_status: OwnerApprovalStatus::from_str(&value.owner_approval_status)
                .unwrap_or_default(),
            payment_status: PaymentStatus::from_str(&value.payment_status).unwrap_or_default(),
            payment_intent_id: value.payment_intent_id,
            transaction_id: value.transaction_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PaymentIntentDto {
    pub booking_id: Uuid,
    pub payment_intent_id: String,
    pub client_secret: String,
    pub amount_minor: i64,
    pub currency: String,
}
