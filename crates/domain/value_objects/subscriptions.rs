use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::subscriptions::SubscriptionEntity,
    value_objects::enums::subscription_statuses::SubscriptionStatus,
};

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutModel {
    pub plan_id: String,
    pub duration_months: i32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CheckoutDto {
    pub subscription_id: Uuid,
    pub razorpay_order_id: String,
    pub razorpay_key_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub original_amount_minor: i64,
    pub discount_amount_minor: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentModel {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SubscriptionDto {
    pub id: Uuid,
    pub plan_id: String,
    pub duration_months: i32,
    pub original_amount_minor: i64,
    pub discount_amount_minor: i64,
    pub final_amount_minor: i64,
    pub status: SubscriptionStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl SubscriptionDto {
    /// Builds the view of a row as of `now`; an active row past its end date reads as expired.
    pub fn from_entity(value: SubscriptionEntity, now: DateTime<Utc>) -> Self {
        Self {
            status: effective_status(&value, now),
            id: value.id,
            plan_id: value.plan_id,
            duration_months: value.duration_months,
            original_amount_minor: value.original_amount_minor,
            discount_amount_minor: value.discount_amount_minor,
            final_amount_minor: value.final_amount_minor,
            start_date: value.start_date,
            end_date: value.end_date,
        }
    }
}

pub fn effective_status(
    subscription: &SubscriptionEntity,
    now: DateTime<Utc>,
) -> SubscriptionStatus {
    match SubscriptionStatus::from_str(&subscription.status) {
        SubscriptionStatus::Active => match subscription.end_date {
            Some(end_date) if end_date <= now => SubscriptionStatus::Expired,
            _ => SubscriptionStatus::Active,
        },
        other => other,
    }
}

pub fn subscription_period(
    starts_at: DateTime<Utc>,
    duration_months: i32,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let months = u32::try_from(duration_months).ok()?;
    let ends_at = starts_at.checked_add_months(Months::new(months))?;
    Some((starts_at, ends_at))
}
