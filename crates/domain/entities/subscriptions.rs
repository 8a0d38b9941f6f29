use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::subscriptions;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = subscriptions)]
pub struct SubscriptionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: String,
    pub duration_months: i32,
    pub original_amount_minor: i64,
    pub discount_amount_minor: i64,
    pub final_amount_minor: i64,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub status: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = subscriptions)]
pub struct InsertSubscriptionEntity {
    pub user_id: Uuid,
    pub plan_id: String,
    pub duration_months: i32,
    pub original_amount_minor: i64,
    pub discount_amount_minor: i64,
    pub final_amount_minor: i64,
    pub razorpay_order_id: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = subscriptions)]
pub struct ActivateSubscriptionEntity {
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub status: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}
