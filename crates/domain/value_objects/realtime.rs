use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::value_objects::enums::user_roles::UserRole;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RealtimeEventType {
    BookingRequested,
    BookingApproved,
    BookingRejected,
    BookingCancelled,
    PaymentSucceeded,
    PaymentFailed,
    PaymentRefunded,
}

impl RealtimeEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RealtimeEventType::BookingRequested => "booking_requested",
            RealtimeEventType::BookingApproved => "booking_approved",
            RealtimeEventType::BookingRejected => "booking_rejected",
            RealtimeEventType::BookingCancelled => "booking_cancelled",
            RealtimeEventType::PaymentSucceeded => "payment_succeeded",
            RealtimeEventType::PaymentFailed => "payment_failed",
            RealtimeEventType::PaymentRefunded => "payment_refunded",
        }
    }
}

impl Display for RealtimeEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RealtimeEvent {
    pub event_type: RealtimeEventType,
    pub booking_id: Uuid,
    pub payload: serde_json::Value,
    pub emitted_at: DateTime<Utc>,
}

impl RealtimeEvent {
    pub fn new(
        event_type: RealtimeEventType,
        booking_id: Uuid,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_type,
            booking_id,
            payload,
            emitted_at: Utc::now(),
        }
    }
}

/// Room a client joins to receive events addressed to one identity in one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Room {
    pub role: UserRole,
    pub user_id: Uuid,
}

impl Room {
    pub fn owner(user_id: Uuid) -> Self {
        Self {
            role: UserRole::Owner,
            user_id,
        }
    }

    pub fn traveller(user_id: Uuid) -> Self {
        Self {
            role: UserRole::Traveller,
            user_id,
        }
    }
}

impl Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.role, self.user_id)
    }
}
