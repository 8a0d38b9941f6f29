use std::sync::Arc;

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use crates::domain::{
    entities::bookings::UpdateBookingStatusEntity,
    repositories::{bookings::BookingRepository, subscriptions::SubscriptionRepository},
    value_objects::booking_lifecycle::BookingState,
};
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct CompleteBookingsResult {
    pub scanned: usize,
    pub completed: usize,
    pub failed: usize,
    pub completed_ids: Vec<Uuid>,
    pub failed_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct LifecycleSweepResult {
    pub bookings: CompleteBookingsResult,
    pub expired_subscriptions: usize,
}

/// Time-driven transitions: finished stays become `completed` and
/// subscriptions past their end date become `expired`.
pub struct LifecycleSweepUseCase {
    booking_repo: Arc<dyn BookingRepository + Send + Sync>,
    subscription_repo: Arc<dyn SubscriptionRepository + Send + Sync>,
}

impl LifecycleSweepUseCase {
    pub fn new(
        booking_repo: Arc<dyn BookingRepository + Send + Sync>,
        subscription_repo: Arc<dyn SubscriptionRepository + Send + Sync>,
    ) -> Self {
        Self {
            booking_repo,
            subscription_repo,
        }
    }

    /// Runs both sweeps every time; a failing one does not skip the other.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<LifecycleSweepResult> {
        let bookings = self.complete_finished_bookings(now.date_naive()).await;
        if let Err(err) = &bookings {
            error!(db_error = ?err, "lifecycle_sweep: booking completion failed");
        }

        let expired_subscriptions = self.expire_ended_subscriptions(now).await;
        if let Err(err) = &expired_subscriptions {
            error!(db_error = ?err, "lifecycle_sweep: subscription expiry failed");
        }

        let (bookings, expired_subscriptions) = match (bookings, expired_subscriptions) {
            (Ok(bookings), Ok(expired)) => (bookings, expired),
            (Err(err), _) => return Err(err.context("booking completion failed")),
            (_, Err(err)) => return Err(err.context("subscription expiry failed")),
        };

        info!(
            scanned_bookings = bookings.scanned,
            completed_bookings = bookings.completed,
            failed_bookings = bookings.failed,
            expired_subscriptions,
            "lifecycle_sweep: completed"
        );

        Ok(LifecycleSweepResult {
            bookings,
            expired_subscriptions,
        })
    }

    pub async fn complete_finished_bookings(
        &self,
        today: NaiveDate,
    ) -> Result<CompleteBookingsResult> {
        let bookings = self.booking_repo.list_completable(today).await?;

        let mut result = CompleteBookingsResult {
            scanned: bookings.len(),
            ..Default::default()
        };

        for booking in bookings {
            let next = BookingState::parse(
                &booking.booking_status,
                &booking.owner_approval_status,
                &booking.payment_status,
            )
            .ok_or_else(|| anyhow!("unknown status columns"))
            .and_then(|state| state.complete().map_err(anyhow::Error::from));

            let next = match next {
                Ok(next) => next,
                Err(err) => {
                    warn!(
                        booking_id = %booking.id,
                        reason = %err,
                        "lifecycle_sweep: booking not completable; skipping"
                    );
                    result.failed += 1;
                    if result.failed_ids.len() < 20 {
                        result.failed_ids.push(booking.id);
                    }
                    continue;
                }
            };

            let update = UpdateBookingStatusEntity {
                booking_status: next.booking_status.as_str().to_string(),
                owner_approval_status: next.owner_approval_status.as_str().to_string(),
                payment_status: next.payment_status.as_str().to_string(),
                transaction_id: booking.transaction_id.clone(),
                updated_at: Utc::now(),
            };

            match self.booking_repo.update_status(booking.id, update).await {
                Ok(_) => {
                    result.completed += 1;
                    if result.completed_ids.len() < 20 {
                        result.completed_ids.push(booking.id);
                    }
                }
                Err(err) => {
                    error!(
                        booking_id = %booking.id,
                        db_error = ?err,
                        "lifecycle_sweep: failed to mark booking completed"
                    );
                    result.failed += 1;
                    if result.failed_ids.len() < 20 {
                        result.failed_ids.push(booking.id);
                    }
                }
            }
        }

        Ok(result)
    }

    pub async fn expire_ended_subscriptions(&self, now: DateTime<Utc>) -> Result<usize> {
        let expired = self.subscription_repo.expire_ended(now).await?;
        if expired > 0 {
            info!(expired, "lifecycle_sweep: subscriptions expired");
        }
        Ok(expired)
    }
}
