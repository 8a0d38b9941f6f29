use serde::Serialize;
use thiserror::Error;

use crate::domain::value_objects::enums::{
    booking_statuses::BookingStatus, owner_approval_statuses::OwnerApprovalStatus,
    payment_statuses::PaymentStatus,
};

pub const SERVICE_CHARGE_PERCENT: i64 = 12;

/// Platform fee charged on top of the booking price, rounded half-up to the minor unit.
pub fn service_charge_minor(price_minor: i64) -> i64 {
    let charge = (i128::from(price_minor) * i128::from(SERVICE_CHARGE_PERCENT) + 50) / 100;
    i64::try_from(charge).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("owner approval cannot move from {from} to {to}")]
    ApprovalTransition {
        from: OwnerApprovalStatus,
        to: OwnerApprovalStatus,
    },
    #[error("payment cannot move from {from} to {to}")]
    PaymentTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },
    #[error("booking is {0} and can no longer change")]
    Closed(BookingStatus),
    #[error("booking must be approved by the owner before payment")]
    NotApproved,
    #[error("booking cannot be cancelled while {0}")]
    NotCancellable(BookingStatus),
    #[error("only approved and paid bookings can be completed")]
    NotCompletable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OwnerDecision {
    Approve,
    Reject,
}

/// The three status columns of a booking, moved together so they never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookingState {
    pub booking_status: BookingStatus,
    pub owner_approval_status: OwnerApprovalStatus,
    pub payment_status: PaymentStatus,
}

impl Default for BookingState {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingState {
    pub fn new() -> Self {
        Self {
            booking_status: BookingStatus::Pending,
            owner_approval_status: OwnerApprovalStatus::Pending,
            payment_status: PaymentStatus::Awaiting,
        }
    }

    pub fn parse(
        booking_status: &str,
        owner_approval_status: &str,
        payment_status: &str,
    ) -> Option<Self> {
        Some(Self {
            booking_status: BookingStatus::from_str(booking_status)?,
            owner_approval_status: OwnerApprovalStatus::from_str(owner_approval_status)?,
            payment_status: PaymentStatus::from_str(payment_status)?,
        })
    }

    pub fn decide(self, decision: OwnerDecision) -> Result<Self, LifecycleError> {
        if self.booking_status.is_terminal() {
            return Err(LifecycleError::Closed(self.booking_status));
        }

        let to = match decision {
            OwnerDecision::Approve => OwnerApprovalStatus::Approved,
            OwnerDecision::Reject => OwnerApprovalStatus::Rejected,
        };
        if self.owner_approval_status != OwnerApprovalStatus::Pending {
            return Err(LifecycleError::ApprovalTransition {
                from: self.owner_approval_status,
                to,
            });
        }

        Ok(self.with(to, self.payment_status))
    }

    pub fn cancel(self) -> Result<Self, LifecycleError> {
        match self.booking_status {
            BookingStatus::Pending | BookingStatus::Approved => Ok(Self {
                booking_status: BookingStatus::Cancelled,
                ..self
            }),
            other => Err(LifecycleError::NotCancellable(other)),
        }
    }

    /// Gate for opening a payment with the provider.
    pub fn ensure_payable(&self) -> Result<(), LifecycleError> {
        if self.booking_status.is_terminal() || self.booking_status == BookingStatus::Rejected {
            return Err(LifecycleError::Closed(self.booking_status));
        }
        if self.owner_approval_status != OwnerApprovalStatus::Approved {
            return Err(LifecycleError::NotApproved);
        }
        match self.payment_status {
            PaymentStatus::Awaiting | PaymentStatus::Failed => Ok(()),
            other => Err(LifecycleError::PaymentTransition {
                from: other,
                to: PaymentStatus::Paid,
            }),
        }
    }

    /// Applies a provider-reported payment outcome. Repeating the current status is a no-op.
    ///
    /// A cancelled booking never becomes paid; a late capture stays with the
    /// provider for a refund.
    pub fn record_payment(self, to: PaymentStatus) -> Result<Self, LifecycleError> {
        let from = self.payment_status;
        if from == to {
            return Ok(self);
        }
        if to == PaymentStatus::Paid && self.booking_status == BookingStatus::Cancelled {
            return Err(LifecycleError::Closed(self.booking_status));
        }

        let allowed = matches!(
            (from, to),
            (PaymentStatus::Awaiting, PaymentStatus::Paid)
                | (PaymentStatus::Awaiting, PaymentStatus::Failed)
                | (PaymentStatus::Awaiting, PaymentStatus::Refunded)
                | (PaymentStatus::Failed, PaymentStatus::Paid)
                | (PaymentStatus::Paid, PaymentStatus::Refunded)
        );
        if !allowed {
            return Err(LifecycleError::PaymentTransition { from, to });
        }
        if to == PaymentStatus::Paid
            && self.owner_approval_status != OwnerApprovalStatus::Approved
        {
            return Err(LifecycleError::NotApproved);
        }

        Ok(self.with(self.owner_approval_status, to))
    }

    pub fn complete(self) -> Result<Self, LifecycleError> {
        if self.booking_status != BookingStatus::Approved
            || self.payment_status != PaymentStatus::Paid
        {
            return Err(LifecycleError::NotCompletable);
        }
        Ok(Self {
            booking_status: BookingStatus::Completed,
            ..self
        })
    }

    fn with(
        self,
        owner_approval_status: OwnerApprovalStatus,
        payment_status: PaymentStatus,
    ) -> Self {
        Self {
            booking_status: compose_booking_status(
                self.booking_status,
                owner_approval_status,
                payment_status,
            ),
            owner_approval_status,
            payment_status,
        }
    }
}

pub fn compose_booking_status(
    current: BookingStatus,
    owner_approval_status: OwnerApprovalStatus,
    payment_status: PaymentStatus,
) -> BookingStatus {
    if current.is_terminal() {
        return current;
    }
    if payment_status == PaymentStatus::Refunded {
        return BookingStatus::Cancelled;
    }
    match owner_approval_status {
        OwnerApprovalStatus::Pending => BookingStatus::Pending,
        OwnerApprovalStatus::Approved => BookingStatus::Approved,
        OwnerApprovalStatus::Rejected => BookingStatus::Rejected,
    }
}
