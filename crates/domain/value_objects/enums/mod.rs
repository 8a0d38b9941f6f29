pub mod booking_statuses;
pub mod owner_approval_statuses;
pub mod payment_statuses;
pub mod subscription_statuses;
pub mod user_roles;
