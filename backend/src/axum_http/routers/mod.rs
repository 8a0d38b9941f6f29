pub mod bookings;
pub mod contact;
pub mod oauth;
pub mod payment_webhooks;
pub mod places;
pub mod properties;
pub mod realtime;
pub mod reviews;
pub mod subscriptions;
pub mod users;
