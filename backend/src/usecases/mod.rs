pub mod bookings;
pub mod contact;
pub mod oauth;
pub mod places;
pub mod properties;
pub mod reviews;
pub mod subscriptions;
pub mod users;
