pub mod bookings;
pub mod contact_messages;
pub mod properties;
pub mod reviews;
pub mod subscriptions;
pub mod users;
