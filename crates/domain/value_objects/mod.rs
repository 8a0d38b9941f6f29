pub mod booking_lifecycle;
pub mod bookings;
pub mod contact;
pub mod enums;
pub mod places;
pub mod plans;
pub mod properties;
pub mod realtime;
pub mod reviews;
pub mod subscriptions;
pub mod users;
