pub mod oauth_client;
pub mod places_client;
