pub mod cache;
pub mod db;
pub mod google;
pub mod realtime;
