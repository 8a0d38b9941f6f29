pub mod room_hub;
