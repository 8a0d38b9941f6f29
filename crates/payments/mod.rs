pub mod razorpay_client;
pub mod stripe_client;
