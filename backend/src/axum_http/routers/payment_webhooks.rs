use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use crates::domain::repositories::{bookings::BookingRepository, properties::PropertyRepository};
use serde_json::json;

use crate::{
    axum_http::{error_responses::AppError, routers::bookings::PostgresBookingUseCase},
    usecases::bookings::{BookingUseCase, PaymentGateway},
};

const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

pub fn routes(usecase: Arc<PostgresBookingUseCase>) -> Router {
    Router::new()
        .route("/stripe", post(stripe_webhook))
        .with_state(usecase)
}

/// The raw body is required: the signature covers the exact bytes Stripe sent.
pub async fn stripe_webhook<B, P, G>(
    State(usecase): State<Arc<BookingUseCase<B, P, G>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError>
where
    B: BookingRepository + Send + Sync + 'static,
    P: PropertyRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    usecase
        .handle_stripe_webhook(&body, signature)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok((StatusCode::OK, Json(json!({ "received": true }))))
}
