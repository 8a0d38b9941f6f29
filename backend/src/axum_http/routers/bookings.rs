use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{bookings::BookingRepository, properties::PropertyRepository},
        value_objects::bookings::{BookingDecisionModel, CreateBookingModel},
    },
    infra::{
        db::{
            postgres::postgres_connection::PgPoolSquad,
            repositories::{bookings::BookingPostgres, properties::PropertyPostgres},
        },
        realtime::room_hub::RoomHub,
    },
    payments::stripe_client::StripeClient,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    config::config_model::DotEnvyConfig,
    usecases::bookings::{BookingUseCase, PaymentGateway},
};

pub type PostgresBookingUseCase = BookingUseCase<BookingPostgres, PropertyPostgres, StripeClient>;

pub fn booking_usecase(
    db_pool: Arc<PgPoolSquad>,
    config: &DotEnvyConfig,
    stripe_client: Arc<StripeClient>,
    room_hub: Arc<RoomHub>,
) -> PostgresBookingUseCase {
    BookingUseCase::new(
        Arc::new(BookingPostgres::new(Arc::clone(&db_pool))),
        Arc::new(PropertyPostgres::new(Arc::clone(&db_pool))),
        stripe_client,
        room_hub,
        config.stripe.currency.clone(),
    )
}

pub fn routes(usecase: Arc<PostgresBookingUseCase>) -> Router {
    Router::new()
        .route("/", post(create_booking))
        .route("/traveller", get(list_traveller_bookings))
        .route("/owner", get(list_owner_bookings))
        .route("/:booking_id", get(get_booking))
        .route("/:booking_id/decision", post(decide_booking))
        .route("/:booking_id/cancel", post(cancel_booking))
        .route("/:booking_id/payment-intent", post(create_payment_intent))
        .with_state(usecase)
}

pub async fn create_booking<B, P, G>(
    State(usecase): State<Arc<BookingUseCase<B, P, G>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(create_booking_model): Json<CreateBookingModel>,
) -> Result<impl IntoResponse, AppError>
where
    B: BookingRepository + Send + Sync + 'static,
    P: PropertyRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    info!(
        %user_id,
        property_id = %create_booking_model.property_id,
        "bookings: create request received"
    );
    let booking = usecase
        .create_booking(user_id, create_booking_model)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn list_traveller_bookings<B, P, G>(
    State(usecase): State<Arc<BookingUseCase<B, P, G>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    B: BookingRepository + Send + Sync + 'static,
    P: PropertyRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    let bookings = usecase
        .list_traveller_bookings(user_id)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(bookings))
}

pub async fn list_owner_bookings<B, P, G>(
    State(usecase): State<Arc<BookingUseCase<B, P, G>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    B: BookingRepository + Send + Sync + 'static,
    P: PropertyRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    let bookings = usecase
        .list_owner_bookings(user_id)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(bookings))
}

pub async fn get_booking<B, P, G>(
    State(usecase): State<Arc<BookingUseCase<B, P, G>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    B: BookingRepository + Send + Sync + 'static,
    P: PropertyRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    let booking = usecase
        .get_booking(user_id, booking_id)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(booking))
}

pub async fn decide_booking<B, P, G>(
    State(usecase): State<Arc<BookingUseCase<B, P, G>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(booking_id): Path<Uuid>,
    Json(decision): Json<BookingDecisionModel>,
) -> Result<impl IntoResponse, AppError>
where
    B: BookingRepository + Send + Sync + 'static,
    P: PropertyRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    info!(%user_id, %booking_id, action = ?decision.action, "bookings: decision request received");
    let booking = usecase
        .decide_booking(user_id, booking_id, decision.action)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(booking))
}

pub async fn cancel_booking<B, P, G>(
    State(usecase): State<Arc<BookingUseCase<B, P, G>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    B: BookingRepository + Send + Sync + 'static,
    P: PropertyRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    let booking = usecase
        .cancel_booking(user_id, booking_id)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(booking))
}

pub async fn create_payment_intent<B, P, G>(
    State(usecase): State<Arc<BookingUseCase<B, P, G>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    B: BookingRepository + Send + Sync + 'static,
    P: PropertyRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    let intent = usecase
        .create_payment_intent(user_id, booking_id)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok((StatusCode::CREATED, Json(intent)))
}
