use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::subscriptions::SubscriptionRepository,
        value_objects::subscriptions::{CheckoutModel, VerifyPaymentModel},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::subscriptions::SubscriptionPostgres,
    },
    payments::razorpay_client::RazorpayClient,
};
use tracing::info;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    config::config_model::DotEnvyConfig,
    usecases::subscriptions::{RazorpayGateway, SubscriptionUseCase},
};

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let subscriptions_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let razorpay_client = RazorpayClient::new(
        config.razorpay.key_id.clone(),
        config.razorpay.key_secret.clone(),
    );
    let subscriptions_usecase =
        SubscriptionUseCase::new(Arc::new(subscriptions_repository), Arc::new(razorpay_client));

    Router::new()
        .route("/plans", get(list_plans))
        .route("/current", get(check_current_user_subscription))
        .route("/checkout", post(checkout))
        .route("/verify", post(verify_payment))
        .route("/cancel", post(cancel_subscription))
        .with_state(Arc::new(subscriptions_usecase))
}

pub async fn list_plans<S, G>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<S, G>>>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    G: RazorpayGateway + Send + Sync + 'static,
{
    Json(subscriptions_usecase.list_plans())
}

pub async fn check_current_user_subscription<S, G>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<S, G>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    G: RazorpayGateway + Send + Sync + 'static,
{
    let current = subscriptions_usecase
        .current_subscription(auth.user_id)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(current))
}

pub async fn checkout<S, G>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<S, G>>>,
    auth: AuthUser,
    Json(checkout_model): Json<CheckoutModel>,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    G: RazorpayGateway + Send + Sync + 'static,
{
    info!(
        user_id = %auth.user_id,
        plan_id = %checkout_model.plan_id,
        "subscriptions: checkout request received"
    );
    let checkout = subscriptions_usecase
        .checkout(auth.user_id, checkout_model)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok((StatusCode::CREATED, Json(checkout)))
}

pub async fn verify_payment<S, G>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<S, G>>>,
    auth: AuthUser,
    Json(verify_payment_model): Json<VerifyPaymentModel>,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    G: RazorpayGateway + Send + Sync + 'static,
{
    let subscription = subscriptions_usecase
        .verify_payment(auth.user_id, verify_payment_model)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(subscription))
}

pub async fn cancel_subscription<S, G>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<S, G>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    G: RazorpayGateway + Send + Sync + 'static,
{
    let subscription = subscriptions_usecase
        .cancel(auth.user_id)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(subscription))
}
