use std::sync::Arc;

use anyhow::Result;
use crates::domain::repositories::{
    bookings::BookingRepository, subscriptions::SubscriptionRepository,
};
use crates::infra::db::{
    postgres::postgres_connection,
    repositories::{bookings::BookingPostgres, subscriptions::SubscriptionPostgres},
};
use tracing::{error, info};
use worker::{axum_http, config, services, usecases::lifecycle_sweep::LifecycleSweepUseCase};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(error) = run().await {
        error!("Worker exited with error: {}", error);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!(stage = %dotenvy_env.stage, "ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    let booking_repository: Arc<dyn BookingRepository + Send + Sync> =
        Arc::new(BookingPostgres::new(Arc::clone(&db_pool_arc)));
    let subscription_repository: Arc<dyn SubscriptionRepository + Send + Sync> =
        Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool_arc)));

    let sweep_usecase = Arc::new(LifecycleSweepUseCase::new(
        booking_repository,
        subscription_repository,
    ));

    // Spawn background loop
    let sweep_loop = tokio::spawn(services::worker_loop::run_worker_loop(
        Arc::clone(&sweep_usecase),
        dotenvy_env.sweep.interval_secs,
    ));

    let server_config = Arc::clone(&dotenvy_env);
    let worker_server = tokio::spawn(async move {
        axum_http::http_serve::start(server_config, sweep_usecase).await
    });

    tokio::select! {
        result = sweep_loop => result??,
        result = worker_server => result??,
    };
    Ok(())
}
