use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use crates::{
    infra::{
        cache::autocomplete_cache::AutocompleteCache,
        db::postgres::postgres_connection::PgPoolSquad, realtime::room_hub::RoomHub,
    },
    payments::stripe_client::StripeClient,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::{
    auth::JwtKeys,
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
};

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let jwt_keys = Arc::new(JwtKeys::new(&config.jwt.secret, config.jwt.ttl_hours));
    let room_hub = Arc::new(RoomHub::new());
    let autocomplete_cache = Arc::new(AutocompleteCache::new(
        Duration::from_secs(config.autocomplete.cache_ttl_secs),
        config.autocomplete.cache_capacity,
    ));
    let stripe_client = Arc::new(StripeClient::new(
        config.stripe.secret_key.clone(),
        config.stripe.webhook_secret.clone(),
    ));

    let booking_usecase = Arc::new(routers::bookings::booking_usecase(
        Arc::clone(&db_pool),
        &config,
        stripe_client,
        Arc::clone(&room_hub),
    ));

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/contact",
            routers::contact::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/places",
            routers::places::routes(Arc::clone(&config), autocomplete_cache),
        )
        .nest(
            "/api/v1/auth",
            routers::oauth::routes(
                Arc::clone(&db_pool),
                Arc::clone(&config),
                Arc::clone(&jwt_keys),
            ),
        )
        .nest(
            "/api/v1/users",
            routers::users::routes(Arc::clone(&db_pool), Arc::clone(&jwt_keys)),
        )
        .nest(
            "/api/v1/properties",
            routers::properties::routes(Arc::clone(&db_pool))
                .merge(routers::reviews::routes(Arc::clone(&db_pool))),
        )
        .nest(
            "/api/v1/bookings",
            routers::bookings::routes(Arc::clone(&booking_usecase)),
        )
        .nest(
            "/api/v1/webhooks",
            routers::payment_webhooks::routes(booking_usecase),
        )
        .nest(
            "/api/v1/subscriptions",
            routers::subscriptions::routes(Arc::clone(&db_pool), Arc::clone(&config)),
        )
        .nest(
            "/api/v1/realtime",
            routers::realtime::routes(Arc::clone(&room_hub), Arc::clone(&jwt_keys)),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(Extension(jwt_keys))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(cors_layer(config.cors_allowed_origin.as_deref())?)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!(stage = %config.stage, "Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Open event streams only end once their rooms are gone.
            room_hub.close_all().await;
        })
        .await?;

    Ok(())
}

fn cors_layer(allowed_origin: Option<&str>) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    match allowed_origin {
        Some(origin) => {
            let origin = HeaderValue::from_str(origin).context("CORS_ALLOWED_ORIGIN is invalid")?;
            Ok(layer.allow_origin(origin))
        }
        None => Ok(layer.allow_origin(Any)),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = ?err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = ?err, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
