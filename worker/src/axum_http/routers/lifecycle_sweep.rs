use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use crate::{
    config::config_model::DotEnvyConfig, usecases::lifecycle_sweep::LifecycleSweepUseCase,
};

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_WORKER/internal/v1/sweep/run" \
//     -H "Authorization: Bearer $INTERNAL_SWEEP_TOKEN"

#[derive(Clone)]
pub struct SweepRouteState {
    config: Arc<DotEnvyConfig>,
    usecase: Arc<LifecycleSweepUseCase>,
}

pub fn routes(config: Arc<DotEnvyConfig>, usecase: Arc<LifecycleSweepUseCase>) -> Router {
    Router::new()
        .route("/run", post(run_sweep))
        .with_state(SweepRouteState { config, usecase })
}

#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub scanned_bookings: usize,
    pub completed_bookings: usize,
    pub failed_bookings: usize,
    pub completed_ids: Vec<Uuid>,
    pub failed_ids: Vec<Uuid>,
    pub expired_subscriptions: usize,
}

pub async fn run_sweep(State(state): State<SweepRouteState>, headers: HeaderMap) -> Response {
    let Some(expected_token) = state.config.sweep.internal_token.as_deref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "sweep token is not configured",
        )
            .into_response();
    };

    if let Err(status) = authorize_bearer(&headers, expected_token) {
        return (status, "unauthorized").into_response();
    }

    match state.usecase.run(Utc::now()).await {
        Ok(result) => Json(SweepResponse {
            scanned_bookings: result.bookings.scanned,
            completed_bookings: result.bookings.completed,
            failed_bookings: result.bookings.failed,
            completed_ids: result.bookings.completed_ids,
            failed_ids: result.bookings.failed_ids,
            expired_subscriptions: result.expired_subscriptions,
        })
        .into_response(),
        Err(err) => {
            error!(error = ?err, "lifecycle_sweep: manual run failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "sweep failed").into_response()
        }
    }
}

fn authorize_bearer(headers: &HeaderMap, expected_token: &str) -> Result<(), StatusCode> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if token == expected_token {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use backend::config::stage::Stage;
    use crates::domain::repositories::{
        bookings::MockBookingRepository, subscriptions::MockSubscriptionRepository,
    };
    use tower::ServiceExt;

    use crate::config::config_model::{Database, Sweep, WorkerServer};

    fn config(internal_token: Option<&str>) -> Arc<DotEnvyConfig> {
        Arc::new(DotEnvyConfig {
            stage: Stage::Local,
            worker_server: WorkerServer {
                port: 8081,
                timeout: 30,
                body_limit: 1,
            },
            database: Database {
                url: "postgres://localhost/test".to_string(),
            },
            sweep: Sweep {
                interval_secs: 300,
                internal_token: internal_token.map(str::to_string),
            },
        })
    }

    fn idle_usecase() -> Arc<LifecycleSweepUseCase> {
        let mut booking_repo = MockBookingRepository::new();
        booking_repo
            .expect_list_completable()
            .returning(|_| Box::pin(async { Ok(vec![]) }));
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_expire_ended()
            .returning(|_| Box::pin(async { Ok(0) }));

        Arc::new(LifecycleSweepUseCase::new(
            Arc::new(booking_repo),
            Arc::new(subscription_repo),
        ))
    }

    fn request(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::post("/run");
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn sweep_requires_the_internal_token() {
        let app = routes(config(Some("secret")), idle_usecase());
        let response = app.oneshot(request(Some("wrong"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn sweep_is_disabled_without_a_token() {
        let app = routes(config(None), idle_usecase());
        let response = app.oneshot(request(Some("secret"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn authorized_sweep_runs() {
        let app = routes(config(Some("secret")), idle_usecase());
        let response = app.oneshot(request(Some("secret"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
