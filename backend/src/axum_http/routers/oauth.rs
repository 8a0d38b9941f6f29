use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use crates::{
    domain::repositories::users::UserRepository,
    infra::{
        db::{postgres::postgres_connection::PgPoolSquad, repositories::users::UserPostgres},
        google::oauth_client::GoogleOAuthClient,
    },
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    auth::JwtKeys,
    axum_http::error_responses::AppError,
    config::config_model::DotEnvyConfig,
    usecases::oauth::{OAuthProvider, OAuthUseCase},
};

#[derive(Debug, Deserialize)]
pub struct AuthUrlQuery {
    state: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthUrlResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
}

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    config: Arc<DotEnvyConfig>,
    jwt_keys: Arc<JwtKeys>,
) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let google = &config.google;
    let oauth_client = GoogleOAuthClient::new(
        google.client_id.clone(),
        google.client_secret.clone(),
        google.redirect_uri.clone(),
    );
    let usecase = OAuthUseCase::new(Arc::new(user_repository), Arc::new(oauth_client), jwt_keys);

    Router::new()
        .route("/google/url", get(authorization_url))
        .route("/google/callback", get(callback))
        .with_state(Arc::new(usecase))
}

pub async fn authorization_url<U, P>(
    State(usecase): State<Arc<OAuthUseCase<U, P>>>,
    Query(query): Query<AuthUrlQuery>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    P: OAuthProvider + Send + Sync + 'static,
{
    let url = usecase
        .authorization_url(query.state.as_deref())
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(AuthUrlResponse { url }))
}

pub async fn callback<U, P>(
    State(usecase): State<Arc<OAuthUseCase<U, P>>>,
    Query(query): Query<CallbackQuery>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    P: OAuthProvider + Send + Sync + 'static,
{
    info!("oauth: google callback received");
    let session = usecase
        .handle_callback(query.code, query.state)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(session))
}
