use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use crates::{
    domain::value_objects::places::AutocompleteQuery,
    infra::{
        cache::autocomplete_cache::AutocompleteCache, google::places_client::GooglePlacesClient,
    },
};

use crate::{
    axum_http::error_responses::AppError,
    config::config_model::DotEnvyConfig,
    usecases::places::{PlacesGateway, PlacesUseCase},
};

pub fn routes(config: Arc<DotEnvyConfig>, cache: Arc<AutocompleteCache>) -> Router {
    let places_client = GooglePlacesClient::new(config.google.places_api_key.clone());
    let usecase = PlacesUseCase::new(Arc::new(places_client), cache);

    Router::new()
        .route("/autocomplete", get(autocomplete))
        .with_state(Arc::new(usecase))
}

pub async fn autocomplete<G>(
    State(usecase): State<Arc<PlacesUseCase<G>>>,
    Query(query): Query<AutocompleteQuery>,
) -> Result<impl IntoResponse, AppError>
where
    G: PlacesGateway + Send + Sync + 'static,
{
    let predictions = usecase
        .autocomplete(query.input)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(predictions))
}
