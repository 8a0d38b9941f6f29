use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use crates::{
    domain::value_objects::places::{
        AutocompleteDto, MAX_QUERY_LEN, PlacePrediction, normalize_query,
    },
    infra::{
        cache::autocomplete_cache::AutocompleteCache, google::places_client::GooglePlacesClient,
    },
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlacesGateway: Send + Sync {
    async fn autocomplete(&self, input: &str) -> AnyResult<Vec<PlacePrediction>>;
}

#[async_trait]
impl PlacesGateway for GooglePlacesClient {
    async fn autocomplete(&self, input: &str) -> AnyResult<Vec<PlacePrediction>> {
        self.autocomplete(input).await
    }
}

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("input is required")]
    MissingInput,
    #[error("input must be at most 200 characters")]
    InputTooLong,
    #[error("places lookup failed")]
    Upstream(#[source] anyhow::Error),
}

impl PlacesError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PlacesError::MissingInput | PlacesError::InputTooLong => StatusCode::BAD_REQUEST,
            PlacesError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PlacesError>;

pub struct PlacesUseCase<G>
where
    G: PlacesGateway + Send + Sync + 'static,
{
    places_gateway: Arc<G>,
    cache: Arc<AutocompleteCache>,
}

impl<G> PlacesUseCase<G>
where
    G: PlacesGateway + Send + Sync + 'static,
{
    pub fn new(places_gateway: Arc<G>, cache: Arc<AutocompleteCache>) -> Self {
        Self {
            places_gateway,
            cache,
        }
    }

    pub async fn autocomplete(&self, input: Option<String>) -> UseCaseResult<AutocompleteDto> {
        let input = input.unwrap_or_default();
        let input = input.trim();

        if input.chars().count() > MAX_QUERY_LEN {
            warn!(input_len = input.chars().count(), "places: input too long");
            return Err(PlacesError::InputTooLong);
        }

        let key = normalize_query(input);
        if key.is_empty() {
            return Err(PlacesError::MissingInput);
        }

        if let Some(predictions) = self.cache.get(&key).await {
            debug!(query = %key, "places: cache hit");
            return Ok(AutocompleteDto {
                predictions,
                cached: true,
            });
        }

        let predictions = self.places_gateway.autocomplete(input).await.map_err(|err| {
            error!(query = %key, upstream_error = ?err, "places: upstream lookup failed");
            PlacesError::Upstream(err)
        })?;

        info!(
            query = %key,
            prediction_count = predictions.len(),
            "places: upstream lookup cached"
        );
        self.cache.insert(key, predictions.clone()).await;

        Ok(AutocompleteDto {
            predictions,
            cached: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn goa() -> Vec<PlacePrediction> {
        vec![PlacePrediction {
            place_id: "goa-1".to_string(),
            description: "Goa, India".to_string(),
            main_text: Some("Goa".to_string()),
            secondary_text: Some("India".to_string()),
        }]
    }

    fn usecase(gateway: MockPlacesGateway) -> PlacesUseCase<MockPlacesGateway> {
        PlacesUseCase::new(
            Arc::new(gateway),
            Arc::new(AutocompleteCache::new(Duration::from_secs(300), 100)),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_input_within_ttl_hits_upstream_once() {
        let mut gateway = MockPlacesGateway::new();
        gateway
            .expect_autocomplete()
            .times(1)
            .returning(|_| Ok(goa()));

        let usecase = usecase(gateway);

        let first = usecase.autocomplete(Some("Goa".to_string())).await.unwrap();
        tokio::time::advance(Duration::from_secs(120)).await;
        let second = usecase.autocomplete(Some("  goa ".to_string())).await.unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(second.predictions, goa());
    }

    #[tokio::test(start_paused = true)]
    async fn input_after_ttl_goes_upstream_again() {
        let mut gateway = MockPlacesGateway::new();
        gateway
            .expect_autocomplete()
            .times(2)
            .returning(|_| Ok(goa()));

        let usecase = usecase(gateway);

        usecase.autocomplete(Some("Goa".to_string())).await.unwrap();
        tokio::time::advance(Duration::from_secs(300)).await;
        let again = usecase.autocomplete(Some("Goa".to_string())).await.unwrap();

        assert!(!again.cached);
    }

    #[tokio::test]
    async fn blank_and_oversized_input_is_rejected() {
        let mut gateway = MockPlacesGateway::new();
        gateway.expect_autocomplete().never();
        let usecase = usecase(gateway);

        let blank = usecase.autocomplete(Some("   ".to_string())).await.unwrap_err();
        assert!(matches!(blank, PlacesError::MissingInput));

        let missing = usecase.autocomplete(None).await.unwrap_err();
        assert!(matches!(missing, PlacesError::MissingInput));

        let long = usecase
            .autocomplete(Some("a".repeat(MAX_QUERY_LEN + 1)))
            .await
            .unwrap_err();
        assert_eq!(long.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upstream_failure_is_not_cached() {
        let mut gateway = MockPlacesGateway::new();
        let mut calls = 0;
        gateway.expect_autocomplete().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(anyhow::anyhow!("quota exceeded"))
            } else {
                Ok(goa())
            }
        });

        let usecase = usecase(gateway);

        let err = usecase.autocomplete(Some("Goa".to_string())).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);

        let ok = usecase.autocomplete(Some("Goa".to_string())).await.unwrap();
        assert!(!ok.cached);
    }
}
