use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::error;

use crate::domain::value_objects::places::PlacePrediction;

const AUTOCOMPLETE_URL: &str = "https://maps.googleapis.com/maps/api/place/autocomplete/json";

/// Thin client for the Google Places Autocomplete endpoint.
pub struct GooglePlacesClient {
    http: reqwest::Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    status: String,
    #[serde(default)]
    predictions: Vec<RawPrediction>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPrediction {
    place_id: String,
    description: String,
    structured_formatting: Option<StructuredFormatting>,
}

#[derive(Debug, Deserialize)]
struct StructuredFormatting {
    main_text: Option<String>,
    secondary_text: Option<String>,
}

impl From<RawPrediction> for PlacePrediction {
    fn from(value: RawPrediction) -> Self {
        let (main_text, secondary_text) = match value.structured_formatting {
            Some(formatting) => (formatting.main_text, formatting.secondary_text),
            None => (None, None),
        };
        Self {
            place_id: value.place_id,
            description: value.description,
            main_text,
            secondary_text,
        }
    }
}

impl GooglePlacesClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    pub async fn autocomplete(&self, input: &str) -> Result<Vec<PlacePrediction>> {
        let resp = self
            .http
            .get(AUTOCOMPLETE_URL)
            .query(&[("input", input), ("key", self.api_key.as_str())])
            .send()
            .await
            .context("places autocomplete request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            error!(status = %status, "places: upstream returned an error status");
            anyhow::bail!("Places API request failed (status {})", status);
        }

        let body: AutocompleteResponse = resp
            .json()
            .await
            .context("places autocomplete response was not valid JSON")?;

        parse_predictions(body)
    }
}

fn parse_predictions(body: AutocompleteResponse) -> Result<Vec<PlacePrediction>> {
    match body.status.as_str() {
        "OK" | "ZERO_RESULTS" => Ok(body
            .predictions
            .into_iter()
            .map(PlacePrediction::from)
            .collect()),
        other => {
            error!(
                places_status = %other,
                error_message = ?body.error_message,
                "places: autocomplete rejected"
            );
            anyhow::bail!("Places API returned status {}", other)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predictions_keep_structured_text() {
        let body: AutocompleteResponse = serde_json::from_value(serde_json::json!({
            "status": "OK",
            "predictions": [{
                "place_id": "abc",
                "description": "Panaji, Goa, India",
                "structured_formatting": { "main_text": "Panaji", "secondary_text": "Goa, India" }
            }]
        }))
        .unwrap();

        let predictions = parse_predictions(body).unwrap();
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].main_text.as_deref(), Some("Panaji"));
    }

    #[test]
    fn zero_results_is_an_empty_list() {
        let body: AutocompleteResponse =
            serde_json::from_value(serde_json::json!({ "status": "ZERO_RESULTS" })).unwrap();
        assert!(parse_predictions(body).unwrap().is_empty());
    }

    #[test]
    fn denied_request_is_an_error() {
        let body: AutocompleteResponse = serde_json::from_value(serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "bad key"
        }))
        .unwrap();
        assert!(parse_predictions(body).is_err());
    }
}
