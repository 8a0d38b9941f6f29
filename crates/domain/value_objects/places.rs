use serde::{Deserialize, Serialize};

pub const MAX_QUERY_LEN: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlacePrediction {
    pub place_id: String,
    pub description: String,
    pub main_text: Option<String>,
    pub secondary_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutocompleteQuery {
    pub input: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AutocompleteDto {
    pub predictions: Vec<PlacePrediction>,
    pub cached: bool,
}

/// Cache key for an autocomplete input: trimmed, lowercased, inner whitespace collapsed.
pub fn normalize_query(input: &str) -> String {
    input
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
