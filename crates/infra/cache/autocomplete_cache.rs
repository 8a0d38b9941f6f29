use std::{collections::HashMap, time::Duration};

use tokio::{sync::Mutex, time::Instant};

use crate::domain::value_objects::places::PlacePrediction;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
struct CacheEntry {
    predictions: Vec<PlacePrediction>,
    written_at: Instant,
}

/// Process-local autocomplete cache keyed by normalized query.
///
/// Entries older than the TTL read as absent. When an insert grows the map
/// past capacity, the oldest writes are evicted first.
pub struct AutocompleteCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl Default for AutocompleteCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl AutocompleteCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Vec<PlacePrediction>> {
        let mut entries = self.entries.lock().await;

        let expired = match entries.get(key) {
            Some(entry) if entry.written_at.elapsed() < self.ttl => {
                return Some(entry.predictions.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(key);
        }
        None
    }

    pub async fn insert(&self, key: String, predictions: Vec<PlacePrediction>) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key,
            CacheEntry {
                predictions,
                written_at: Instant::now(),
            },
        );

        if entries.len() > self.capacity {
            let mut by_age: Vec<(String, Instant)> = entries
                .iter()
                .map(|(key, entry)| (key.clone(), entry.written_at))
                .collect();
            by_age.sort_by_key(|(_, written_at)| *written_at);

            let overflow = entries.len() - self.capacity;
            for (key, _) in by_age.into_iter().take(overflow) {
                entries.remove(&key);
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
