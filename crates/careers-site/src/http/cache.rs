use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde_json::Value;

#[derive(Debug, Clone)]
struct CachedPayload {
    stored_at: Instant,
    payload: Value,
}

/// Remembers the last good payload per URL so a failing upstream can be
/// papered over for at most `window`.
#[derive(Debug, Clone)]
pub struct FallbackCache {
    window: Duration,
    entries: Arc<Mutex<HashMap<String, CachedPayload>>>,
}

impl FallbackCache {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn store(&self, url: &str, payload: Value) {
        self.store_at(url, payload, Instant::now());
    }

    pub fn recall(&self, url: &str) -> Option<Value> {
        self.recall_at(url, Instant::now())
    }

    pub(crate) fn store_at(&self, url: &str, payload: Value, now: Instant) {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(
            url.to_string(),
            CachedPayload {
                stored_at: now,
                payload,
            },
        );
    }

    pub(crate) fn recall_at(&self, url: &str, now: Instant) -> Option<Value> {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = guard.get(url)?;
        if now.saturating_duration_since(entry.stored_at) <= self.window {
            return Some(entry.payload.clone());
        }
        guard.remove(url);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serves_payload_inside_window() {
        let cache = FallbackCache::new(Duration::from_secs(300));
        let stored = Instant::now();
        cache.store_at("https://example.test/jobs", json!({"jobs": []}), stored);

        let hit = cache.recall_at("https://example.test/jobs", stored + Duration::from_secs(299));
        assert_eq!(hit, Some(json!({"jobs": []})));
    }

    #[test]
    fn expires_payload_after_window() {
        let cache = FallbackCache::new(Duration::from_secs(300));
        let stored = Instant::now();
        cache.store_at("https://example.test/jobs", json!({"jobs": []}), stored);

        let late = stored + Duration::from_secs(301);
        assert!(cache.recall_at("https://example.test/jobs", late).is_none());
        assert!(cache
            .recall_at("https://example.test/jobs", stored)
            .is_none(), "expired entries are evicted");
    }

    #[test]
    fn misses_unknown_urls() {
        let cache = FallbackCache::new(Duration::from_secs(5));
        assert!(cache.recall("https://example.test/other").is_none());
    }
}
