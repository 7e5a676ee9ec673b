//! In-process TTL cache keyed by request identity. Values are fully
//! serialized replies, so a hit replays bytes without re-running any
//! modification or badge logic.

use std::collections::BTreeMap;
use std::sync::Mutex;

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::Response;

/// One serialized HTTP reply: status, headers, body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CachedResponse {
    pub(crate) status: u16,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: String,
}

impl CachedResponse {
    pub(crate) fn into_http_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        for (name, value) in self.headers {
            let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
                continue;
            };
            let Ok(value) = HeaderValue::from_str(&value) else {
                continue;
            };
            response.headers_mut().append(name, value);
        }
        response
    }
}

#[derive(Debug, Clone)]
struct CacheSlot {
    response: CachedResponse,
    expires_unix_ms: u64,
}

#[derive(Debug, Default)]
pub(crate) struct ResponseCache {
    entries: Mutex<BTreeMap<String, CacheSlot>>,
}

impl ResponseCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Look up a live entry, dropping every expired slot on the way.
    pub(crate) fn fetch(&self, key: &str) -> Option<CachedResponse> {
        let now_unix_ms = current_unix_timestamp_ms();
        let mut entries = self.entries.lock().ok()?;
        entries.retain(|_, slot| slot.expires_unix_ms > now_unix_ms);
        entries.get(key).map(|slot| slot.response.clone())
    }

    pub(crate) fn store(&self, key: &str, response: CachedResponse, ttl_seconds: u64) {
        let expires_unix_ms =
            current_unix_timestamp_ms().saturating_add(ttl_seconds.saturating_mul(1000));
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key.to_string(),
                CacheSlot {
                    response,
                    expires_unix_ms,
                },
            );
        }
    }

    pub(crate) fn entry_count(&self) -> usize {
        self.entries
            .lock()
            .map(|entries| entries.len())
            .unwrap_or(0)
    }
}

fn current_unix_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}
