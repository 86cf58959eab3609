use std::sync::Arc;

use chrono::{Days, Utc};
use tracing::warn;

use crate::store::KeyValueStore;

const STATS_PREFIX: &str = "repost:stats";
const VISITORS_PREFIX: &str = "repost:visitors";
const RECENT_EVENTS_KEY: &str = "repost:events:recent";

/// How many recent events the rolling list keeps.
const RECENT_EVENTS_CAP: i64 = 200;

const EVENT_NAME_MAX_CHARS: usize = 64;

/// Event names end up in the key space, so restrict them to
/// `[a-z0-9_-]` and a sane length. Anything else maps to `_`.
pub fn sanitize_event_name(name: &str) -> String {
    name.trim()
        .chars()
        .take(EVENT_NAME_MAX_CHARS)
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Usage counters over the key-value store.
///
/// Every recording call is best-effort: a failed write logs a warning
/// and the request it was attached to finishes normally.
pub struct UsageTracker {
    store: Arc<dyn KeyValueStore>,
}

impl UsageTracker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn today() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }

    /// Record one analyze call against the totals and the daily counter.
    pub async fn record_analyze(&self, from_cache: bool, success: bool) {
        self.incr(&format!("{STATS_PREFIX}:analyze:total")).await;
        if success {
            self.incr(&format!("{STATS_PREFIX}:analyze:success")).await;
        } else {
            self.incr(&format!("{STATS_PREFIX}:analyze:failed")).await;
        }
        if from_cache {
            self.incr(&format!("{STATS_PREFIX}:analyze:cache_hits")).await;
        }
        self.incr(&format!("{STATS_PREFIX}:analyze:daily:{}", Self::today()))
            .await;
    }

    /// Record a named client event, optionally crediting a visitor to
    /// today's visitor set, and push it onto the rolling event list.
    pub async fn record_event(&self, name: &str, visitor: Option<&str>) {
        let name = sanitize_event_name(name);
        if name.is_empty() {
            return;
        }

        self.incr(&format!("{STATS_PREFIX}:event:{name}")).await;

        if let Some(visitor) = visitor.map(str::trim).filter(|v| !v.is_empty()) {
            let key = format!("{VISITORS_PREFIX}:{}", Self::today());
            if let Err(e) = self.store.sadd(&key, visitor).await {
                warn!(key, error = %e, "Failed to record visitor");
            }
        }

        let entry = serde_json::json!({
            "event": name,
            "at": Utc::now().to_rfc3339(),
        });
        match self.store.lpush(RECENT_EVENTS_KEY, &entry.to_string()).await {
            Ok(_) => {
                if let Err(e) = self
                    .store
                    .ltrim(RECENT_EVENTS_KEY, 0, RECENT_EVENTS_CAP - 1)
                    .await
                {
                    warn!(error = %e, "Failed to trim the event list");
                }
            }
            Err(e) => warn!(error = %e, "Failed to record event"),
        }
    }

    /// The newest `limit` recorded events, JSON strings as stored.
    pub async fn recent_events(&self, limit: i64) -> Vec<String> {
        if limit <= 0 {
            // A stop index of limit - 1 would go negative, which Redis
            // reads as counting from the end of the list.
            return Vec::new();
        }
        match self.store.lrange(RECENT_EVENTS_KEY, 0, limit - 1).await {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "Failed to read recent events");
                Vec::new()
            }
        }
    }

    /// Distinct visitors across the last `days` daily sets, today
    /// included.
    pub async fn unique_visitors(&self, days: u64) -> i64 {
        let today = Utc::now().date_naive();
        let keys: Vec<String> = (0..days)
            .filter_map(|back| today.checked_sub_days(Days::new(back)))
            .map(|day| format!("{VISITORS_PREFIX}:{}", day.format("%Y-%m-%d")))
            .collect();
        let dest = format!("{VISITORS_PREFIX}:union");
        match self.store.sunionstore(&dest, &keys).await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "Failed to count unique visitors");
                0
            }
        }
    }

    /// Size of today's visitor set.
    pub async fn today_visitors(&self) -> i64 {
        let key = format!("{VISITORS_PREFIX}:{}", Self::today());
        match self.store.scard(&key).await {
            Ok(count) => count,
            Err(e) => {
                warn!(key, error = %e, "Failed to count today's visitors");
                0
            }
        }
    }

    async fn incr(&self, key: &str) {
        if let Err(e) = self.store.incr(key).await {
            warn!(key, error = %e, "Failed to increment counter");
        }
    }
}
