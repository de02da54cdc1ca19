//! Fixed-window admission control guarding the model call.
//!
//! One counter window per client key. Precision at window boundaries is
//! explicitly not guaranteed: a client can land up to twice the ceiling
//! across a window edge, which is acceptable for this threat model.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::http::HeaderMap;
use dashmap::DashMap;
use tracing::debug;

/// Outcome of one admission check. Surfaced on every response as the
/// `X-RateLimit-*` headers so callers can self-throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Epoch milliseconds at which the caller's window resets.
    pub reset_at: u64,
}

/// Admission store seam. In-process by default; the trait exists so a
/// distributed store can be swapped in without touching pipeline logic.
#[async_trait]
pub trait QuotaStore: Send + Sync {
    /// Never errors; denial is advisory metadata for the caller.
    async fn check(&self, key: &str) -> QuotaDecision;

    /// Evicts expired windows. Maintenance only — `check` reopens expired
    /// windows itself, so a stale entry surviving until the next sweep is
    /// harmless.
    async fn sweep(&self);
}

#[derive(Debug, Clone, Copy)]
struct QuotaWindow {
    count: u32,
    reset_at: u64,
}

/// In-memory fixed-window store. The per-key read-modify-write happens under
/// the map's entry lock, so concurrent requests from one client cannot
/// under- or over-count; the sweep locks one shard at a time and never
/// stalls the whole map.
pub struct MemoryQuotaStore {
    windows: DashMap<String, QuotaWindow>,
    ceiling: u32,
    window: Duration,
}

impl MemoryQuotaStore {
    pub fn new(ceiling: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            ceiling,
            window,
        }
    }

    fn check_at(&self, key: &str, now_ms: u64) -> QuotaDecision {
        let window_ms = self.window.as_millis() as u64;
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert(QuotaWindow {
                count: 0,
                reset_at: now_ms + window_ms,
            });

        if now_ms > entry.reset_at {
            // Window elapsed: replace the entry outright, never merge.
            *entry = QuotaWindow {
                count: 0,
                reset_at: now_ms + window_ms,
            };
        }

        if entry.count >= self.ceiling {
            return QuotaDecision {
                allowed: false,
                remaining: 0,
                reset_at: entry.reset_at,
            };
        }

        entry.count += 1;
        QuotaDecision {
            allowed: true,
            remaining: self.ceiling - entry.count,
            reset_at: entry.reset_at,
        }
    }

    fn sweep_at(&self, now_ms: u64) {
        let before = self.windows.len();
        self.windows.retain(|_, window| now_ms <= window.reset_at);
        let evicted = before.saturating_sub(self.windows.len());
        if evicted > 0 {
            debug!("quota sweep evicted {evicted} expired windows");
        }
    }
}

#[async_trait]
impl QuotaStore for MemoryQuotaStore {
    async fn check(&self, key: &str) -> QuotaDecision {
        self.check_at(key, epoch_millis())
    }

    async fn sweep(&self) {
        self.sweep_at(epoch_millis());
    }
}

/// Spawns the periodic sweep. Runs independently of request handling.
pub fn spawn_sweeper(store: Arc<dyn QuotaStore>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // the first tick fires immediately
        loop {
            ticker.tick().await;
            store.sweep().await;
        }
    });
}

/// Derives the client key from proxy headers: first `X-Forwarded-For` entry,
/// then `X-Real-IP`, then a shared fallback bucket.
pub fn client_key(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|s| !s.is_empty()) {
            return first.to_string();
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    "unknown".to_string()
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
