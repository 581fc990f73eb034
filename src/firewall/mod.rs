//! Per-endpoint fixed-window request counter.
//!
//! The counter is keyed by operation name only, so every caller of an
//! endpoint shares one budget per window. It is an approximate flood guard,
//! not per-user quota enforcement.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::FirewallConfig;

pub const DEFAULT_MAX_PER_WINDOW: u32 = 10;
pub const DEFAULT_WINDOW_MS: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirewallEntry {
    pub count: u32,
    pub window_start_ms: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FirewallError {
    #[error("Too many requests for {endpoint}: {count} in window (limit {limit})")]
    Exceeded {
        endpoint: String,
        count: u32,
        limit: u32,
    },
}

/// Storage for window counters. `hit` must apply reset + increment for one
/// endpoint atomically with respect to other hits on the same endpoint.
pub trait FirewallStore: Send + Sync {
    fn hit(&self, endpoint: &str, now_ms: i64, window_ms: i64) -> FirewallEntry;
    fn get(&self, endpoint: &str) -> Option<FirewallEntry>;
    fn clear(&self);
}

/// Process-local store; entries live as long as the store
#[derive(Debug, Default)]
pub struct InMemoryFirewallStore {
    entries: DashMap<String, FirewallEntry>,
}

impl InMemoryFirewallStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FirewallStore for InMemoryFirewallStore {
    fn hit(&self, endpoint: &str, now_ms: i64, window_ms: i64) -> FirewallEntry {
        // The entry guard holds the shard lock for the whole read-modify-write
        let mut entry = self.entries.entry(endpoint.to_string()).or_insert_with(|| {
            debug!(endpoint = endpoint, "Creating firewall entry");
            FirewallEntry {
                count: 0,
                window_start_ms: now_ms,
            }
        });

        if now_ms - entry.window_start_ms > window_ms {
            entry.count = 0;
            entry.window_start_ms = now_ms;
        }
        entry.count = entry.count.saturating_add(1);
        *entry
    }

    fn get(&self, endpoint: &str) -> Option<FirewallEntry> {
        self.entries.get(endpoint).map(|e| *e)
    }

    fn clear(&self) {
        self.entries.clear();
    }
}

/// Admission check shared by every callable operation
#[derive(Clone)]
pub struct Firewall {
    store: Arc<dyn FirewallStore>,
    enabled: bool,
    max_per_window: u32,
    window_ms: i64,
}

impl Firewall {
    pub fn new(store: Arc<dyn FirewallStore>, max_per_window: u32, window_ms: i64) -> Self {
        Self {
            store,
            enabled: true,
            max_per_window,
            window_ms,
        }
    }

    pub fn from_config(config: &FirewallConfig) -> Self {
        let mut firewall = Self::new(
            Arc::new(InMemoryFirewallStore::new()),
            config.max_requests,
            config.window_ms,
        );
        firewall.enabled = config.enabled;
        firewall
    }

    /// In-memory firewall with the default 10 requests / 10 s budget
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryFirewallStore::new()),
            DEFAULT_MAX_PER_WINDOW,
            DEFAULT_WINDOW_MS,
        )
    }

    pub fn disabled() -> Self {
        let mut firewall = Self::in_memory();
        firewall.enabled = false;
        firewall
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn check(&self, endpoint: &str) -> Result<(), FirewallError> {
        self.check_at(endpoint, Utc::now().timestamp_millis())
    }

    /// Count a request issued at `now_ms` and decide whether to admit it
    pub fn check_at(&self, endpoint: &str, now_ms: i64) -> Result<(), FirewallError> {
        if !self.enabled {
            return Ok(());
        }

        let entry = self.store.hit(endpoint, now_ms, self.window_ms);
        if entry.count <= self.max_per_window {
            return Ok(());
        }

        warn!(
            endpoint = endpoint,
            count = entry.count,
            limit = self.max_per_window,
            "Firewall rejected request"
        );
        Err(FirewallError::Exceeded {
            endpoint: endpoint.to_string(),
            count: entry.count,
            limit: self.max_per_window,
        })
    }

    pub fn entry(&self, endpoint: &str) -> Option<FirewallEntry> {
        self.store.get(endpoint)
    }

    pub fn reset(&self) {
        self.store.clear();
    }
}

impl std::fmt::Debug for Firewall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Firewall")
            .field("enabled", &self.enabled)
            .field("max_per_window", &self.max_per_window)
            .field("window_ms", &self.window_ms)
            .finish()
    }
}
