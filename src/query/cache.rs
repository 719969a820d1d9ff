//! Reactive query cache: maps each [`QueryKey`] to cached data plus fetch
//! status, dedupes concurrent identical requests, and refetches on read once
//! an entry is older than its endpoint's refresh interval.
//!
//! A fetch is keyed by the filter values active at request time. When the
//! completion no longer matches the key derived from the current filters, the
//! response is discarded instead of applied, so a late-arriving result for
//! old filters never overwrites newer state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use ringlog::*;
use serde_json::Value;
use tokio::sync::watch;

use super::{filter_params, Endpoint, QueryKey};
use crate::client::{ApiClient, ApiError};
use crate::filters::{agent_option_params, FilterChange, FilterStore};

/// Per-key fetch lifecycle: `Idle -> Loading -> {Success, Error}`, with both
/// terminal states re-entering `Loading` on refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error,
}

struct Entry {
    data: Option<Arc<Value>>,
    status: QueryStatus,
    error: Option<String>,
    last_fetched: Option<Instant>,
    stale: bool,
    inflight: Option<watch::Receiver<bool>>,
}

impl Entry {
    fn new() -> Self {
        Self {
            data: None,
            status: QueryStatus::Idle,
            error: None,
            last_fetched: None,
            stale: false,
            inflight: None,
        }
    }

    fn is_fresh(&self, interval: Duration) -> bool {
        !self.stale
            && self
                .last_fetched
                .map(|at| at.elapsed() < interval)
                .unwrap_or(false)
    }
}

/// Read-side view of one cache entry.
#[derive(Debug, Clone)]
pub struct QuerySnapshot {
    pub data: Option<Arc<Value>>,
    pub status: QueryStatus,
    pub error: Option<String>,
    pub last_fetched: Option<Instant>,
    /// Set when the entry holds previous data that no longer reflects the
    /// backend (failed refetch or pending invalidation). The UI surfaces
    /// this alongside the retained value.
    pub stale: bool,
}

impl QuerySnapshot {
    fn idle() -> Self {
        Self {
            data: None,
            status: QueryStatus::Idle,
            error: None,
            last_fetched: None,
            stale: false,
        }
    }
}

pub struct QueryCache {
    client: Arc<ApiClient>,
    filters: Arc<FilterStore>,
    entries: Mutex<HashMap<QueryKey, Entry>>,
    refresh_overrides: HashMap<Endpoint, Duration>,
}

enum Action {
    Fresh,
    Await(watch::Receiver<bool>),
    Fetch(watch::Sender<bool>),
}

impl QueryCache {
    pub fn new(client: Arc<ApiClient>, filters: Arc<FilterStore>) -> Self {
        Self {
            client,
            filters,
            entries: Mutex::new(HashMap::new()),
            refresh_overrides: HashMap::new(),
        }
    }

    pub fn with_refresh_overrides(mut self, overrides: HashMap<Endpoint, Duration>) -> Self {
        self.refresh_overrides = overrides;
        self
    }

    fn interval(&self, endpoint: Endpoint) -> Duration {
        self.refresh_overrides
            .get(&endpoint)
            .copied()
            .unwrap_or_else(|| endpoint.refresh_interval())
    }

    /// Read the endpoint under the current filters, fetching if the entry is
    /// missing, stale, or past its refresh interval. Concurrent readers of
    /// the same key share a single network call.
    pub async fn read(&self, endpoint: Endpoint) -> QuerySnapshot {
        let state = self.filters.snapshot();

        // The agent dropdown is never fetched without a parent filter.
        if endpoint == Endpoint::AgentOptions && agent_option_params(&state).is_none() {
            return QuerySnapshot::idle();
        }

        let key = QueryKey::new(endpoint, &state);

        let interval = self.interval(endpoint);
        let action = {
            let mut entries = self.entries.lock();
            let entry = entries.entry(key.clone()).or_insert_with(Entry::new);

            // A closed inflight channel means the fetching task was dropped
            // before settling; start over in that case.
            let live = entry
                .inflight
                .as_ref()
                .filter(|rx| rx.has_changed().is_ok())
                .cloned();

            if let Some(rx) = live {
                Action::Await(rx)
            } else if entry.inflight.is_none() && entry.is_fresh(interval) {
                Action::Fresh
            } else {
                let (tx, rx) = watch::channel(false);
                entry.inflight = Some(rx);
                entry.status = QueryStatus::Loading;
                Action::Fetch(tx)
            }
        };

        match action {
            Action::Fresh => {}
            Action::Await(mut rx) => {
                let _ = rx.wait_for(|settled| *settled).await;
            }
            Action::Fetch(tx) => {
                debug!("fetching {key}");
                let params = filter_params(endpoint, &state);
                let result = self.client.get(endpoint.path(), &params).await;
                self.complete(&key, result);
                let _ = tx.send(true);
            }
        }

        self.snapshot_of(&key)
    }

    /// Mark every entry for `endpoint` stale so the next read refetches.
    /// Previously successful data stays readable until then.
    pub fn refresh(&self, endpoint: Endpoint) {
        let mut entries = self.entries.lock();
        for (key, entry) in entries.iter_mut() {
            if key.endpoint() == endpoint {
                entry.stale = true;
            }
        }
    }

    /// Invalidate entries affected by a filter change. A changed dimension
    /// changes the key of every endpoint that declares it, so settled
    /// entries under the old values are dropped outright; in-flight ones are
    /// marked stale and discarded on completion.
    pub fn invalidate(&self, change: &FilterChange) {
        if !change.any() {
            return;
        }

        let mut entries = self.entries.lock();
        entries.retain(|key, entry| {
            let affected = key
                .endpoint()
                .dimensions()
                .iter()
                .any(|dim| change.contains(*dim));
            if affected && entry.inflight.is_some() {
                entry.stale = true;
            }
            !affected || entry.inflight.is_some()
        });
    }

    fn complete(&self, key: &QueryKey, result: Result<Value, ApiError>) {
        let current = QueryKey::new(key.endpoint(), &self.filters.snapshot());

        let mut entries = self.entries.lock();
        let Some(mut entry) = entries.remove(key) else {
            return;
        };
        entry.inflight = None;

        if current != *key {
            // Filters moved on while this fetch was in flight; the response
            // is discarded rather than applied. Previously fetched data for
            // the old filters stays readable, flagged stale.
            debug!("discarding stale response for {key}");
            if entry.data.is_some() {
                entry.stale = true;
                entry.status = QueryStatus::Success;
                entries.insert(key.clone(), entry);
            }
            return;
        }

        entry.last_fetched = Some(Instant::now());
        match result {
            Ok(value) => {
                entry.data = Some(Arc::new(value));
                entry.status = QueryStatus::Success;
                entry.error = None;
                entry.stale = false;
            }
            Err(e) => {
                // Keep the last good data; surface the error alongside it.
                warn!("fetch failed for {key}: {e}");
                entry.status = QueryStatus::Error;
                entry.error = Some(e.to_string());
                entry.stale = entry.data.is_some();
            }
        }

        entries.insert(key.clone(), entry);
    }

    fn snapshot_of(&self, key: &QueryKey) -> QuerySnapshot {
        let entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) => QuerySnapshot {
                data: entry.data.clone(),
                status: entry.status,
                error: entry.error.clone(),
                last_fetched: entry.last_fetched,
                stale: entry.stale,
            },
            None => QuerySnapshot::idle(),
        }
    }
}
