use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::settings::AppConfig;

/// Submission timestamps recorded for one client
#[derive(Debug)]
struct ClientWindow {
    hits: VecDeque<Instant>,
    last_seen: Instant,
}

impl ClientWindow {
    fn new(now: Instant) -> Self {
        Self {
            hits: VecDeque::new(),
            last_seen: now,
        }
    }

    /// Keeps only hits strictly newer than `cutoff`.
    /// A `None` cutoff means the window reaches back past the clock's origin.
    fn prune(&mut self, cutoff: Option<Instant>) {
        if let Some(cutoff) = cutoff {
            self.hits.retain(|&hit| hit > cutoff);
        }
    }

    /// Returns true and records `now` if fewer than `limit` hits remain in the window.
    fn try_record(&mut self, now: Instant, cutoff: Option<Instant>, limit: usize) -> bool {
        self.last_seen = self.last_seen.max(now);
        self.prune(cutoff);

        if self.hits.len() >= limit {
            return false;
        }
        self.hits.push_back(now);
        true
    }
}

type Key = String;

/// Entries inspected when picking an eviction victim.
const EVICTION_SAMPLE: usize = 16;

/// Sliding-window limiter for contact submissions, keyed by client identifier.
///
/// The check and the record for a key happen under that key's shard lock,
/// so concurrent submissions from one client can never exceed the quota.
/// Memory stays bounded: idle clients are dropped by [`sweep`](Self::sweep)
/// and, once `max_clients` is hit, the least recently seen of a small sample
/// of clients is evicted to make room for a new one.
///
/// `max_clients` is a soft cap. The size check and the insert are not one
/// atomic step, so concurrent first-time clients can push the map past it
/// by at most the number of in-flight requests.
#[derive(Debug)]
pub struct ContactRateLimiter {
    map: DashMap<Key, ClientWindow>,
    window: Duration,
    limit: usize,
    max_clients: usize,
    last_sweep: Mutex<Option<Instant>>,
}

impl ContactRateLimiter {
    pub fn new(limit: usize, window: Duration, max_clients: usize) -> Self {
        Self {
            map: DashMap::new(),
            window,
            limit,
            max_clients: max_clients.max(1),
            last_sweep: Mutex::new(None),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.rate_limit_max,
            config.rate_limit_window(),
            config.rate_limit_max_clients,
        )
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Checks and records a submission for `key` at the current instant.
    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    /// Checks and records a submission for `key` at `now`.
    ///
    /// Hits at or before `now - window` no longer count. A rejected attempt
    /// is not recorded.
    pub fn allow_at(&self, key: &str, now: Instant) -> bool {
        if !self.map.contains_key(key) && self.map.len() >= self.max_clients {
            self.make_room(now);
        }

        let cutoff = now.checked_sub(self.window);
        let mut entry = self
            .map
            .entry(key.to_string())
            .or_insert_with(|| ClientWindow::new(now));

        entry.try_record(now, cutoff, self.limit)
    }

    /// Hits still counted against `key` at `now`.
    pub fn hits_at(&self, key: &str, now: Instant) -> usize {
        let cutoff = now.checked_sub(self.window);
        self.map
            .get(key)
            .map(|w| {
                w.hits
                    .iter()
                    .filter(|&&hit| cutoff.is_none_or(|c| hit > c))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Drops every client whose hits have all left the window. Returns how many were removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let cutoff = now.checked_sub(self.window);
        let mut removed = 0;

        self.map.retain(|_, window| {
            window.prune(cutoff);
            if window.hits.is_empty() {
                removed += 1;
                false
            } else {
                true
            }
        });

        let mut last = self.last_sweep.lock();
        *last = Some(last.map_or(now, |prev| prev.max(now)));

        removed
    }

    pub fn tracked_clients(&self) -> usize {
        self.map.len()
    }

    /// Whether a full sweep ran less than one window before `now`.
    fn swept_recently(&self, now: Instant) -> bool {
        self.last_sweep
            .lock()
            .is_some_and(|last| now.saturating_duration_since(last) < self.window)
    }

    /// Frees one slot for a new client.
    ///
    /// A full sweep runs at most once per window; otherwise the least
    /// recently seen entry among the first [`EVICTION_SAMPLE`] is dropped.
    fn make_room(&self, now: Instant) {
        if !self.swept_recently(now) && self.sweep(now) > 0 && self.map.len() < self.max_clients {
            return;
        }

        let oldest = self
            .map
            .iter()
            .take(EVICTION_SAMPLE)
            .min_by_key(|entry| entry.value().last_seen)
            .map(|entry| entry.key().clone());

        if let Some(key) = oldest {
            tracing::debug!("Rate limiter full, evicting least recently seen client {}", key);
            self.map.remove(&key);
        }
    }
}
