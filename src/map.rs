//! The expiring map: data structure, locking discipline, and public API.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      TtlMap<V>                       │
//! │                                                      │
//! │   RwLock<HashMap<String, Entry<V>>>                  │
//! │      ▲ shared (get / keys / values / snapshot)       │
//! │      ▲ exclusive (set / remove / clear / sweep)      │
//! └──────┼───────────────────────────────────────────────┘
//!        │
//!        │ exclusive, one pass per tick
//!   ┌────┴─────────────────────┐
//!   │        Sweeper           │
//!   │  (background Tokio task) │
//!   └──────────────────────────┘
//! ```
//!
//! One lock guards the whole mapping. Reads run concurrently with each other
//! but never with a mutation, so the mapping is never observed in a
//! partially-mutated state. Every read operation returns owned clones;
//! nothing hands out references into the live map.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::entry::Entry;
use crate::hook::PreDeleteHook;
use crate::sweeper;

/// TTLs are capped here so `Instant + Duration` cannot overflow.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Errors raised by [`Builder::start`].
///
/// Construction is the only fallible surface of the map; every operation on
/// a successfully built map is infallible.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No sweep interval was given to the builder.
    #[error("sweep interval not set")]
    SweepIntervalNotSet,

    /// No shutdown signal was given to the builder.
    #[error("shutdown signal not set")]
    ShutdownNotSet,
}

/// Shared state between the map handles and the background sweeper.
pub(crate) struct MapInner<V> {
    data: RwLock<HashMap<String, Entry<V>>>,
    hook: Option<Box<dyn PreDeleteHook<V>>>,
}

impl<V> MapInner<V> {
    /// Runs one sweep pass: evicts every entry whose expiration is strictly
    /// before the time snapshot taken at pass start, invoking the pre-delete
    /// hook per entry first.
    ///
    /// Returns the number of entries evicted.
    pub(crate) fn sweep(&self) -> usize {
        // One clock read per pass; every expiry comparison uses it, so an
        // entry cannot be skipped or double-processed by the clock moving
        // mid-pass.
        let now = Instant::now();

        let mut data = self.data.write().unwrap();
        let before = data.len();

        data.retain(|key, entry| {
            if entry.expires_at() >= now {
                return true;
            }

            if let Some(hook) = &self.hook {
                if let Err(error) = hook.before_delete(key, entry) {
                    // Hook failure never keeps an entry alive.
                    warn!(key = %key, error = %error, "pre-delete hook failed, evicting anyway");
                }
            }

            false
        });

        before - data.len()
    }
}

/// An in-memory key-value map whose entries expire.
///
/// Each entry carries an absolute expiration timestamp assigned at
/// [`set`](TtlMap::set) time as `now + ttl`. A background task started at
/// construction sweeps the map on a fixed interval and evicts expired
/// entries, optionally handing each to a [`PreDeleteHook`] first.
///
/// The handle is cheap to clone; clones share the same underlying map.
/// Multiple independent maps can coexist, each with its own sweeper.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use tokio::sync::watch;
/// use ttlmap::TtlMap;
///
/// #[tokio::main]
/// async fn main() {
///     let (shutdown_tx, shutdown_rx) = watch::channel(false);
///
///     let map: TtlMap<String> = TtlMap::builder()
///         .sweep_interval(Duration::from_secs(1))
///         .shutdown_signal(shutdown_rx)
///         .start()
///         .unwrap();
///
///     map.set("session:42", "alice".to_string(), Duration::from_secs(2));
///     assert!(map.get("session:42").is_some());
///
///     tokio::time::sleep(Duration::from_secs(3)).await;
///     assert!(map.get("session:42").is_none());
///
///     let _ = shutdown_tx.send(true);
/// }
/// ```
#[derive(Clone)]
pub struct TtlMap<V> {
    inner: Arc<MapInner<V>>,
}

impl<V> fmt::Debug for TtlMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.inner.data.read().map(|data| data.len()).unwrap_or(0);
        f.debug_struct("TtlMap")
            .field("entries", &entries)
            .field("hook", &self.inner.hook.is_some())
            .finish()
    }
}

impl<V> TtlMap<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Returns a builder for constructing a map and starting its sweeper.
    pub fn builder() -> Builder<V> {
        Builder::new()
    }

    /// Inserts or overwrites the entry for `key`, expiring `ttl` from now.
    ///
    /// An overwrite replaces both the value and the expiration atomically;
    /// the map behaves as if only the latest `set` ever happened.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl.min(MAX_TTL);

        let mut data = self.inner.data.write().unwrap();
        data.insert(key.into(), Entry::new(value, expires_at));
    }

    /// Looks up `key` and returns a clone of its entry, or `None` if absent.
    ///
    /// `get` deliberately does not check expiration. Enforcement belongs
    /// solely to the sweep pass, which keeps this read path a shared lock
    /// and a clone. The visible consequence: an entry whose TTL has passed
    /// remains readable until the next sweep runs, so reads are stale by at
    /// most one sweep interval. Callers that cannot tolerate that window can
    /// check [`Entry::is_expired`] on the result themselves.
    pub fn get(&self, key: &str) -> Option<Entry<V>> {
        let data = self.inner.data.read().unwrap();
        data.get(key).cloned()
    }

    /// Removes the entry for `key`, returning it if it existed.
    ///
    /// The pre-delete hook is not invoked; it belongs to sweep eviction, not
    /// to explicit removal.
    pub fn remove(&self, key: &str) -> Option<Entry<V>> {
        let mut data = self.inner.data.write().unwrap();
        data.remove(key)
    }

    /// Checks whether `key` is present (expired-but-unswept entries count).
    pub fn contains_key(&self, key: &str) -> bool {
        let data = self.inner.data.read().unwrap();
        data.contains_key(key)
    }

    /// Returns a snapshot of all keys at call time, in no particular order.
    ///
    /// Later mutations do not alter a previously returned snapshot.
    pub fn keys(&self) -> Vec<String> {
        let data = self.inner.data.read().unwrap();
        data.keys().cloned().collect()
    }

    /// Returns a snapshot of all entries at call time, in no particular
    /// order. Same snapshot semantics as [`keys`](TtlMap::keys).
    pub fn values(&self) -> Vec<Entry<V>> {
        let data = self.inner.data.read().unwrap();
        data.values().cloned().collect()
    }

    /// Returns a full shallow copy of the mapping at call time, independent
    /// of any subsequent mutation of the live map.
    pub fn snapshot(&self) -> HashMap<String, Entry<V>> {
        let data = self.inner.data.read().unwrap();
        data.clone()
    }

    /// Returns the number of entries, including expired-but-unswept ones.
    pub fn len(&self) -> usize {
        let data = self.inner.data.read().unwrap();
        data.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all entries. The sweeper keeps running.
    pub fn clear(&self) {
        let mut data = self.inner.data.write().unwrap();
        data.clear();
    }

    /// Runs one sweep pass by hand, the same pass the background task runs
    /// on every tick. Returns the number of entries evicted.
    pub fn sweep(&self) -> usize {
        self.inner.sweep()
    }
}

/// Builder for [`TtlMap`].
///
/// A sweep interval and a shutdown signal are required;
/// [`start`](Builder::start) reports which one is missing. The pre-delete
/// hook is optional and absence means no hook is invoked.
pub struct Builder<V> {
    sweep_interval: Option<Duration>,
    hook: Option<Box<dyn PreDeleteHook<V>>>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl<V> Default for Builder<V> {
    fn default() -> Self {
        Self {
            sweep_interval: None,
            hook: None,
            shutdown: None,
        }
    }
}

impl<V> Builder<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how often the background sweeper scans for expired entries.
    /// Required.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    /// Sets the hook invoked per evicted entry before removal. Optional.
    pub fn pre_delete_hook(mut self, hook: impl PreDeleteHook<V> + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    /// Sets the shutdown signal that stops the background sweeper. Required.
    ///
    /// The caller keeps the [`watch::Sender`]; sending `true` (or dropping
    /// the sender) permanently stops the sweeper. The map itself keeps
    /// answering direct calls and is not cleared.
    pub fn shutdown_signal(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }
}

impl<V> Builder<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Builds the map and starts its background sweeper.
    ///
    /// # Errors
    ///
    /// [`ConfigError::SweepIntervalNotSet`] if no sweep interval was given,
    /// [`ConfigError::ShutdownNotSet`] if no shutdown signal was given.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime; the sweeper is spawned
    /// with `tokio::spawn`.
    pub fn start(self) -> Result<TtlMap<V>, ConfigError> {
        let interval = self.sweep_interval.ok_or(ConfigError::SweepIntervalNotSet)?;
        let shutdown = self.shutdown.ok_or(ConfigError::ShutdownNotSet)?;

        if tokio::runtime::Handle::try_current().is_err() {
            panic!(
                "ttlmap::Builder::start requires a Tokio runtime: \
                 the background sweeper is spawned with tokio::spawn"
            );
        }

        let inner = Arc::new(MapInner {
            data: RwLock::new(HashMap::new()),
            hook: self.hook,
        });

        tokio::spawn(sweeper::sweeper_loop(Arc::clone(&inner), interval, shutdown));

        info!(
            interval_ms = interval.as_millis() as u64,
            hook = inner.hook.is_some(),
            "background sweeper started"
        );

        Ok(TtlMap { inner })
    }
}
