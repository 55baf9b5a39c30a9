//! # ttlmap - An In-Memory Expiring Key-Value Map
//!
//! `ttlmap` is an in-memory key-value store where every entry carries a
//! time-to-live. A background task sweeps the map on a fixed interval,
//! evicts entries whose expiration has passed, and optionally hands each
//! one to a caller-supplied hook before removal.
//!
//! It targets single-process ephemeral state: session data, rate-limit
//! counters, short-lived computation results. It is not a distributed
//! cache, not durable, and not size-bounded; eviction is driven purely by
//! wall-clock expiration, checked at discrete intervals.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        TtlMap<V>                           │
//! │                                                            │
//! │  set / get / keys / values / snapshot / remove / sweep     │
//! │                          │                                 │
//! │                          ▼                                 │
//! │        RwLock<HashMap<String, Entry<V>>>                   │
//! └──────────────────────────▲─────────────────────────────────┘
//!                            │ exclusive lock, one pass per tick
//!              ┌─────────────┴─────────────┐
//!              │          Sweeper          │
//!              │  (background Tokio task)  │──── PreDeleteHook
//!              └─────────────▲─────────────┘
//!                            │ watch::Receiver<bool>
//!                     caller-owned shutdown
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use tokio::sync::watch;
//! use ttlmap::TtlMap;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//!     let map: TtlMap<String> = TtlMap::builder()
//!         .sweep_interval(Duration::from_secs(1))
//!         .shutdown_signal(shutdown_rx)
//!         .start()
//!         .unwrap();
//!
//!     map.set("session:42", "alice".to_string(), Duration::from_secs(2));
//!     assert!(map.get("session:42").is_some());
//!
//!     tokio::time::sleep(Duration::from_secs(3)).await;
//!     assert!(map.get("session:42").is_none());
//!
//!     // Stop the sweeper; the map keeps answering direct calls.
//!     let _ = shutdown_tx.send(true);
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`map`]: the map itself, its builder, and its locking discipline
//! - [`entry`]: the stored-value type with its expiration timestamp
//! - [`hook`]: the pre-delete hook trait and its failure contract
//!
//! ## Design Highlights
//!
//! ### Sweep-Only Expiration
//!
//! `get` never checks expiration. Enforcement belongs solely to the sweep
//! pass, which keeps the read path a shared lock and a clone; in exchange,
//! an expired entry stays readable for up to one sweep interval. See
//! [`TtlMap::get`] for the full contract.
//!
//! ### Cooperative Cancellation
//!
//! The sweeper multiplexes the recurring tick and a caller-owned
//! `tokio::sync::watch` channel. Sending `true` (or dropping the sender)
//! stops the sweeper permanently without clearing the map. There is no
//! pause or resume; restarting eviction means building a new map.
//!
//! ### Hooks Cannot Veto
//!
//! A pre-delete hook may fail; the failure is logged and the entry is
//! evicted anyway. Hook errors never reach map callers and never leave a
//! stuck entry behind.

pub mod entry;
pub mod hook;
pub mod map;
mod sweeper;

// Re-export commonly used types for convenience
pub use entry::Entry;
pub use hook::{HookError, PreDeleteHook};
pub use map::{Builder, ConfigError, TtlMap};

/// Version of ttlmap
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
