//! Background eviction sweeper.
//!
//! One Tokio task per map, spawned at construction. The task is a two-event
//! select loop over the recurring tick and the shutdown signal:
//!
//! 1. Tick: run one sweep pass over the map, stay running.
//! 2. Shutdown observed (`true` sent, or sender dropped): exit permanently.
//!
//! Exactly one of the two events is serviced per iteration, and the select
//! is biased toward shutdown, so once cancellation has fired it wins over a
//! simultaneously ready tick. At most the in-flight sweep pass completes
//! before exit. There is no pause or resume; restarting eviction means
//! building a new map.
//!
//! The task never holds the map lock while suspended. It only awaits the
//! tick and the shutdown signal; the sweep pass itself is synchronous.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::map::MapInner;

/// The sweeper loop. Runs until the shutdown signal fires.
pub(crate) async fn sweeper_loop<V>(
    inner: Arc<MapInner<V>>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    V: Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    // The first tick resolves immediately; consume it so the first sweep
    // happens one full interval after construction.
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;

            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("sweeper received shutdown signal, exiting");
                    return;
                }
            }

            _ = ticker.tick() => {
                let evicted = inner.sweep();
                if evicted > 0 {
                    debug!(evicted, "sweep pass evicted expired entries");
                } else {
                    trace!("sweep pass found no expired entries");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::watch;

    use crate::entry::Entry;
    use crate::hook::HookError;
    use crate::map::TtlMap;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn spawn_map(interval: Duration) -> (TtlMap<String>, watch::Sender<bool>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let map = TtlMap::builder()
            .sweep_interval(interval)
            .shutdown_signal(shutdown_rx)
            .start()
            .unwrap();
        (map, shutdown_tx)
    }

    #[tokio::test]
    async fn test_sweeper_evicts_expired_entries() {
        init_tracing();
        let (map, _shutdown_tx) = spawn_map(Duration::from_millis(20));

        for i in 0..10 {
            map.set(
                format!("short{}", i),
                "value".to_string(),
                Duration::from_millis(10),
            );
        }
        map.set("long", "value".to_string(), Duration::from_secs(3600));

        assert_eq!(map.len(), 11);

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(map.keys(), vec!["long".to_string()]);
    }

    #[tokio::test]
    async fn test_hook_invoked_once_before_removal() {
        init_tracing();
        let seen: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let map: TtlMap<String> = TtlMap::builder()
            .sweep_interval(Duration::from_millis(20))
            .pre_delete_hook(move |key: &str, entry: &Entry<String>| -> Result<(), HookError> {
                recorder
                    .lock()
                    .unwrap()
                    .push((key.to_string(), entry.value().clone()));
                Ok(())
            })
            .shutdown_signal(shutdown_rx)
            .start()
            .unwrap();

        map.set("k", "v".to_string(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("k".to_string(), "v".to_string())]
        );
        assert!(map.keys().is_empty());

        drop(shutdown_tx);
    }

    #[tokio::test]
    async fn test_hook_failure_does_not_block_eviction() {
        init_tracing();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let map: TtlMap<String> = TtlMap::builder()
            .sweep_interval(Duration::from_millis(20))
            .pre_delete_hook(|key: &str, _entry: &Entry<String>| -> Result<(), HookError> {
                Err(format!("hook refuses to release {key}").into())
            })
            .shutdown_signal(shutdown_rx)
            .start()
            .unwrap();

        map.set("doomed", "value".to_string(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(map.get("doomed").is_none());
        assert!(map.is_empty());

        drop(shutdown_tx);
    }

    #[tokio::test]
    async fn test_cancellation_stops_future_evictions() {
        let (map, shutdown_tx) = spawn_map(Duration::from_millis(20));

        shutdown_tx.send(true).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Past-due entry set after cancellation: no sweep ever removes it.
        map.set("lingering", "value".to_string(), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(map.get("lingering").is_some());
        assert_eq!(map.keys(), vec!["lingering".to_string()]);
    }

    #[tokio::test]
    async fn test_sender_drop_stops_sweeper() {
        let (map, shutdown_tx) = spawn_map(Duration::from_millis(20));
        drop(shutdown_tx);

        tokio::time::sleep(Duration::from_millis(50)).await;

        map.set("survivor", "value".to_string(), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(map.contains_key("survivor"));
    }

    #[tokio::test]
    async fn test_sending_false_keeps_sweeper_running() {
        let (map, shutdown_tx) = spawn_map(Duration::from_millis(20));

        shutdown_tx.send(false).unwrap();

        map.set("ephemeral", "value".to_string(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(map.get("ephemeral").is_none());
    }

    #[tokio::test]
    async fn test_map_usable_after_cancellation() {
        let (map, shutdown_tx) = spawn_map(Duration::from_millis(20));

        map.set("kept", "value".to_string(), Duration::from_secs(3600));
        shutdown_tx.send(true).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Cancellation does not clear existing data.
        assert_eq!(map.get("kept").unwrap().value(), "value");
        map.set("late", "value".to_string(), Duration::from_secs(3600));
        assert_eq!(map.len(), 2);
    }

    #[tokio::test]
    async fn test_set_expire_scenario() {
        // Sweep every 50ms, entry lives 150ms: present right after set,
        // gone after sleeping well past its expiry and several sweeps.
        let (map, _shutdown_tx) = spawn_map(Duration::from_millis(50));

        map.set("k", "v".to_string(), Duration::from_millis(150));
        assert_eq!(map.keys(), vec!["k".to_string()]);

        tokio::time::sleep(Duration::from_millis(400)).await;

        assert!(map.keys().is_empty());
    }

    #[tokio::test]
    async fn test_independent_maps_have_independent_sweepers() {
        let (fast, _fast_tx) = spawn_map(Duration::from_millis(20));
        let (slow, _slow_tx) = spawn_map(Duration::from_secs(3600));

        fast.set("a", "1".to_string(), Duration::from_millis(10));
        slow.set("a", "1".to_string(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(fast.get("a").is_none());
        assert!(slow.get("a").is_some());
    }
}
