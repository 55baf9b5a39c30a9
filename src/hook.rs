//! Pre-delete hooks: caller-supplied callbacks run on each evicted entry.
//!
//! A hook gets one synchronous call per expired entry, inside the sweep pass
//! and before the entry is removed. The usual use is a side effect such as
//! persisting the value somewhere durable before it vanishes from memory.
//!
//! ## Failure contract
//!
//! A hook returns `Result<(), HookError>`. An `Err` is logged by the sweep
//! pass and the entry is evicted anyway; a failing hook can never keep an
//! entry alive, stall the sweep, or surface an error to map callers.

use crate::entry::Entry;

/// Error type produced by a [`PreDeleteHook`].
///
/// Hooks belong to the caller, so their failures are opaque to the map; any
/// boxed error will do.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Callback invoked for each expired entry before the sweep removes it.
///
/// Implemented for any matching closure, so plain functions work:
///
/// ```
/// use ttlmap::{Entry, HookError, PreDeleteHook};
///
/// let hook = |key: &str, entry: &Entry<String>| -> Result<(), HookError> {
///     println!("evicting {key} = {}", entry.value());
///     Ok(())
/// };
///
/// fn takes_hook(_hook: impl PreDeleteHook<String>) {}
/// takes_hook(hook);
/// ```
pub trait PreDeleteHook<V>: Send + Sync {
    /// Called with the key and a read-only view of the entry about to be
    /// evicted. Clone out of `entry` if the value needs to outlive the call.
    fn before_delete(&self, key: &str, entry: &Entry<V>) -> Result<(), HookError>;
}

impl<V, F> PreDeleteHook<V> for F
where
    F: Fn(&str, &Entry<V>) -> Result<(), HookError> + Send + Sync,
{
    fn before_delete(&self, key: &str, entry: &Entry<V>) -> Result<(), HookError> {
        self(key, entry)
    }
}
