//! The stored-value type: an opaque value paired with its expiration time.

use std::time::Instant;

/// A stored value together with its absolute expiration timestamp.
///
/// Entries are created by [`TtlMap::set`](crate::TtlMap::set) and replaced
/// wholesale by a later `set` on the same key; the expiration timestamp is
/// never mutated in place. All map read operations return owned clones of
/// entries, never references into the live map.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> Entry<V> {
    pub(crate) fn new(value: V, expires_at: Instant) -> Self {
        Self { value, expires_at }
    }

    /// Returns a reference to the stored value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consumes the entry and returns the stored value.
    pub fn into_value(self) -> V {
        self.value
    }

    /// Returns the instant at which this entry expires.
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Checks whether this entry's expiration has passed.
    ///
    /// Note that an expired entry stays in the map until the next sweep pass
    /// removes it; see [`TtlMap::get`](crate::TtlMap::get).
    #[inline]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}
