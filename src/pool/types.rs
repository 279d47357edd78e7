use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde::Serialize;

/// Idle connections kept when the caller never sets a limit.
pub const DEFAULT_MAX_IDLE_CONNS: usize = 2;

/// Backing capacity used while max-open is "unlimited".
pub(crate) const UNLIMITED_POOL_SIZE: usize = 1024;

/// Live pool limits, shared between the handle and its manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    /// 0 means unlimited.
    pub max_open: usize,
    pub max_idle: usize,
    pub max_lifetime: Option<Duration>,
    pub max_idle_time: Option<Duration>,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            max_open: 0,
            max_idle: DEFAULT_MAX_IDLE_CONNS,
            max_lifetime: None,
            max_idle_time: None,
        }
    }
}

impl PoolLimits {
    /// Whether a connection of this age, idle for `idle`, must be discarded.
    #[must_use]
    pub fn is_expired(&self, age: Duration, idle: Duration) -> bool {
        self.max_lifetime.is_some_and(|max| age >= max)
            || self.max_idle_time.is_some_and(|max| idle >= max)
    }

    pub(crate) fn backing_size(&self) -> usize {
        if self.max_open == 0 {
            UNLIMITED_POOL_SIZE
        } else {
            self.max_open
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SharedLimits(Arc<RwLock<PoolLimits>>);

impl SharedLimits {
    pub(crate) fn get(&self) -> PoolLimits {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut PoolLimits)) -> PoolLimits {
        let mut guard = self.0.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
        *guard
    }
}

/// Snapshot of a pooled handle's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DbStats {
    /// Configured limit; 0 means unlimited.
    pub max_open_connections: usize,
    /// Connections currently held by the pool, in use or idle.
    pub open_connections: usize,
    pub in_use: usize,
    pub idle: usize,
    /// Callers currently waiting for a connection.
    pub wait_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_never_expire() {
        let limits = PoolLimits::default();
        assert!(!limits.is_expired(Duration::from_secs(86_400), Duration::from_secs(86_400)));
        assert_eq!(limits.backing_size(), UNLIMITED_POOL_SIZE);
        assert_eq!(limits.max_idle, DEFAULT_MAX_IDLE_CONNS);
    }

    #[test]
    fn either_limit_expires_a_connection() {
        let limits = PoolLimits {
            max_lifetime: Some(Duration::from_secs(10)),
            max_idle_time: Some(Duration::from_secs(2)),
            ..PoolLimits::default()
        };
        assert!(!limits.is_expired(Duration::from_secs(5), Duration::from_secs(1)));
        assert!(limits.is_expired(Duration::from_secs(10), Duration::ZERO));
        assert!(limits.is_expired(Duration::from_secs(3), Duration::from_secs(2)));
    }
}
