use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sql::Db;

/// Pool settings applied by [`crate::open_configured`].
///
/// Only the fields that are set are applied; the rest keep the pool's own
/// defaults (unlimited open connections, 2 idle, no expiry).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub max_open_conns: Option<usize>,
    pub max_idle_conns: Option<usize>,
    pub conn_max_lifetime: Option<Duration>,
    pub conn_max_idle_time: Option<Duration>,
}

impl PoolConfig {
    #[must_use]
    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::default()
    }

    /// Fold options in order; a later option for the same field wins.
    #[must_use]
    pub fn from_options<I>(options: I) -> Self
    where
        I: IntoIterator<Item = PoolOption>,
    {
        let mut config = Self::default();
        for option in options {
            option.apply(&mut config);
        }
        config
    }

    /// Push the configured values into `db`.
    ///
    /// Max-open goes first so a max-idle above it is capped the same way
    /// regardless of option order.
    pub fn apply_to(&self, db: &Db) {
        if let Some(n) = self.max_open_conns {
            db.set_max_open_conns(n);
        }
        if let Some(n) = self.max_idle_conns {
            db.set_max_idle_conns(n);
        }
        if let Some(d) = self.conn_max_lifetime {
            db.set_conn_max_lifetime(d);
        }
        if let Some(d) = self.conn_max_idle_time {
            db.set_conn_max_idle_time(d);
        }
    }
}

/// A single pool setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolOption {
    MaxOpenConns(usize),
    MaxIdleConns(usize),
    ConnMaxLifetime(Duration),
    ConnMaxIdleTime(Duration),
}

impl PoolOption {
    pub fn apply(self, config: &mut PoolConfig) {
        match self {
            PoolOption::MaxOpenConns(n) => config.max_open_conns = Some(n),
            PoolOption::MaxIdleConns(n) => config.max_idle_conns = Some(n),
            PoolOption::ConnMaxLifetime(d) => config.conn_max_lifetime = Some(d),
            PoolOption::ConnMaxIdleTime(d) => config.conn_max_idle_time = Some(d),
        }
    }
}

/// Maximum open connections; `0` means unlimited.
#[must_use]
pub fn with_max_open_conns(n: usize) -> PoolOption {
    PoolOption::MaxOpenConns(n)
}

/// Maximum idle connections kept for reuse.
#[must_use]
pub fn with_max_idle_conns(n: usize) -> PoolOption {
    PoolOption::MaxIdleConns(n)
}

/// Maximum age of a connection; zero means no limit.
#[must_use]
pub fn with_conn_max_lifetime(d: Duration) -> PoolOption {
    PoolOption::ConnMaxLifetime(d)
}

/// Maximum time a connection may sit idle; zero means no limit.
#[must_use]
pub fn with_conn_max_idle_time(d: Duration) -> PoolOption {
    PoolOption::ConnMaxIdleTime(d)
}

/// Fluent builder for [`PoolConfig`].
#[derive(Debug, Clone, Default)]
pub struct PoolConfigBuilder {
    config: PoolConfig,
}

impl PoolConfigBuilder {
    #[must_use]
    pub fn max_open_conns(mut self, n: usize) -> Self {
        self.config.max_open_conns = Some(n);
        self
    }

    #[must_use]
    pub fn max_idle_conns(mut self, n: usize) -> Self {
        self.config.max_idle_conns = Some(n);
        self
    }

    #[must_use]
    pub fn conn_max_lifetime(mut self, d: Duration) -> Self {
        self.config.conn_max_lifetime = Some(d);
        self
    }

    #[must_use]
    pub fn conn_max_idle_time(mut self, d: Duration) -> Self {
        self.config.conn_max_idle_time = Some(d);
        self
    }

    #[must_use]
    pub fn finish(self) -> PoolConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_options_means_nothing_set() {
        assert_eq!(PoolConfig::from_options([]), PoolConfig::default());
    }

    #[test]
    fn options_and_builder_agree() {
        let from_options = PoolConfig::from_options([
            with_max_open_conns(10),
            with_max_idle_conns(5),
            with_conn_max_lifetime(Duration::from_secs(30)),
        ]);
        let built = PoolConfig::builder()
            .max_open_conns(10)
            .max_idle_conns(5)
            .conn_max_lifetime(Duration::from_secs(30))
            .finish();
        assert_eq!(from_options, built);
        assert_eq!(built.conn_max_idle_time, None);
    }

    #[test]
    fn later_option_wins() {
        let config = PoolConfig::from_options([with_max_idle_conns(1), with_max_idle_conns(4)]);
        assert_eq!(config.max_idle_conns, Some(4));
    }
}
