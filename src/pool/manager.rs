use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use deadpool::managed::{Manager, Metrics, Pool, RecycleError, RecycleResult};
use tracing::debug;

use super::types::SharedLimits;
use crate::context::Context;
use crate::error::FalseDbError;
use crate::spi::{Conn, Connector};

/// A driver connection as stored in the pool.
pub struct ManagedConn {
    conn: Box<dyn Conn>,
    // last check-in, or creation for a connection never handed out
    returned_at: Instant,
}

impl ManagedConn {
    fn new(conn: Box<dyn Conn>) -> Self {
        Self {
            conn,
            returned_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn conn(&self) -> &dyn Conn {
        self.conn.as_ref()
    }

    /// Time spent sitting in the pool since the last check-in.
    #[must_use]
    pub fn idle_for(&self) -> Duration {
        self.returned_at.elapsed()
    }

    pub(crate) fn mark_returned(&mut self) {
        self.returned_at = Instant::now();
    }

    pub(crate) fn close(&self) {
        if let Err(e) = self.conn.close() {
            debug!(error = %e, "close of discarded connection failed");
        }
    }
}

/// deadpool manager that creates connections through a driver [`Connector`].
pub struct ConnManager {
    connector: Arc<dyn Connector>,
    limits: SharedLimits,
}

impl ConnManager {
    pub(crate) fn new(connector: Arc<dyn Connector>, limits: SharedLimits) -> Self {
        Self { connector, limits }
    }
}

// Manual Debug implementation because connectors are trait objects
impl fmt::Debug for ConnManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnManager")
            .field("connector", &"<Connector>")
            .field("limits", &self.limits.get())
            .finish()
    }
}

impl Manager for ConnManager {
    type Type = ManagedConn;
    type Error = FalseDbError;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        let conn = self.connector.connect(&Context::background()).await?;
        Ok(ManagedConn::new(conn))
    }

    async fn recycle(&self, conn: &mut Self::Type, metrics: &Metrics) -> RecycleResult<Self::Error> {
        let limits = self.limits.get();
        if limits.is_expired(metrics.age(), conn.idle_for()) {
            debug!(age = ?metrics.age(), idle = ?conn.idle_for(), "discarding expired connection");
            conn.close();
            return Err(RecycleError::Message("connection expired".into()));
        }
        Ok(())
    }
}

pub type ConnPool = Pool<ConnManager>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::FalseConn;

    #[test]
    fn idle_time_restarts_on_check_in() {
        let mut conn = ManagedConn::new(Box::new(FalseConn::new()));
        std::thread::sleep(Duration::from_millis(20));
        assert!(conn.idle_for() >= Duration::from_millis(20));
        conn.mark_returned();
        assert!(conn.idle_for() < Duration::from_millis(20));
    }
}
