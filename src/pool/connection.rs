use std::cell::Cell;

use deadpool::managed::{Object, PoolError};

use super::gate::{OpenGate, OpenPermit};
use super::manager::{ConnManager, ConnPool};
use super::types::SharedLimits;
use crate::context::Context;
use crate::error::FalseDbError;
use crate::spi::Conn;

/// A connection checked out of the pool. Returned when dropped.
pub struct PooledConn {
    obj: Object<ConnManager>,
    // both declared after `obj` so they run once the connection is back
    _permit: OpenPermit,
    _trim: IdleTrim,
}

impl std::fmt::Debug for PooledConn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PooledConn").field(&"<Conn>").finish()
    }
}

impl PooledConn {
    /// Wait for a free slot and a connection, giving up when `ctx` is done.
    ///
    /// # Errors
    /// Context errors, `FalseDbError::Closed` once the pool is closed, or the
    /// connector's error.
    pub(crate) async fn checkout(
        pool: &ConnPool,
        gate: &OpenGate,
        limits: &SharedLimits,
        ctx: &Context,
    ) -> Result<Self, FalseDbError> {
        let permit = tokio::select! {
            biased;
            err = ctx.done() => return Err(err),
            permit = gate.acquire() => permit?,
        };
        let obj = tokio::select! {
            biased;
            err = ctx.done() => return Err(err),
            obj = pool.get() => obj.map_err(from_pool_error)?,
        };
        Ok(Self {
            obj,
            _permit: permit,
            _trim: IdleTrim {
                pool: pool.clone(),
                limits: limits.clone(),
            },
        })
    }

    /// The driver connection.
    #[must_use]
    pub fn conn(&self) -> &dyn Conn {
        self.obj.conn()
    }
}

impl Drop for PooledConn {
    fn drop(&mut self) {
        self.obj.mark_returned();
    }
}

struct IdleTrim {
    pool: ConnPool,
    limits: SharedLimits,
}

impl Drop for IdleTrim {
    fn drop(&mut self) {
        trim_idle(&self.pool, &self.limits);
    }
}

/// Discard expired idle connections and any idle ones above the cap.
pub(crate) fn trim_idle(pool: &ConnPool, limits: &SharedLimits) {
    let limits = limits.get();
    let kept = Cell::new(0usize);
    let _ = pool.retain(|conn, metrics| {
        if kept.get() >= limits.max_idle || limits.is_expired(metrics.age(), conn.idle_for()) {
            conn.close();
            return false;
        }
        kept.set(kept.get() + 1);
        true
    });
}

fn from_pool_error(err: PoolError<FalseDbError>) -> FalseDbError {
    match err {
        PoolError::Backend(e) => e,
        PoolError::Closed => FalseDbError::Closed,
        other => FalseDbError::PoolError(other.to_string()),
    }
}
