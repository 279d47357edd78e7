use std::sync::Arc;
use std::time::Duration;

use deadpool::managed::Pool;
use tracing::debug;

use crate::context::Context;
use crate::error::FalseDbError;
use crate::pool::{
    ConnManager, ConnPool, DbStats, OpenGate, PoolLimits, PooledConn, SharedLimits, trim_idle,
};
use crate::spi::{Connector, Driver, ExecResult};
use crate::types::{NamedValue, TxOptions, Value};

use super::connector::DsnConnector;
use super::dispatch::{begin_on, exec_on, prepare_on, query_on};
use super::{Rows, Stmt, Tx, registry};

/// Pooled handle over a registered driver.
///
/// Cheap to clone; clones share the pool. Every operation checks its
/// context before touching the pool.
#[derive(Clone)]
pub struct Db {
    pool: ConnPool,
    gate: OpenGate,
    limits: SharedLimits,
    connector: Arc<dyn Connector>,
}

// Manual Debug implementation because the connector is a trait object
impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("pool", &self.pool.status())
            .field("limits", &self.limits.get())
            .finish_non_exhaustive()
    }
}

impl Db {
    /// Open a handle on the driver registered as `driver_name`.
    ///
    /// No connection is made until one is needed.
    ///
    /// # Errors
    /// `FalseDbError::UnknownDriver` if nothing is registered under that name,
    /// or the driver's error when it rejects the connection string.
    pub fn open(driver_name: &str, dsn: &str) -> Result<Self, FalseDbError> {
        let driver = registry::lookup(driver_name)?;
        let connector: Arc<dyn Connector> = match driver.clone().as_driver_context() {
            Some(ctx_driver) => Arc::from(ctx_driver.open_connector(dsn)?),
            None => Arc::new(DsnConnector::new(driver, dsn)),
        };
        debug!(driver = driver_name, "opening pooled handle");
        Self::open_connector(connector)
    }

    /// Open a handle straight from a connector, bypassing the registry.
    ///
    /// # Errors
    /// `FalseDbError::PoolError` if the pool cannot be built.
    pub fn open_connector(connector: Arc<dyn Connector>) -> Result<Self, FalseDbError> {
        let limits = SharedLimits::default();
        let size = limits.get().backing_size();
        let manager = ConnManager::new(Arc::clone(&connector), limits.clone());
        let pool = Pool::builder(manager)
            .max_size(size)
            .build()
            .map_err(|e| FalseDbError::PoolError(format!("Failed to create pool: {e}")))?;
        Ok(Self {
            pool,
            gate: OpenGate::new(size),
            limits,
            connector,
        })
    }

    /// The driver behind this handle.
    #[must_use]
    pub fn driver(&self) -> Arc<dyn Driver> {
        self.connector.driver()
    }

    /// Check out a dedicated connection, waiting while max-open are in use.
    ///
    /// # Errors
    /// Context errors (also while waiting), `FalseDbError::Closed`, or the
    /// connector's error.
    pub async fn conn(&self, ctx: &Context) -> Result<PooledConn, FalseDbError> {
        ctx.check()?;
        if self.pool.is_closed() {
            return Err(FalseDbError::Closed);
        }
        PooledConn::checkout(&self.pool, &self.gate, &self.limits, ctx).await
    }

    /// # Errors
    /// Context errors, `FalseDbError::Closed`, or the connector's error.
    pub async fn ping(&self, ctx: &Context) -> Result<(), FalseDbError> {
        self.conn(ctx).await.map(drop)
    }

    /// # Errors
    /// Context errors, `FalseDbError::Closed`, or driver errors.
    pub async fn exec(
        &self,
        ctx: &Context,
        query: &str,
        args: &[Value],
    ) -> Result<Box<dyn ExecResult>, FalseDbError> {
        let conn = self.conn(ctx).await?;
        exec_on(conn.conn(), ctx, query, &NamedValue::from_positional(args)).await
    }

    /// # Errors
    /// Context errors, `FalseDbError::Closed`, or driver errors.
    pub async fn query(&self, ctx: &Context, query: &str, args: &[Value]) -> Result<Rows, FalseDbError> {
        let conn = Arc::new(self.conn(ctx).await?);
        let (rows, stmt) = query_on(conn.conn(), ctx, query, &NamedValue::from_positional(args)).await?;
        Ok(Rows::new(rows, stmt, conn))
    }

    /// # Errors
    /// Context errors, `FalseDbError::Closed`, or driver errors.
    pub async fn prepare(&self, ctx: &Context, query: &str) -> Result<Stmt, FalseDbError> {
        let conn = Arc::new(self.conn(ctx).await?);
        let stmt = prepare_on(conn.conn(), ctx, query).await?;
        Ok(Stmt::new(stmt, conn))
    }

    /// # Errors
    /// Context errors, `FalseDbError::Closed`, `FalseDbError::Unsupported` for
    /// options the driver cannot honor, or driver errors.
    pub async fn begin_tx(&self, ctx: &Context, opts: TxOptions) -> Result<Tx, FalseDbError> {
        let conn = Arc::new(self.conn(ctx).await?);
        let tx = begin_on(conn.conn(), ctx, opts).await?;
        Ok(Tx::new(tx, conn))
    }

    /// # Errors
    /// Same as [`Db::begin_tx`].
    pub async fn begin(&self, ctx: &Context) -> Result<Tx, FalseDbError> {
        self.begin_tx(ctx, TxOptions::default()).await
    }

    /// Limit open connections; `0` means unlimited. Lowers max-idle to match.
    ///
    /// Connections already checked out stay open; new checkouts wait until
    /// the count drops below the new limit.
    pub fn set_max_open_conns(&self, n: usize) {
        let mut before = 0;
        let limits = self.limits.update(|l| {
            before = l.backing_size();
            l.max_open = n;
            if n > 0 && l.max_idle > n {
                l.max_idle = n;
            }
        });
        let after = limits.backing_size();
        self.gate.resize(before, after);
        // deadpool only ever grows; the gate is what enforces the limit
        if after > self.pool.status().max_size {
            self.pool.resize(after);
        }
        debug!(max_open = n, "pool max open connections set");
        self.trim();
    }

    /// Limit idle connections kept for reuse; `0` keeps none. Never above max-open.
    pub fn set_max_idle_conns(&self, n: usize) {
        self.limits.update(|l| {
            l.max_idle = if l.max_open > 0 { n.min(l.max_open) } else { n };
        });
        debug!(max_idle = n, "pool max idle connections set");
        self.trim();
    }

    /// Discard connections older than `d`; zero disables the limit.
    pub fn set_conn_max_lifetime(&self, d: Duration) {
        self.limits
            .update(|l| l.max_lifetime = (!d.is_zero()).then_some(d));
        debug!(max_lifetime = ?d, "pool connection max lifetime set");
        self.trim();
    }

    /// Discard connections idle for `d`; zero disables the limit.
    pub fn set_conn_max_idle_time(&self, d: Duration) {
        self.limits
            .update(|l| l.max_idle_time = (!d.is_zero()).then_some(d));
        debug!(max_idle_time = ?d, "pool connection max idle time set");
        self.trim();
    }

    #[must_use]
    pub fn limits(&self) -> PoolLimits {
        self.limits.get()
    }

    #[must_use]
    pub fn stats(&self) -> DbStats {
        let status = self.pool.status();
        DbStats {
            max_open_connections: self.limits.get().max_open,
            open_connections: status.size,
            in_use: status.size.saturating_sub(status.available),
            idle: status.available,
            wait_count: self.gate.waiting(),
        }
    }

    /// Close the pool. Idempotent; later operations fail with `FalseDbError::Closed`.
    pub fn close(&self) {
        if !self.pool.is_closed() {
            debug!("closing pooled handle");
            self.gate.close();
            self.pool.close();
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    fn trim(&self) {
        trim_idle(&self.pool, &self.limits);
    }
}
