use std::sync::Arc;

use crate::context::Context;
use crate::error::FalseDbError;
use crate::pool::PooledConn;
use crate::spi::{self, ExecResult};
use crate::types::{NamedValue, Value};

use super::dispatch::{exec_on, prepare_on, query_on};
use super::{Rows, Stmt};

/// An open transaction and the connection it runs on.
///
/// Commit and rollback are passed straight to the driver; the handle does
/// not track which was called.
pub struct Tx {
    tx: Box<dyn spi::Tx>,
    conn: Arc<PooledConn>,
}

impl std::fmt::Debug for Tx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tx").finish_non_exhaustive()
    }
}

impl Tx {
    pub(crate) fn new(tx: Box<dyn spi::Tx>, conn: Arc<PooledConn>) -> Self {
        Self { tx, conn }
    }

    /// # Errors
    /// Driver errors.
    pub async fn commit(&self) -> Result<(), FalseDbError> {
        self.tx.commit().await
    }

    /// # Errors
    /// Driver errors.
    pub async fn rollback(&self) -> Result<(), FalseDbError> {
        self.tx.rollback().await
    }

    /// # Errors
    /// Context errors or driver errors.
    pub async fn exec(
        &self,
        ctx: &Context,
        query: &str,
        args: &[Value],
    ) -> Result<Box<dyn ExecResult>, FalseDbError> {
        exec_on(self.conn.conn(), ctx, query, &NamedValue::from_positional(args)).await
    }

    /// # Errors
    /// Context errors or driver errors.
    pub async fn query(&self, ctx: &Context, query: &str, args: &[Value]) -> Result<Rows, FalseDbError> {
        let (rows, stmt) =
            query_on(self.conn.conn(), ctx, query, &NamedValue::from_positional(args)).await?;
        Ok(Rows::new(rows, stmt, Arc::clone(&self.conn)))
    }

    /// # Errors
    /// Context errors or driver errors.
    pub async fn prepare(&self, ctx: &Context, query: &str) -> Result<Stmt, FalseDbError> {
        let stmt = prepare_on(self.conn.conn(), ctx, query).await?;
        Ok(Stmt::new(stmt, Arc::clone(&self.conn)))
    }
}
