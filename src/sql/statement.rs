use std::sync::Arc;

use crate::context::Context;
use crate::error::FalseDbError;
use crate::pool::PooledConn;
use crate::spi::{self, ExecResult};
use crate::types::{NamedValue, Value};

use super::Rows;
use super::dispatch::{close_stmt, exec_stmt, query_stmt};

/// A prepared statement pinned to the connection it was prepared on.
pub struct Stmt {
    stmt: Box<dyn spi::Stmt>,
    conn: Arc<PooledConn>,
    closed: bool,
}

impl std::fmt::Debug for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stmt")
            .field("num_input", &self.stmt.num_input())
            .field("closed", &self.closed)
            .finish()
    }
}

impl Stmt {
    pub(crate) fn new(stmt: Box<dyn spi::Stmt>, conn: Arc<PooledConn>) -> Self {
        Self {
            stmt,
            conn,
            closed: false,
        }
    }

    /// Declared placeholder count; `None` when the driver accepts any count.
    #[must_use]
    pub fn num_input(&self) -> Option<usize> {
        self.stmt.num_input()
    }

    /// # Errors
    /// `FalseDbError::StmtClosed` after [`Stmt::close`], context errors, or driver errors.
    pub async fn exec(
        &self,
        ctx: &Context,
        args: &[Value],
    ) -> Result<Box<dyn ExecResult>, FalseDbError> {
        self.ensure_open()?;
        exec_stmt(self.stmt.as_ref(), ctx, &NamedValue::from_positional(args)).await
    }

    /// # Errors
    /// `FalseDbError::StmtClosed` after [`Stmt::close`], context errors, or driver errors.
    pub async fn query(&self, ctx: &Context, args: &[Value]) -> Result<Rows, FalseDbError> {
        self.ensure_open()?;
        let rows = query_stmt(self.stmt.as_ref(), ctx, &NamedValue::from_positional(args)).await?;
        Ok(Rows::new(rows, None, Arc::clone(&self.conn)))
    }

    /// Idempotent.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            close_stmt(self.stmt.as_ref());
        }
    }

    fn ensure_open(&self) -> Result<(), FalseDbError> {
        if self.closed {
            Err(FalseDbError::StmtClosed)
        } else {
            Ok(())
        }
    }
}

impl Drop for Stmt {
    fn drop(&mut self) {
        self.close();
    }
}
