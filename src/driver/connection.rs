use async_trait::async_trait;
use tracing::trace;

use super::{FalseResult, FalseRows, FalseStmt, FalseTx};
use crate::context::Context;
use crate::error::FalseDbError;
use crate::spi::{
    Conn, ConnBeginTx, ConnPrepareContext, ExecResult, Execer, ExecerContext, Queryer,
    QueryerContext, Rows, Stmt, Tx,
};
use crate::types::{NamedValue, TxOptions, Value};

/// A connection to nothing. Always open; closing is a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct FalseConn;

impl FalseConn {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Conn for FalseConn {
    async fn prepare(&self, query: &str) -> Result<Box<dyn Stmt>, FalseDbError> {
        self.prepare_context(&Context::background(), query).await
    }

    async fn begin(&self) -> Result<Box<dyn Tx>, FalseDbError> {
        self.begin_tx(&Context::background(), TxOptions::default())
            .await
    }

    fn close(&self) -> Result<(), FalseDbError> {
        Ok(())
    }

    fn as_queryer(&self) -> Option<&dyn Queryer> {
        Some(self)
    }
    fn as_execer(&self) -> Option<&dyn Execer> {
        Some(self)
    }
    fn as_queryer_context(&self) -> Option<&dyn QueryerContext> {
        Some(self)
    }
    fn as_execer_context(&self) -> Option<&dyn ExecerContext> {
        Some(self)
    }
    fn as_prepare_context(&self) -> Option<&dyn ConnPrepareContext> {
        Some(self)
    }
    fn as_begin_tx(&self) -> Option<&dyn ConnBeginTx> {
        Some(self)
    }
}

#[async_trait]
impl Queryer for FalseConn {
    async fn query(&self, query: &str, args: &[Value]) -> Result<Box<dyn Rows>, FalseDbError> {
        self.query_context(
            &Context::background(),
            query,
            &NamedValue::from_positional(args),
        )
        .await
    }
}

#[async_trait]
impl Execer for FalseConn {
    async fn exec(&self, query: &str, args: &[Value]) -> Result<Box<dyn ExecResult>, FalseDbError> {
        self.exec_context(
            &Context::background(),
            query,
            &NamedValue::from_positional(args),
        )
        .await
    }
}

#[async_trait]
impl QueryerContext for FalseConn {
    async fn query_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> Result<Box<dyn Rows>, FalseDbError> {
        ctx.check()?;
        trace!(query, args = args.len(), "falsedb: query");
        Ok(Box::new(FalseRows::new()))
    }
}

#[async_trait]
impl ExecerContext for FalseConn {
    async fn exec_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> Result<Box<dyn ExecResult>, FalseDbError> {
        ctx.check()?;
        trace!(query, args = args.len(), "falsedb: exec");
        Ok(Box::new(FalseResult))
    }
}

#[async_trait]
impl ConnPrepareContext for FalseConn {
    async fn prepare_context(
        &self,
        ctx: &Context,
        query: &str,
    ) -> Result<Box<dyn Stmt>, FalseDbError> {
        ctx.check()?;
        trace!(query, "falsedb: prepare");
        Ok(Box::new(FalseStmt::new()))
    }
}

#[async_trait]
impl ConnBeginTx for FalseConn {
    async fn begin_tx(&self, ctx: &Context, opts: TxOptions) -> Result<Box<dyn Tx>, FalseDbError> {
        ctx.check()?;
        trace!(isolation = ?opts.isolation, read_only = opts.read_only, "falsedb: begin");
        Ok(Box::new(FalseTx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cancelled() -> Context {
        let (ctx, cancel) = Context::background().with_cancel();
        cancel.cancel();
        ctx
    }

    #[tokio::test]
    async fn context_operations_fail_once_cancelled() {
        let conn = FalseConn::new();
        let ctx = cancelled();
        assert!(conn.prepare_context(&ctx, "SELECT 1").await.is_err());
        assert!(conn.query_context(&ctx, "SELECT 1", &[]).await.is_err());
        assert!(conn.exec_context(&ctx, "INSERT 1", &[]).await.is_err());
        assert!(conn.begin_tx(&ctx, TxOptions::default()).await.is_err());
    }

    #[tokio::test]
    async fn legacy_operations_never_fail() {
        let conn = FalseConn::new();
        let stmt = conn.prepare("not even sql").await.unwrap();
        assert_eq!(stmt.num_input(), None);
        let mut rows = conn.query("SELECT 1", &[Value::Int(1)]).await.unwrap();
        assert!(!rows.next(&mut []).unwrap());
        let res = conn.exec("DELETE", &[]).await.unwrap();
        assert_eq!(res.rows_affected(), Ok(0));
        let tx = conn.begin().await.unwrap();
        assert!(tx.commit().await.is_ok());
    }

    #[test]
    fn close_is_idempotent() {
        let conn = FalseConn::new();
        assert!(conn.close().is_ok());
        assert!(conn.close().is_ok());
    }
}
