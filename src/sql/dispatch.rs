//! Pick the best operation a driver handle declares, falling back the same
//! way for every backend: context-aware, then legacy, then prepare + statement.

use tracing::trace;

use crate::context::Context;
use crate::error::FalseDbError;
use crate::spi::{Conn, ExecResult, Rows, Stmt, Tx};
use crate::types::{NamedValue, TxOptions};

pub(crate) async fn prepare_on(
    conn: &dyn Conn,
    ctx: &Context,
    query: &str,
) -> Result<Box<dyn Stmt>, FalseDbError> {
    if let Some(preparer) = conn.as_prepare_context() {
        return preparer.prepare_context(ctx, query).await;
    }
    ctx.check()?;
    conn.prepare(query).await
}

pub(crate) async fn exec_on(
    conn: &dyn Conn,
    ctx: &Context,
    query: &str,
    args: &[NamedValue],
) -> Result<Box<dyn ExecResult>, FalseDbError> {
    if let Some(execer) = conn.as_execer_context() {
        return execer.exec_context(ctx, query, args).await;
    }
    if let Some(execer) = conn.as_execer() {
        ctx.check()?;
        return execer.exec(query, &NamedValue::into_positional(args)).await;
    }
    trace!("driver has no direct exec; preparing");
    let stmt = prepare_on(conn, ctx, query).await?;
    let res = exec_stmt(stmt.as_ref(), ctx, args).await;
    close_stmt(stmt.as_ref());
    res
}

/// Returns the cursor and, when a statement had to be prepared for it, that
/// statement, which must outlive the cursor.
pub(crate) async fn query_on(
    conn: &dyn Conn,
    ctx: &Context,
    query: &str,
    args: &[NamedValue],
) -> Result<(Box<dyn Rows>, Option<Box<dyn Stmt>>), FalseDbError> {
    if let Some(queryer) = conn.as_queryer_context() {
        let rows = queryer.query_context(ctx, query, args).await?;
        return Ok((rows, None));
    }
    if let Some(queryer) = conn.as_queryer() {
        ctx.check()?;
        let rows = queryer
            .query(query, &NamedValue::into_positional(args))
            .await?;
        return Ok((rows, None));
    }
    trace!("driver has no direct query; preparing");
    let stmt = prepare_on(conn, ctx, query).await?;
    let res = query_stmt(stmt.as_ref(), ctx, args).await;
    match res {
        Ok(rows) => Ok((rows, Some(stmt))),
        Err(e) => {
            close_stmt(stmt.as_ref());
            Err(e)
        }
    }
}

pub(crate) async fn exec_stmt(
    stmt: &dyn Stmt,
    ctx: &Context,
    args: &[NamedValue],
) -> Result<Box<dyn ExecResult>, FalseDbError> {
    if let Some(execer) = stmt.as_exec_context() {
        return execer.exec_context(ctx, args).await;
    }
    ctx.check()?;
    stmt.exec(&NamedValue::into_positional(args)).await
}

pub(crate) async fn query_stmt(
    stmt: &dyn Stmt,
    ctx: &Context,
    args: &[NamedValue],
) -> Result<Box<dyn Rows>, FalseDbError> {
    if let Some(queryer) = stmt.as_query_context() {
        return queryer.query_context(ctx, args).await;
    }
    ctx.check()?;
    stmt.query(&NamedValue::into_positional(args)).await
}

pub(crate) async fn begin_on(
    conn: &dyn Conn,
    ctx: &Context,
    opts: TxOptions,
) -> Result<Box<dyn Tx>, FalseDbError> {
    if let Some(beginner) = conn.as_begin_tx() {
        return beginner.begin_tx(ctx, opts).await;
    }
    if !opts.is_default() {
        return Err(FalseDbError::Unsupported(
            "driver does not support isolation levels or read-only transactions".into(),
        ));
    }
    ctx.check()?;
    conn.begin().await
}

pub(crate) fn close_stmt(stmt: &dyn Stmt) {
    if let Err(e) = stmt.close() {
        trace!(error = %e, "statement close failed");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::driver::{FalseResult, FalseRows, FalseTx};
    use crate::types::{IsolationLevel, Value};

    /// Declares no optional capability at all.
    #[derive(Default)]
    struct BareConn {
        prepared: Arc<AtomicUsize>,
    }

    struct BareStmt;

    #[async_trait]
    impl Stmt for BareStmt {
        fn close(&self) -> Result<(), FalseDbError> {
            Ok(())
        }
        fn num_input(&self) -> Option<usize> {
            Some(0)
        }
        async fn exec(&self, _args: &[Value]) -> Result<Box<dyn ExecResult>, FalseDbError> {
            Ok(Box::new(FalseResult))
        }
        async fn query(&self, _args: &[Value]) -> Result<Box<dyn Rows>, FalseDbError> {
            Ok(Box::new(FalseRows::new()))
        }
    }

    #[async_trait]
    impl Conn for BareConn {
        async fn prepare(&self, _query: &str) -> Result<Box<dyn Stmt>, FalseDbError> {
            self.prepared.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(BareStmt))
        }
        async fn begin(&self) -> Result<Box<dyn Tx>, FalseDbError> {
            Ok(Box::new(FalseTx))
        }
        fn close(&self) -> Result<(), FalseDbError> {
            Ok(())
        }
    }

    fn cancelled() -> Context {
        let (ctx, cancel) = Context::background().with_cancel();
        cancel.cancel();
        ctx
    }

    #[tokio::test]
    async fn bare_connection_falls_back_to_prepare() {
        let conn = BareConn::default();
        let ctx = Context::background();
        let res = exec_on(&conn, &ctx, "INSERT", &[]).await.unwrap();
        assert_eq!(res.rows_affected(), Ok(0));
        let (_rows, stmt) = query_on(&conn, &ctx, "SELECT", &[]).await.unwrap();
        assert!(stmt.is_some());
        assert_eq!(conn.prepared.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fallbacks_still_check_the_context() {
        let conn = BareConn::default();
        let ctx = cancelled();
        assert!(prepare_on(&conn, &ctx, "SELECT").await.is_err());
        assert!(exec_on(&conn, &ctx, "INSERT", &[]).await.is_err());
        assert!(query_on(&conn, &ctx, "SELECT", &[]).await.is_err());
        assert!(begin_on(&conn, &ctx, TxOptions::default()).await.is_err());
        assert_eq!(conn.prepared.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn legacy_begin_rejects_non_default_options() {
        let conn = BareConn::default();
        let opts = TxOptions {
            isolation: IsolationLevel::Serializable,
            read_only: true,
        };
        let err = begin_on(&conn, &Context::background(), opts).await.err();
        assert!(matches!(err, Some(FalseDbError::Unsupported(_))));
    }
}
