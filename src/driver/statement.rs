use async_trait::async_trait;

use super::{FalseResult, FalseRows};
use crate::context::Context;
use crate::error::FalseDbError;
use crate::spi::{ExecResult, Rows, Stmt, StmtExecContext, StmtQueryContext};
use crate::types::{NamedValue, Value};

/// Prepared statement that accepts any number of arguments.
#[derive(Debug, Default, Clone, Copy)]
pub struct FalseStmt {
    // fixed at prepare time; `None` means "unknown, accept any count"
    num_input: Option<usize>,
}

impl FalseStmt {
    #[must_use]
    pub fn new() -> Self {
        Self { num_input: None }
    }
}

#[async_trait]
impl Stmt for FalseStmt {
    fn close(&self) -> Result<(), FalseDbError> {
        Ok(())
    }

    fn num_input(&self) -> Option<usize> {
        self.num_input
    }

    async fn exec(&self, args: &[Value]) -> Result<Box<dyn ExecResult>, FalseDbError> {
        self.exec_context(&Context::background(), &NamedValue::from_positional(args))
            .await
    }

    async fn query(&self, args: &[Value]) -> Result<Box<dyn Rows>, FalseDbError> {
        self.query_context(&Context::background(), &NamedValue::from_positional(args))
            .await
    }

    fn as_exec_context(&self) -> Option<&dyn StmtExecContext> {
        Some(self)
    }
    fn as_query_context(&self) -> Option<&dyn StmtQueryContext> {
        Some(self)
    }
}

#[async_trait]
impl StmtExecContext for FalseStmt {
    async fn exec_context(
        &self,
        ctx: &Context,
        _args: &[NamedValue],
    ) -> Result<Box<dyn ExecResult>, FalseDbError> {
        ctx.check()?;
        Ok(Box::new(FalseResult))
    }
}

#[async_trait]
impl StmtQueryContext for FalseStmt {
    async fn query_context(
        &self,
        ctx: &Context,
        _args: &[NamedValue],
    ) -> Result<Box<dyn Rows>, FalseDbError> {
        ctx.check()?;
        Ok(Box::new(FalseRows::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spi::Capability;

    #[tokio::test]
    async fn statement_honors_cancellation() {
        let stmt = FalseStmt::new();
        let (ctx, cancel) = Context::background().with_cancel();
        let args = NamedValue::from_positional(&[Value::Int(42)]);

        assert!(stmt.exec_context(&ctx, &args).await.is_ok());
        assert!(stmt.query_context(&ctx, &args).await.is_ok());

        cancel.cancel();
        assert_eq!(
            stmt.exec_context(&ctx, &args).await.err(),
            Some(FalseDbError::Canceled)
        );
        assert_eq!(
            stmt.query_context(&ctx, &args).await.err(),
            Some(FalseDbError::Canceled)
        );
    }

    #[tokio::test]
    async fn statement_accepts_any_argument_count() {
        let stmt = FalseStmt::new();
        assert_eq!(stmt.num_input(), None);
        for n in [0usize, 1, 7] {
            let args = vec![Value::Null; n];
            let res = stmt.exec(&args).await.unwrap();
            assert_eq!(res.last_insert_id(), Ok(0));
        }
        assert!(stmt.close().is_ok());
        assert!(stmt.close().is_ok());
        assert!(Capability::STMT.iter().all(|cap| stmt.supports(*cap)));
    }
}
