//! Driver-side traits a backend implements to plug into [`crate::sql`].
//!
//! The required traits are `Driver`, `Conn`, `Stmt`, `Rows`, `Tx` and
//! `ExecResult`. Everything else is an optional capability: a type opts in by
//! overriding the matching `as_*` accessor to return `Some(self)`.

use std::sync::Arc;

use async_trait::async_trait;

use super::Capability;
use crate::context::Context;
use crate::error::FalseDbError;
use crate::types::{NamedValue, TxOptions, Value, ValueKind};

/// Entry point registered with the front-end under a driver name.
pub trait Driver: Send + Sync + 'static {
    /// Open a new connection for the given connection string.
    ///
    /// # Errors
    /// Backend specific.
    fn open(&self, name: &str) -> Result<Box<dyn Conn>, FalseDbError>;

    /// Upcast to [`DriverContext`] if the driver can hand out reusable connectors.
    fn as_driver_context(self: Arc<Self>) -> Option<Arc<dyn DriverContext>> {
        None
    }
}

pub trait DriverContext: Driver {
    /// Parse `name` once and return a connector bound to this driver.
    ///
    /// # Errors
    /// Backend specific.
    fn open_connector(self: Arc<Self>, name: &str) -> Result<Box<dyn Connector>, FalseDbError>;
}

/// Reusable connection factory.
#[async_trait]
pub trait Connector: Send + Sync {
    /// # Errors
    /// Backend specific; context errors when the connector honors cancellation.
    async fn connect(&self, ctx: &Context) -> Result<Box<dyn Conn>, FalseDbError>;

    /// The driver this connector was created by.
    fn driver(&self) -> Arc<dyn Driver>;
}

/// One logical connection to the backend.
#[async_trait]
pub trait Conn: Send + Sync {
    /// # Errors
    /// Backend specific.
    async fn prepare(&self, query: &str) -> Result<Box<dyn Stmt>, FalseDbError>;

    /// # Errors
    /// Backend specific.
    async fn begin(&self) -> Result<Box<dyn Tx>, FalseDbError>;

    /// # Errors
    /// Backend specific.
    fn close(&self) -> Result<(), FalseDbError>;

    fn as_queryer(&self) -> Option<&dyn Queryer> {
        None
    }
    fn as_execer(&self) -> Option<&dyn Execer> {
        None
    }
    fn as_queryer_context(&self) -> Option<&dyn QueryerContext> {
        None
    }
    fn as_execer_context(&self) -> Option<&dyn ExecerContext> {
        None
    }
    fn as_prepare_context(&self) -> Option<&dyn ConnPrepareContext> {
        None
    }
    fn as_begin_tx(&self) -> Option<&dyn ConnBeginTx> {
        None
    }

    /// Whether this connection declares `cap`. Capabilities that belong to
    /// other handle kinds are never supported here.
    fn supports(&self, cap: Capability) -> bool {
        match cap {
            Capability::Queryer => self.as_queryer().is_some(),
            Capability::Execer => self.as_execer().is_some(),
            Capability::QueryerContext => self.as_queryer_context().is_some(),
            Capability::ExecerContext => self.as_execer_context().is_some(),
            Capability::ConnPrepareContext => self.as_prepare_context().is_some(),
            Capability::ConnBeginTx => self.as_begin_tx().is_some(),
            _ => false,
        }
    }
}

#[async_trait]
pub trait Queryer: Send + Sync {
    /// # Errors
    /// Backend specific.
    async fn query(&self, query: &str, args: &[Value]) -> Result<Box<dyn Rows>, FalseDbError>;
}

#[async_trait]
pub trait Execer: Send + Sync {
    /// # Errors
    /// Backend specific.
    async fn exec(&self, query: &str, args: &[Value]) -> Result<Box<dyn ExecResult>, FalseDbError>;
}

#[async_trait]
pub trait QueryerContext: Send + Sync {
    /// # Errors
    /// Context errors, or backend specific.
    async fn query_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> Result<Box<dyn Rows>, FalseDbError>;
}

#[async_trait]
pub trait ExecerContext: Send + Sync {
    /// # Errors
    /// Context errors, or backend specific.
    async fn exec_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> Result<Box<dyn ExecResult>, FalseDbError>;
}

#[async_trait]
pub trait ConnPrepareContext: Send + Sync {
    /// # Errors
    /// Context errors, or backend specific.
    async fn prepare_context(
        &self,
        ctx: &Context,
        query: &str,
    ) -> Result<Box<dyn Stmt>, FalseDbError>;
}

#[async_trait]
pub trait ConnBeginTx: Send + Sync {
    /// # Errors
    /// Context errors, or backend specific.
    async fn begin_tx(&self, ctx: &Context, opts: TxOptions) -> Result<Box<dyn Tx>, FalseDbError>;
}

/// A prepared statement.
#[async_trait]
pub trait Stmt: Send + Sync {
    /// # Errors
    /// Backend specific.
    fn close(&self) -> Result<(), FalseDbError>;

    /// Number of placeholders, or `None` when the driver does not know and
    /// accepts any count.
    fn num_input(&self) -> Option<usize>;

    /// # Errors
    /// Backend specific.
    async fn exec(&self, args: &[Value]) -> Result<Box<dyn ExecResult>, FalseDbError>;

    /// # Errors
    /// Backend specific.
    async fn query(&self, args: &[Value]) -> Result<Box<dyn Rows>, FalseDbError>;

    fn as_exec_context(&self) -> Option<&dyn StmtExecContext> {
        None
    }
    fn as_query_context(&self) -> Option<&dyn StmtQueryContext> {
        None
    }

    fn supports(&self, cap: Capability) -> bool {
        match cap {
            Capability::StmtExecContext => self.as_exec_context().is_some(),
            Capability::StmtQueryContext => self.as_query_context().is_some(),
            _ => false,
        }
    }
}

#[async_trait]
pub trait StmtExecContext: Send + Sync {
    /// # Errors
    /// Context errors, or backend specific.
    async fn exec_context(
        &self,
        ctx: &Context,
        args: &[NamedValue],
    ) -> Result<Box<dyn ExecResult>, FalseDbError>;
}

#[async_trait]
pub trait StmtQueryContext: Send + Sync {
    /// # Errors
    /// Context errors, or backend specific.
    async fn query_context(
        &self,
        ctx: &Context,
        args: &[NamedValue],
    ) -> Result<Box<dyn Rows>, FalseDbError>;
}

/// Cursor over a query's rows.
pub trait Rows: Send + Sync {
    fn columns(&self) -> Vec<String>;

    /// # Errors
    /// Backend specific.
    fn close(&mut self) -> Result<(), FalseDbError>;

    /// Fill `dest` with the next row. `Ok(false)` means end of data and is
    /// not a failure.
    ///
    /// # Errors
    /// Backend specific.
    fn next(&mut self, dest: &mut [Value]) -> Result<bool, FalseDbError>;

    fn as_column_types(&self) -> Option<&dyn RowsColumnTypes> {
        None
    }

    fn supports(&self, cap: Capability) -> bool {
        matches!(cap, Capability::RowsColumnTypes) && self.as_column_types().is_some()
    }
}

/// Column metadata. `None` means the driver cannot say.
pub trait RowsColumnTypes: Send + Sync {
    fn scan_type(&self, index: usize) -> Option<ValueKind>;
    fn database_type_name(&self, index: usize) -> &str;
    fn nullable(&self, index: usize) -> Option<bool>;
    fn precision_scale(&self, index: usize) -> Option<(i64, i64)>;
    fn length(&self, index: usize) -> Option<i64>;
}

#[async_trait]
pub trait Tx: Send + Sync {
    /// # Errors
    /// Backend specific.
    async fn commit(&self) -> Result<(), FalseDbError>;

    /// # Errors
    /// Backend specific.
    async fn rollback(&self) -> Result<(), FalseDbError>;
}

/// Outcome of a mutating statement.
pub trait ExecResult: Send + Sync {
    /// # Errors
    /// Backend specific.
    fn last_insert_id(&self) -> Result<i64, FalseDbError>;

    /// # Errors
    /// Backend specific.
    fn rows_affected(&self) -> Result<i64, FalseDbError>;
}
