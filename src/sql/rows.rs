use std::sync::Arc;

use crate::error::FalseDbError;
use crate::pool::PooledConn;
use crate::spi;
use crate::types::{Value, ValueKind};

use super::dispatch::close_stmt;

/// Column metadata as reported by a driver's column-type capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnType {
    pub name: String,
    pub scan_type: Option<ValueKind>,
    pub database_type_name: String,
    pub nullable: Option<bool>,
    pub precision_scale: Option<(i64, i64)>,
    pub length: Option<i64>,
}

/// Result of a query. Holds its connection until closed or dropped.
///
/// ```rust,no_run
/// use falsedb::prelude::*;
///
/// # async fn demo() -> Result<(), FalseDbError> {
/// let db = falsedb::open()?;
/// let mut rows = db.query(&Context::background(), "SELECT * FROM users", &[]).await?;
/// while rows.next() {
///     let _ = rows.values();
/// }
/// assert!(rows.err().is_none());
/// # Ok(()) }
/// ```
pub struct Rows {
    rows: Box<dyn spi::Rows>,
    // statement prepared only to run this query
    stmt: Option<Box<dyn spi::Stmt>>,
    conn: Option<Arc<PooledConn>>,
    current: Vec<Value>,
    seen: usize,
    err: Option<FalseDbError>,
    closed: bool,
}

impl std::fmt::Debug for Rows {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rows")
            .field("seen", &self.seen)
            .field("closed", &self.closed)
            .field("err", &self.err)
            .finish_non_exhaustive()
    }
}

impl Rows {
    pub(crate) fn new(
        rows: Box<dyn spi::Rows>,
        stmt: Option<Box<dyn spi::Stmt>>,
        conn: Arc<PooledConn>,
    ) -> Self {
        Self {
            rows,
            stmt,
            conn: Some(conn),
            current: Vec::new(),
            seen: 0,
            err: None,
            closed: false,
        }
    }

    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        self.rows.columns()
    }

    /// Per-column metadata; empty when the driver cannot describe its columns.
    #[must_use]
    pub fn column_types(&self) -> Vec<ColumnType> {
        let Some(types) = self.rows.as_column_types() else {
            return Vec::new();
        };
        self.rows
            .columns()
            .into_iter()
            .enumerate()
            .map(|(i, name)| ColumnType {
                name,
                scan_type: types.scan_type(i),
                database_type_name: types.database_type_name(i).to_string(),
                nullable: types.nullable(i),
                precision_scale: types.precision_scale(i),
                length: types.length(i),
            })
            .collect()
    }

    /// Advance to the next row. Returns `false` at end of data or on error;
    /// the cursor closes itself in both cases.
    pub fn next(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.current.clear();
        self.current.resize(self.rows.columns().len(), Value::Null);
        match self.rows.next(&mut self.current) {
            Ok(true) => {
                self.seen += 1;
                true
            }
            Ok(false) => {
                let _ = self.close();
                false
            }
            Err(e) => {
                self.err = Some(e);
                let _ = self.close();
                false
            }
        }
    }

    /// Values of the current row.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.current
    }

    /// Rows produced so far.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.seen
    }

    /// The error that ended iteration, if any. End of data is not an error.
    #[must_use]
    pub fn err(&self) -> Option<&FalseDbError> {
        self.err.as_ref()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Close the cursor and release its connection. Idempotent.
    ///
    /// # Errors
    /// Whatever the driver's cursor close reports, on the first call only.
    pub fn close(&mut self) -> Result<(), FalseDbError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let res = self.rows.close();
        if let Some(stmt) = self.stmt.take() {
            close_stmt(stmt.as_ref());
        }
        self.conn = None;
        res
    }
}

impl Drop for Rows {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
