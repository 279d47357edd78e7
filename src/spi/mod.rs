//! The driver SPI: what a backend implements, and the optional capabilities
//! it may declare on top.

mod traits;

pub use traits::{
    Conn, ConnBeginTx, ConnPrepareContext, Connector, Driver, DriverContext, ExecResult, Execer,
    ExecerContext, Queryer, QueryerContext, Rows, RowsColumnTypes, Stmt, StmtExecContext,
    StmtQueryContext, Tx,
};

/// Optional SPI extensions a handle can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Driver hands out reusable connectors.
    DriverContext,
    /// Connection runs queries without a prepare step.
    Queryer,
    /// Connection runs statements without a prepare step.
    Execer,
    QueryerContext,
    ExecerContext,
    ConnPrepareContext,
    /// Connection begins transactions with options and a context.
    ConnBeginTx,
    StmtQueryContext,
    StmtExecContext,
    /// Cursor describes its columns.
    RowsColumnTypes,
}

impl Capability {
    pub const CONN: [Capability; 6] = [
        Capability::Queryer,
        Capability::Execer,
        Capability::QueryerContext,
        Capability::ExecerContext,
        Capability::ConnPrepareContext,
        Capability::ConnBeginTx,
    ];

    pub const STMT: [Capability; 2] = [Capability::StmtQueryContext, Capability::StmtExecContext];
}
