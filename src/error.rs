use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FalseDbError {
    #[error("context canceled")]
    Canceled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("sql: unknown driver {0:?} (forgotten registration?)")]
    UnknownDriver(String),

    #[error("sql: register called twice for driver {0}")]
    DuplicateDriver(String),

    #[error("sql: database is closed")]
    Closed,

    #[error("sql: statement is closed")]
    StmtClosed,

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Pool error: {0}")]
    PoolError(String),
}

impl FalseDbError {
    /// True for the two errors a context produces once it is done.
    #[must_use]
    pub fn is_context_error(&self) -> bool {
        matches!(self, Self::Canceled | Self::DeadlineExceeded)
    }
}

pub type Result<T, E = FalseDbError> = std::result::Result<T, E>;
