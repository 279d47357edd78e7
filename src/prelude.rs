//! Convenient imports for common functionality.

pub use crate::config::{
    PoolConfig, PoolOption, with_conn_max_idle_time, with_conn_max_lifetime, with_max_idle_conns,
    with_max_open_conns,
};
pub use crate::context::{CancelHandle, Context};
pub use crate::driver::{DRIVER_NAME, FalseDriver};
pub use crate::error::FalseDbError;
pub use crate::pool::DbStats;
pub use crate::spi::{Capability, ExecResult};
pub use crate::sql::{Db, Rows, Stmt, Tx};
pub use crate::types::{IsolationLevel, NamedValue, TxOptions, Value};
