//! falsedb: a SQL driver that does nothing.
//!
//! Every operation succeeds and returns an empty result, without I/O,
//! parsing or storage. Code written against the generic [`sql`] front-end
//! runs unmodified on top of it, which is handy for testing call sites,
//! measuring call overhead, or stubbing out a database.
//!
//! The one rule with observable behavior: context-aware operations fail with
//! [`FalseDbError::Canceled`] or [`FalseDbError::DeadlineExceeded`] when their
//! [`Context`] is already done, and succeed otherwise.

pub mod config;
pub mod context;
pub mod driver;
pub mod error;
mod facade;
pub mod pool;
pub mod prelude;
pub mod server;
pub mod spi;
pub mod sql;
pub mod types;

pub use config::{
    PoolConfig, PoolOption, with_conn_max_idle_time, with_conn_max_lifetime, with_max_idle_conns,
    with_max_open_conns,
};
pub use context::Context;
pub use driver::{DRIVER_NAME, FalseDriver};
pub use error::FalseDbError;
pub use facade::{open, open_configured, open_with_config, register};
pub use sql::Db;
