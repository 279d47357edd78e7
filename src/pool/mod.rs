//! Glue between the front-end and `deadpool`, the generic pool manager.

pub mod connection;
mod gate;
pub mod manager;
pub mod types;

pub use connection::PooledConn;
pub use manager::{ConnManager, ConnPool, ManagedConn};
pub use types::{DEFAULT_MAX_IDLE_CONNS, DbStats, PoolLimits};

pub(crate) use connection::trim_idle;
pub(crate) use gate::OpenGate;
pub(crate) use types::SharedLimits;
