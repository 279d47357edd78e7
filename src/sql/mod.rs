//! Generic, driver-agnostic front-end.
//!
//! Drivers are registered by name; [`Db`] then front-ends any of them with a
//! `deadpool` connection pool and picks, per call, the best operation the
//! driver declares (see [`crate::spi::Capability`]).

mod connector;
mod db;
mod dispatch;
pub mod registry;
mod rows;
mod statement;
mod transaction;

pub use db::Db;
pub use registry::{drivers, is_registered, register};
pub use rows::{ColumnType, Rows};
pub use statement::Stmt;
pub use transaction::Tx;
