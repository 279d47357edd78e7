//! The falsedb driver: every operation succeeds and returns nothing.
//!
//! Context-aware operations are the one place with observable branching: a
//! context that is already cancelled or past its deadline fails the call
//! with the context error; a live one never does. The legacy forms run the
//! context-aware ones with [`Context::background`].

mod connection;
mod rows;
mod statement;
mod transaction;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

pub use connection::FalseConn;
pub use rows::{FalseResult, FalseRows};
pub use statement::FalseStmt;
pub use transaction::FalseTx;

use crate::context::Context;
use crate::error::FalseDbError;
use crate::spi::{Conn, Connector, Driver, DriverContext};

/// Name the driver is registered under with [`crate::sql`].
pub const DRIVER_NAME: &str = "falsedb";

/// The falsedb SPI entry point. Connection strings are accepted as-is and
/// never inspected.
#[derive(Debug, Default, Clone, Copy)]
pub struct FalseDriver;

impl FalseDriver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Driver for FalseDriver {
    fn open(&self, name: &str) -> Result<Box<dyn Conn>, FalseDbError> {
        debug!(dsn_len = name.len(), "falsedb: opening connection");
        Ok(Box::new(FalseConn::new()))
    }

    fn as_driver_context(self: Arc<Self>) -> Option<Arc<dyn DriverContext>> {
        Some(self)
    }
}

impl DriverContext for FalseDriver {
    fn open_connector(self: Arc<Self>, name: &str) -> Result<Box<dyn Connector>, FalseDbError> {
        debug!(dsn_len = name.len(), "falsedb: opening connector");
        Ok(Box::new(FalseConnector { driver: self }))
    }
}

/// Connector bound to the [`FalseDriver`] that created it.
///
/// Connecting honors cancellation: a done context fails the call.
#[derive(Debug, Clone)]
pub struct FalseConnector {
    driver: Arc<FalseDriver>,
}

impl FalseConnector {
    #[must_use]
    pub fn new(driver: Arc<FalseDriver>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl Connector for FalseConnector {
    async fn connect(&self, ctx: &Context) -> Result<Box<dyn Conn>, FalseDbError> {
        ctx.check()?;
        self.driver.open("")
    }

    fn driver(&self) -> Arc<dyn Driver> {
        self.driver.clone()
    }
}
