use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::FalseDbError;
use crate::spi::{Conn, Connector, Driver};

/// Connector for drivers without [`crate::spi::DriverContext`]: re-opens the
/// same connection string on every connect.
pub(crate) struct DsnConnector {
    driver: Arc<dyn Driver>,
    name: String,
}

impl DsnConnector {
    pub(crate) fn new(driver: Arc<dyn Driver>, name: &str) -> Self {
        Self {
            driver,
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl Connector for DsnConnector {
    async fn connect(&self, ctx: &Context) -> Result<Box<dyn Conn>, FalseDbError> {
        ctx.check()?;
        self.driver.open(&self.name)
    }

    fn driver(&self) -> Arc<dyn Driver> {
        Arc::clone(&self.driver)
    }
}
