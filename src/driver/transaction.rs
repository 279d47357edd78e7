use async_trait::async_trait;

use crate::error::FalseDbError;
use crate::spi::Tx;

/// Transaction with nothing to commit and nothing to undo. Commit and
/// rollback may both be called, in any order, any number of times.
#[derive(Debug, Default, Clone, Copy)]
pub struct FalseTx;

#[async_trait]
impl Tx for FalseTx {
    async fn commit(&self) -> Result<(), FalseDbError> {
        Ok(())
    }

    async fn rollback(&self) -> Result<(), FalseDbError> {
        Ok(())
    }
}
