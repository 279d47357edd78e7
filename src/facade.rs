use std::sync::{Arc, Once};

use tracing::{debug, warn};

use crate::config::{PoolConfig, PoolOption};
use crate::driver::{DRIVER_NAME, FalseDriver};
use crate::error::FalseDbError;
use crate::sql::{self, Db};

static REGISTER: Once = Once::new();

/// Register [`FalseDriver`] under [`DRIVER_NAME`]. Safe to call any number of times.
///
/// If something else already claimed the name, that registration is kept
/// and a warning is logged.
pub fn register() {
    REGISTER.call_once(|| match sql::register(DRIVER_NAME, Arc::new(FalseDriver::new())) {
        Ok(()) => debug!(driver = DRIVER_NAME, "driver registered"),
        Err(e) => warn!(driver = DRIVER_NAME, error = %e, "driver name already taken"),
    });
}

/// Open a pooled handle on the falsedb driver with the pool's defaults.
///
/// ```rust,no_run
/// # async fn demo() -> Result<(), falsedb::FalseDbError> {
/// use falsedb::prelude::*;
///
/// let db = falsedb::open()?;
/// let res = db
///     .exec(&Context::background(), "INSERT INTO void VALUES (?)", &[Value::Int(42)])
///     .await?;
/// assert_eq!(res.rows_affected()?, 0);
/// # Ok(()) }
/// ```
///
/// # Errors
/// `FalseDbError::PoolError` if the pool cannot be built.
pub fn open() -> Result<Db, FalseDbError> {
    register();
    Db::open(DRIVER_NAME, "")
}

/// Open a pooled handle and apply the given pool options.
///
/// ```rust,no_run
/// use std::time::Duration;
/// use falsedb::prelude::*;
///
/// # fn demo() -> Result<(), FalseDbError> {
/// let db = falsedb::open_configured([
///     with_max_open_conns(10),
///     with_max_idle_conns(5),
///     with_conn_max_lifetime(Duration::from_secs(300)),
/// ])?;
/// assert_eq!(db.stats().max_open_connections, 10);
/// # Ok(()) }
/// ```
///
/// # Errors
/// `FalseDbError::PoolError` if the pool cannot be built.
pub fn open_configured<I>(options: I) -> Result<Db, FalseDbError>
where
    I: IntoIterator<Item = PoolOption>,
{
    open_with_config(PoolConfig::from_options(options))
}

/// Same as [`open_configured`], from an already built [`PoolConfig`].
///
/// # Errors
/// `FalseDbError::PoolError` if the pool cannot be built.
pub fn open_with_config(config: PoolConfig) -> Result<Db, FalseDbError> {
    let db = open()?;
    config.apply_to(&db);
    Ok(db)
}
