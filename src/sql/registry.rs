use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use tracing::debug;

use crate::error::FalseDbError;
use crate::spi::Driver;

type DriverMap = LazyLock<RwLock<HashMap<String, Arc<dyn Driver>>>>;

static DRIVERS: DriverMap = LazyLock::new(|| RwLock::new(HashMap::new()));

/// Make a driver available to [`super::Db::open`] under `name`.
///
/// # Errors
/// Returns `FalseDbError::DuplicateDriver` if `name` is already taken.
pub fn register(name: &str, driver: Arc<dyn Driver>) -> Result<(), FalseDbError> {
    let mut drivers = DRIVERS.write().unwrap_or_else(PoisonError::into_inner);
    if drivers.contains_key(name) {
        return Err(FalseDbError::DuplicateDriver(name.to_string()));
    }
    debug!(driver = name, "registering driver");
    drivers.insert(name.to_string(), driver);
    Ok(())
}

#[must_use]
pub fn is_registered(name: &str) -> bool {
    DRIVERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(name)
}

/// Sorted names of every registered driver.
#[must_use]
pub fn drivers() -> Vec<String> {
    let mut names: Vec<String> = DRIVERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .keys()
        .cloned()
        .collect();
    names.sort();
    names
}

pub(crate) fn lookup(name: &str) -> Result<Arc<dyn Driver>, FalseDbError> {
    DRIVERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
        .ok_or_else(|| FalseDbError::UnknownDriver(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::FalseDriver;

    #[test]
    fn second_registration_under_same_name_fails() {
        let name = "registry-test-duplicate";
        assert!(register(name, Arc::new(FalseDriver)).is_ok());
        assert_eq!(
            register(name, Arc::new(FalseDriver)),
            Err(FalseDbError::DuplicateDriver(name.to_string()))
        );
        assert!(is_registered(name));
        assert!(drivers().contains(&name.to_string()));
    }

    #[test]
    fn unknown_driver_lookup_fails() {
        assert_eq!(
            lookup("registry-test-missing").err(),
            Some(FalseDbError::UnknownDriver("registry-test-missing".into()))
        );
    }
}
