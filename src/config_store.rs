//! A thread-safe holder for the currently published datafile. [`ConfigStore`] provides concurrent
//! access for readers (decisions) and writers (whatever refreshes the datafile).
use std::sync::{Arc, RwLock};

use crate::{error::ConfigParseError, DatafileIndex, Error, ErrorHandler, Logger};

/// `ConfigStore` provides a thread-safe (`Sync`) storage for the current [`DatafileIndex`].
///
/// The index itself is immutable and can only be replaced completely. Readers holding a previous
/// snapshot keep using it until they drop it.
#[derive(Default)]
pub struct ConfigStore {
    config: RwLock<Option<Arc<DatafileIndex>>>,
}

impl ConfigStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        ConfigStore::default()
    }

    /// Get the currently published snapshot. Returns `None` if nothing has been published yet.
    pub fn get_config(&self) -> Option<Arc<DatafileIndex>> {
        // read() only fails if a writer panicked while holding the lock, which should never
        // happen.
        let config = self
            .config
            .read()
            .expect("thread holding config lock should not panic");

        config.clone()
    }

    /// Publish a new snapshot.
    pub fn set_config(&self, config: Arc<DatafileIndex>) {
        let mut slot = self
            .config
            .write()
            .expect("thread holding config lock should not panic");

        *slot = Some(config);
    }

    /// Build an index from `datafile` and publish it if its revision differs from the current
    /// one.
    ///
    /// The index is built before the lock is taken. Returns whether a new snapshot was
    /// published. A payload that fails to build is reported to `error_handler` and leaves the
    /// current snapshot in place.
    pub fn update_from_datafile(
        &self,
        datafile: &str,
        logger: Arc<dyn Logger>,
        error_handler: Arc<dyn ErrorHandler>,
    ) -> Result<bool, ConfigParseError> {
        let config = match DatafileIndex::from_datafile(datafile, logger, error_handler.clone()) {
            Ok(config) => config,
            Err(err) => {
                log::warn!(target: "optimizely", "failed to build datafile: {err}");
                error_handler.handle_error(&Error::ConfigParse(err.clone()));
                return Err(err);
            }
        };

        let mut slot = self
            .config
            .write()
            .expect("thread holding config lock should not panic");

        let revision = config.revision();
        if slot
            .as_ref()
            .is_some_and(|current| current.revision() == revision)
        {
            log::debug!(target: "optimizely", revision; "datafile revision unchanged");
            return Ok(false);
        }

        log::info!(target: "optimizely",
                   revision,
                   version = config.version();
                   "publishing new datafile");
        *slot = Some(Arc::new(config));
        Ok(true)
    }
}
