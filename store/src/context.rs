//! Collaborators shared by every container.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::notify::Notifier;
use crate::source::StudySource;
use crate::storage::{KeyValueStorage, load_snapshot, save_snapshot};

/// The source, snapshot storage, and notifier a container works with.
#[derive(Clone)]
pub struct StoreContext {
    pub source: Arc<dyn StudySource>,
    pub storage: Arc<dyn KeyValueStorage>,
    pub notifier: Arc<dyn Notifier>,
}

impl StoreContext {
    pub fn new(
        source: Arc<dyn StudySource>,
        storage: Arc<dyn KeyValueStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            storage,
            notifier,
        }
    }

    /// Reads a snapshot, treating any failure as "no snapshot".
    pub(crate) fn restore<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match load_snapshot(self.storage.as_ref(), key) {
            Ok(Some(value)) => {
                debug!(key, backend = self.storage.backend_name(), "restored snapshot");
                Some(value)
            }
            Ok(None) => None,
            Err(err) => {
                warn!(key, error = %err, "failed to restore snapshot");
                None
            }
        }
    }

    /// Writes a snapshot. Failures are logged; in-memory state stays valid.
    pub(crate) fn persist<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(err) = save_snapshot(self.storage.as_ref(), key, value) {
            warn!(key, error = %err, "failed to persist snapshot");
        }
    }

    /// Logs `err`, shows `message` to the user, and hands the error back.
    pub(crate) fn report(&self, message: &str, err: impl Into<StoreError>) -> StoreError {
        let err = err.into();
        warn!(error = %err, "{message}");
        self.notifier.notify(message);
        err
    }
}

impl fmt::Debug for StoreContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreContext")
            .field("storage", &self.storage.backend_name())
            .finish_non_exhaustive()
    }
}
