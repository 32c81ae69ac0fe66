use crate::{CoreResult, MemoError, store::PersistenceGateway};

use std::panic::Location;

use error_location::ErrorLocation;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Parse a persisted JSON value.
#[track_caller]
pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> CoreResult<T> {
    serde_json::from_slice(bytes).map_err(|e| MemoError::MalformedData {
        reason: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Fetch and parse `key`, degrading every failure to `None`.
///
/// Read errors and malformed payloads are logged, never returned.
pub(crate) async fn load_json<T: DeserializeOwned>(
    gateway: &dyn PersistenceGateway,
    key: &str,
) -> Option<T> {
    let bytes = match gateway.get(key).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            debug!(key, "No persisted value");
            return None;
        }
        Err(e) => {
            warn!(key, error = ?e, "Failed to read persisted value, using defaults");
            return None;
        }
    };

    match decode(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = ?e, "Persisted value is malformed, using defaults");
            None
        }
    }
}
