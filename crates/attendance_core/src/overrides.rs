//! Override precedence over static reference data.
//!
//! Each entity type has exactly one override blob holding the whole
//! collection. Once written it shadows the static source completely; there
//! is no per-record merge. Callers read, modify and write back the full
//! collection.

use crate::error::{Error, Result};
use crate::profile::{ProfileKey, ProfileStore};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Returns the persisted override, `Ok(None)` if none was ever written, or
/// `Error::StorageCorrupt` if the stored blob does not parse.
pub fn read_override<T: DeserializeOwned>(
    store: &dyn ProfileStore,
    key: ProfileKey,
) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| Error::StorageCorrupt {
            key: key.to_string(),
            reason: err.to_string(),
        })
}

/// Override if present and readable, otherwise `fallback` unchanged.
pub fn read<T: DeserializeOwned>(
    store: &dyn ProfileStore,
    key: ProfileKey,
    fallback: T,
) -> Result<T> {
    match read_override(store, key) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Ok(fallback),
        Err(Error::StorageCorrupt { key, reason }) => {
            warn!(%key, %reason, "ignoring corrupt override");
            Ok(fallback)
        }
        Err(err) => Err(err),
    }
}

pub fn write<T: Serialize + ?Sized>(
    store: &mut dyn ProfileStore,
    key: ProfileKey,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    debug!(%key, bytes = raw.len(), "writing override");
    store.set(key, &raw)
}
