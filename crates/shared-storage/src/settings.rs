//! # Settings Block
//!
//! Load/save of the `SharedSettings` block. Satellites only load; a missing or
//! unreadable block yields defaults.

use shared_types::SharedSettings;

use crate::errors::StorageError;
use crate::keys::SETTINGS_KEY;
use crate::ports::KeyValueStore;

/// Read the settings block, falling back to defaults.
pub fn load_settings(store: &dyn KeyValueStore) -> SharedSettings {
    let bytes = match store.get(SETTINGS_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return SharedSettings::default(),
        Err(e) => {
            tracing::warn!(error = %e, "[shared-storage] Settings unavailable, using defaults");
            return SharedSettings::default();
        }
    };

    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "[shared-storage] Settings block unreadable, using defaults");
        SharedSettings::default()
    })
}

/// Write the settings block (authority only).
pub fn save_settings(store: &dyn KeyValueStore, settings: &SharedSettings) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec(settings).map_err(StorageError::io)?;
    store.put(SETTINGS_KEY, &bytes)
}
