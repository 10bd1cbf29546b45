//! Well-known keys in the shared durable region.

/// Last-known vehicle snapshot (codec bytes).
pub const SNAPSHOT_KEY: &str = "snapshot.latest";

/// Optimistic overlay of the satellite cache.
pub const OVERLAY_KEY: &str = "snapshot.overlay";

/// Deferred action ledger document.
pub const LEDGER_KEY: &str = "ledger.pending";

/// Settings block written by the authority.
pub const SETTINGS_KEY: &str = "settings";
