//! # Shared Storage
//!
//! The logically-keyed durable region shared by the authority and every
//! satellite process on one physical device.
//!
//! ## Entries
//!
//! | Key | Owner | Content |
//! |-----|-------|---------|
//! | `snapshot.latest` | authority / satellite cache | encoded `VehicleSnapshot` |
//! | `snapshot.overlay` | satellite cache | optimistic overlay (JSON) |
//! | `ledger.pending` | any process | deferred action ledger (JSON) |
//! | `settings` | authority (read-only elsewhere) | `SharedSettings` (JSON) |
//!
//! ## Module Structure
//!
//! ```text
//! shared-storage/
//! ├── ports/       # KeyValueStore, TimeSource
//! ├── adapters/    # InMemoryKVStore, FileBackedKVStore, SystemTimeSource, ManualClock
//! ├── errors.rs    # StorageError
//! ├── keys.rs      # Well-known keys
//! └── settings.rs  # SharedSettings load/save
//! ```
//!
//! A store that cannot be opened is a `StorageError`, never a panic; callers
//! degrade to "no cached data".

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod errors;
pub mod keys;
pub mod ports;
pub mod settings;

pub use adapters::{FileBackedKVStore, InMemoryKVStore, ManualClock, SystemTimeSource};
pub use errors::StorageError;
pub use ports::{BatchOperation, KeyValueStore, TimeSource};
pub use settings::{load_settings, save_settings};
