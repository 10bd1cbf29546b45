//! # Sync Runtime Library
//!
//! Builds and runs the sync subsystems for one process. The `maintsync-node`
//! binary hosts the satellite roles; an authority host embeds this library
//! and supplies its own `CanonicalStore`.
//!
//! ## Modular Structure
//!
//! - `container/` - Runtime configuration and the subsystem container
//! - `wiring/` - Event loop and shutdown handling
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (`RuntimeConfig::from_env`) and validate it
//! 2. Open the shared store and build subsystems in dependency order
//! 3. Attach the event bus to the transport adapter
//! 4. Replay waiting state (`SyncRuntime::start`), spawn the event loop
//! 5. Run until shutdown is signalled

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod container;
pub mod wiring;

pub use container::{ConfigError, Endpoint, NodeRole, RuntimeConfig, SyncContainer};
pub use wiring::SyncRuntime;
