//! # Maintenance Sync Test Suite
//!
//! Cross-subsystem scenarios: a satellite and the authority wired through an
//! in-process loopback link, sharing stores the way processes on one device do.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs      # Fixtures: vehicles, devices, event pumping
//!     ├── reconnect.rs    # Offline mutation → reconnect → authority push
//!     ├── double_tap.rs   # Repeated completions from several surfaces
//!     └── durability.rs   # Ledger TTL across restarts, staleness, authority wins
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ms-tests
//! cargo test -p ms-tests integration::reconnect
//! ```

pub mod integration;
