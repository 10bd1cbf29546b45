//! # MS-01 Snapshot Codec
//!
//! Versioned wire/storage format for vehicle snapshots, application contexts
//! and keyed mutation messages.
//!
//! **Subsystem ID:** 01
//! **Architecture:** Hexagonal (domain + pure codec functions)
//!
//! ## Compatibility Contract
//!
//! Authority and satellite binaries update independently, so:
//!
//! | Payload | Decoder behaviour |
//! |---------|-------------------|
//! | Older payload, newer optional fields absent | Decodes, defaults filled (`distanceUnit` → miles) |
//! | Newer payload, unknown fields present | Decodes, unknown fields ignored |
//! | Unknown enum value (unit, status) | Decodes, falls back to the default value |
//! | Structurally invalid (bad JSON, required field missing) | `DecodeError` |
//!
//! ## Module Structure
//!
//! ```text
//! ms-01-snapshot-codec/
//! ├── domain/          # ApplicationContext, DecodeError, wire structs
//! └── codec.rs         # encode/decode for snapshots, contexts, messages
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod domain;

// Re-exports
pub use codec::{
    decode_context, decode_intent, decode_snapshot, encode_context, encode_intent,
    encode_snapshot,
};
pub use domain::{ApplicationContext, DecodeError, EncodeError, SCHEMA_VERSION};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
