//! Cross-subsystem scenarios.

pub mod harness;

mod double_tap;
mod durability;
mod reconnect;
