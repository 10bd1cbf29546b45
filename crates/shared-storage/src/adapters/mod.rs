//! Storage and clock adapters.

mod file;
#[cfg(feature = "locking")]
mod lock;
mod memory;
mod time;

pub use file::FileBackedKVStore;
pub use memory::InMemoryKVStore;
pub use time::{ManualClock, SystemTimeSource};
