//! Key-value store adapters.

mod atomic_json;
mod memory;

pub use atomic_json::AtomicJsonFileStore;
pub use memory::InMemoryKeyValueStore;
