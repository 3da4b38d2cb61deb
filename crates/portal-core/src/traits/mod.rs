//! Traits defined in `portal-core` and implemented by other crates.

pub mod store;

pub use store::KeyValueStore;
