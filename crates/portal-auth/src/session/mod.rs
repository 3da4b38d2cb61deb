//! Session records and per-account active session sets.

pub mod store;

pub use store::SessionStore;
