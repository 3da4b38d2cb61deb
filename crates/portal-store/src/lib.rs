//! # portal-store
//!
//! Key-value store providers for session records and token revocation.
//!
//! - **memory**: in-process store built on [dashmap](https://crates.io/crates/dashmap)
//!   with per-entry expiry on the tokio clock
//! - **redis**: Redis-backed store using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime based on configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use keys::StoreKeys;
pub use provider::StoreManager;
