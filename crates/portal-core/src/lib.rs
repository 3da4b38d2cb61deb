//! # portal-core
//!
//! Core crate for the portal auth service. Contains configuration schemas,
//! the key-value store trait and the unified infrastructure error type.
//!
//! This crate has **no** dependencies on other portal crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
