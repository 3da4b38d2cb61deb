//! # portal-entity
//!
//! Domain models for the portal auth service. Accounts are rows in the
//! relational database and derive `sqlx::FromRow`; sessions live in the
//! key-value store and are plain serializable values.

pub mod account;
pub mod session;
