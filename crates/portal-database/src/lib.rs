//! # portal-database
//!
//! Account persistence for the portal auth service: PostgreSQL connection
//! management, migrations, and the [`AccountRepository`] trait with a
//! PostgreSQL and an in-memory implementation.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{AccountBackend, AccountRepository};
