//! Credential hashing.

pub mod hasher;

pub use hasher::{Argon2Hasher, CredentialHasher};
