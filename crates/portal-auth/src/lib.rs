//! # portal-auth
//!
//! Session and token authority for the portal.
//!
//! ## Modules
//!
//! - `jwt`: signing and verification of bearer tokens
//! - `revocation`: TTL-bound blacklist of token ids
//! - `session`: session records and per-account active session sets
//! - `password`: Argon2id credential hashing
//! - `orchestrator`: registration, login, refresh, validation and logout policy
//! - `error`: the auth failure taxonomy

pub mod error;
pub mod jwt;
pub mod orchestrator;
pub mod password;
pub mod revocation;
pub mod session;

pub use error::AuthError;
pub use jwt::{Claims, IssuedToken, TokenAuthority, TokenError, TokenKind, TokenPair};
pub use orchestrator::{AuthOrchestrator, AuthOutcome, Principal, RegisterInput};
pub use password::{Argon2Hasher, CredentialHasher};
pub use revocation::RevocationList;
pub use session::SessionStore;
