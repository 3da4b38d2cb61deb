//! Bearer token signing and verification.

pub mod authority;
pub mod claims;

pub use authority::{IssuedToken, TokenAuthority, TokenError, TokenPair};
pub use claims::{Claims, TokenKind};
