//! `mentara-auth`: identity boundary (roles, per-request access context, token claims).
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod principal;
pub mod roles;

pub use claims::{Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use principal::{AccessContext, Caller};
pub use roles::Role;
