//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Authorization: Bearer <token>
//!     → middleware.rs (extract token)
//!     → verifier.rs (IdentityVerifier → Principal)
//!     → Principal stored in request extensions for handlers
//! ```
//!
//! # Design Decisions
//! - Verification is delegated; this service never issues tokens
//! - Every failure, including provider outages, answers 401 with one body

pub mod middleware;
pub mod verifier;

pub use middleware::require_principal;
pub use verifier::{
    build_verifier, AuthError, IdentityToolkitVerifier, IdentityVerifier, Principal,
    StaticTokenVerifier,
};
