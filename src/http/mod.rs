//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request id, CORS, limits, tracing)
//!     → auth middleware (bearer token → Principal)
//!     → handlers.rs (validate, call store / summarizer)
//!     → errors.rs (ApiError → status + JSON body)
//! ```

pub mod errors;
pub mod handlers;
pub mod server;

pub use errors::ApiError;
pub use server::{AppState, HttpServer, X_REQUEST_ID};
