//! Note summarization subsystem.
//!
//! # Data Flow
//! ```text
//! summarize handler
//!     → client.rs (credential & input checks, request construction)
//!     → resilience::executor (deadline, retries, backoff)
//!     → transport.rs (one HTTP POST per attempt)
//!     → client.rs (status → summary or SummarizeError)
//! ```
//!
//! # Design Decisions
//! - Credential and endpoint come from config at construction, never globals
//! - Transport is a trait so tests script upstream answers without sockets
//! - Raw upstream payloads never leave this module except as a short
//!   diagnostic message inside the error

pub mod client;
pub mod error;
pub mod payload;
pub mod transport;

pub use client::SummarizerClient;
pub use error::{SummarizeError, SummarizeErrorKind};
pub use transport::{GenerativeTransport, ReqwestTransport, TransportError, TransportResponse};
