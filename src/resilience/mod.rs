//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call:
//!     → executor.rs (per-attempt deadline, bounded attempt loop)
//!     → On failure: retries.rs (failure reports its own disposition)
//!     → backoff.rs (2^attempt · base delay for rate limits)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Only the error type knows whether it is retryable
//! - The executor keeps no state between calls

pub mod backoff;
pub mod executor;
pub mod retries;

pub use executor::ResilientCallExecutor;
pub use retries::{AttemptTimeout, Disposition, RetryPolicy, Retryable};
