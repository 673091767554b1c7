//! Network layer subsystem.
//!
//! Plain TCP listeners come straight from tokio; this module only prepares the
//! optional TLS configuration handed to `HttpServer::run_tls`.

pub mod tls;
