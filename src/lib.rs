//! Notes API library: authenticated note CRUD plus resilient summarization.

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod notes;
pub mod observability;
pub mod resilience;
pub mod store;
pub mod summarizer;

pub use config::schema::NotesConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
