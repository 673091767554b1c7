//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, CORS, security headers)
//! - Guard note routes with bearer-token authentication
//! - Serve the frontend bundle for non-API paths when configured
//! - Bind server to listener and drain on shutdown

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath},
    http::{header, HeaderName, HeaderValue, Method, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::{require_principal, IdentityVerifier};
use crate::config::{Environment, NotesConfig};
use crate::http::handlers;
use crate::observability::metrics;
use crate::store::NoteStore;
use crate::summarizer::SummarizerClient;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NoteStore>,
    pub summarizer: SummarizerClient,
    pub environment: Environment,
}

/// HTTP server for the notes API.
pub struct HttpServer {
    router: Router,
    config: NotesConfig,
    store: Arc<dyn NoteStore>,
}

impl HttpServer {
    /// Create a new HTTP server from already-built components.
    pub fn new(config: NotesConfig, state: AppState, verifier: Arc<dyn IdentityVerifier>) -> Self {
        let store = state.store.clone();
        let router = Self::build_router(&config, state, verifier);
        Self {
            router,
            config,
            store,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(
        config: &NotesConfig,
        state: AppState,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Router {
        let notes = Router::new()
            .route("/", get(handlers::list_notes).post(handlers::create_note))
            .route(
                "/{id}",
                get(handlers::get_note)
                    .put(handlers::update_note)
                    .delete(handlers::delete_note),
            )
            .route("/{id}/summarize", post(handlers::summarize_note))
            .route_layer(middleware::from_fn_with_state(verifier, require_principal));

        let api = Router::new()
            .nest("/notes", notes)
            .route("/health", get(handlers::health))
            .fallback(handlers::api_not_found);

        let mut router = Router::new().nest("/api", api).with_state(state);

        // Everything outside /api belongs to the single-page frontend.
        router = match &config.static_files.dir {
            Some(dir) => {
                let index = Path::new(dir).join("index.html");
                router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
            }
            None => router.fallback(handlers::api_not_found),
        };

        router = router.layer(DefaultBodyLimit::max(config.security.max_body_size));

        if config.security.enable_headers {
            router = router
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                ));
        }

        // Outermost first: the request id exists before the trace span opens.
        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(&X_REQUEST_ID)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                .layer(cors_layer(&config.cors.allowed_origins))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                .layer(middleware::from_fn(track_metrics)),
        )
    }

    /// Run the server on a plain TCP listener until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        Self::flush_store(&self.store).await;
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received, draining connections");
            shutdown_handle.graceful_shutdown(Some(grace));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        Self::flush_store(&self.store).await;
        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    async fn flush_store(store: &Arc<dyn NoteStore>) {
        if let Err(e) = store.flush().await {
            tracing::error!(error = %e, "Failed to persist notes on shutdown");
        }
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &NotesConfig {
        &self.config
    }

    /// A clone of the fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(&method, &route, response.status().as_u16(), start);
    response
}
