pub mod docs;
pub mod dto;
pub mod errors;
pub mod handlers;
pub mod helpers;
pub mod middleware;
pub mod router;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::http::{HeaderValue, Method};
use ipc_source::DatasetSource;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use docs::ApiDoc;
use router::api_router;

/// Shared secret protecting the admin endpoints.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// HTTP layer settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub admin: AdminCredentials,
    pub request_timeout: Duration,
    /// `None` means permissive CORS.
    pub cors_allowed_origins: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn DatasetSource>,
    pub config: Arc<ApiConfig>,
}

pub struct ApiService {
    state: AppState,
    host: String,
    port: u16,
}

impl ApiService {
    pub fn new(state: AppState, host: &str, port: u16) -> Self {
        Self {
            state,
            host: host.to_owned(),
            port,
        }
    }

    /// Router with every middleware layer applied.
    pub fn app(&self) -> Router {
        let config = &self.state.config;
        tracing::info!(
            timeout_secs = config.request_timeout.as_secs(),
            "Request timeout configured"
        );

        api_router::<ApiDoc>(self.state.clone())
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(config.request_timeout))
            .layer(cors_layer(config.cors_allowed_origins.as_deref()))
    }

    /// Serves until `token` is cancelled.
    pub async fn run(self, token: CancellationToken) -> anyhow::Result<()> {
        let address = format!("{}:{}", self.host, self.port);
        let socket_addr: SocketAddr = address
            .parse()
            .with_context(|| format!("Invalid API address {address}"))?;
        let listener = TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("Could not bind {socket_addr}"))?;

        self.serve(listener, token).await
    }

    pub async fn serve(self, listener: TcpListener, token: CancellationToken) -> anyhow::Result<()> {
        let app = self.app();
        let local_addr = listener.local_addr()?;
        tracing::info!("API started at http://{}", local_addr);

        let shutdown = async move { token.cancelled().await };

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .context("API server stopped!")
    }
}

fn cors_layer(origins: Option<&str>) -> CorsLayer {
    let Some(origins) = origins else {
        tracing::info!("CORS_ALLOWED_ORIGINS not set; using permissive CORS configuration");
        return CorsLayer::permissive();
    };

    let allowed_origins: Vec<HeaderValue> = origins
        .split(',')
        .filter_map(|origin| {
            let trimmed = origin.trim();
            if trimmed.is_empty() {
                return None;
            }
            match HeaderValue::from_str(trimmed) {
                Ok(value) => Some(value),
                Err(err) => {
                    tracing::warn!(
                        origin = trimmed,
                        error = %err,
                        "Invalid origin in CORS_ALLOWED_ORIGINS, skipping",
                    );
                    None
                }
            }
        })
        .collect();

    if allowed_origins.is_empty() {
        tracing::warn!(
            "CORS_ALLOWED_ORIGINS was set but no valid origins were parsed; falling back to permissive CORS",
        );
        return CorsLayer::permissive();
    }

    tracing::info!(allowed = %origins, "Configured restricted CORS origins");

    CorsLayer::new()
        .allow_credentials(true)
        .allow_headers(AllowHeaders::mirror_request())
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_origin(AllowOrigin::list(allowed_origins))
}
