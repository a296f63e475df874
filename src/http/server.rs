//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compile locations and build the resolver from config
//! - Wire the pipeline: request ID → trace → timeout → location binding
//!   → endpoint picker interception → internal router
//! - Bind server to listener and stop on the shutdown signal
//!
//! The interception stage wraps the internal router as a service (not as a
//! route layer), so a rewritten URI is routed afresh.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware::from_fn_with_state, Router};
use axum::http::header::InvalidHeaderName;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::http::middleware::{bind_location, epp_interception};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::upstream::{internal_router, UpstreamState};
use crate::interception::{EppSettings, Interceptor};
use crate::resolver::{build_resolver, EndpointResolver, ResolutionInvoker, ResolveError};
use crate::routing::LocationTable;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Resolver(#[from] ResolveError),

    #[error("invalid selection header: {0}")]
    SelectionHeader(#[from] InvalidHeaderName),
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a server using the resolver named in the configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let resolver = build_resolver(&config.epp)?;
        Self::with_resolver(config, resolver)
    }

    /// Create a server with an explicit resolver.
    pub fn with_resolver(
        config: GatewayConfig,
        resolver: Arc<dyn EndpointResolver>,
    ) -> Result<Self, StartupError> {
        let router = build_router(&config, resolver)?;
        Ok(Self { router, config })
    }

    /// The full request pipeline, e.g. for driving it without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the request pipeline.
#[allow(deprecated)]
pub fn build_router(
    config: &GatewayConfig,
    resolver: Arc<dyn EndpointResolver>,
) -> Result<Router, StartupError> {
    let settings = EppSettings::from_config(&config.epp)?;
    let invoker = ResolutionInvoker::new(
        resolver,
        Duration::from_millis(config.epp.resolve_timeout_ms),
    );
    let interceptor = Interceptor::new(settings, invoker);
    let locations = Arc::new(LocationTable::from_config(config.locations.clone()));

    tracing::info!(
        locations = locations.len(),
        internal_locations = config.internal_locations.len(),
        resolver = ?config.epp.resolver.kind,
        "Pipeline configured"
    );

    let internal = internal_router(UpstreamState::new(
        config.internal_locations.clone(),
        &config.epp.variables.endpoint,
        Duration::from_secs(config.timeouts.connect_secs),
    ));

    let pipeline = ServiceBuilder::new()
        .layer(from_fn_with_state(locations, bind_location))
        .layer(from_fn_with_state(interceptor, epp_interception))
        .service(internal);

    Ok(Router::new()
        .fallback_service(pipeline)
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(set_request_id_layer()))
}
