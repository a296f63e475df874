//! Endpoint resolution subsystem.
//!
//! # Data Flow
//! ```text
//! RoutingContext
//!     → ResolutionRequest (host, port, method, serialized context, body)
//!     → invoker.rs (one call, bounded by a timeout)
//!     → EndpointResolver (header.rs | http.rs)
//!     → ResolutionOutcome: Endpoint | Error | Fault
//! ```
//!
//! # Design Decisions
//! - The resolver is a trait object so engines can be swapped by config
//! - The call is an awaited future; the worker is never blocked
//! - Outcomes are owned values handed to the caller; dropping them is the release

pub mod header;
pub mod http;
pub mod invoker;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::config::{EppConfig, ResolverKind};
use crate::context::RoutingContext;

pub use header::HeaderSelectionResolver;
pub use http::HttpPickerResolver;
pub use invoker::{FaultReason, ResolutionInvoker, ResolutionOutcome};

/// Inputs of one resolution call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub host: String,
    pub port: String,
    pub method: String,
    pub serialized_context: String,
    pub body: Bytes,
}

impl ResolutionRequest {
    /// Serialize `context` into call inputs.
    pub fn from_context(context: &RoutingContext) -> serde_json::Result<Self> {
        Ok(Self {
            host: context.target.host.clone(),
            port: context.target.port.clone(),
            method: context.method.as_str().to_string(),
            serialized_context: context.headers.to_json()?,
            body: context.body.clone(),
        })
    }

    /// `host:port` of the picker, for log lines.
    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    /// The engine answered with an error message.
    #[error("{0}")]
    Engine(String),

    /// The engine could not be reached or its answer could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("resolver setup failed: {0}")]
    Setup(String),
}

/// An engine that picks a backend endpoint for a request.
pub trait EndpointResolver: Send + Sync + fmt::Debug {
    /// Resolve one request to an endpoint identifier (usually `ip:port`).
    fn resolve<'a>(
        &'a self,
        request: &'a ResolutionRequest,
    ) -> BoxFuture<'a, Result<String, ResolveError>>;
}

/// Build the configured engine.
pub fn build_resolver(config: &EppConfig) -> Result<Arc<dyn EndpointResolver>, ResolveError> {
    match config.resolver.kind {
        ResolverKind::Header => Ok(Arc::new(HeaderSelectionResolver::new(&config.selection_header))),
        ResolverKind::Http => {
            let raw = config
                .resolver
                .picker_url
                .as_deref()
                .ok_or_else(|| ResolveError::Setup("picker_url is not set".to_string()))?;
            let url = raw
                .parse()
                .map_err(|e| ResolveError::Setup(format!("invalid picker_url '{}': {}", raw, e)))?;
            let resolver = HttpPickerResolver::new(url, Duration::from_millis(config.resolve_timeout_ms))?;
            Ok(Arc::new(resolver))
        }
    }
}
