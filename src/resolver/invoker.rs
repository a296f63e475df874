//! One bounded call to the resolution engine.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::time::timeout;

use crate::observability::metrics;
use crate::resolver::{EndpointResolver, ResolutionRequest, ResolveError};

/// Result of one resolution call. Exactly one variant per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The engine picked a (non-empty) endpoint.
    Endpoint(String),
    /// The engine reported an error message.
    Error(String),
    /// The call failed without an engine message.
    Fault(FaultReason),
}

impl ResolutionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ResolutionOutcome::Endpoint(_) => "endpoint",
            ResolutionOutcome::Error(_) => "error",
            ResolutionOutcome::Fault(reason) => reason.code(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaultReason {
    #[error("resolution timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Transport(String),

    #[error("resolver returned an empty endpoint")]
    EmptyEndpoint,
}

impl FaultReason {
    pub fn code(&self) -> &'static str {
        match self {
            FaultReason::Timeout(_) => "timeout",
            FaultReason::Transport(_) => "transport",
            FaultReason::EmptyEndpoint => "empty_endpoint",
        }
    }
}

/// Calls the configured engine exactly once per request.
#[derive(Debug, Clone)]
pub struct ResolutionInvoker {
    resolver: Arc<dyn EndpointResolver>,
    timeout: Duration,
}

impl ResolutionInvoker {
    pub fn new(resolver: Arc<dyn EndpointResolver>, timeout: Duration) -> Self {
        Self { resolver, timeout }
    }

    pub async fn invoke(&self, request: &ResolutionRequest) -> ResolutionOutcome {
        let start = Instant::now();

        let outcome = match timeout(self.timeout, self.resolver.resolve(request)).await {
            Ok(Ok(endpoint)) if endpoint.is_empty() => {
                ResolutionOutcome::Fault(FaultReason::EmptyEndpoint)
            }
            Ok(Ok(endpoint)) => ResolutionOutcome::Endpoint(endpoint),
            Ok(Err(ResolveError::Engine(message))) => ResolutionOutcome::Error(message),
            Ok(Err(other)) => ResolutionOutcome::Fault(FaultReason::Transport(other.to_string())),
            Err(_) => ResolutionOutcome::Fault(FaultReason::Timeout(self.timeout)),
        };

        metrics::record_resolution(outcome.label(), start);
        outcome
    }
}
