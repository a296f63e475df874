//! Endpoint picker interception stage.
//!
//! # State Machine (per request)
//! ```text
//! Start → Extract ─ missing variable ─→ 400 (no call, no redirect)
//!             │
//!             └→ Serialize → Invoke → {endpoint | error | fault} → Rewrite → Done
//! ```
//!
//! # Design Decisions
//! - Resolution is advisory: errors and faults never fail the request
//! - Exactly one resolution call per request that passes extraction
//! - Settings are built once at startup and shared read-only

pub mod dispatch;
pub mod outcome;

use std::sync::Arc;

use axum::extract::Request;
use axum::http::header::InvalidHeaderName;
use axum::http::HeaderName;

use crate::config::{EppConfig, VariableNames};
use crate::context::{extract_target, HeaderSubset, RequestVariables, RoutingContext};
use crate::error::GatewayError;
use crate::http::request::request_id;
use crate::observability::metrics;
use crate::resolver::{ResolutionInvoker, ResolutionRequest};

pub use dispatch::{rewrite, InternalRedirect};
pub use outcome::apply_outcome;

/// Process-wide interception settings, read-only after startup.
#[derive(Debug, Clone)]
pub struct EppSettings {
    pub variables: VariableNames,
    pub selection_header: HeaderName,
}

impl EppSettings {
    pub fn from_config(config: &EppConfig) -> Result<Self, InvalidHeaderName> {
        Ok(Self {
            variables: config.variables.clone(),
            selection_header: HeaderName::from_bytes(config.selection_header.as_bytes())?,
        })
    }
}

/// Per-location switch, attached to the request by the location stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSettings {
    pub epp_enabled: bool,
}

/// What the stage did with a request.
#[derive(Debug)]
pub enum Interception {
    /// Disabled for this request; passed on unchanged.
    Declined(Request),
    /// Rewritten to the internal path; processing restarts there.
    Redirected(Request),
}

#[derive(Debug, Clone)]
pub struct Interceptor {
    settings: Arc<EppSettings>,
    invoker: ResolutionInvoker,
}

impl Interceptor {
    pub fn new(settings: EppSettings, invoker: ResolutionInvoker) -> Self {
        Self {
            settings: Arc::new(settings),
            invoker,
        }
    }

    pub fn settings(&self) -> &EppSettings {
        &self.settings
    }

    /// Run the stage for one request.
    pub async fn intercept(&self, mut req: Request) -> Result<Interception, GatewayError> {
        let enabled = req
            .extensions()
            .get::<RouteSettings>()
            .is_some_and(|s| s.epp_enabled);
        if !enabled {
            return Ok(Interception::Declined(req));
        }

        let request_id = request_id(&req);
        let mut vars = req
            .extensions_mut()
            .remove::<RequestVariables>()
            .unwrap_or_default();

        let target = extract_target(&vars, &self.settings.variables).inspect_err(|e| {
            tracing::error!(request_id = %request_id, error = %e, "Missing routing context");
        })?;

        let context = RoutingContext::new(
            target,
            req.method().clone(),
            HeaderSubset::capture(req.headers(), &self.settings.selection_header),
        );
        let call = ResolutionRequest::from_context(&context)
            .map_err(|e| GatewayError::Allocation(format!("serialize context: {}", e)))?;

        tracing::debug!(
            request_id = %request_id,
            target = %call.target(),
            context = %call.serialized_context,
            "Calling endpoint picker"
        );
        let outcome = self.invoker.invoke(&call).await;

        let picked = apply_outcome(
            outcome,
            &mut vars,
            &self.settings.variables.endpoint,
            &call.target(),
            &request_id,
        );
        req.extensions_mut().insert(vars);

        let req = rewrite(req, &context.target.internal_path)?;
        metrics::record_redirect(picked);
        tracing::debug!(
            request_id = %request_id,
            uri = %req.uri(),
            endpoint_set = picked,
            "Internal redirect"
        );
        Ok(Interception::Redirected(req))
    }
}
