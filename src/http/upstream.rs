//! Internal locations: the destinations of an internal redirect.
//!
//! # Responsibilities
//! - Refuse direct client access (404 without an internal redirect)
//! - Forward to the picked endpoint when one was stored
//! - Otherwise apply the location's failure mode
//! - Serve requests the picker left alone from their location's upstream
//!
//! The original request URI is what gets forwarded, not the internal path.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::Uri,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::{FailureMode, InternalLocationConfig};
use crate::context::RequestVariables;
use crate::error::GatewayError;
use crate::http::request::request_id;
use crate::interception::InternalRedirect;
use crate::observability::metrics;

/// Upstream of the client-facing location a request matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationUpstream(pub String);

#[derive(Clone)]
pub struct UpstreamState {
    locations: Arc<HashMap<String, InternalLocationConfig>>,
    endpoint_variable: Arc<str>,
    client: Client<HttpConnector, Body>,
}

impl UpstreamState {
    pub fn new(
        locations: Vec<InternalLocationConfig>,
        endpoint_variable: &str,
        connect_timeout: Duration,
    ) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            locations: Arc::new(
                locations
                    .into_iter()
                    .map(|l| (l.path.clone(), l))
                    .collect(),
            ),
            endpoint_variable: endpoint_variable.into(),
            client,
        }
    }
}

/// Router serving every internal location.
pub fn internal_router(state: UpstreamState) -> Router {
    Router::new()
        .route("/{*path}", any(internal_location))
        .route("/", any(internal_location))
        .with_state(state)
}

async fn internal_location(State(state): State<UpstreamState>, req: Request) -> Response {
    let response = match route(&state, req).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };
    metrics::record_response(response.status().as_u16());
    response
}

async fn route(state: &UpstreamState, req: Request) -> Result<Response, GatewayError> {
    let Some(redirect) = req.extensions().get::<InternalRedirect>().cloned() else {
        return match req.extensions().get::<LocationUpstream>().cloned() {
            Some(LocationUpstream(upstream)) => {
                let uri = req.uri().clone();
                forward(&state.client, &upstream, &uri, req).await
            }
            None => Err(GatewayError::NotFound),
        };
    };
    let location = state
        .locations
        .get(req.uri().path())
        .ok_or(GatewayError::NotFound)?;

    let endpoint = req
        .extensions()
        .get::<RequestVariables>()
        .and_then(|vars| vars.get_non_empty(&state.endpoint_variable))
        .map(str::to_string);

    let upstream = match (endpoint, location.failure_mode, &location.fallback_upstream) {
        (Some(endpoint), _, _) => endpoint,
        (None, FailureMode::FailOpen, Some(fallback)) => fallback.clone(),
        _ => {
            tracing::warn!(
                request_id = %request_id(&req),
                location = %location.path,
                "No endpoint picked and no fallback upstream"
            );
            return Err(GatewayError::NoEndpoint);
        }
    };

    forward(&state.client, &upstream, &redirect.original_uri, req).await
}

async fn forward(
    client: &Client<HttpConnector, Body>,
    upstream: &str,
    original_uri: &Uri,
    req: Request,
) -> Result<Response, GatewayError> {
    let request_id = request_id(&req);
    let path_and_query = original_uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let uri: Uri = format!("http://{}{}", upstream, path_and_query)
        .parse()
        .map_err(|e| GatewayError::Upstream(format!("invalid upstream '{}': {}", upstream, e)))?;

    tracing::debug!(request_id = %request_id, upstream = %uri, "Forwarding request");

    let (mut parts, body) = req.into_parts();
    parts.uri = uri;
    parts.extensions = Default::default();

    match client.request(Request::from_parts(parts, body)).await {
        Ok(response) => Ok(from_upstream(response)),
        Err(e) => {
            tracing::error!(request_id = %request_id, upstream = %upstream, error = %e, "Upstream error");
            Err(GatewayError::Upstream(e.to_string()))
        }
    }
}

fn from_upstream(response: hyper::Response<Incoming>) -> Response {
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Body::new(body))
}
