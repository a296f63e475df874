//! Internal redirect to the resolved location.

use axum::extract::Request;
use axum::http::Uri;

use crate::error::GatewayError;

/// Marks a request that reached its current URI through an internal redirect.
#[derive(Debug, Clone)]
pub struct InternalRedirect {
    /// The URI the client actually asked for.
    pub original_uri: Uri,
}

/// Point `req` at `internal_path`, keeping the original query string as is.
pub fn rewrite(mut req: Request, internal_path: &str) -> Result<Request, GatewayError> {
    let original_uri = req.uri().clone();
    let path_and_query = match original_uri.query() {
        Some(query) => format!("{}?{}", internal_path, query),
        None => internal_path.to_string(),
    };

    let uri = Uri::builder()
        .path_and_query(path_and_query)
        .build()
        .map_err(|e| GatewayError::Allocation(format!("invalid redirect target: {}", e)))?;

    *req.uri_mut() = uri;
    req.extensions_mut().insert(InternalRedirect { original_uri });
    Ok(req)
}
