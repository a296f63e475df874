//! Seeds the request-scoped variable store from the matched location.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::context::RequestVariables;
use crate::http::request::request_id;
use crate::http::upstream::LocationUpstream;
use crate::interception::RouteSettings;
use crate::routing::LocationTable;

pub async fn bind_location(
    State(locations): State<Arc<LocationTable>>,
    mut req: Request,
    next: Next,
) -> Response {
    match locations.match_request(&req) {
        Some(location) => {
            tracing::debug!(
                request_id = %request_id(&req),
                location = %location.name,
                path = %req.uri().path(),
                "Matched location"
            );
            let vars = RequestVariables::seeded(&location.variables);
            req.extensions_mut().insert(vars);
            req.extensions_mut().insert(RouteSettings {
                epp_enabled: location.epp_enabled,
            });
            if let Some(upstream) = &location.upstream {
                req.extensions_mut().insert(LocationUpstream(upstream.clone()));
            }
        }
        None => {
            tracing::debug!(path = %req.uri().path(), "No location matched");
        }
    }
    next.run(req).await
}
