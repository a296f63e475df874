//! Axum glue for the interception stage.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::interception::{Interception, Interceptor};
use crate::observability::metrics;

/// Runs the endpoint picker stage, then hands the (possibly rewritten)
/// request to the next service.
pub async fn epp_interception(
    State(interceptor): State<Interceptor>,
    req: Request,
    next: Next,
) -> Response {
    match interceptor.intercept(req).await {
        Ok(Interception::Declined(req)) | Ok(Interception::Redirected(req)) => next.run(req).await,
        Err(e) => {
            metrics::record_response(e.status_code().as_u16());
            e.into_response()
        }
    }
}
