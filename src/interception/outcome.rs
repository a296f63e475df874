//! Fail-open handling of resolution outcomes.
//!
//! Only a picked endpoint changes request state. Errors and faults are
//! logged and the request carries on without an endpoint decision.

use crate::context::{RequestVariables, VariableFlags};
use crate::resolver::ResolutionOutcome;

/// Apply `outcome` to the request's variables. Returns true if an endpoint was stored.
///
/// The outcome is consumed here, so every returned string is released exactly once.
pub fn apply_outcome(
    outcome: ResolutionOutcome,
    vars: &mut RequestVariables,
    endpoint_variable: &str,
    target: &str,
    request_id: &str,
) -> bool {
    match outcome {
        ResolutionOutcome::Endpoint(endpoint) => {
            tracing::info!(
                request_id = %request_id,
                target = %target,
                endpoint = %endpoint,
                "Resolved inference workload endpoint"
            );
            vars.set(endpoint_variable, endpoint, VariableFlags::DYNAMIC);
            true
        }
        ResolutionOutcome::Error(message) => {
            tracing::error!(
                request_id = %request_id,
                target = %target,
                error = %message,
                "Endpoint picker returned an error"
            );
            false
        }
        ResolutionOutcome::Fault(reason) => {
            tracing::error!(
                request_id = %request_id,
                target = %target,
                code = reason.code(),
                error = %reason,
                "Endpoint picker call failed"
            );
            false
        }
    }
}
