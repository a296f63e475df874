//! Routing target extraction.

use axum::http::uri::PathAndQuery;

use crate::config::VariableNames;
use crate::context::store::RequestVariables;
use crate::error::GatewayError;

/// Where the picker lives and where the request goes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingTarget {
    pub host: String,
    pub port: String,
    pub internal_path: String,
}

/// Read the three required variables, failing on the first absent or empty one.
pub fn extract_target(
    vars: &RequestVariables,
    names: &VariableNames,
) -> Result<RoutingTarget, GatewayError> {
    let required = |name: &str| -> Result<String, GatewayError> {
        vars.get_non_empty(name)
            .map(str::to_string)
            .ok_or_else(|| GatewayError::MissingContext {
                variable: name.to_string(),
            })
    };

    let host = required(&names.host)?;
    let port = required(&names.port)?;
    let internal_path = required(&names.internal_path)?;

    // The redirect target has to be a bare path; the query comes from the request.
    let valid_path = internal_path.starts_with('/')
        && internal_path
            .parse::<PathAndQuery>()
            .map(|pq| pq.query().is_none())
            .unwrap_or(false);
    if !valid_path {
        return Err(GatewayError::MissingContext {
            variable: names.internal_path.clone(),
        });
    }

    Ok(RoutingTarget {
        host,
        port,
        internal_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(host: &str, port: &str, path: &str) -> RequestVariables {
        RequestVariables::seeded([
            ("epp_host", host),
            ("epp_port", port),
            ("epp_internal_path", path),
        ])
    }

    #[test]
    fn test_extracts_all_three() {
        let vars = vars("10.0.0.1", "8080", "/upstream");
        let target = extract_target(&vars, &VariableNames::default()).unwrap();
        assert_eq!(
            target,
            RoutingTarget {
                host: "10.0.0.1".into(),
                port: "8080".into(),
                internal_path: "/upstream".into(),
            }
        );
    }

    #[test]
    fn test_missing_or_empty_variable() {
        let names = VariableNames::default();

        let err = extract_target(&vars("10.0.0.1", "", "/upstream"), &names).unwrap_err();
        assert!(matches!(err, GatewayError::MissingContext { ref variable } if variable == "epp_port"));

        let only_host = RequestVariables::seeded([("epp_host", "10.0.0.1")]);
        let err = extract_target(&only_host, &names).unwrap_err();
        assert!(matches!(err, GatewayError::MissingContext { ref variable } if variable == "epp_port"));

        let err = extract_target(&RequestVariables::new(), &names).unwrap_err();
        assert!(matches!(err, GatewayError::MissingContext { ref variable } if variable == "epp_host"));
    }

    #[test]
    fn test_rejects_unusable_internal_path() {
        let names = VariableNames::default();
        for path in ["upstream", "/upstream?x=1", "/bad path"] {
            let err = extract_target(&vars("h", "1", path), &names).unwrap_err();
            assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST, "{path}");
        }
    }

    #[test]
    fn test_custom_variable_names() {
        let names = VariableNames {
            host: "picker_host".into(),
            port: "picker_port".into(),
            internal_path: "picker_path".into(),
            endpoint: "picked".into(),
        };
        let vars = RequestVariables::seeded([
            ("picker_host", "h"),
            ("picker_port", "1"),
            ("picker_path", "/p"),
        ]);
        assert_eq!(extract_target(&vars, &names).unwrap().internal_path, "/p");
    }
}
